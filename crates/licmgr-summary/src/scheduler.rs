//! # Summary Scheduler
//!
//! Background task that calls [`SummaryGenerator::generate`] every
//! `interval`. The first run happens one full interval after start. A failed
//! run is logged and the schedule continues; the task stops only on
//! [`SchedulerMessage::Shutdown`] or when its control channel closes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info};

use crate::generator::SummaryGenerator;

/// Control messages for a running scheduler.
#[derive(Debug)]
pub enum SchedulerMessage {
    /// Run a generation now, outside the regular schedule.
    RunNow,
    /// Stop the scheduler.
    Shutdown,
}

/// Periodic summary generation.
pub struct SummaryScheduler {
    generator: Arc<SummaryGenerator>,
    interval: Duration,
    control_tx: mpsc::Sender<SchedulerMessage>,
    control_rx: mpsc::Receiver<SchedulerMessage>,
}

impl SummaryScheduler {
    /// `interval` is clamped to at least one second.
    pub fn new(generator: Arc<SummaryGenerator>, interval: Duration) -> Self {
        let (control_tx, control_rx) = mpsc::channel(4);
        Self {
            generator,
            interval: interval.max(Duration::from_secs(1)),
            control_tx,
            control_rx,
        }
    }

    /// A sender for controlling the scheduler once it runs.
    pub fn control_handle(&self) -> mpsc::Sender<SchedulerMessage> {
        self.control_tx.clone()
    }

    /// Run until shutdown.
    pub async fn run(self) {
        let Self {
            generator,
            interval,
            control_tx,
            mut control_rx,
        } = self;
        // Only external handles keep the channel open.
        drop(control_tx);

        info!(interval_secs = interval.as_secs(), "summary scheduler started");
        let mut ticker = interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => run_once(&generator).await,
                msg = control_rx.recv() => match msg {
                    Some(SchedulerMessage::RunNow) => run_once(&generator).await,
                    Some(SchedulerMessage::Shutdown) | None => {
                        info!("summary scheduler shutting down");
                        break;
                    }
                },
            }
        }
    }
}

async fn run_once(generator: &SummaryGenerator) {
    match generator.generate().await {
        Ok(out) => info!(date = %out.date, digest = %out.digest, "scheduled summary generated"),
        Err(e) => error!(error = %e, "scheduled summary generation failed"),
    }
}

/// Spawn the scheduler as a background task.
pub fn spawn_scheduler(
    generator: Arc<SummaryGenerator>,
    interval: Duration,
) -> (tokio::task::JoinHandle<()>, mpsc::Sender<SchedulerMessage>) {
    let scheduler = SummaryScheduler::new(generator, interval);
    let control = scheduler.control_handle();
    let handle = tokio::spawn(scheduler.run());
    (handle, control)
}
