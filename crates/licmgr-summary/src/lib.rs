//! # licmgr-summary: Signed Usage Summaries
//!
//! Pipeline: snapshot the registry → canonical-encode → external signature →
//! write `<dir>/YYYY-MM-DD.json` atomically.
//!
//! - [`snapshot`]: the signed unit, a point-in-time view of every client.
//! - [`artifact`]: the on-disk `{summary, signature}` file and discovery of
//!   the latest one.
//! - [`generator`]: runs the pipeline, at most one run per calendar day in
//!   flight at a time.
//! - [`scheduler`]: fires the generator periodically.
//!
//! The registry lock is held only while copying records. The signer call
//! happens outside it, so a persisted snapshot may already be behind the
//! live registry when it lands on disk.

pub mod artifact;
pub mod error;
pub mod generator;
pub mod scheduler;
pub mod snapshot;

pub use artifact::{read_artifact, write_artifact, SignedArtifact};
pub use licmgr_core::{artifact_file_name, latest_artifact_path};
pub use error::SummaryError;
pub use generator::{SummaryGenerator, SummaryOutcome};
pub use scheduler::{spawn_scheduler, SchedulerMessage, SummaryScheduler};
pub use snapshot::{ClientUsageView, SummarySnapshot};
