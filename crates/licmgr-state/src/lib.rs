//! # licmgr-state: Client Registry and License Lifecycle
//!
//! Owns every piece of mutable state in the manager:
//!
//! - **`ClientRegistry`**: client identity → [`ClientRecord`], behind one
//!   exclusive section, persisted through a [`RegistryStore`].
//! - **Registration** ([`registration`]): issues a license, has the external
//!   signer sign its canonical descriptor, then stores the record.
//! - **Usage reports** ([`usage`]): the per-report state machine
//!   `UsageReport → LocatedReport → Screening → UsageDecision`.
//! - **Revocation** ([`revocation`]): one-way disable.
//!
//! ## Locking discipline
//!
//! One `parking_lot::Mutex` covers lookup, mutation and persistence. It is
//! never held across an `.await`: registration signs first and only then
//! takes the lock to store.
//!
//! ## Persistence
//!
//! Every mutation is applied to a copy, saved, and only then committed to
//! memory. A failed save leaves the in-memory registry unchanged and surfaces
//! as `StoreError`.

pub mod error;
pub mod record;
pub mod registration;
pub mod registry;
pub mod revocation;
pub mod store;
pub mod usage;

pub use error::{RegistrationError, RegistryError, StoreError, UsageError};
pub use record::{ClientRecord, QUOTA_BYTES};
pub use registration::{register, LicenseDescriptor, RegistrationReceipt, RegistrationRequest};
pub use registry::ClientRegistry;
pub use revocation::{revoke_client, RevocationOutcome};
pub use store::{ClientMap, JsonFileStore, MemoryStore, RegistryStore};
pub use usage::{Action, Reason, UsageDecision, UsageReport};
