//! # rightst-sync
//!
//! Content-addressed attachment reconciliation and the script push pipeline.
//!
//! Call [`pipeline::plan`] then [`pipeline::apply`] to push a batch of
//! scripts, or [`pipeline::push_script`] for one. Attachments are matched to
//! the remote side by MD5 fingerprint, never by name.

pub mod error;
pub mod hash_index;
pub mod pipeline;
pub mod reconcile;
pub mod remote;
pub mod snapshot;
pub mod upsert;
pub mod walk;
pub mod writer;

pub use error::SyncError;
pub use hash_index::{HashIndex, LocalAttachment};
pub use pipeline::{BatchPlan, LocalScript, NamePolicy, PushReport, PushResult};
pub use reconcile::{AttachmentResult, ReconcilePlan};
pub use snapshot::RemoteSnapshot;
pub use upsert::{Resolution, UpsertOutcome};
pub use writer::ScaffoldResult;
