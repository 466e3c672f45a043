//! Schema-governed uploads into the warehouse
//!
//! This module decides whether a destination table must be created,
//! validated or cleared, and guarantees column consistency before any row
//! is written.

pub mod confirm;
pub mod enrich;
pub mod error;
pub mod identity;
pub mod materialize;
pub mod orchestrator;
pub mod reconcile;
pub mod registry;
pub mod statement;
pub mod types;

pub use confirm::{AutoConfirm, Confirm, DeclineAll, PromptConfirm};
pub use identity::Principal;
pub use orchestrator::{DropOutcome, UploadRequest, Uploader, WriteKind};
pub use registry::SchemaRegistry;
pub use types::*;
