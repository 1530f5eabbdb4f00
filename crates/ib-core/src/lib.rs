//! Shared data model, configuration, error, and host-interface types for the
//! info-bar core.
//!
//! Every other crate in this workspace (`ib-panels`, `ib-strategy`,
//! `ib-prompt`, `ib-parser`, `ib-retrieval`) and the root `infobar-core`
//! facade depend on this crate for the types that flow between them. Nothing
//! here touches I/O — collaborators that do (the data store, the host chat
//! platform, the vector store) are represented as traits in [`host`] and
//! implemented outside this workspace.

pub mod config;
pub mod error;
pub mod events;
pub mod host;
pub mod model;
pub mod status;

pub use config::*;
pub use error::{CoreError, CoreResult};
pub use events::{CoreEvent, DataEntry, HybridSearchOutcome, RetrievalStats};
pub use host::{ChatId, HostContext};
pub use model::*;
pub use status::StatusReport;
