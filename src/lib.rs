//! Facade over the info-bar core: prompt assembly, response parsing and
//! data application, and contextual memory retrieval, wired together per
//! the control-flow diagram in spec §2.
//!
//! Every other crate in this workspace (`ib-core`, `ib-panels`,
//! `ib-strategy`, `ib-prompt`, `ib-parser`, `ib-retrieval`) is re-exported
//! here so a host only depends on this one crate.

mod facade;

pub use facade::{Engine, MemorySummaryIngestor, TurnOptions, TurnPlan};

pub use ib_core as core;
pub use ib_panels as panels;
pub use ib_parser as parser;
pub use ib_prompt as prompt;
pub use ib_retrieval as retrieval;
pub use ib_strategy as strategy;
