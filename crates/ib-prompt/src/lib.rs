//! Prompt assembly: rules-catalog rendering, template composition, and
//! host injection routing.

pub mod compose;
pub mod inject;
pub mod rules;
pub mod templates;
pub mod types;

pub use compose::compose;
pub use inject::{resolve_api_target, take_stashed, InjectionDispatcher};
pub use rules::{FieldRule, PanelRule, RuleCatalog, RuleProvider};
pub use types::{ApiTarget, ComposeOptions, OutputMode};
