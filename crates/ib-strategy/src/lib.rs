//! Coverage/strategy classification and missing-field detection.
//!
//! Both are pure functions over `(enabledPanels, currentData)` — no I/O,
//! no shared state. A caller can run them on a background thread or call
//! them repeatedly with the same inputs and get the same answer.

pub mod missing;
pub mod strategy;

pub use missing::detect;
pub use strategy::analyze;
