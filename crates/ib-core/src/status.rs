//! Observable health counters, surfaced via `getStatus()`: repeated
//! failures increment `error_count` rather than just logging and
//! forgetting.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub initialized: bool,
    pub error_count: u32,
    pub retrieval_error_count: u32,
    pub last_error: Option<String>,
}

impl StatusReport {
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.error_count += 1;
        self.last_error = Some(message.into());
    }

    pub fn record_retrieval_error(&mut self, message: impl Into<String>) {
        self.retrieval_error_count += 1;
        self.last_error = Some(message.into());
    }
}
