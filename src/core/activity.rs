use std::collections::VecDeque;

use crate::core::time::clock_stamp;

pub const ACTIVITY_LOG_CAPACITY: usize = 10;

const BOOT_LINE: &str = "System ready. Awaiting target acquisition...";

/// Most-recent-first, capped operator log. Write-only from the engine's view.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    lines: VecDeque<String>,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityLog {
    pub fn new() -> Self {
        let mut lines = VecDeque::with_capacity(ACTIVITY_LOG_CAPACITY);
        lines.push_front(BOOT_LINE.to_string());
        Self { lines }
    }

    pub fn push(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        tracing::info!(target: "activity", "{}", msg);
        self.lines.push_front(format!("[{}] {}", clock_stamp(), msg));
        self.lines.truncate(ACTIVITY_LOG_CAPACITY);
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }
}
