//! Reporting sinks for human-readable progress lines.
//!
//! Lines are free text for operators. Nothing parses them.

use std::cell::RefCell;
use std::rc::Rc;

/// Destination for progress and diagnostic lines.
pub trait ReportSink {
    /// A line describing work that was done.
    fn notice(&self, line: &str);

    /// A line describing something that was skipped and why.
    fn diagnostic(&self, line: &str) {
        self.notice(line);
    }
}

/// Default sink: forwards lines to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn notice(&self, line: &str) {
        tracing::info!("{line}");
    }

    fn diagnostic(&self, line: &str) {
        tracing::warn!("{line}");
    }
}

/// Collects lines in memory. Clones share the same buffer, so a test can keep
/// one handle and give another to the code under test.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Rc<RefCell<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every line received so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    pub fn clear(&self) {
        self.lines.borrow_mut().clear();
    }
}

impl ReportSink for MemorySink {
    fn notice(&self, line: &str) {
        self.lines.borrow_mut().push(line.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_clones_share_lines() {
        let sink = MemorySink::new();
        let handle = sink.clone();
        handle.notice("Patched CELL:0165A7()");
        handle.diagnostic("Unable to resolve record: 0165A8");
        assert_eq!(
            sink.lines(),
            ["Patched CELL:0165A7()", "Unable to resolve record: 0165A8"]
        );
        sink.clear();
        assert!(handle.lines().is_empty());
    }

    #[test]
    fn tracing_sink_accepts_lines_without_subscriber() {
        TracingSink.notice("no subscriber installed");
        TracingSink.diagnostic("still fine");
    }
}
