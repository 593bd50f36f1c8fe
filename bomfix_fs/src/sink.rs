//! Status line sinks.
//!
//! The pipeline reports what it detected and decided as plain text lines.
//! Where those lines end up is the caller's business.

/// Receiver for human-readable status lines.
pub trait StatusSink {
    fn status(&mut self, line: &str);
}

/// Forwards status lines to `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl StatusSink for TracingSink {
    fn status(&mut self, line: &str) {
        tracing::info!(target: "bomfix", "{line}");
    }
}

/// Collects status lines in memory.
impl StatusSink for Vec<String> {
    fn status(&mut self, line: &str) {
        self.push(line.to_string());
    }
}

impl<S: StatusSink + ?Sized> StatusSink for &mut S {
    fn status(&mut self, line: &str) {
        (**self).status(line);
    }
}
