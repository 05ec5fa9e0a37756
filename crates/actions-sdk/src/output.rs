/// Line-oriented sink for workflow commands.
///
/// The runner watches the step's standard output for `::command::` lines. We
/// mirror that with a trait so commands can be captured in tests.
pub trait OutputWriter: Send + Sync {
    /// Write one line. The writer supplies the line terminator.
    fn write_line(&self, line: &str);
}

/// Writes every line to the process standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutWriter;

impl OutputWriter for StdoutWriter {
    fn write_line(&self, line: &str) {
        println!("{line}");
    }
}

/// Discards all lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullWriter;

impl OutputWriter for NullWriter {
    fn write_line(&self, _line: &str) {}
}

/// Collects all lines into a `Vec`.
/// Useful for testing output.
#[derive(Debug, Default)]
pub struct CollectingWriter {
    lines: parking_lot::Mutex<Vec<String>>,
}

impl CollectingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return all collected lines.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Clear collected lines.
    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl OutputWriter for CollectingWriter {
    fn write_line(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}
