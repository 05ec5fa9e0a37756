// StepContext: the handle every step-facing operation hangs off.

use std::path::PathBuf;
use std::sync::Arc;

use actions_sdk::{Environment, OutputWriter, ProcessEnvironment, StdoutWriter};

use crate::command::{self, FileCommand, FileCommandKind, StdOutCommand};
use crate::error::Result;
use crate::key_value::KeyValueInput;

/// The environment and output of the step being executed.
///
/// All toolkit operations are methods on this type. `StepContext::default()`
/// binds the real process environment and stdout; tests bind a
/// `MemoryEnvironment` and a `CollectingWriter` instead.
#[derive(Clone)]
pub struct StepContext {
    env: Arc<dyn Environment>,
    output: Arc<dyn OutputWriter>,
}

impl StepContext {
    pub fn new(env: Arc<dyn Environment>, output: Arc<dyn OutputWriter>) -> Self {
        Self { env, output }
    }

    /// Context bound to the process environment and standard output.
    pub fn from_process() -> Self {
        Self::new(Arc::new(ProcessEnvironment), Arc::new(StdoutWriter))
    }

    pub fn env(&self) -> &dyn Environment {
        self.env.as_ref()
    }

    pub fn output(&self) -> &dyn OutputWriter {
        self.output.as_ref()
    }

    /// Write a stdout command.
    pub fn dispatch(&self, command: &StdOutCommand) {
        command.dispatch_to(self.output());
    }

    /// Write a plain log line.
    pub fn print(&self, line: &str) {
        self.output.write_line(line);
    }

    // -----------------------------------------------------------------------
    // File commands
    // -----------------------------------------------------------------------

    /// Resolve a file command. Custom commands are treated as raw.
    pub fn file_command(&self, name: &str) -> Result<FileCommand> {
        FileCommand::resolve(self.env(), name)
    }

    /// Resolve a file command, using `kind` when it is not a well-known one.
    pub fn file_command_with_kind(&self, name: &str, kind: FileCommandKind) -> Result<FileCommand> {
        FileCommand::resolve_with_kind(self.env(), name, kind)
    }

    /// Path of a file command.
    pub fn file_command_path(&self, name: &str) -> Result<PathBuf> {
        command::resolve_path(self.env(), name)
    }

    /// Append single-line values to a file command.
    pub fn append_file_values<S: AsRef<str>>(&self, name: &str, values: &[S]) -> Result<()> {
        self.file_command(name)?.append_values(values)
    }

    /// Append pairs to a file command.
    pub fn append_file_pairs<V: Into<String>>(&self, name: &str, input: impl Into<KeyValueInput<V>>) -> Result<()> {
        self.file_command(name)?.append_pairs(input)
    }

    /// Truncate a file command.
    pub fn clear_file_command(&self, name: &str) -> Result<()> {
        self.file_command(name)?.clear()
    }

    /// Compact a file command. `kind` only applies to custom commands.
    pub fn optimize_file_command(&self, name: &str, kind: FileCommandKind) -> Result<()> {
        self.file_command_with_kind(name, kind)?.optimize()
    }

    // -----------------------------------------------------------------------
    // Command processing
    // -----------------------------------------------------------------------

    pub fn disable_echo(&self) -> Result<()> {
        command::disable_echo(self.output())
    }

    pub fn enable_echo(&self) -> Result<()> {
        command::enable_echo(self.output())
    }

    /// Stop command processing; returns the token that resumes it.
    pub fn disable_process_commands(&self, end_token: Option<&str>) -> Result<String> {
        command::disable_process_commands(self.output(), end_token)
    }

    pub fn enable_process_commands(&self, end_token: &str) -> Result<()> {
        command::enable_process_commands(self.output(), end_token)
    }
}

impl Default for StepContext {
    fn default() -> Self {
        Self::from_process()
    }
}

impl std::fmt::Debug for StepContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepContext").finish_non_exhaustive()
    }
}

/// Test helpers shared by the step-facing modules.
#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use actions_sdk::{CollectingWriter, MemoryEnvironment};

    pub(crate) struct TestStep {
        pub env: Arc<MemoryEnvironment>,
        pub output: Arc<CollectingWriter>,
        pub ctx: StepContext,
    }

    pub(crate) fn test_step<I, K, V>(vars: I) -> TestStep
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let env = Arc::new(MemoryEnvironment::with_vars(vars));
        let output = Arc::new(CollectingWriter::new());
        let ctx = StepContext::new(env.clone(), output.clone());
        TestStep { env, output, ctx }
    }
}
