// Log output: annotations, debug lines, groups, secret masks and problem
// matchers.

use std::str::FromStr;

use actions_sdk::StringUtil;

use crate::command::StdOutCommand;
use crate::constants::ANNOTATION_DATA_MAX_LENGTH;
use crate::context::StepContext;
use crate::error::{Result, ToolkitError};

/// Severity of an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    Error,
    Notice,
    Warning,
}

impl AnnotationKind {
    /// Stdout command emitting this annotation.
    pub fn command(&self) -> &'static str {
        match self {
            AnnotationKind::Error => "error",
            AnnotationKind::Notice => "notice",
            AnnotationKind::Warning => "warning",
        }
    }
}

impl FromStr for AnnotationKind {
    type Err = ToolkitError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "error" | "Error" => Ok(AnnotationKind::Error),
            "note" | "Note" | "notice" | "Notice" => Ok(AnnotationKind::Notice),
            "warn" | "Warn" | "warning" | "Warning" => Ok(AnnotationKind::Warning),
            _ => Err(ToolkitError::Validation(format!(
                "`{s}` is not a valid GitHub Actions annotation type! Only accept these values: Error, Note, Notice, Warn, Warning, error, note, notice, warn, warning"
            ))),
        }
    }
}

impl std::fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.command())
    }
}

/// Where an annotation points, and how it is titled.
///
/// Line and column numbers are 1-based; `0` means "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationProperties {
    /// Path of the file, relative to the repository root.
    pub file: Option<String>,
    pub line: u64,
    pub column: u64,
    pub line_end: u64,
    pub column_end: u64,
    pub title: Option<String>,
    /// Shown instead of the data when the data is too long for an annotation.
    pub summary: Option<String>,
}

impl AnnotationProperties {
    fn to_command_properties(&self) -> Vec<(&'static str, String)> {
        let mut properties = Vec::new();
        if let Some(file) = self.file.as_deref().filter(|f| !f.is_empty()) {
            properties.push(("file", file.to_string()));
        }
        let numbers = [
            ("line", self.line),
            ("col", self.column),
            ("endLine", self.line_end),
            ("endColumn", self.column_end),
        ];
        for (key, number) in numbers {
            if number > 0 {
                properties.push((key, number.to_string()));
            }
        }
        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            properties.push(("title", title.to_string()));
        }
        properties
    }
}

impl StepContext {
    /// Register values the runner must mask in the log. Empty values are skipped.
    pub fn add_secret_mask<S: AsRef<str>>(&self, values: &[S]) -> Result<()> {
        for value in values.iter().map(AsRef::as_ref).filter(|v| !v.is_empty()) {
            self.dispatch(&StdOutCommand::new("add-mask")?.message(value));
        }
        Ok(())
    }

    /// Start a collapsible group in the log.
    pub fn enter_log_group(&self, title: &str) -> Result<()> {
        if !StringUtil::is_single_line(title) {
            return Err(ToolkitError::Validation(format!(
                "`{title}` (parameter `title`) is not a string which is single line!"
            )));
        }
        self.dispatch(&StdOutCommand::new("group")?.message(title));
        Ok(())
    }

    /// End the current log group.
    pub fn exit_log_group(&self) -> Result<()> {
        self.dispatch(&StdOutCommand::new("endgroup")?);
        Ok(())
    }

    /// Write an annotation.
    ///
    /// When `data` is longer than 4096 UTF-16 code units and a summary is
    /// given, the data goes to the log as plain text and the annotation
    /// carries the summary. Data that itself looks like a command is fenced with
    /// `stop-commands` so the runner does not execute it.
    pub fn write_annotation(&self, kind: AnnotationKind, data: &str, properties: &AnnotationProperties) -> Result<()> {
        let command = StdOutCommand::new(kind.command())?.properties(properties.to_command_properties())?;
        let summary = properties.summary.as_deref().filter(|s| !s.is_empty());

        match summary {
            Some(summary) if data.encode_utf16().count() > ANNOTATION_DATA_MAX_LENGTH => {
                if data.trim().starts_with(crate::command::stdout::COMMAND_KEY) {
                    let end_token = self.disable_process_commands(None)?;
                    self.print(data);
                    self.enable_process_commands(&end_token)?;
                } else {
                    self.print(data);
                }
                self.dispatch(&command.message(summary));
            }
            _ => self.dispatch(&command.message(data)),
        }
        Ok(())
    }

    /// Write debug lines; only visible when step debug logging is on.
    pub fn write_debug<S: AsRef<str>>(&self, data: &[S]) -> Result<()> {
        for item in data {
            self.dispatch(&StdOutCommand::new("debug")?.message(item.as_ref()));
        }
        Ok(())
    }

    pub fn write_error(&self, data: &str, properties: &AnnotationProperties) -> Result<()> {
        self.write_annotation(AnnotationKind::Error, data, properties)
    }

    pub fn write_notice(&self, data: &str, properties: &AnnotationProperties) -> Result<()> {
        self.write_annotation(AnnotationKind::Notice, data, properties)
    }

    pub fn write_warning(&self, data: &str, properties: &AnnotationProperties) -> Result<()> {
        self.write_annotation(AnnotationKind::Warning, data, properties)
    }

    /// Register a problem matcher definition file.
    pub fn add_problem_matcher(&self, path: &str) -> Result<()> {
        if path.is_empty() || !StringUtil::is_single_line(path) {
            return Err(ToolkitError::Validation(format!(
                "`{path}` is not a valid problem matcher path!"
            )));
        }
        self.dispatch(&StdOutCommand::new("add-matcher")?.message(path));
        Ok(())
    }

    /// Remove a problem matcher by its owner.
    pub fn remove_problem_matcher(&self, owner: &str) -> Result<()> {
        if owner.is_empty() {
            return Err(ToolkitError::Validation(
                "Problem matcher owner must not be empty!".to_string(),
            ));
        }
        self.dispatch(&StdOutCommand::new("remove-matcher")?.property("owner", owner)?);
        Ok(())
    }
}
