// Stdout workflow commands.
// Builds `::command key=val,key2=val2::data` lines, the format the runner
// scans step output for.

use std::fmt;

use actions_sdk::{OutputWriter, StdoutWriter, StringUtil};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::{STDOUT_COMMANDS, STDOUT_COMMANDS_FORBIDDEN};
use crate::error::{Result, ToolkitError};
use crate::key_value::{KeyValueInput, PairsCollection};

/// The v2 command delimiter (`::`) used both as prefix and as separator.
pub const COMMAND_KEY: &str = "::";

/// Minimum length of a `stop-commands` end token.
pub const END_TOKEN_MIN_LENGTH: usize = 4;

/// Shape of a command name the runner may act on.
static COMMAND_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[\da-z][\da-z._-]*)?[\da-z]$").expect("Invalid command name regex"));

// ---------------------------------------------------------------------------
// Escape mappings
// ---------------------------------------------------------------------------

struct EscapeMapping {
    token: &'static str,
    replacement: &'static str,
}

/// Data escape mappings. `%` comes first so the `%` introduced by the other
/// replacements is not escaped again.
const ESCAPE_DATA_MAPPINGS: &[EscapeMapping] = &[
    EscapeMapping { token: "%",  replacement: "%25" },
    EscapeMapping { token: "\n", replacement: "%0A" },
    EscapeMapping { token: "\r", replacement: "%0D" },
];

/// Applied on top of the data mappings for property values.
const ESCAPE_PROPERTY_MAPPINGS: &[EscapeMapping] = &[
    EscapeMapping { token: ",",  replacement: "%2C" },
    EscapeMapping { token: ":",  replacement: "%3A" },
];

fn apply(mappings: &[EscapeMapping], value: String) -> String {
    mappings
        .iter()
        .fold(value, |acc, mapping| acc.replace(mapping.token, mapping.replacement))
}

/// Escape a command message.
pub fn escape_data(value: &str) -> String {
    apply(ESCAPE_DATA_MAPPINGS, value.to_string())
}

/// Escape a command property value.
pub fn escape_property(value: &str) -> String {
    apply(ESCAPE_PROPERTY_MAPPINGS, escape_data(value))
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A validated stdout workflow command.
///
/// Validation happens while the command is built, so nothing reaches the
/// output for a malformed or forbidden command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StdOutCommand {
    command: String,
    properties: PairsCollection,
    message: String,
}

impl StdOutCommand {
    /// Create a command with no properties and an empty message.
    pub fn new(command: impl Into<String>) -> Result<Self> {
        let command = command.into();
        if !(STDOUT_COMMANDS.contains(&command.as_str()) || COMMAND_NAME_REGEX.is_match(&command)) {
            return Err(ToolkitError::Validation(format!(
                "`{command}` is not a valid GitHub Actions stdout command!"
            )));
        }
        if STDOUT_COMMANDS_FORBIDDEN.contains(&command.as_str()) {
            return Err(ToolkitError::Forbidden(format!(
                "`{command}` is a forbidden GitHub Actions stdout command!"
            )));
        }
        Ok(Self {
            command,
            properties: PairsCollection::new(),
            message: String::new(),
        })
    }

    /// Set the message body.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add one property. A repeated key overwrites the earlier value.
    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if !StringUtil::is_single_line(&key) {
            return Err(ToolkitError::Validation(format!(
                "`{key}` is not a valid GitHub Actions stdout command property key!"
            )));
        }
        self.properties.insert(key, value);
        Ok(self)
    }

    /// Add several properties.
    pub fn properties<V: Into<String>>(self, properties: impl Into<KeyValueInput<V>>) -> Result<Self> {
        properties
            .into()
            .into_entries()
            .into_iter()
            .try_fold(self, |command, (key, value)| command.property(key, value))
    }

    /// The command name.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Render the command line.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Print the command to the process standard output.
    pub fn dispatch(&self) {
        self.dispatch_to(&StdoutWriter);
    }

    /// Write the command to `writer`.
    pub fn dispatch_to(&self, writer: &dyn OutputWriter) {
        writer.write_line(&self.render());
    }
}

impl fmt::Display for StdOutCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{COMMAND_KEY}{}", self.command)?;
        if !self.properties.is_empty() {
            let properties: Vec<String> = self
                .properties
                .iter()
                .map(|(key, value)| format!("{key}={}", escape_property(value)))
                .collect();
            write!(f, " {}", properties.join(","))?;
        }
        write!(f, "{COMMAND_KEY}{}", escape_data(&self.message))
    }
}

// ---------------------------------------------------------------------------
// Echo and command processing toggles
// ---------------------------------------------------------------------------

/// Stop the runner from echoing received commands into the log.
///
/// `ACTIONS_STEP_DEBUG` overrides this setting on the runner side.
pub fn disable_echo(writer: &dyn OutputWriter) -> Result<()> {
    StdOutCommand::new("echo")?.message("off").dispatch_to(writer);
    Ok(())
}

/// Make the runner echo received commands into the log.
pub fn enable_echo(writer: &dyn OutputWriter) -> Result<()> {
    StdOutCommand::new("echo")?.message("on").dispatch_to(writer);
    Ok(())
}

/// Stop the runner from processing stdout commands until the returned token
/// is dispatched as a command. A token is generated when none is given.
pub fn disable_process_commands(writer: &dyn OutputWriter, end_token: Option<&str>) -> Result<String> {
    let end_token = match end_token {
        Some(token) => {
            validate_end_token(token)?;
            token.to_string()
        }
        None => generate_end_token(),
    };
    StdOutCommand::new("stop-commands")?
        .message(end_token.as_str())
        .dispatch_to(writer);
    Ok(end_token)
}

/// Resume stdout command processing by dispatching `end_token`.
pub fn enable_process_commands(writer: &dyn OutputWriter, end_token: &str) -> Result<()> {
    validate_end_token(end_token)?;
    StdOutCommand::new(end_token)?.dispatch_to(writer);
    Ok(())
}

fn generate_end_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn validate_end_token(token: &str) -> Result<()> {
    let valid = StringUtil::is_single_line(token)
        && token.chars().count() >= END_TOKEN_MIN_LENGTH
        && COMMAND_NAME_REGEX.is_match(token)
        && !STDOUT_COMMANDS.contains(&token)
        && !STDOUT_COMMANDS_FORBIDDEN.contains(&token);
    if valid {
        Ok(())
    } else {
        Err(ToolkitError::Validation(
            "Parameter `endToken` is not a string which is single line, more than or equal to 4 characters, and not match any GitHub Actions command!"
                .to_string(),
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
