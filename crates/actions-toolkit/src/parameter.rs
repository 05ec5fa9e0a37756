// Step parameters: inputs and state coming in, outputs and state going out.

use actions_sdk::StringUtil;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::command::file::validate_pair_key;
use crate::constants::variables;
use crate::context::StepContext;
use crate::error::{Result, ToolkitError};
use crate::key_value::KeyValueInput;

/// What to do when a parameter is not defined (absent or empty).
#[derive(Debug, Clone, PartialEq)]
pub enum Presence<T> {
    /// Fail with [`ToolkitError::NotDefined`].
    Required,
    /// Return `None`.
    Optional,
    /// Return this value.
    Default(T),
}

/// A JSON array parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonArray(pub Vec<Value>);

/// A JSON object parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonObject(pub Map<String, Value>);

/// A JSON scalar parameter: boolean, number, string or null.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPrimitive(pub Value);

/// Types a parameter string can be parsed into.
pub trait FromParameter: Sized {
    /// Human name of the type, used in parse errors.
    const EXPECTED: &'static str;

    fn from_parameter(value: &str) -> Option<Self>;
}

impl FromParameter for String {
    const EXPECTED: &'static str = "string";

    fn from_parameter(value: &str) -> Option<Self> {
        Some(value.to_string())
    }
}

impl FromParameter for bool {
    const EXPECTED: &'static str = "boolean";

    fn from_parameter(value: &str) -> Option<Self> {
        StringUtil::convert_to_bool(value)
    }
}

/// Integers may carry a trailing `n`, as big integer literals are printed.
fn strip_bigint_suffix(value: &str) -> &str {
    let value = value.trim();
    value.strip_suffix('n').unwrap_or(value)
}

impl FromParameter for i64 {
    const EXPECTED: &'static str = "integer";

    fn from_parameter(value: &str) -> Option<Self> {
        strip_bigint_suffix(value).parse().ok()
    }
}

impl FromParameter for u64 {
    const EXPECTED: &'static str = "unsigned integer";

    fn from_parameter(value: &str) -> Option<Self> {
        strip_bigint_suffix(value).parse().ok()
    }
}

impl FromParameter for i128 {
    const EXPECTED: &'static str = "big integer";

    fn from_parameter(value: &str) -> Option<Self> {
        strip_bigint_suffix(value).parse().ok()
    }
}

impl FromParameter for f64 {
    const EXPECTED: &'static str = "number";

    fn from_parameter(value: &str) -> Option<Self> {
        value.trim().parse::<f64>().ok().filter(|n| !n.is_nan())
    }
}

impl FromParameter for Value {
    const EXPECTED: &'static str = "JSON";

    fn from_parameter(value: &str) -> Option<Self> {
        serde_json::from_str(value).ok()
    }
}

impl FromParameter for JsonArray {
    const EXPECTED: &'static str = "JSON array";

    fn from_parameter(value: &str) -> Option<Self> {
        match serde_json::from_str(value).ok()? {
            Value::Array(items) => Some(JsonArray(items)),
            _ => None,
        }
    }
}

impl FromParameter for JsonObject {
    const EXPECTED: &'static str = "JSON object";

    fn from_parameter(value: &str) -> Option<Self> {
        match serde_json::from_str(value).ok()? {
            Value::Object(map) => Some(JsonObject(map)),
            _ => None,
        }
    }
}

impl FromParameter for JsonPrimitive {
    const EXPECTED: &'static str = "JSON primitive";

    fn from_parameter(value: &str) -> Option<Self> {
        match serde_json::from_str(value).ok()? {
            Value::Array(_) | Value::Object(_) => None,
            primitive => Some(JsonPrimitive(primitive)),
        }
    }
}

/// Where a parameter comes from.
#[derive(Debug, Clone, Copy)]
enum ParameterSource {
    Input,
    State,
}

impl ParameterSource {
    fn prefix(self) -> &'static str {
        match self {
            ParameterSource::Input => "INPUT_",
            ParameterSource::State => "STATE_",
        }
    }

    fn name(self) -> &'static str {
        match self {
            ParameterSource::Input => "input",
            ParameterSource::State => "state",
        }
    }

    fn variable(self, key: &str) -> String {
        format!("{}{}", self.prefix(), key.replace(' ', "_").to_uppercase())
    }
}

/// Render a value the way it is written to outputs and state: strings as is,
/// anything else as JSON.
fn stringify<V: Serialize>(value: &V) -> Result<String> {
    Ok(match serde_json::to_value(value)? {
        Value::String(s) => s,
        other => other.to_string(),
    })
}

impl StepContext {
    fn get_parameter<T: FromParameter>(
        &self,
        source: ParameterSource,
        key: &str,
        presence: Presence<T>,
    ) -> Result<Option<T>> {
        if !StringUtil::is_single_line(key) {
            return Err(ToolkitError::Validation(format!(
                "`{key}` is not a valid {} key!",
                source.name()
            )));
        }
        let Some(raw) = self.env().get_non_empty(&source.variable(key)) else {
            return match presence {
                Presence::Required => Err(ToolkitError::NotDefined(format!(
                    "{} `{key}` is not defined!",
                    source.name()
                ))),
                Presence::Optional => Ok(None),
                Presence::Default(value) => Ok(Some(value)),
            };
        };
        match T::from_parameter(&raw) {
            Some(value) => Ok(Some(value)),
            None => Err(ToolkitError::Parse {
                value: raw,
                source_name: source.name(),
                key: key.to_string(),
                expected: T::EXPECTED,
            }),
        }
    }

    /// Read an input of the step.
    ///
    /// Under [`Presence::Required`] and [`Presence::Default`] the result is
    /// always `Some`.
    pub fn get_input<T: FromParameter>(&self, key: &str, presence: Presence<T>) -> Result<Option<T>> {
        self.get_parameter(ParameterSource::Input, key, presence)
    }

    /// Read a state value saved by an earlier phase of the same action.
    pub fn get_state<T: FromParameter>(&self, key: &str, presence: Presence<T>) -> Result<Option<T>> {
        self.get_parameter(ParameterSource::State, key, presence)
    }

    fn set_parameter<V: Serialize>(&self, command: &str, what: &str, input: KeyValueInput<V>) -> Result<()> {
        let mut entries = Vec::new();
        for (key, value) in input.into_entries() {
            validate_pair_key(&key, what)?;
            entries.push((key, stringify(&value)?));
        }
        self.append_file_pairs(command, entries)
    }

    /// Set outputs of the step.
    pub fn set_output<V: Serialize>(&self, input: impl Into<KeyValueInput<V>>) -> Result<()> {
        self.set_parameter(variables::GITHUB_OUTPUT, "output", input.into())
    }

    /// Save state for the later phases (`pre`, `main`, `post`) of this action.
    pub fn set_state<V: Serialize>(&self, input: impl Into<KeyValueInput<V>>) -> Result<()> {
        self.set_parameter(variables::GITHUB_STATE, "state", input.into())
    }

    pub fn clear_output(&self) -> Result<()> {
        self.clear_file_command(variables::GITHUB_OUTPUT)
    }

    pub fn clear_state(&self) -> Result<()> {
        self.clear_file_command(variables::GITHUB_STATE)
    }

    pub fn optimize_output(&self) -> Result<()> {
        self.file_command(variables::GITHUB_OUTPUT)?.optimize()
    }

    pub fn optimize_state(&self) -> Result<()> {
        self.file_command(variables::GITHUB_STATE)?.optimize()
    }
}
