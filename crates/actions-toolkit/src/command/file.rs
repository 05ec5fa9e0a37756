// File commands (GITHUB_ENV, GITHUB_PATH, GITHUB_OUTPUT, etc.).
// The runner hands each step the paths of a few files through environment
// variables; the step appends to them and the runner processes them when the
// step ends.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use actions_sdk::{Environment, StringUtil, LINE_ENDING};
use once_cell::sync::Lazy;
use regex::Regex;
use strum::{AsRefStr, Display, EnumString};

use crate::constants::variables;
use crate::error::{Result, ToolkitError};
use crate::key_value::{KeyValueInput, PairsCollection};

/// Heredoc marker between a key and its delimiter.
const HEREDOC_MARKER: &str = "<<";

/// Shape of a custom file command name.
static FILE_COMMAND_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[\dA-Z][\dA-Z_-]*)?[\dA-Z]$").expect("Invalid file command regex"));

/// Content layout of a file command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FileCommandKind {
    /// `key=value` lines and `key<<DELIMITER` blocks.
    Pairs,
    /// One value per line.
    Values,
    /// Opaque text, appended verbatim.
    #[default]
    Raw,
}

/// Well-known file commands and their content layout.
const FILE_COMMANDS: &[(&str, FileCommandKind)] = &[
    (variables::GITHUB_ENV, FileCommandKind::Pairs),
    (variables::GITHUB_OUTPUT, FileCommandKind::Pairs),
    (variables::GITHUB_PATH, FileCommandKind::Values),
    (variables::GITHUB_STATE, FileCommandKind::Pairs),
    (variables::GITHUB_STEP_SUMMARY, FileCommandKind::Raw),
];

/// Layout of a well-known file command, `None` for custom ones.
pub fn known_kind(command: &str) -> Option<FileCommandKind> {
    FILE_COMMANDS
        .iter()
        .find(|(name, _)| *name == command)
        .map(|&(_, kind)| kind)
}

/// A file command resolved against the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCommand {
    name: String,
    path: PathBuf,
    kind: FileCommandKind,
}

impl FileCommand {
    /// Resolve `name`. Custom commands are treated as [`FileCommandKind::Raw`].
    pub fn resolve(env: &dyn Environment, name: &str) -> Result<Self> {
        Self::resolve_with_kind(env, name, FileCommandKind::Raw)
    }

    /// Resolve `name`, using `fallback_kind` when it is not a well-known command.
    pub fn resolve_with_kind(env: &dyn Environment, name: &str, fallback_kind: FileCommandKind) -> Result<Self> {
        let path = resolve_path(env, name)?;
        let kind = known_kind(name).unwrap_or(fallback_kind);
        tracing::debug!(command = name, path = %path.display(), %kind, "Resolved file command");
        Ok(Self {
            name: name.to_string(),
            path,
            kind,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> FileCommandKind {
        self.kind
    }

    /// Append single-line values, one per line. Duplicates are written once.
    pub fn append_values<S: AsRef<str>>(&self, values: &[S]) -> Result<()> {
        for value in values {
            let value = value.as_ref();
            if value.is_empty() || !StringUtil::is_single_line(value) {
                return Err(ToolkitError::Validation(format!(
                    "`{value}` is not a valid GitHub Actions file line command value!"
                )));
            }
        }
        if values.is_empty() {
            return Ok(());
        }
        let content = format_values(values.iter().map(AsRef::as_ref));
        self.append_raw(format!("{content}{LINE_ENDING}"))
    }

    /// Append pairs. Keys must be non-empty and single-line.
    pub fn append_pairs<V: Into<String>>(&self, input: impl Into<KeyValueInput<V>>) -> Result<()> {
        let mut pairs = PairsCollection::new();
        for (key, value) in input.into().into_entries() {
            validate_pair_key(&key, "file map command pair")?;
            pairs.insert(key, value);
        }
        if pairs.is_empty() {
            return Ok(());
        }
        self.append_raw(format!("{}{LINE_ENDING}", format_pairs(&pairs)))
    }

    /// Append `content` verbatim.
    pub fn append_raw(&self, content: impl AsRef<[u8]>) -> Result<()> {
        let content = content.as_ref();
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(content)?;
        tracing::debug!(command = %self.name, bytes = content.len(), "Appended to file command");
        Ok(())
    }

    /// Truncate the file.
    pub fn clear(&self) -> Result<()> {
        fs::write(&self.path, "")?;
        tracing::debug!(command = %self.name, "Cleared file command");
        Ok(())
    }

    /// Rewrite the file in its most compact form.
    ///
    /// Content that does not parse under the command's layout is left
    /// untouched. Raw commands are never rewritten.
    pub fn optimize(&self) -> Result<()> {
        if self.kind == FileCommandKind::Raw {
            return Ok(());
        }
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        let optimized = match self.kind {
            FileCommandKind::Pairs => match parse_pairs(&content) {
                Some(pairs) if pairs.is_empty() => String::new(),
                Some(pairs) => format!("{}{LINE_ENDING}", format_pairs(&pairs)),
                None => {
                    tracing::warn!(command = %self.name, "File command content is not well formed, skipping optimization");
                    return Ok(());
                }
            },
            FileCommandKind::Values => {
                let values = format_values(
                    StringUtil::split_lines(&content)
                        .into_iter()
                        .map(str::trim)
                        .filter(|line| !line.is_empty()),
                );
                if values.is_empty() {
                    String::new()
                } else {
                    format!("{values}{LINE_ENDING}")
                }
            }
            FileCommandKind::Raw => return Ok(()),
        };

        fs::write(&self.path, &optimized)?;
        tracing::debug!(
            command = %self.name,
            before = content.len(),
            after = optimized.len(),
            "Optimized file command"
        );
        Ok(())
    }
}

/// Look up and validate the path of file command `command`.
///
/// The file itself may not exist yet; the runner creates it lazily.
pub fn resolve_path(env: &dyn Environment, command: &str) -> Result<PathBuf> {
    if !(known_kind(command).is_some() || FILE_COMMAND_NAME_REGEX.is_match(command)) {
        return Err(ToolkitError::Validation(format!(
            "`{command}` is not a valid GitHub Actions file command!"
        )));
    }
    let path = env.get_non_empty(command).ok_or_else(|| ToolkitError::Configuration {
        command: command.to_string(),
    })?;
    let path = PathBuf::from(path);
    if !path.is_absolute() {
        return Err(ToolkitError::Consistency(format!(
            "`{}` (file command `{command}`) is not a valid absolute path!",
            path.display()
        )));
    }
    match fs::metadata(&path) {
        Ok(metadata) if !metadata.is_file() => Err(ToolkitError::Consistency(format!(
            "`{}` (file command `{command}`) is not a file!",
            path.display()
        ))),
        Ok(_) => Ok(path),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(path),
        Err(e) => Err(e.into()),
    }
}

/// Keys must survive a round trip through the pairs layout, so they can not
/// carry the `=` or `<<` separators.
pub(crate) fn validate_pair_key(key: &str, what: &str) -> Result<()> {
    if key.is_empty() || !StringUtil::is_single_line(key) || key.contains('=') || key.contains(HEREDOC_MARKER) {
        return Err(ToolkitError::Validation(format!(
            "`{key}` is not a valid GitHub Actions {what} key!"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Serialize `pairs` into the pairs layout, without a trailing terminator.
pub fn format_pairs(pairs: &PairsCollection) -> String {
    format_pairs_with(pairs, &mut || uuid::Uuid::new_v4().simple().to_string())
}

fn format_pairs_with(pairs: &PairsCollection, next_delimiter: &mut dyn FnMut() -> String) -> String {
    pairs
        .iter()
        .map(|(key, value)| {
            if StringUtil::is_single_line(value) {
                return format!("{key}={value}");
            }
            let delimiter = loop {
                let candidate = next_delimiter();
                if !key.contains(&candidate) && !value.contains(&candidate) {
                    break candidate;
                }
            };
            format!(
                "{key}{HEREDOC_MARKER}{delimiter}{LINE_ENDING}{}{LINE_ENDING}{delimiter}",
                StringUtil::normalize_line_endings(value)
            )
        })
        .collect::<Vec<_>>()
        .join(LINE_ENDING)
}

/// Serialize values one per line, dropping repeats, without a trailing
/// terminator.
pub fn format_values<'a>(values: impl IntoIterator<Item = &'a str>) -> String {
    let mut unique: Vec<&str> = Vec::new();
    for value in values {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    unique.join(LINE_ENDING)
}

/// Parse pairs layout content. `None` when any line is malformed.
fn parse_pairs(content: &str) -> Option<PairsCollection> {
    let lines = StringUtil::split_lines(content);
    let mut pairs = PairsCollection::new();
    let mut index = 0;
    while index < lines.len() {
        let line = lines[index];
        index += 1;
        if line.trim().is_empty() {
            continue;
        }

        let equals_index = line.find('=');
        let heredoc_index = line.find(HEREDOC_MARKER);
        let is_heredoc = match (equals_index, heredoc_index) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(equals), Some(heredoc)) => heredoc < equals,
        };

        if is_heredoc {
            let (key, delimiter) = line.rsplit_once(HEREDOC_MARKER)?;
            if key.is_empty() || delimiter.is_empty() {
                return None;
            }
            let mut value = Vec::new();
            loop {
                let next = *lines.get(index)?;
                index += 1;
                if next == delimiter {
                    break;
                }
                value.push(next);
            }
            pairs.insert(key, value.join("\n"));
            continue;
        }

        let (key, value) = line.split_once('=')?;
        if key.is_empty() {
            return None;
        }
        pairs.insert(key, value);
    }
    Some(pairs)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
