// Environment variables and PATH for the current and subsequent steps.

use std::path::Path;

use actions_sdk::{PathUtil, StringUtil};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::command::file::validate_pair_key;
use crate::constants::variables;
use crate::context::StepContext;
use crate::error::{Result, ToolkitError};
use crate::key_value::{KeyValueInput, PairsCollection};

/// Variables the runner owns; steps may not overwrite them.
static FORBIDDEN_KEY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:CI|PATH)$|^(?:ACTIONS|GITHUB|RUNNER)_").expect("Invalid forbidden key regex")
});

/// Options for [`StepContext::set_environment_variable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetEnvironmentVariableOptions {
    /// Also set the variable in the current process.
    pub scope_current: bool,
    /// Export the variable to the steps that follow (`GITHUB_ENV`).
    pub scope_subsequent: bool,
    /// Compact `GITHUB_ENV` afterwards.
    pub optimize: bool,
}

impl Default for SetEnvironmentVariableOptions {
    fn default() -> Self {
        Self {
            scope_current: true,
            scope_subsequent: true,
            optimize: false,
        }
    }
}

/// Options for [`StepContext::add_path`]. Same switches as for variables.
pub type AddPathOptions = SetEnvironmentVariableOptions;

fn validate_environment_variable_key(key: &str) -> Result<()> {
    validate_pair_key(key, "environment variable")?;
    if FORBIDDEN_KEY_REGEX.is_match(key) {
        return Err(ToolkitError::Forbidden(format!(
            "Modify environment variable `{key}` is forbidden!"
        )));
    }
    Ok(())
}

impl StepContext {
    /// Set environment variables for this step and/or the steps that follow.
    pub fn set_environment_variable<V: Into<String>>(
        &self,
        input: impl Into<KeyValueInput<V>>,
        options: SetEnvironmentVariableOptions,
    ) -> Result<()> {
        let mut pairs = PairsCollection::new();
        for (key, value) in input.into().into_entries() {
            validate_environment_variable_key(&key)?;
            pairs.insert(key, value);
        }

        // Resolve before touching the process so a missing GITHUB_ENV leaves
        // everything unchanged.
        let subsequent = if options.scope_subsequent && !pairs.is_empty() {
            Some(self.file_command(variables::GITHUB_ENV)?)
        } else {
            None
        };

        if options.scope_current {
            for (key, value) in pairs.iter() {
                self.env().set(key, value);
            }
        }
        if let Some(command) = subsequent {
            let entries: Vec<(String, String)> = pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            command.append_pairs(entries)?;
        }
        if options.optimize {
            self.optimize_environment_variable_subsequent()?;
        }
        Ok(())
    }

    /// Add absolute paths to PATH for this step and/or the steps that follow.
    pub fn add_path<S: AsRef<str>>(&self, paths: &[S], options: AddPathOptions) -> Result<()> {
        let paths: Vec<String> = paths.iter().map(|p| p.as_ref().to_string()).collect();
        for path in &paths {
            if !StringUtil::is_single_line(path) || !Path::new(path).is_absolute() {
                return Err(ToolkitError::Validation(format!(
                    "`{path}` is not a valid absolute path!"
                )));
            }
        }

        let subsequent = if options.scope_subsequent && !paths.is_empty() {
            Some(self.file_command(variables::GITHUB_PATH)?)
        } else {
            None
        };

        if options.scope_current && !paths.is_empty() {
            PathUtil::prepend_paths(self.env(), &paths);
        }
        if let Some(command) = subsequent {
            command.append_values(&paths)?;
        }
        if options.optimize {
            self.optimize_path_subsequent()?;
        }
        Ok(())
    }

    /// Drop every variable exported to subsequent steps by this step.
    pub fn clear_environment_variable_subsequent(&self) -> Result<()> {
        self.clear_file_command(variables::GITHUB_ENV)
    }

    /// Drop every PATH entry exported to subsequent steps by this step.
    pub fn clear_path_subsequent(&self) -> Result<()> {
        self.clear_file_command(variables::GITHUB_PATH)
    }

    pub fn optimize_environment_variable_subsequent(&self) -> Result<()> {
        self.file_command(variables::GITHUB_ENV)?.optimize()
    }

    pub fn optimize_path_subsequent(&self) -> Result<()> {
        self.file_command(variables::GITHUB_PATH)?.optimize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_support::test_step;
    use actions_sdk::{Environment, LINE_ENDING, PATH_SEPARATOR, PATH_VARIABLE};
    use std::fs;

    #[test]
    fn forbidden_keys() {
        for key in ["CI", "path", "GITHUB_TOKEN", "actions_runtime", "Runner_Temp"] {
            assert!(matches!(
                validate_environment_variable_key(key),
                Err(ToolkitError::Forbidden(_))
            ));
        }
        for key in ["CIRCLE", "MY_PATH", "GITHUBX", "NODE_OPTIONS"] {
            assert!(validate_environment_variable_key(key).is_ok(), "{key}");
        }
        assert!(matches!(
            validate_environment_variable_key("A\nB"),
            Err(ToolkitError::Validation(_))
        ));
        assert!(matches!(
            validate_environment_variable_key(""),
            Err(ToolkitError::Validation(_))
        ));
        assert!(matches!(
            validate_environment_variable_key("A=B"),
            Err(ToolkitError::Validation(_))
        ));
    }

    #[test]
    fn set_environment_variable_without_env_file_changes_nothing() {
        let step = test_step::<_, String, String>([]);
        let err = step
            .ctx
            .set_environment_variable(("FOO", "bar"), SetEnvironmentVariableOptions::default())
            .unwrap_err();
        assert!(matches!(err, ToolkitError::Configuration { .. }));
        assert_eq!(step.env.get("FOO"), None);
    }

    #[test]
    fn add_path_without_path_file_changes_nothing() {
        let step = test_step([(PATH_VARIABLE, "/usr/bin")]);
        let tool = std::env::temp_dir().join("tool").to_string_lossy().to_string();
        let err = step
            .ctx
            .add_path(&[tool.as_str()], AddPathOptions::default())
            .unwrap_err();
        assert!(matches!(err, ToolkitError::Configuration { .. }));
        assert_eq!(step.env.get(PATH_VARIABLE), Some("/usr/bin".to_string()));
    }

    #[test]
    fn set_environment_variable_both_scopes() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let step = test_step([("GITHUB_ENV", tmp.path().to_string_lossy().to_string())]);

        step.ctx
            .set_environment_variable(("GREETING", "hello"), SetEnvironmentVariableOptions::default())
            .unwrap();

        assert_eq!(step.env.get("GREETING"), Some("hello".to_string()));
        assert_eq!(
            fs::read_to_string(tmp.path()).unwrap(),
            format!("GREETING=hello{LINE_ENDING}")
        );
    }

    #[test]
    fn set_environment_variable_current_scope_only() {
        let step = test_step::<_, String, String>([]);
        let options = SetEnvironmentVariableOptions {
            scope_subsequent: false,
            ..Default::default()
        };
        step.ctx
            .set_environment_variable([("A", "1"), ("B", "2")], options)
            .unwrap();
        assert_eq!(step.env.get("A"), Some("1".to_string()));
        assert_eq!(step.env.get("B"), Some("2".to_string()));
    }

    #[test]
    fn set_environment_variable_rejects_before_writing() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let step = test_step([("GITHUB_ENV", tmp.path().to_string_lossy().to_string())]);
        let err = step
            .ctx
            .set_environment_variable([("OK", "1"), ("GITHUB_SHA", "x")], Default::default())
            .unwrap_err();
        assert!(matches!(err, ToolkitError::Forbidden(_)));
        assert_eq!(step.env.get("OK"), None);
        assert_eq!(fs::read_to_string(tmp.path()).unwrap(), "");
    }

    #[test]
    fn set_environment_variable_with_optimize() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let step = test_step([("GITHUB_ENV", tmp.path().to_string_lossy().to_string())]);
        let options = SetEnvironmentVariableOptions {
            scope_current: false,
            optimize: true,
            ..Default::default()
        };
        step.ctx.set_environment_variable(("A", "1"), options).unwrap();
        step.ctx.set_environment_variable(("A", "2"), options).unwrap();
        assert_eq!(fs::read_to_string(tmp.path()).unwrap(), format!("A=2{LINE_ENDING}"));
    }

    #[test]
    fn add_path_both_scopes() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let step = test_step([
            ("GITHUB_PATH", tmp.path().to_string_lossy().to_string()),
            (PATH_VARIABLE, "/usr/bin".to_string()),
        ]);
        let tool = std::env::temp_dir().join("tool").to_string_lossy().to_string();

        step.ctx.add_path(&[tool.as_str()], AddPathOptions::default()).unwrap();

        assert_eq!(
            step.env.get(PATH_VARIABLE),
            Some(format!("{tool}{PATH_SEPARATOR}/usr/bin"))
        );
        assert_eq!(fs::read_to_string(tmp.path()).unwrap(), format!("{tool}{LINE_ENDING}"));
    }

    #[test]
    fn add_path_rejects_relative() {
        let step = test_step::<_, String, String>([]);
        let err = step
            .ctx
            .add_path(&["relative/bin"], AddPathOptions::default())
            .unwrap_err();
        assert!(matches!(err, ToolkitError::Validation(_)));
    }

    #[test]
    fn clear_subsequent() {
        let env_file = tempfile::NamedTempFile::new().unwrap();
        let path_file = tempfile::NamedTempFile::new().unwrap();
        fs::write(env_file.path(), "A=1\n").unwrap();
        fs::write(path_file.path(), "/x\n").unwrap();
        let step = test_step([
            ("GITHUB_ENV", env_file.path().to_string_lossy().to_string()),
            ("GITHUB_PATH", path_file.path().to_string_lossy().to_string()),
        ]);

        step.ctx.clear_environment_variable_subsequent().unwrap();
        step.ctx.clear_path_subsequent().unwrap();

        assert_eq!(fs::read_to_string(env_file.path()).unwrap(), "");
        assert_eq!(fs::read_to_string(path_file.path()).unwrap(), "");
    }
}
