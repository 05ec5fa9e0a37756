// Metadata about the runner executing the step.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::constants::{variables, RunnerArchitecture, RunnerEnvironment, RunnerOs};
use crate::context::StepContext;
use crate::error::{Result, ToolkitError};

/// Variables every runner sets, with the exact value where one is fixed.
const RUNNER_DEFAULT_VARIABLES: &[(&str, Option<&str>)] = &[
    (variables::CI, Some("true")),
    (variables::GITHUB_ACTION, None),
    (variables::GITHUB_ACTIONS, Some("true")),
    (variables::GITHUB_ACTOR, None),
    (variables::GITHUB_ACTOR_ID, None),
    (variables::GITHUB_API_URL, None),
    (variables::GITHUB_ENV, None),
    (variables::GITHUB_EVENT_NAME, None),
    (variables::GITHUB_EVENT_PATH, None),
    (variables::GITHUB_GRAPHQL_URL, None),
    (variables::GITHUB_JOB, None),
    (variables::GITHUB_OUTPUT, None),
    (variables::GITHUB_PATH, None),
    (variables::GITHUB_REF_NAME, None),
    (variables::GITHUB_REF_TYPE, None),
    (variables::GITHUB_REPOSITORY, None),
    (variables::GITHUB_REPOSITORY_ID, None),
    (variables::GITHUB_REPOSITORY_OWNER, None),
    (variables::GITHUB_REPOSITORY_OWNER_ID, None),
    (variables::GITHUB_RETENTION_DAYS, None),
    (variables::GITHUB_RUN_ATTEMPT, None),
    (variables::GITHUB_RUN_ID, None),
    (variables::GITHUB_RUN_NUMBER, None),
    (variables::GITHUB_SERVER_URL, None),
    (variables::GITHUB_SHA, None),
    (variables::GITHUB_STATE, None),
    (variables::GITHUB_STEP_SUMMARY, None),
    (variables::GITHUB_WORKFLOW, None),
    (variables::GITHUB_WORKFLOW_REF, None),
    (variables::GITHUB_WORKFLOW_SHA, None),
    (variables::GITHUB_WORKSPACE, None),
    (variables::RUNNER_ARCH, None),
    (variables::RUNNER_NAME, None),
    (variables::RUNNER_OS, None),
    (variables::RUNNER_TEMP, None),
];

/// Extra resources [`StepContext::is_in_runner`] can check for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunnerTestOptions {
    pub artifact: bool,
    pub cache: bool,
    /// OpenID Connect token service.
    pub oidc: bool,
    pub tool_cache: bool,
}

impl RunnerTestOptions {
    fn extra_variables(&self) -> Vec<&'static str> {
        let checks = [
            (variables::ACTIONS_RESULTS_URL, self.artifact),
            (variables::ACTIONS_RUNTIME_TOKEN, self.artifact || self.cache),
            (variables::ACTIONS_RUNTIME_URL, self.artifact),
            (variables::ACTIONS_CACHE_URL, self.cache),
            (variables::ACTIONS_ID_TOKEN_REQUEST_TOKEN, self.oidc),
            (variables::ACTIONS_ID_TOKEN_REQUEST_URL, self.oidc),
            (variables::RUNNER_TOOL_CACHE, self.tool_cache),
        ];
        checks
            .into_iter()
            .filter(|&(_, needed)| needed)
            .map(|(name, _)| name)
            .collect()
    }
}

impl StepContext {
    pub(crate) fn required_variable(&self, name: &str, what: &str) -> Result<String> {
        self.env().get(name).ok_or_else(|| {
            ToolkitError::NotDefined(format!(
                "Unable to get the GitHub Actions {what}, environment variable `{name}` is not defined!"
            ))
        })
    }

    fn known_variable<T: FromStr>(&self, name: &str, what: &str) -> Result<T> {
        let value = self.required_variable(name, what)?;
        value.parse().map_err(|_| {
            ToolkitError::Consistency(format!(
                "`{value}` (environment variable `{name}`) is not a known GitHub Actions {what}!"
            ))
        })
    }

    pub(crate) fn absolute_path_variable(&self, name: &str, value: String) -> Result<PathBuf> {
        if !Path::new(&value).is_absolute() {
            return Err(ToolkitError::Consistency(format!(
                "`{value}` (environment variable `{name}`) is not a valid absolute path!"
            )));
        }
        Ok(PathBuf::from(value))
    }

    pub fn runner_architecture(&self) -> Result<RunnerArchitecture> {
        self.known_variable(variables::RUNNER_ARCH, "runner architecture")
    }

    /// Whether the run has debug logging enabled.
    pub fn runner_debug_status(&self) -> bool {
        self.env().get(variables::RUNNER_DEBUG).as_deref() == Some("1")
    }

    pub fn runner_environment(&self) -> Result<RunnerEnvironment> {
        self.known_variable(variables::RUNNER_ENVIRONMENT, "runner environment")
    }

    pub fn runner_name(&self) -> Result<String> {
        self.required_variable(variables::RUNNER_NAME, "runner name")
    }

    pub fn runner_os(&self) -> Result<RunnerOs> {
        self.known_variable(variables::RUNNER_OS, "runner OS")
    }

    /// Temporary directory of the runner, emptied at the start and end of
    /// every job.
    pub fn runner_temp_path(&self) -> Result<PathBuf> {
        let value = self.required_variable(variables::RUNNER_TEMP, "runner TEMP path")?;
        self.absolute_path_variable(variables::RUNNER_TEMP, value)
    }

    /// Tool cache directory; only GitHub-hosted runners set it.
    pub fn runner_tool_cache_path(&self) -> Result<Option<PathBuf>> {
        self.env()
            .get(variables::RUNNER_TOOL_CACHE)
            .map(|value| self.absolute_path_variable(variables::RUNNER_TOOL_CACHE, value))
            .transpose()
    }

    /// Default working directory of steps.
    pub fn runner_workspace_path(&self) -> Result<PathBuf> {
        let value = self.required_variable(variables::GITHUB_WORKSPACE, "runner workspace path")?;
        self.absolute_path_variable(variables::GITHUB_WORKSPACE, value)
    }

    /// Check that the process runs inside a GitHub Actions runner.
    ///
    /// Every missing or unexpected variable is logged as a warning, not only
    /// the first one.
    pub fn is_in_runner(&self, options: RunnerTestOptions) -> bool {
        let checks = RUNNER_DEFAULT_VARIABLES
            .iter()
            .copied()
            .chain(options.extra_variables().into_iter().map(|name| (name, None)));

        let mut in_runner = true;
        for (name, expected) in checks {
            let ok = match (self.env().get(name), expected) {
                (None, _) => false,
                (Some(current), Some(expected)) => current == expected,
                (Some(_), None) => true,
            };
            if !ok {
                tracing::warn!(
                    variable = name,
                    "Unable to get the GitHub Actions resources, environment variable `{name}` is not defined, or not contain an expected value!"
                );
                in_runner = false;
            }
        }
        in_runner
    }

    /// Like [`is_in_runner`](Self::is_in_runner), but as an error.
    pub fn validate_in_runner(&self, options: RunnerTestOptions) -> Result<()> {
        if self.is_in_runner(options) {
            Ok(())
        } else {
            Err(ToolkitError::Consistency(
                "This process requires to invoke inside the GitHub Actions environment!".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_support::test_step;
    use actions_sdk::Environment;

    fn runner_vars() -> Vec<(&'static str, String)> {
        let workspace = std::env::temp_dir().join("work").to_string_lossy().to_string();
        RUNNER_DEFAULT_VARIABLES
            .iter()
            .map(|&(name, expected)| {
                let value = match name {
                    variables::GITHUB_WORKSPACE | variables::RUNNER_TEMP => workspace.clone(),
                    _ => expected.unwrap_or("x").to_string(),
                };
                (name, value)
            })
            .collect()
    }

    #[test]
    fn metadata_getters() {
        let step = test_step([
            ("RUNNER_ARCH", "X64"),
            ("RUNNER_OS", "macOS"),
            ("RUNNER_ENVIRONMENT", "github-hosted"),
            ("RUNNER_NAME", "Hosted Agent"),
            ("RUNNER_DEBUG", "1"),
        ]);
        assert_eq!(step.ctx.runner_architecture().unwrap(), RunnerArchitecture::X64);
        assert_eq!(step.ctx.runner_os().unwrap(), RunnerOs::MacOS);
        assert_eq!(step.ctx.runner_environment().unwrap(), RunnerEnvironment::GithubHosted);
        assert_eq!(step.ctx.runner_name().unwrap(), "Hosted Agent");
        assert!(step.ctx.runner_debug_status());
    }

    #[test]
    fn unknown_and_missing_values() {
        let step = test_step([("RUNNER_ARCH", "riscv"), ("RUNNER_DEBUG", "true")]);
        assert!(matches!(
            step.ctx.runner_architecture(),
            Err(ToolkitError::Consistency(_))
        ));
        assert!(matches!(step.ctx.runner_os(), Err(ToolkitError::NotDefined(_))));
        assert!(!step.ctx.runner_debug_status());
    }

    #[test]
    fn path_getters() {
        let temp = std::env::temp_dir();
        let step = test_step([
            ("RUNNER_TEMP", temp.to_string_lossy().to_string()),
            ("GITHUB_WORKSPACE", "relative/work".to_string()),
        ]);
        assert_eq!(step.ctx.runner_temp_path().unwrap(), temp);
        assert!(matches!(
            step.ctx.runner_workspace_path(),
            Err(ToolkitError::Consistency(_))
        ));
        assert_eq!(step.ctx.runner_tool_cache_path().unwrap(), None);

        step.env.set("RUNNER_TOOL_CACHE", "cache");
        assert!(step.ctx.runner_tool_cache_path().is_err());
    }

    #[test]
    fn in_runner_with_default_variables() {
        let step = test_step(runner_vars());
        assert!(step.ctx.is_in_runner(RunnerTestOptions::default()));
        assert!(step.ctx.validate_in_runner(RunnerTestOptions::default()).is_ok());
    }

    #[test]
    fn in_runner_checks_expected_values() {
        let step = test_step(runner_vars());
        step.env.set("CI", "1");
        assert!(!step.ctx.is_in_runner(RunnerTestOptions::default()));
    }

    #[test]
    fn in_runner_checks_requested_resources() {
        let step = test_step(runner_vars());
        let options = RunnerTestOptions {
            cache: true,
            ..Default::default()
        };
        assert!(!step.ctx.is_in_runner(options));
        assert!(matches!(
            step.ctx.validate_in_runner(options),
            Err(ToolkitError::Consistency(_))
        ));

        step.env.set("ACTIONS_RUNTIME_TOKEN", "token");
        step.env.set("ACTIONS_CACHE_URL", "https://cache.example/");
        assert!(step.ctx.is_in_runner(options));
    }

    #[test]
    fn not_in_runner() {
        let step = test_step::<_, String, String>([]);
        assert!(!step.ctx.is_in_runner(RunnerTestOptions::default()));
    }
}
