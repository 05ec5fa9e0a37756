// Constants describing the runner contract: well-known variables, command
// names and the closed value sets the runner publishes.

use strum::{AsRefStr, Display, EnumString};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// CPU architecture of the runner executing the job (`RUNNER_ARCH`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
pub enum RunnerArchitecture {
    #[strum(serialize = "ARM")]
    Arm,
    #[strum(serialize = "ARM64")]
    Arm64,
    #[strum(serialize = "X64")]
    X64,
    #[strum(serialize = "X86")]
    X86,
}

/// Operating system of the runner executing the job (`RUNNER_OS`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
pub enum RunnerOs {
    #[strum(serialize = "Linux")]
    Linux,
    #[strum(serialize = "macOS")]
    MacOS,
    #[strum(serialize = "Windows")]
    Windows,
}

/// Who provisions the runner executing the job (`RUNNER_ENVIRONMENT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum RunnerEnvironment {
    GithubHosted,
    SelfHosted,
}

// ---------------------------------------------------------------------------
// Command names
// ---------------------------------------------------------------------------

/// Stdout commands the runner currently recognizes.
pub const STDOUT_COMMANDS: &[&str] = &[
    "add-mask",
    "add-matcher",
    "debug",
    "echo",
    "endgroup",
    "error",
    "group",
    "notice",
    "remove-matcher",
    "stop-commands",
    "warning",
];

/// Stdout commands the runner disabled in favor of file commands.
pub const STDOUT_COMMANDS_FORBIDDEN: &[&str] = &["add-path", "save-state", "set-env", "set-output"];

/// Annotation payloads longer than this are printed as plain log text when a
/// summary is available.
pub const ANNOTATION_DATA_MAX_LENGTH: usize = 4096;

// ---------------------------------------------------------------------------
// Well-known environment variables
// ---------------------------------------------------------------------------

pub mod variables {
    pub const CI: &str = "CI";

    // File commands
    pub const GITHUB_ENV: &str = "GITHUB_ENV";
    pub const GITHUB_OUTPUT: &str = "GITHUB_OUTPUT";
    pub const GITHUB_PATH: &str = "GITHUB_PATH";
    pub const GITHUB_STATE: &str = "GITHUB_STATE";
    pub const GITHUB_STEP_SUMMARY: &str = "GITHUB_STEP_SUMMARY";

    // Runner
    pub const RUNNER_ARCH: &str = "RUNNER_ARCH";
    pub const RUNNER_DEBUG: &str = "RUNNER_DEBUG";
    pub const RUNNER_ENVIRONMENT: &str = "RUNNER_ENVIRONMENT";
    pub const RUNNER_NAME: &str = "RUNNER_NAME";
    pub const RUNNER_OS: &str = "RUNNER_OS";
    pub const RUNNER_TEMP: &str = "RUNNER_TEMP";
    pub const RUNNER_TOOL_CACHE: &str = "RUNNER_TOOL_CACHE";

    // Workflow
    pub const GITHUB_ACTION: &str = "GITHUB_ACTION";
    pub const GITHUB_ACTIONS: &str = "GITHUB_ACTIONS";
    pub const GITHUB_ACTOR: &str = "GITHUB_ACTOR";
    pub const GITHUB_ACTOR_ID: &str = "GITHUB_ACTOR_ID";
    pub const GITHUB_API_URL: &str = "GITHUB_API_URL";
    pub const GITHUB_BASE_REF: &str = "GITHUB_BASE_REF";
    pub const GITHUB_EVENT_NAME: &str = "GITHUB_EVENT_NAME";
    pub const GITHUB_EVENT_PATH: &str = "GITHUB_EVENT_PATH";
    pub const GITHUB_GRAPHQL_URL: &str = "GITHUB_GRAPHQL_URL";
    pub const GITHUB_HEAD_REF: &str = "GITHUB_HEAD_REF";
    pub const GITHUB_JOB: &str = "GITHUB_JOB";
    pub const GITHUB_REF: &str = "GITHUB_REF";
    pub const GITHUB_REF_NAME: &str = "GITHUB_REF_NAME";
    pub const GITHUB_REF_PROTECTED: &str = "GITHUB_REF_PROTECTED";
    pub const GITHUB_REF_TYPE: &str = "GITHUB_REF_TYPE";
    pub const GITHUB_REPOSITORY: &str = "GITHUB_REPOSITORY";
    pub const GITHUB_REPOSITORY_ID: &str = "GITHUB_REPOSITORY_ID";
    pub const GITHUB_REPOSITORY_OWNER: &str = "GITHUB_REPOSITORY_OWNER";
    pub const GITHUB_REPOSITORY_OWNER_ID: &str = "GITHUB_REPOSITORY_OWNER_ID";
    pub const GITHUB_RETENTION_DAYS: &str = "GITHUB_RETENTION_DAYS";
    pub const GITHUB_RUN_ATTEMPT: &str = "GITHUB_RUN_ATTEMPT";
    pub const GITHUB_RUN_ID: &str = "GITHUB_RUN_ID";
    pub const GITHUB_RUN_NUMBER: &str = "GITHUB_RUN_NUMBER";
    pub const GITHUB_SERVER_URL: &str = "GITHUB_SERVER_URL";
    pub const GITHUB_SHA: &str = "GITHUB_SHA";
    pub const GITHUB_WORKFLOW: &str = "GITHUB_WORKFLOW";
    pub const GITHUB_WORKFLOW_REF: &str = "GITHUB_WORKFLOW_REF";
    pub const GITHUB_WORKFLOW_SHA: &str = "GITHUB_WORKFLOW_SHA";
    pub const GITHUB_WORKSPACE: &str = "GITHUB_WORKSPACE";

    // Services
    pub const ACTIONS_CACHE_URL: &str = "ACTIONS_CACHE_URL";
    pub const ACTIONS_ID_TOKEN_REQUEST_TOKEN: &str = "ACTIONS_ID_TOKEN_REQUEST_TOKEN";
    pub const ACTIONS_ID_TOKEN_REQUEST_URL: &str = "ACTIONS_ID_TOKEN_REQUEST_URL";
    pub const ACTIONS_RESULTS_URL: &str = "ACTIONS_RESULTS_URL";
    pub const ACTIONS_RUNTIME_TOKEN: &str = "ACTIONS_RUNTIME_TOKEN";
    pub const ACTIONS_RUNTIME_URL: &str = "ACTIONS_RUNTIME_URL";
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_GRAPHQL_URL: &str = "https://api.github.com/graphql";
pub const DEFAULT_SERVER_URL: &str = "https://github.com";

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn runner_architecture_names() {
        assert_eq!(RunnerArchitecture::from_str("ARM64").ok(), Some(RunnerArchitecture::Arm64));
        assert_eq!(RunnerArchitecture::X86.to_string(), "X86");
        assert!(RunnerArchitecture::from_str("x64").is_err());
    }

    #[test]
    fn runner_os_names() {
        assert_eq!(RunnerOs::from_str("macOS").ok(), Some(RunnerOs::MacOS));
        assert_eq!(RunnerOs::Linux.as_ref(), "Linux");
        assert!(RunnerOs::from_str("Darwin").is_err());
    }

    #[test]
    fn runner_environment_names() {
        assert_eq!(
            RunnerEnvironment::from_str("github-hosted").ok(),
            Some(RunnerEnvironment::GithubHosted)
        );
        assert_eq!(RunnerEnvironment::SelfHosted.to_string(), "self-hosted");
    }

    #[test]
    fn forbidden_commands_are_not_recognized() {
        for name in STDOUT_COMMANDS_FORBIDDEN {
            assert!(!STDOUT_COMMANDS.contains(name));
        }
    }
}
