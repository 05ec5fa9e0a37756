// Metadata about the workflow run: GitHub endpoints, repository, actor,
// event, reference.

use std::fs;

use serde::Deserialize;
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumString};
use url::Url;

use crate::constants::{variables, DEFAULT_API_URL, DEFAULT_GRAPHQL_URL, DEFAULT_SERVER_URL};
use crate::context::StepContext;
use crate::error::{Result, ToolkitError};

/// Event that triggered the workflow run (`GITHUB_EVENT_NAME`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum EventName {
    BranchProtectionRule,
    CheckRun,
    CheckSuite,
    Create,
    Delete,
    Deployment,
    DeploymentStatus,
    Discussion,
    DiscussionComment,
    Fork,
    Gollum,
    IssueComment,
    Issues,
    Label,
    MergeGroup,
    Milestone,
    PageBuild,
    // Legacy projects
    Project,
    ProjectCard,
    ProjectColumn,
    Public,
    PullRequest,
    PullRequestComment,
    PullRequestReview,
    PullRequestReviewComment,
    PullRequestTarget,
    Push,
    RegistryPackage,
    Release,
    RepositoryDispatch,
    Schedule,
    Status,
    Watch,
    WorkflowCall,
    WorkflowDispatch,
    WorkflowRun,
}

/// Kind of Git reference the run was triggered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ReferenceType {
    Branch,
    Tag,
}

/// The Git reference of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReference {
    /// Target branch of a pull request.
    pub base: Option<String>,
    /// Fully-formed reference, e.g. `refs/heads/main`.
    pub full: String,
    /// Source branch of a pull request.
    pub head: Option<String>,
    /// Whether branch protections or rulesets apply.
    pub protected: bool,
    /// Short name, e.g. `main` or `feature-branch-1`.
    pub short: String,
    pub kind: ReferenceType,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PayloadOwner {
    pub login: String,
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PayloadRepository {
    pub full_name: Option<String>,
    pub html_url: Option<String>,
    pub name: String,
    pub owner: PayloadOwner,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An object carrying an id, e.g. a comment or an installation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PayloadIdentified {
    pub id: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An issue or pull request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PayloadNumbered {
    pub number: u64,
    pub html_url: Option<String>,
    pub body: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PayloadSender {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Webhook payload of the event that triggered the run.
///
/// Only the fields shared by most events are typed; the rest is kept in
/// `extra`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WebhookEventPayload {
    pub action: Option<String>,
    pub comment: Option<PayloadIdentified>,
    pub installation: Option<PayloadIdentified>,
    pub issue: Option<PayloadNumbered>,
    pub pull_request: Option<PayloadNumbered>,
    pub repository: Option<PayloadRepository>,
    pub sender: Option<PayloadSender>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StepContext {
    fn url_variable(&self, name: &str, default: &str) -> Result<Url> {
        let value = self.env().get(name);
        Ok(Url::parse(value.as_deref().unwrap_or(default))?)
    }

    fn number_variable(&self, name: &str, what: &str) -> Result<u64> {
        let value = self.required_variable(name, what)?;
        value.trim().parse().map_err(|_| ToolkitError::Parse {
            value,
            source_name: "environment variable",
            key: name.to_string(),
            expected: "number",
        })
    }

    pub fn github_api_url(&self) -> Result<Url> {
        self.url_variable(variables::GITHUB_API_URL, DEFAULT_API_URL)
    }

    pub fn github_graphql_api_url(&self) -> Result<Url> {
        self.url_variable(variables::GITHUB_GRAPHQL_URL, DEFAULT_GRAPHQL_URL)
    }

    pub fn github_server_url(&self) -> Result<Url> {
        self.url_variable(variables::GITHUB_SERVER_URL, DEFAULT_SERVER_URL)
    }

    pub fn workflow_name(&self) -> Result<String> {
        self.required_variable(variables::GITHUB_WORKFLOW, "workflow name")
    }

    /// E.g. `octocat/hello-world/.github/workflows/my-workflow.yml@refs/heads/my_branch`.
    pub fn workflow_reference_path(&self) -> Result<String> {
        self.required_variable(variables::GITHUB_WORKFLOW_REF, "workflow reference path")
    }

    /// Owner and repository name, e.g. `octocat/Hello-World`.
    pub fn workflow_repository(&self) -> Result<String> {
        self.required_variable(variables::GITHUB_REPOSITORY, "workflow repository")
    }

    pub fn workflow_repository_id(&self) -> Result<String> {
        self.required_variable(variables::GITHUB_REPOSITORY_ID, "workflow repository ID")
    }

    pub fn workflow_repository_owner(&self) -> Result<String> {
        self.required_variable(variables::GITHUB_REPOSITORY_OWNER, "workflow repository owner")
    }

    pub fn workflow_repository_owner_id(&self) -> Result<String> {
        self.required_variable(variables::GITHUB_REPOSITORY_OWNER_ID, "workflow repository owner ID")
    }

    pub fn workflow_run_action_id(&self) -> Result<String> {
        self.required_variable(variables::GITHUB_ACTION, "workflow run action ID")
    }

    pub fn workflow_run_actor_id(&self) -> Result<String> {
        self.required_variable(variables::GITHUB_ACTOR_ID, "workflow run actor ID")
    }

    pub fn workflow_run_actor_name(&self) -> Result<String> {
        self.required_variable(variables::GITHUB_ACTOR, "workflow run actor name")
    }

    pub fn workflow_run_commit_sha(&self) -> Result<String> {
        self.required_variable(variables::GITHUB_SHA, "workflow run commit SHA")
    }

    pub fn workflow_run_event_name(&self) -> Result<EventName> {
        let value = self.required_variable(variables::GITHUB_EVENT_NAME, "workflow run event name")?;
        value.parse().map_err(|_| {
            ToolkitError::Consistency(format!(
                "`{value}` is not a known GitHub Actions workflow run event name!"
            ))
        })
    }

    pub fn workflow_run_id(&self) -> Result<String> {
        self.required_variable(variables::GITHUB_RUN_ID, "workflow run ID")
    }

    pub fn workflow_run_job_id(&self) -> Result<String> {
        self.required_variable(variables::GITHUB_JOB, "workflow run job ID")
    }

    pub fn workflow_run_number(&self) -> Result<u64> {
        self.number_variable(variables::GITHUB_RUN_NUMBER, "workflow run number")
    }

    pub fn workflow_run_reference(&self) -> Result<RunReference> {
        let what = "workflow run reference";
        let full = self.required_variable(variables::GITHUB_REF, what)?;
        let short = self.required_variable(variables::GITHUB_REF_NAME, what)?;
        let kind = self.required_variable(variables::GITHUB_REF_TYPE, what)?;
        let kind = kind.parse().map_err(|_| {
            ToolkitError::Consistency(format!(
                "`{kind}` is not a known GitHub Actions workflow run reference type!"
            ))
        })?;
        Ok(RunReference {
            base: self.env().get_non_empty(variables::GITHUB_BASE_REF),
            full,
            head: self.env().get_non_empty(variables::GITHUB_HEAD_REF),
            protected: self.env().get(variables::GITHUB_REF_PROTECTED).as_deref() == Some("true"),
            short,
            kind,
        })
    }

    pub fn workflow_run_retention_days(&self) -> Result<u64> {
        self.number_variable(variables::GITHUB_RETENTION_DAYS, "workflow run retention days")
    }

    pub fn workflow_run_attempt(&self) -> Result<u64> {
        self.number_variable(variables::GITHUB_RUN_ATTEMPT, "workflow run attempt")
    }

    /// Web page of the run, e.g. `https://github.com/octocat/Hello-World/actions/runs/1658821493`.
    pub fn workflow_run_url(&self) -> Result<Url> {
        let repository = self.required_variable(variables::GITHUB_REPOSITORY, "workflow run URL")?;
        let run_id = self.workflow_run_id()?;
        let server = self.github_server_url()?;
        let server = server.as_str();
        let separator = if server.ends_with('/') { "" } else { "/" };
        Ok(Url::parse(&format!("{server}{separator}{repository}/actions/runs/{run_id}"))?)
    }

    /// Parse the webhook payload file the runner wrote for this run.
    pub fn workflow_run_webhook_event_payload(&self) -> Result<WebhookEventPayload> {
        let value = self.required_variable(variables::GITHUB_EVENT_PATH, "workflow run webhook event payload")?;
        let path = self.absolute_path_variable(variables::GITHUB_EVENT_PATH, value)?;
        let content = fs::read_to_string(&path)?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "Read webhook event payload");
        Ok(serde_json::from_str(&content)?)
    }

    pub fn workflow_sha(&self) -> Result<String> {
        self.required_variable(variables::GITHUB_WORKFLOW_SHA, "workflow SHA")
    }

    /// Whether the run is hosted by GitHub Enterprise Server rather than
    /// GitHub.com or GitHub Enterprise Cloud.
    pub fn is_github_enterprise_server(&self) -> Result<bool> {
        let url = self.github_server_url()?;
        let host = url.host_str().unwrap_or_default().trim_end().to_uppercase();
        let is_github = host == "GITHUB.COM";
        let is_enterprise_cloud = host.ends_with(".GHE.COM");
        let is_local = host.ends_with(".LOCALHOST");
        Ok(!is_github && !is_enterprise_cloud && !is_local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_support::test_step;
    use std::str::FromStr;

    #[test]
    fn url_defaults() {
        let step = test_step::<_, String, String>([]);
        assert_eq!(step.ctx.github_api_url().unwrap().as_str(), "https://api.github.com/");
        assert_eq!(
            step.ctx.github_graphql_api_url().unwrap().as_str(),
            "https://api.github.com/graphql"
        );
        assert_eq!(step.ctx.github_server_url().unwrap().as_str(), "https://github.com/");
        assert!(!step.ctx.is_github_enterprise_server().unwrap());
    }

    #[test]
    fn invalid_url() {
        let step = test_step([("GITHUB_API_URL", "not a url")]);
        assert!(matches!(step.ctx.github_api_url(), Err(ToolkitError::Url(_))));
    }

    #[test]
    fn enterprise_server_detection() {
        for (server, expected) in [
            ("https://github.com", false),
            ("https://octo.ghe.com", false),
            ("https://api.ghe.localhost", false),
            ("https://github.example.com", true),
        ] {
            let step = test_step([("GITHUB_SERVER_URL", server)]);
            assert_eq!(step.ctx.is_github_enterprise_server().unwrap(), expected, "{server}");
        }
    }

    #[test]
    fn event_names() {
        assert_eq!(EventName::from_str("pull_request_target").ok(), Some(EventName::PullRequestTarget));
        assert_eq!(EventName::WorkflowDispatch.to_string(), "workflow_dispatch");

        let step = test_step([("GITHUB_EVENT_NAME", "push")]);
        assert_eq!(step.ctx.workflow_run_event_name().unwrap(), EventName::Push);
        let step = test_step([("GITHUB_EVENT_NAME", "pushed")]);
        assert!(matches!(
            step.ctx.workflow_run_event_name(),
            Err(ToolkitError::Consistency(_))
        ));
    }

    #[test]
    fn string_getters() {
        let step = test_step([
            ("GITHUB_WORKFLOW", "CI"),
            ("GITHUB_REPOSITORY", "octocat/Hello-World"),
            ("GITHUB_SHA", "ffac537e6cbbf934b08745a378932722df287a53"),
        ]);
        assert_eq!(step.ctx.workflow_name().unwrap(), "CI");
        assert_eq!(step.ctx.workflow_repository().unwrap(), "octocat/Hello-World");
        assert_eq!(
            step.ctx.workflow_run_commit_sha().unwrap(),
            "ffac537e6cbbf934b08745a378932722df287a53"
        );
        assert!(matches!(step.ctx.workflow_sha(), Err(ToolkitError::NotDefined(_))));
    }

    #[test]
    fn number_getters() {
        let step = test_step([
            ("GITHUB_RUN_NUMBER", "12"),
            ("GITHUB_RUN_ATTEMPT", "1"),
            ("GITHUB_RETENTION_DAYS", "ninety"),
        ]);
        assert_eq!(step.ctx.workflow_run_number().unwrap(), 12);
        assert_eq!(step.ctx.workflow_run_attempt().unwrap(), 1);
        assert!(matches!(
            step.ctx.workflow_run_retention_days(),
            Err(ToolkitError::Parse { .. })
        ));
    }

    #[test]
    fn run_reference() {
        let step = test_step([
            ("GITHUB_REF", "refs/pull/7/merge"),
            ("GITHUB_REF_NAME", "7/merge"),
            ("GITHUB_REF_TYPE", "branch"),
            ("GITHUB_BASE_REF", "main"),
            ("GITHUB_HEAD_REF", ""),
            ("GITHUB_REF_PROTECTED", "true"),
        ]);
        let reference = step.ctx.workflow_run_reference().unwrap();
        assert_eq!(
            reference,
            RunReference {
                base: Some("main".to_string()),
                full: "refs/pull/7/merge".to_string(),
                head: None,
                protected: true,
                short: "7/merge".to_string(),
                kind: ReferenceType::Branch,
            }
        );
    }

    #[test]
    fn run_reference_unknown_type() {
        let step = test_step([
            ("GITHUB_REF", "refs/x"),
            ("GITHUB_REF_NAME", "x"),
            ("GITHUB_REF_TYPE", "note"),
        ]);
        assert!(matches!(
            step.ctx.workflow_run_reference(),
            Err(ToolkitError::Consistency(_))
        ));
    }

    #[test]
    fn run_url() {
        let step = test_step([
            ("GITHUB_SERVER_URL", "https://github.com"),
            ("GITHUB_REPOSITORY", "octocat/Hello-World"),
            ("GITHUB_RUN_ID", "1658821493"),
        ]);
        assert_eq!(
            step.ctx.workflow_run_url().unwrap().as_str(),
            "https://github.com/octocat/Hello-World/actions/runs/1658821493"
        );
    }

    #[test]
    fn webhook_payload() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        fs::write(
            tmp.path(),
            r#"{
                "action": "opened",
                "number": 7,
                "pull_request": {"number": 7, "body": "Fixes it", "draft": false},
                "repository": {"name": "Hello-World", "owner": {"login": "octocat", "id": 1}},
                "sender": {"type": "User", "login": "octocat"}
            }"#,
        )
        .unwrap();
        let step = test_step([("GITHUB_EVENT_PATH", tmp.path().to_string_lossy().to_string())]);

        let payload = step.ctx.workflow_run_webhook_event_payload().unwrap();
        assert_eq!(payload.action.as_deref(), Some("opened"));
        let pull_request = payload.pull_request.unwrap();
        assert_eq!(pull_request.number, 7);
        assert_eq!(pull_request.extra.get("draft"), Some(&Value::Bool(false)));
        let repository = payload.repository.unwrap();
        assert_eq!(repository.owner.login, "octocat");
        assert_eq!(payload.sender.unwrap().kind, "User");
        assert_eq!(payload.extra.get("number"), Some(&Value::from(7)));
        assert!(payload.issue.is_none());
    }

    #[test]
    fn webhook_payload_requires_absolute_path() {
        let step = test_step([("GITHUB_EVENT_PATH", "event.json")]);
        assert!(matches!(
            step.ctx.workflow_run_webhook_event_payload(),
            Err(ToolkitError::Consistency(_))
        ));
    }
}
