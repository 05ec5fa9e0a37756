// actions-toolkit: step-facing API for the GitHub Actions Runner.
// A step talks to the runner by printing workflow commands on stdout and by
// appending to the command files whose paths the runner passes in
// environment variables (GITHUB_ENV, GITHUB_OUTPUT, ...). StepContext wraps
// both channels.

pub mod command;
pub mod constants;
pub mod context;
pub mod environment_variable;
pub mod error;
pub mod key_value;
pub mod log;
pub mod logging;
pub mod parameter;
pub mod runner;
pub mod summary;
pub mod utility;

// Re-export commonly used items at crate root
pub use command::{FileCommand, FileCommandKind, StdOutCommand};
pub use constants::{RunnerArchitecture, RunnerEnvironment, RunnerOs};
pub use context::StepContext;
pub use environment_variable::{AddPathOptions, SetEnvironmentVariableOptions};
pub use error::{Result, ToolkitError};
pub use key_value::{KeyValueInput, PairsCollection};
pub use log::{AnnotationKind, AnnotationProperties};
pub use parameter::{FromParameter, JsonArray, JsonObject, JsonPrimitive, Presence};
pub use runner::RunnerTestOptions;
pub use utility::{EventName, ReferenceType, RunReference, WebhookEventPayload};
