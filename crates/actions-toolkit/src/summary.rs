// Job summary (GITHUB_STEP_SUMMARY).

use crate::constants::variables;
use crate::context::StepContext;
use crate::error::Result;

impl StepContext {
    /// Append Markdown (or raw bytes) to the job summary. Nothing is added
    /// between successive appends.
    pub fn append_summary(&self, content: impl AsRef<[u8]>) -> Result<()> {
        self.file_command(variables::GITHUB_STEP_SUMMARY)?.append_raw(content)
    }

    /// Remove everything this step wrote to the job summary.
    pub fn clear_summary(&self) -> Result<()> {
        self.clear_file_command(variables::GITHUB_STEP_SUMMARY)
    }
}
