//! [`BuildTool`] implementation spawning the real tool binary.

use std::process::Stdio;

use async_trait::async_trait;
use camino::Utf8PathBuf;
use tokio::process::Command;

use super::{BuildTool, ToolError, ToolInvocation, ToolOutput};

/// Spawns `program` inside the workspace directory for each invocation.
#[derive(Debug, Clone)]
pub struct ProcessBuildTool {
    program: String,
    working_dir: Utf8PathBuf,
}

impl ProcessBuildTool {
    /// Creates a tool runner for `program` rooted at `working_dir`.
    #[must_use]
    pub fn new(program: impl Into<String>, working_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            program: program.into(),
            working_dir: working_dir.into(),
        }
    }

    fn command_line(&self, invocation: &ToolInvocation) -> String {
        if invocation.args().is_empty() {
            self.program.clone()
        } else {
            format!("{} {invocation}", self.program)
        }
    }

    fn command(&self, invocation: &ToolInvocation) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(invocation.args())
            .current_dir(self.working_dir.as_std_path())
            .stdin(Stdio::null())
            .kill_on_drop(true);
        command
    }

    async fn run_captured(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ToolError> {
        let command_line = self.command_line(invocation);
        let output = self
            .command(invocation)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|error| ToolError::Spawn {
                command: command_line.clone(),
                message: error.to_string(),
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            return Err(ToolError::ExitStatus {
                command: command_line,
                code: output.status.code(),
                stderr,
            });
        }
        if !stderr.trim().is_empty() {
            tracing::debug!(command = %command_line, "tool stderr: {}", stderr.trim());
        }

        let stdout = String::from_utf8(output.stdout).map_err(|error| ToolError::InvalidOutput {
            command: command_line,
            message: error.to_string(),
        })?;
        Ok(ToolOutput::with_stdout(stdout))
    }

    async fn run_streamed(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ToolError> {
        let command_line = self.command_line(invocation);
        let status = self
            .command(invocation)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|error| ToolError::Spawn {
                command: command_line.clone(),
                message: error.to_string(),
            })?;

        if status.success() {
            Ok(ToolOutput::default())
        } else {
            Err(ToolError::ExitStatus {
                command: command_line,
                code: status.code(),
                stderr: String::new(),
            })
        }
    }
}

#[async_trait]
impl BuildTool for ProcessBuildTool {
    async fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ToolError> {
        tracing::debug!(
            program = %self.program,
            cwd = %self.working_dir,
            "running `{invocation}`"
        );
        if invocation.captures_stdout() {
            self.run_captured(invocation).await
        } else {
            self.run_streamed(invocation).await
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use camino::Utf8PathBuf;
    use rstest::rstest;

    use super::ProcessBuildTool;
    use crate::tool::{BuildTool, ToolError, ToolInvocation};

    fn current_dir() -> Utf8PathBuf {
        Utf8PathBuf::try_from(std::env::current_dir().expect("cwd should be readable"))
            .expect("cwd should be UTF-8")
    }

    #[rstest]
    #[tokio::test]
    async fn captures_stdout_verbatim() {
        let tool = ProcessBuildTool::new("echo", current_dir());
        let output = tool
            .run(&ToolInvocation::new(["{\"a\":1}"]).captured())
            .await
            .expect("echo should succeed");

        assert_eq!(output.stdout, "{\"a\":1}\n");
    }

    #[rstest]
    #[tokio::test]
    async fn reports_non_zero_exit_codes() {
        let tool = ProcessBuildTool::new("false", current_dir());
        let error = tool
            .run(&ToolInvocation::new(Vec::<String>::new()))
            .await
            .expect_err("false should fail");

        assert!(
            matches!(error, ToolError::ExitStatus { code: Some(1), .. }),
            "unexpected error: {error:?}"
        );
    }

    #[rstest]
    #[tokio::test]
    async fn reports_missing_programs_as_spawn_failures() {
        let tool = ProcessBuildTool::new("lanesync-no-such-binary", current_dir());
        let error = tool
            .run(&ToolInvocation::new(["--version"]))
            .await
            .expect_err("spawn should fail");

        assert!(
            matches!(error, ToolError::Spawn { .. }),
            "unexpected error: {error:?}"
        );
    }
}
