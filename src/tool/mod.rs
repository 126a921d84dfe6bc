//! Invocation of the external component build tool.
//!
//! Every tool command is described by a [`ToolInvocation`] and executed through
//! the [`BuildTool`] trait, so the pipeline never spawns processes directly.
//! Invocations that feed a parser capture stdout verbatim; all others stream
//! their output straight through to the job log.

mod process;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use process::ProcessBuildTool;

use async_trait::async_trait;
use thiserror::Error;

/// Arguments for one tool command.
///
/// # Example
///
/// ```
/// use lanesync::tool::ToolInvocation;
///
/// let invocation = ToolInvocation::new(["status", "--json"]).captured();
/// assert!(invocation.captures_stdout());
/// assert_eq!(invocation.to_string(), "status --json");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    args: Vec<String>,
    capture_stdout: bool,
}

impl ToolInvocation {
    /// Creates an invocation whose output is streamed, not captured.
    #[must_use]
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            capture_stdout: false,
        }
    }

    /// Marks stdout for verbatim capture.
    #[must_use]
    pub const fn captured(mut self) -> Self {
        self.capture_stdout = true;
        self
    }

    /// Command arguments, excluding the program.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Whether stdout is captured for parsing.
    #[must_use]
    pub const fn captures_stdout(&self) -> bool {
        self.capture_stdout
    }

    /// Returns true when the arguments begin with `prefix`.
    #[must_use]
    pub fn starts_with(&self, prefix: &[&str]) -> bool {
        prefix.len() <= self.args.len()
            && self
                .args
                .iter()
                .zip(prefix)
                .all(|(arg, expected)| arg == expected)
    }
}

impl std::fmt::Display for ToolInvocation {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.args.join(" "))
    }
}

/// Result of a successful invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Captured stdout; empty unless the invocation requested capture.
    pub stdout: String,
}

impl ToolOutput {
    /// Output carrying the given stdout text.
    #[must_use]
    pub fn with_stdout(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
        }
    }
}

/// Failures running the build tool.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolError {
    /// The process could not be started.
    #[error("failed to start `{command}`: {message}")]
    Spawn {
        /// Rendered command line.
        command: String,
        /// Operating system error detail.
        message: String,
    },

    /// The process exited unsuccessfully.
    #[error("`{command}` exited with {status}{detail}", status = describe_exit(*code), detail = describe_stderr(stderr))]
    ExitStatus {
        /// Rendered command line.
        command: String,
        /// Exit code, absent when terminated by a signal.
        code: Option<i32>,
        /// Captured stderr, empty when output was streamed.
        stderr: String,
    },

    /// Captured stdout was not valid UTF-8.
    #[error("`{command}` produced unreadable output: {message}")]
    InvalidOutput {
        /// Rendered command line.
        command: String,
        /// Decoding error detail.
        message: String,
    },
}

fn describe_exit(code: Option<i32>) -> String {
    code.map_or_else(|| "a signal".to_owned(), |value| format!("status {value}"))
}

fn describe_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

/// Runs build tool commands inside the workspace.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BuildTool: Send + Sync {
    /// Runs one command to completion.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] when the process cannot start, exits
    /// unsuccessfully or yields undecodable captured output.
    async fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ToolError>;
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{ToolError, ToolInvocation};

    #[rstest]
    #[case::exact(&["lane", "create"], true)]
    #[case::shorter(&["lane"], true)]
    #[case::different(&["lane", "remove"], false)]
    #[case::longer(&["lane", "create", "pr-1", "extra"], false)]
    fn matches_argument_prefixes(#[case] prefix: &[&str], #[case] expected: bool) {
        let invocation = ToolInvocation::new(["lane", "create", "pr-1"]);
        assert_eq!(invocation.starts_with(prefix), expected);
    }

    #[rstest]
    fn exit_status_message_includes_trimmed_stderr() {
        let error = ToolError::ExitStatus {
            command: "bit export".to_owned(),
            code: Some(1),
            stderr: "  remote refused\n".to_owned(),
        };
        assert_eq!(
            error.to_string(),
            "`bit export` exited with status 1: remote refused"
        );
    }

    #[rstest]
    fn exit_status_message_handles_signals_without_stderr() {
        let error = ToolError::ExitStatus {
            command: "bit snap".to_owned(),
            code: None,
            stderr: String::new(),
        };
        assert_eq!(error.to_string(), "`bit snap` exited with a signal");
    }
}
