//! Scripted [`BuildTool`] double recording every invocation.
//!
//! # Examples
//!
//! ```
//! use lanesync::tool::test_support::ScriptedBuildTool;
//!
//! let tool = ScriptedBuildTool::new().on_success(&["--version"], "1.9.0\n");
//! assert!(tool.invocations().is_empty());
//! ```

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::{BuildTool, ToolError, ToolInvocation, ToolOutput};

#[derive(Debug)]
struct Rule {
    prefix: Vec<String>,
    responses: VecDeque<Result<ToolOutput, ToolError>>,
}

#[derive(Debug, Default)]
struct State {
    rules: Vec<Rule>,
    invocations: Vec<Vec<String>>,
}

/// Build tool answering from scripted rules.
///
/// Each rule matches invocations whose arguments start with its prefix.
/// Responses are consumed in order and the last one repeats. Unmatched
/// invocations succeed with empty output.
#[derive(Debug, Default)]
pub struct ScriptedBuildTool {
    state: Mutex<State>,
}

impl ScriptedBuildTool {
    /// Creates a tool that succeeds at everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a response for invocations starting with `prefix`.
    #[must_use]
    pub fn on(self, prefix: &[&str], response: Result<ToolOutput, ToolError>) -> Self {
        {
            let mut state = self.state();
            let key: Vec<String> = prefix.iter().map(|&arg| arg.to_owned()).collect();
            if let Some(rule) = state.rules.iter_mut().find(|rule| rule.prefix == key) {
                rule.responses.push_back(response);
            } else {
                state.rules.push(Rule {
                    prefix: key,
                    responses: VecDeque::from([response]),
                });
            }
        }
        self
    }

    /// Appends a successful response printing `stdout`.
    #[must_use]
    pub fn on_success(self, prefix: &[&str], stdout: &str) -> Self {
        self.on(prefix, Ok(ToolOutput::with_stdout(stdout)))
    }

    /// Appends a failing response exiting with status 1 and `stderr`.
    #[must_use]
    pub fn on_failure(self, prefix: &[&str], stderr: &str) -> Self {
        let command = prefix.join(" ");
        self.on(
            prefix,
            Err(ToolError::ExitStatus {
                command,
                code: Some(1),
                stderr: stderr.to_owned(),
            }),
        )
    }

    /// Arguments of every invocation, in call order.
    #[must_use]
    pub fn invocations(&self) -> Vec<Vec<String>> {
        self.state().invocations.clone()
    }

    /// Position of the first invocation starting with `prefix`.
    #[must_use]
    pub fn position_of(&self, prefix: &[&str]) -> Option<usize> {
        self.state().invocations.iter().position(|args| {
            prefix.len() <= args.len() && args.iter().zip(prefix).all(|(arg, want)| arg == want)
        })
    }

    /// Number of invocations starting with `prefix`.
    #[must_use]
    pub fn count_of(&self, prefix: &[&str]) -> usize {
        self.state()
            .invocations
            .iter()
            .filter(|args| {
                prefix.len() <= args.len()
                    && args.iter().zip(prefix).all(|(arg, want)| arg == want)
            })
            .count()
    }
}

#[async_trait]
impl BuildTool for ScriptedBuildTool {
    async fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ToolError> {
        let mut state = self.state();
        state.invocations.push(invocation.args().to_vec());

        let Some(rule) = state
            .rules
            .iter_mut()
            .filter(|rule| {
                let prefix: Vec<&str> = rule.prefix.iter().map(String::as_str).collect();
                invocation.starts_with(&prefix)
            })
            .max_by_key(|rule| rule.prefix.len())
        else {
            return Ok(ToolOutput::default());
        };

        if rule.responses.len() > 1 {
            rule.responses
                .pop_front()
                .unwrap_or_else(|| Ok(ToolOutput::default()))
        } else {
            rule.responses
                .front()
                .cloned()
                .unwrap_or_else(|| Ok(ToolOutput::default()))
        }
    }
}
