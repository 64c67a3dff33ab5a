//! Test utilities and mocks for Galley unit tests.
//!
//! Recipes hand every command to a [`CommandRunner`]; [`MockExecutor`]
//! records those commands and answers them from expectations, so phases can
//! be exercised without Bazel or a configure script on the machine.
//!
//! # Example
//!
//! ```rust,ignore
//! use galley::test_support::{MockExecutor, MockProcessOutput};
//!
//! #[test]
//! fn test_example() {
//!     let mut exec = MockExecutor::new();
//!     exec.expect_prefix("bazel", MockProcessOutput::success(""));
//!
//!     // Run a phase with &mut exec, then inspect exec.calls()
//! }
//! ```

pub mod fixtures;

use anyhow::{bail, Result};

use crate::util::process::{CommandRunner, ProcessBuilder};

// Re-export fixtures for convenience
pub use fixtures::*;

/// Mock process output for testing command execution.
#[derive(Debug, Clone)]
pub struct MockProcessOutput {
    /// Exit status code (0 = success).
    pub status: i32,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
}

impl MockProcessOutput {
    /// Create a successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        MockProcessOutput {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Create a failure output with the given stderr and status code.
    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Check if the process succeeded.
    pub fn success_status(&self) -> bool {
        self.status == 0
    }
}

impl Default for MockProcessOutput {
    fn default() -> Self {
        MockProcessOutput::success("")
    }
}

/// Pattern for matching commands in MockExecutor.
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on full command string.
    Exact(String),
    /// Match if command starts with prefix.
    StartsWith(String),
    /// Match if command contains substring.
    Contains(String),
    /// Match any command.
    Any,
}

impl CommandPattern {
    /// Check if this pattern matches the given command.
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Contains(s) => cmd.contains(s),
            CommandPattern::Any => true,
        }
    }
}

/// Expectation for a command execution.
#[derive(Debug, Clone)]
pub struct CommandExpectation {
    /// Pattern to match against commands.
    pub pattern: CommandPattern,
    /// Output to return when matched.
    pub output: MockProcessOutput,
    /// Number of times this expectation can be used (None = unlimited).
    pub times: Option<usize>,
    /// Number of times this expectation has been used.
    pub used: usize,
}

impl CommandExpectation {
    /// Create a new expectation.
    pub fn new(pattern: CommandPattern, output: MockProcessOutput) -> Self {
        CommandExpectation {
            pattern,
            output,
            times: None,
            used: 0,
        }
    }

    /// Set the number of times this expectation can be used.
    pub fn times(mut self, n: usize) -> Self {
        self.times = Some(n);
        self
    }

    /// Check if this expectation can still be used.
    pub fn available(&self) -> bool {
        match self.times {
            Some(n) => self.used < n,
            None => true,
        }
    }
}

/// Mock process executor for testing command execution.
///
/// Records every command it is asked to run, including environment, working
/// directory and stdin, and answers from its expectations.
#[derive(Debug, Default)]
pub struct MockExecutor {
    expectations: Vec<CommandExpectation>,
    calls: Vec<String>,
    commands: Vec<ProcessBuilder>,
    default_output: Option<MockProcessOutput>,
}

impl MockExecutor {
    /// Create a new mock executor.
    pub fn new() -> Self {
        MockExecutor::default()
    }

    /// Add an expectation for an exact command match.
    pub fn expect(&mut self, cmd: &str, output: MockProcessOutput) -> &mut Self {
        self.expectations.push(CommandExpectation::new(
            CommandPattern::Exact(cmd.to_string()),
            output,
        ));
        self
    }

    /// Add an expectation for a command starting with a prefix.
    pub fn expect_prefix(&mut self, prefix: &str, output: MockProcessOutput) -> &mut Self {
        self.expectations.push(CommandExpectation::new(
            CommandPattern::StartsWith(prefix.to_string()),
            output,
        ));
        self
    }

    /// Add an expectation for a command containing a substring.
    pub fn expect_contains(&mut self, substring: &str, output: MockProcessOutput) -> &mut Self {
        self.expectations.push(CommandExpectation::new(
            CommandPattern::Contains(substring.to_string()),
            output,
        ));
        self
    }

    /// Add a custom expectation.
    pub fn expect_pattern(&mut self, expectation: CommandExpectation) -> &mut Self {
        self.expectations.push(expectation);
        self
    }

    /// Set a default output for commands that don't match any expectation.
    pub fn set_default(&mut self, output: MockProcessOutput) -> &mut Self {
        self.default_output = Some(output);
        self
    }

    /// Get all command lines that were run.
    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    /// Get the full recorded commands.
    pub fn commands(&self) -> &[ProcessBuilder] {
        &self.commands
    }

    /// Verify that all expectations with a specific count were satisfied.
    pub fn verify(&self) -> Result<()> {
        for (i, exp) in self.expectations.iter().enumerate() {
            if let Some(expected) = exp.times {
                if exp.used != expected {
                    bail!(
                        "expectation {} was used {} times, expected {}",
                        i,
                        exp.used,
                        expected
                    );
                }
            }
        }
        Ok(())
    }

    fn respond(&mut self, full_cmd: &str) -> Result<MockProcessOutput> {
        for exp in &mut self.expectations {
            if exp.pattern.matches(full_cmd) && exp.available() {
                exp.used += 1;
                return Ok(exp.output.clone());
            }
        }

        if let Some(ref default) = self.default_output {
            return Ok(default.clone());
        }

        bail!("unexpected command: {}", full_cmd)
    }
}

impl CommandRunner for MockExecutor {
    fn run(&mut self, cmd: &ProcessBuilder) -> Result<()> {
        let full_cmd = cmd.display_command();
        self.calls.push(full_cmd.clone());
        self.commands.push(cmd.clone());

        let output = self.respond(&full_cmd)?;
        if !output.success_status() {
            bail!(
                "`{}` failed with exit code {:?}\n{}",
                full_cmd,
                Some(output.status),
                output.stderr
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_executor_basic() {
        let mut exec = MockExecutor::new();

        exec.expect("bazel --version", MockProcessOutput::success("bazel 5.1.1"));
        exec.expect_prefix("bash", MockProcessOutput::success(""));

        exec.run(&ProcessBuilder::new("bazel").arg("--version")).unwrap();
        exec.run(&ProcessBuilder::new("bash").args(["-c", "true"])).unwrap();

        assert_eq!(exec.calls(), ["bazel --version", "bash -c true"]);
    }

    #[test]
    fn test_mock_executor_unexpected() {
        let mut exec = MockExecutor::new();

        let result = exec.run(&ProcessBuilder::new("unknown"));
        assert!(result.is_err());
    }

    #[test]
    fn test_mock_executor_failure_output() {
        let mut exec = MockExecutor::new();
        exec.expect_contains("configure", MockProcessOutput::failure(1, "bad answer"));

        let err = exec.run(&ProcessBuilder::new("./configure")).unwrap_err();
        assert!(err.to_string().contains("bad answer"));
    }

    #[test]
    fn test_mock_executor_verify_counts() {
        let mut exec = MockExecutor::new();
        exec.expect_pattern(
            CommandExpectation::new(
                CommandPattern::StartsWith("bazel".to_string()),
                MockProcessOutput::default(),
            )
            .times(1),
        );

        assert!(exec.verify().is_err());
        exec.run(&ProcessBuilder::new("bazel").arg("build")).unwrap();
        assert!(exec.verify().is_ok());

        // Exhausted expectations no longer match
        assert!(exec.run(&ProcessBuilder::new("bazel").arg("build")).is_err());
    }
}
