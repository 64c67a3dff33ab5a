//! Non-interactive run of an interactive configure script.

use anyhow::{Context, Result};

use crate::builder::context::StageContext;
use crate::util::fs::{read_to_string, write_string};
use crate::util::process::CommandRunner;

/// One empty answer per prompt: take every default.
pub const DEFAULT_ANSWERS: &str = "\n\n\n\n\n\n\n\n\n\n\n\n";

/// Answer file written into the source checkout.
pub const INPUT_FILE: &str = ".input";

/// Run `./configure`, feeding it [`DEFAULT_ANSWERS`] through [`INPUT_FILE`].
pub fn run_configure(ctx: &StageContext, runner: &mut dyn CommandRunner) -> Result<()> {
    let input = ctx.source_dir().join(INPUT_FILE);
    write_string(&input, DEFAULT_ANSWERS)?;
    let answers = read_to_string(&input)?;

    let script = ctx
        .config()
        .tools
        .configure
        .clone()
        .unwrap_or_else(|| ctx.source_dir().join("configure"));

    tracing::info!("Configuring with {}", script.display());

    let cmd = ctx.command(&script).stdin(answers);
    runner.run(&cmd).context("configure script failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::env::BuildEnvironment;
    use crate::test_support::{tensorflow_stage, MockExecutor, MockProcessOutput};
    use tempfile::TempDir;

    #[test]
    fn test_configure_feeds_default_answers() {
        let tmp = TempDir::new().unwrap();
        let mut ctx = tensorflow_stage(tmp.path(), false);
        let mut env = BuildEnvironment::new();
        env.set("TF_NEED_CUDA", "0");
        ctx.set_env(env);

        let mut exec = MockExecutor::new();
        exec.expect_contains("configure", MockProcessOutput::success(""));

        run_configure(&ctx, &mut exec).unwrap();

        let recorded = &exec.commands()[0];
        assert_eq!(recorded.get_program(), ctx.source_dir().join("configure"));
        assert_eq!(recorded.get_stdin(), Some(DEFAULT_ANSWERS.as_bytes()));
        assert_eq!(recorded.get_env("TF_NEED_CUDA"), Some("0"));
        assert_eq!(
            std::fs::read_to_string(ctx.source_dir().join(INPUT_FILE)).unwrap(),
            DEFAULT_ANSWERS
        );
        assert_eq!(DEFAULT_ANSWERS.len(), 12);
    }

    #[test]
    fn test_configure_failure_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let ctx = tensorflow_stage(tmp.path(), false);
        let mut exec = MockExecutor::new();
        exec.expect_contains("configure", MockProcessOutput::failure(2, "no python"));

        let err = run_configure(&ctx, &mut exec).unwrap_err();
        assert!(format!("{:#}", err).contains("configure script failed"));
    }
}
