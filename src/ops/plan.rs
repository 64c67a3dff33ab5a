//! Implementation of `galley plan`.
//!
//! A dry run: composes the environment and the Bazel command line a recipe
//! would use, without writing files or spawning processes.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use crate::builder::bazel::{BazelInvocation, RepoOverride};
use crate::builder::context::StageContext;
use crate::builder::env::BuildEnvironment;
use crate::builder::external::RepoBinding;
use crate::core::recipe::{Phase, Recipe};
use crate::util::process::find_bazel;

/// What a recipe run would do.
#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    pub recipe: String,
    pub version: String,
    pub phases: Vec<Phase>,
    pub environment: BuildEnvironment,

    /// External build, for recipes that have one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildPlan>,
}

/// The external build tool invocation of a plan.
#[derive(Debug, Clone, Serialize)]
pub struct BuildPlan {
    /// Tool binary (as configured or found on PATH)
    pub program: PathBuf,
    pub args: Vec<String>,

    /// Descriptors that would be synthesized
    pub overrides: Vec<RepoOverride>,

    /// Bindings left out because their package is not resolved
    pub skipped: Vec<RepoBinding>,
}

impl BuildPlan {
    fn new(invocation: BazelInvocation, ctx: &StageContext) -> Self {
        let program = find_bazel(ctx.config().tools.bazel.as_deref())
            .unwrap_or_else(|| PathBuf::from("bazel"));

        BuildPlan {
            program,
            args: invocation.args(),
            overrides: invocation.overrides,
            skipped: invocation.skipped,
        }
    }
}

/// Plan a recipe run against a staged checkout.
pub fn plan(recipe: &dyn Recipe, ctx: &StageContext) -> Result<PlanReport> {
    let mut environment = BuildEnvironment::new();
    recipe.setup_build_environment(ctx, &mut environment)?;

    let build = recipe
        .build_plan(ctx)
        .map(|invocation| BuildPlan::new(invocation, ctx));

    Ok(PlanReport {
        recipe: recipe.name().to_string(),
        version: ctx.spec().package.version.clone(),
        phases: recipe.phases().to_vec(),
        environment,
        build,
    })
}

/// Format a plan for display.
pub fn format_plan(report: &PlanReport) -> String {
    use std::fmt::Write;

    let mut output = String::new();

    let phases: Vec<_> = report.phases.iter().map(Phase::as_str).collect();
    let _ = writeln!(output, "{} v{}", report.recipe, report.version);
    let _ = writeln!(output, "  phases: {}", phases.join(", "));

    if !report.environment.is_empty() {
        let _ = writeln!(output, "\nEnvironment:");
        for (key, value) in report.environment.iter() {
            let _ = writeln!(output, "  {}={}", key, value);
        }
    }

    if let Some(build) = &report.build {
        let _ = writeln!(output, "\nRepository overrides:");
        for o in &build.overrides {
            let _ = writeln!(output, "  {} -> {}", o.binding.bazel_name, o.path.display());
        }
        for binding in &build.skipped {
            let _ = writeln!(
                output,
                "  {} (skipped, `{}` not resolved)",
                binding.bazel_name, binding.package
            );
        }

        let _ = writeln!(output, "\nCommand:");
        let _ = writeln!(output, "  {} \\", build.program.display());
        let last = build.args.len().saturating_sub(1);
        for (i, arg) in build.args.iter().enumerate() {
            let cont = if i == last { "" } else { " \\" };
            let _ = writeln!(output, "    {}{}", arg, cont);
        }
    }

    output
}
