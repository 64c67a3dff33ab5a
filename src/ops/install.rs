//! Implementation of `galley install`.

use anyhow::{Context, Result};

use crate::builder::context::StageContext;
use crate::builder::env::BuildEnvironment;
use crate::core::errors::RecipeError;
use crate::core::recipe::{Phase, Recipe};
use crate::util::process::CommandRunner;

/// Options for the install command.
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Run only this phase (None = every phase, in order)
    pub phase: Option<Phase>,
}

/// Result of a recipe run.
#[derive(Debug, Clone)]
pub struct InstallResult {
    /// Phases that ran, in order
    pub phases: Vec<Phase>,

    /// Environment exported to the recipe's tools
    pub environment: BuildEnvironment,
}

/// Run a recipe against a staged checkout.
///
/// The recipe's build environment is set up first and attached to the
/// stage, so every command a phase spawns sees it. The first failing phase
/// aborts the run; nothing already installed is rolled back.
pub fn install(
    recipe: &dyn Recipe,
    mut ctx: StageContext,
    opts: &InstallOptions,
    runner: &mut dyn CommandRunner,
) -> Result<InstallResult> {
    let phases = select_phases(recipe, opts.phase)?;

    let mut environment = BuildEnvironment::new();
    recipe
        .setup_build_environment(&ctx, &mut environment)
        .with_context(|| {
            format!("failed to set up the build environment for `{}`", recipe.name())
        })?;
    for (key, value) in environment.iter() {
        tracing::debug!("{}={}", key, value);
    }
    ctx.set_env(environment.clone());

    for phase in &phases {
        tracing::info!(
            "{} {} v{}",
            capitalize(phase.as_str()),
            recipe.name(),
            ctx.spec().package.version
        );

        recipe
            .run_phase(*phase, &ctx, runner)
            .with_context(|| format!("{} phase of `{}` failed", phase, recipe.name()))?;
    }

    tracing::info!("Installed {} into {}", recipe.name(), ctx.prefix().display());

    Ok(InstallResult {
        phases,
        environment,
    })
}

fn select_phases(recipe: &dyn Recipe, selected: Option<Phase>) -> Result<Vec<Phase>> {
    match selected {
        None => Ok(recipe.phases().to_vec()),
        Some(phase) if recipe.phases().contains(&phase) => Ok(vec![phase]),
        Some(phase) => Err(RecipeError::UnsupportedPhase {
            recipe: recipe.name().to_string(),
            phase,
        }
        .into()),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
