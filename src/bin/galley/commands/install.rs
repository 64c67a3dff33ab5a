//! `galley install` command

use anyhow::Result;

use crate::cli::InstallArgs;
use crate::commands::load_stage;
use galley::core::Phase;
use galley::ops::{install, InstallOptions};
use galley::util::{GlobalContext, SystemRunner};
use galley::RecipeRegistry;

pub fn execute(args: InstallArgs) -> Result<()> {
    let gctx = GlobalContext::new()?;

    let registry = RecipeRegistry::builtin();
    let recipe = registry.get(&args.recipe)?;

    let phase = args.phase.as_deref().map(str::parse::<Phase>).transpose()?;

    let mut ctx = load_stage(&gctx, &args.stage, &args.prefix)?;
    if let Some(jobs) = args.jobs {
        let mut config = ctx.config().clone();
        config.build.jobs = Some(jobs);
        ctx = ctx.with_config(config);
    }

    let opts = InstallOptions { phase };
    install(recipe, ctx, &opts, &mut SystemRunner::new())?;

    Ok(())
}
