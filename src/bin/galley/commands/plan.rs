//! `galley plan` command

use anyhow::Result;

use crate::cli::PlanArgs;
use crate::commands::load_stage;
use galley::ops::{format_plan, plan};
use galley::util::GlobalContext;
use galley::RecipeRegistry;

pub fn execute(args: PlanArgs) -> Result<()> {
    let gctx = GlobalContext::new()?;

    let registry = RecipeRegistry::builtin();
    let recipe = registry.get(&args.recipe)?;

    let ctx = load_stage(&gctx, &args.stage, &args.prefix)?;
    let report = plan(recipe, &ctx)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_plan(&report));
    }

    Ok(())
}
