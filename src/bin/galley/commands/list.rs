//! `galley list` command

use anyhow::Result;

use crate::cli::ListArgs;
use galley::core::DepKind;
use galley::RecipeRegistry;

pub fn execute(args: ListArgs) -> Result<()> {
    let registry = RecipeRegistry::builtin();

    for name in registry.names() {
        let recipe = registry.get(name)?;
        println!("{:<14} {}", recipe.name(), recipe.summary());

        if !args.deps {
            continue;
        }

        println!("  homepage: {}", recipe.homepage());
        if !recipe.variants().is_empty() {
            println!("  variants: {}", recipe.variants().join(", "));
        }
        for dep in recipe.dependencies() {
            let kind = match dep.kind {
                DepKind::Build => "build",
                DepKind::Run => "run",
                DepKind::BuildRun => "build, run",
            };
            match dep.when {
                Some(variant) => println!("  {} ({}) when +{}", dep.name, kind, variant),
                None => println!("  {} ({})", dep.name, kind),
            }
        }
    }

    Ok(())
}
