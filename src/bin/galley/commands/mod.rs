//! Command implementations

pub mod completions;
pub mod external;
pub mod install;
pub mod list;
pub mod plan;

use anyhow::Result;

use crate::cli::StageArgs;
use galley::builder::StageContext;
use galley::core::ResolvedSpec;
use galley::util::GlobalContext;

/// Load the resolved spec and configuration for a staged checkout.
pub fn load_stage(
    gctx: &GlobalContext,
    stage: &StageArgs,
    prefix: &std::path::Path,
) -> Result<StageContext> {
    let spec = ResolvedSpec::load(&gctx.resolve_path(&stage.spec))?;
    let source = gctx.resolve_path(&stage.source);
    let config = gctx.load_config(&source);

    Ok(StageContext::new(spec, source, gctx.resolve_path(prefix)).with_config(config))
}
