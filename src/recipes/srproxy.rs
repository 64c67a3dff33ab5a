//! SRProxy: a proxy-class code generator.
//!
//! Nothing is compiled. The generator script goes to `bin/`, and the
//! headers and sources it includes go to `include/`.

use anyhow::Result;

use crate::builder::context::StageContext;
use crate::core::errors::RecipeError;
use crate::core::recipe::{DeclaredDependency, DepKind, Phase, Recipe};
use crate::util::fs::{copy_file, ensure_dir, glob_files};
use crate::util::process::CommandRunner;

/// The generator script at the top of the checkout.
pub const GENERATOR: &str = "gen_srproxy";

/// Files installed next to the generator's output.
pub const INCLUDE_PATTERNS: &[&str] = &["*.h", "*.cxx"];

pub struct SrProxy;

impl SrProxy {
    fn install(&self, ctx: &StageContext) -> Result<()> {
        let bin = ctx.bin_dir();
        let include = ctx.include_dir();
        ensure_dir(&bin)?;
        ensure_dir(&include)?;

        copy_file(&ctx.source_dir().join(GENERATOR), &bin.join(GENERATOR))?;

        for pattern in INCLUDE_PATTERNS {
            let files = glob_files(ctx.source_dir(), &[pattern.to_string()])?;
            if files.is_empty() {
                return Err(RecipeError::NothingMatched {
                    pattern: pattern.to_string(),
                    dir: ctx.source_dir().to_path_buf(),
                }
                .into());
            }

            for file in files {
                if let Some(name) = file.file_name() {
                    copy_file(&file, &include.join(name))?;
                }
            }
        }

        Ok(())
    }
}

impl Recipe for SrProxy {
    fn name(&self) -> &'static str {
        "py-srproxy"
    }

    fn summary(&self) -> &'static str {
        "Generator for proxy classes over flat ROOT trees"
    }

    fn homepage(&self) -> &'static str {
        "https://github.com/cafana/SRProxy/"
    }

    fn dependencies(&self) -> Vec<DeclaredDependency> {
        vec![
            DeclaredDependency::new("castxml", DepKind::BuildRun),
            DeclaredDependency::new("py-pygccxml", DepKind::BuildRun),
        ]
    }

    fn phases(&self) -> &'static [Phase] {
        &[Phase::Install]
    }

    fn run_phase(
        &self,
        phase: Phase,
        ctx: &StageContext,
        _runner: &mut dyn CommandRunner,
    ) -> Result<()> {
        match phase {
            Phase::Install => self.install(ctx),
            other => Err(RecipeError::UnsupportedPhase {
                recipe: self.name().to_string(),
                phase: other,
            }
            .into()),
        }
    }
}
