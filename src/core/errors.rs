//! Typed errors raised by recipes and their helpers.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::recipe::Phase;

#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("unknown recipe `{name}` (available: {available})")]
    UnknownRecipe { name: String, available: String },

    #[error("`{package}` is not present in the resolved specification")]
    MissingDependency { package: String },

    #[error("recipe `{recipe}` has no {phase} phase")]
    UnsupportedPhase { recipe: String, phase: Phase },

    #[error("no files matched `{pattern}` in {}", dir.display())]
    NothingMatched { pattern: String, dir: PathBuf },

    #[error("build output not found at {}", path.display())]
    MissingBuildOutput { path: PathBuf },

    #[error("invalid repository binding `{0}` (expected `<bazel-name>:<package>`)")]
    InvalidBinding(String),

    #[error("unknown phase `{0}` (expected configure, build or install)")]
    UnknownPhase(String),
}
