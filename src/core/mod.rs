//! Core data structures for Galley.
//!
//! - The resolved specification the host hands over
//! - The recipe trait and its phases
//! - Typed recipe errors

pub mod errors;
pub mod recipe;
pub mod spec;

pub use errors::RecipeError;
pub use recipe::{DeclaredDependency, DepKind, Phase, Recipe};
pub use spec::{DependencyRecord, LibrarySet, ResolvedSpec};
