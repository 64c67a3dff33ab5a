//! Galley - package-build recipes for a host package manager
//!
//! This crate provides recipes that configure, build and install third-party
//! software into a prefix, using dependencies the host package manager has
//! already resolved and installed. Heavy builds are delegated to Bazel,
//! which is pointed at those installs through synthesized external
//! repositories.

pub mod builder;
pub mod core;
pub mod ops;
pub mod recipes;
pub mod util;

/// Test utilities and mocks for Galley unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a recording process executor and fixtures
/// for fake install prefixes and build trees.
#[cfg(test)]
pub mod test_support;

pub use core::{
    errors::RecipeError,
    recipe::{Phase, Recipe},
    spec::{DependencyRecord, ResolvedSpec},
};

pub use builder::StageContext;
pub use recipes::RecipeRegistry;
pub use util::context::GlobalContext;
