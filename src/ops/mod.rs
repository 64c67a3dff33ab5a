//! High-level operations.
//!
//! This module contains the implementation of Galley commands.

pub mod install;
pub mod plan;

pub use install::{install, InstallOptions, InstallResult};
pub use plan::{format_plan, plan, BuildPlan, PlanReport};
