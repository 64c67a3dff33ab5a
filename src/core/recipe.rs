//! The recipe abstraction.
//!
//! A recipe knows how to turn a staged source checkout into an installed
//! package. It declares its dependency edges for the host, exports the
//! environment its tools expect, and runs an ordered list of phases.

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use serde::Serialize;

use crate::builder::bazel::BazelInvocation;
use crate::builder::context::StageContext;
use crate::builder::env::BuildEnvironment;
use crate::core::errors::RecipeError;
use crate::core::spec::ResolvedSpec;
use crate::util::process::CommandRunner;

/// A step of a recipe run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Configure,
    Build,
    Install,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Configure => "configure",
            Phase::Build => "build",
            Phase::Install => "install",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "configure" => Ok(Phase::Configure),
            "build" => Ok(Phase::Build),
            "install" => Ok(Phase::Install),
            _ => Err(RecipeError::UnknownPhase(s.to_string())),
        }
    }
}

/// When a declared dependency is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DepKind {
    Build,
    Run,
    BuildRun,
}

/// A dependency edge declared by a recipe. Resolution is the host's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeclaredDependency {
    pub name: &'static str,
    pub kind: DepKind,
    /// Variant that must be enabled for the edge to apply
    pub when: Option<&'static str>,
}

impl DeclaredDependency {
    pub const fn new(name: &'static str, kind: DepKind) -> Self {
        DeclaredDependency {
            name,
            kind,
            when: None,
        }
    }

    pub fn when(mut self, variant: &'static str) -> Self {
        self.when = Some(variant);
        self
    }

    /// Whether this edge applies to the given spec.
    pub fn applies_to(&self, spec: &ResolvedSpec) -> bool {
        self.when.map_or(true, |v| spec.satisfies(&[v]))
    }
}

/// A package-build recipe.
pub trait Recipe {
    /// Package-manager name of the package this recipe installs.
    fn name(&self) -> &'static str;

    /// One-line description.
    fn summary(&self) -> &'static str;

    fn homepage(&self) -> &'static str;

    /// Dependency edges, for the host to resolve.
    fn dependencies(&self) -> Vec<DeclaredDependency>;

    /// Phases in the order they run.
    fn phases(&self) -> &'static [Phase];

    /// Variants the recipe understands.
    fn variants(&self) -> &'static [&'static str] {
        &[]
    }

    /// Populate variables that every spawned tool should see.
    fn setup_build_environment(
        &self,
        _ctx: &StageContext,
        _env: &mut BuildEnvironment,
    ) -> Result<()> {
        Ok(())
    }

    /// Describe the external build invocation without running anything.
    fn build_plan(&self, _ctx: &StageContext) -> Option<BazelInvocation> {
        None
    }

    /// Run one phase.
    fn run_phase(
        &self,
        phase: Phase,
        ctx: &StageContext,
        runner: &mut dyn CommandRunner,
    ) -> Result<()>;
}
