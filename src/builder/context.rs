//! Stage context - the source checkout, install prefix and resolved spec of
//! one package build.

use std::path::{Path, PathBuf};

use crate::builder::env::BuildEnvironment;
use crate::core::spec::ResolvedSpec;
use crate::util::config::Config;
use crate::util::process::ProcessBuilder;

/// Directory (under the source checkout) holding synthesized repositories.
pub const EXTERNAL_DIR: &str = "spack-external";

/// Directory (next to the source checkout) used as Bazel's output root.
pub const OUTPUT_ROOT_DIR: &str = "spack-build";

/// Everything a recipe phase may look at.
///
/// The resolved spec is carried here rather than read from any global, so a
/// phase sees exactly the dependency table it was given.
#[derive(Debug, Clone)]
pub struct StageContext {
    /// Resolved dependency table
    spec: ResolvedSpec,

    /// Staged source checkout
    source_dir: PathBuf,

    /// Install prefix
    prefix: PathBuf,

    /// Merged configuration
    config: Config,

    /// Variables exported to every spawned tool
    env: BuildEnvironment,
}

impl StageContext {
    /// Create a new stage context.
    pub fn new(spec: ResolvedSpec, source_dir: PathBuf, prefix: PathBuf) -> Self {
        StageContext {
            spec,
            source_dir,
            prefix,
            config: Config::default(),
            env: BuildEnvironment::new(),
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Replace the build environment.
    pub fn set_env(&mut self, env: BuildEnvironment) {
        self.env = env;
    }

    pub fn spec(&self) -> &ResolvedSpec {
        &self.spec
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn env(&self) -> &BuildEnvironment {
        &self.env
    }

    /// `<prefix>/bin`
    pub fn bin_dir(&self) -> PathBuf {
        self.prefix.join("bin")
    }

    /// `<prefix>/include`
    pub fn include_dir(&self) -> PathBuf {
        self.prefix.join("include")
    }

    /// `<prefix>/lib`
    pub fn lib_dir(&self) -> PathBuf {
        self.prefix.join("lib")
    }

    /// Root of the synthesized external repositories.
    pub fn external_root(&self) -> PathBuf {
        self.source_dir.join(EXTERNAL_DIR)
    }

    /// Bazel's isolated output root, a sibling of the source checkout.
    pub fn output_user_root(&self) -> PathBuf {
        let parent = self.source_dir.parent().unwrap_or(&self.source_dir);
        parent.join(OUTPUT_ROOT_DIR)
    }

    /// The `bazel-bin` convenience symlink Bazel leaves in the checkout.
    pub fn bazel_bin(&self) -> PathBuf {
        self.source_dir.join("bazel-bin")
    }

    /// A command running in the source checkout with the build environment.
    pub fn command(&self, program: impl AsRef<Path>) -> ProcessBuilder {
        ProcessBuilder::new(program)
            .cwd(&self.source_dir)
            .envs(self.env.iter())
    }
}
