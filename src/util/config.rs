//! Configuration file support for Galley.
//!
//! Galley reads two configuration file locations:
//! - Global: `~/.galley/config.toml` - User-wide defaults
//! - Stage: `<source>/.galley/config.toml` - Overrides for one source checkout
//!
//! Stage config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default value for `CC_OPT_FLAGS` handed to configure scripts.
pub const DEFAULT_CC_OPT_FLAGS: &str = "-Wno-sign-compare";

/// Headers whose path contains this are not installed by default.
pub const DEFAULT_HEADER_EXCLUDE: &str = "internal";

/// Galley configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// External tool locations
    pub tools: ToolsConfig,

    /// Build settings
    pub build: BuildConfig,

    /// Install settings
    pub install: InstallConfig,
}

/// Paths to external tools. Unset entries are looked up on PATH or in the
/// source checkout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Path to the bazel binary
    pub bazel: Option<PathBuf>,

    /// Path to the configure script (defaults to `<source>/configure`)
    pub configure: Option<PathBuf>,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Number of parallel jobs passed to the build tool (None = tool default)
    pub jobs: Option<usize>,

    /// Extra arguments appended after the generated build flags
    #[serde(default)]
    pub extra_args: Vec<String>,

    /// Optimization flags exported as CC_OPT_FLAGS
    pub cc_opt_flags: Option<String>,
}

/// Install-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Substring that excludes a header from installation
    pub exclude: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        // Tool settings
        if other.tools.bazel.is_some() {
            self.tools.bazel = other.tools.bazel;
        }
        if other.tools.configure.is_some() {
            self.tools.configure = other.tools.configure;
        }

        // Build settings
        if other.build.jobs.is_some() {
            self.build.jobs = other.build.jobs;
        }
        if !other.build.extra_args.is_empty() {
            self.build.extra_args = other.build.extra_args;
        }
        if other.build.cc_opt_flags.is_some() {
            self.build.cc_opt_flags = other.build.cc_opt_flags;
        }

        // Install settings
        if other.install.exclude.is_some() {
            self.install.exclude = other.install.exclude;
        }
    }

    /// Optimization flags for configure scripts.
    pub fn cc_opt_flags(&self) -> &str {
        self.build
            .cc_opt_flags
            .as_deref()
            .unwrap_or(DEFAULT_CC_OPT_FLAGS)
    }

    /// Header path exclusion substring.
    pub fn header_exclude(&self) -> &str {
        self.install
            .exclude
            .as_deref()
            .unwrap_or(DEFAULT_HEADER_EXCLUDE)
    }
}

/// Load merged configuration from global and stage locations.
///
/// Order of precedence (highest to lowest):
/// 1. Stage config (<source>/.galley/config.toml)
/// 2. Global config (~/.galley/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, stage_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        let global = Config::load_or_default(global_path);
        config.merge(global);
    }

    if stage_path.exists() {
        let stage = Config::load_or_default(stage_path);
        config.merge(stage);
    }

    config
}

/// Get the global galley config directory (~/.galley).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".galley"))
}

/// Get the stage config path (<source>/.galley/config.toml).
pub fn stage_config_path(source_dir: &Path) -> PathBuf {
    source_dir.join(".galley").join("config.toml")
}
