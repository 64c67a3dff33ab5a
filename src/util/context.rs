//! Global context for Galley operations.
//!
//! Provides centralized access to configuration paths and environment.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::config::{global_config_dir, load_config, stage_config_path, Config};

/// Environment variable that relocates the Galley home directory.
pub const GALLEY_HOME_ENV: &str = "GALLEY_HOME";

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global Galley data (~/.galley/)
    home: PathBuf,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;

        let home = match std::env::var_os(GALLEY_HOME_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => global_config_dir().unwrap_or_else(|| PathBuf::from(".galley")),
        };

        Ok(GlobalContext { cwd, home })
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = cwd;
        Ok(ctx)
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Resolve a possibly relative path against the working directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    /// Load the merged global + stage configuration for a source checkout.
    pub fn load_config(&self, source_dir: &Path) -> Config {
        load_config(&self.config_path(), &stage_config_path(source_dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_path() {
        let ctx = GlobalContext::with_cwd(PathBuf::from("/work")).unwrap();

        assert_eq!(ctx.resolve_path(Path::new("spec.toml")), PathBuf::from("/work/spec.toml"));
        assert_eq!(ctx.resolve_path(Path::new("/abs/spec.toml")), PathBuf::from("/abs/spec.toml"));
    }

    #[test]
    fn test_config_path_is_in_home() {
        let ctx = GlobalContext::with_cwd(PathBuf::from("/work")).unwrap();
        let path = ctx.config_path();

        assert_eq!(path.file_name().unwrap(), "config.toml");
        assert!(!path.starts_with("/work"));
    }

    #[test]
    fn test_load_config_reads_stage_file() {
        let tmp = TempDir::new().unwrap();
        let stage = tmp.path().join("source");
        std::fs::create_dir_all(stage.join(".galley")).unwrap();
        std::fs::write(
            stage.join(".galley/config.toml"),
            "[build]\njobs = 3\n",
        )
        .unwrap();

        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf()).unwrap();
        let config = ctx.load_config(&stage);

        assert_eq!(config.build.jobs, Some(3));
    }
}
