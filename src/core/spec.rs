//! Resolved specification handed over by the host package manager.
//!
//! The host resolves the dependency graph and installs every dependency
//! before a recipe runs. What reaches Galley is a flat, name-indexed table
//! of installed dependencies plus the variants enabled on the root package:
//!
//! ```toml
//! [package]
//! name = "tensorflow2"
//! version = "2.10.0"
//! variants = ["cuda"]
//!
//! [dependencies.protobuf]
//! prefix = "/opt/spack/protobuf-3.21.5"
//!
//! [dependencies.protobuf.libs]
//! names = ["protobuf"]
//! directories = ["/opt/spack/protobuf-3.21.5/lib"]
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::errors::RecipeError;
use crate::util::fs::read_to_string;

/// Library metadata for an installed dependency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibrarySet {
    /// Link names without `lib` prefix or extension (`protobuf`, `z`)
    #[serde(default)]
    pub names: Vec<String>,

    /// Directories holding the libraries, most specific first
    #[serde(default)]
    pub directories: Vec<PathBuf>,
}

/// One installed dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRecord {
    /// Package-manager name; filled from the table key when loaded
    #[serde(default, skip_serializing)]
    pub name: String,

    /// Install prefix
    pub prefix: PathBuf,

    /// Library metadata, if the host could provide it
    #[serde(default)]
    pub libs: Option<LibrarySet>,

    /// Header root, when it is not `<prefix>/include`
    #[serde(default)]
    pub headers: Option<PathBuf>,
}

impl DependencyRecord {
    pub fn new(name: impl Into<String>, prefix: impl Into<PathBuf>) -> Self {
        DependencyRecord {
            name: name.into(),
            prefix: prefix.into(),
            libs: None,
            headers: None,
        }
    }

    /// Attach library metadata.
    pub fn with_libs<I, S>(mut self, names: I, directories: Vec<PathBuf>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.libs = Some(LibrarySet {
            names: names.into_iter().map(Into::into).collect(),
            directories,
        });
        self
    }

    /// Header root of the install.
    pub fn include_dir(&self) -> PathBuf {
        self.headers
            .clone()
            .unwrap_or_else(|| self.prefix.join("include"))
    }

    /// Binary directory of the install.
    pub fn bin_dir(&self) -> PathBuf {
        self.prefix.join("bin")
    }

    /// First library directory, if the host reported one.
    pub fn primary_lib_dir(&self) -> Option<&Path> {
        self.libs
            .as_ref()
            .and_then(|libs| libs.directories.first())
            .map(PathBuf::as_path)
    }
}

/// Root package identity and enabled variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub name: String,
    /// Version as the host spells it (`2.10.0`, `00.31`)
    pub version: String,
    #[serde(default)]
    pub variants: BTreeSet<String>,
}

/// The host's concrete dependency table for one build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSpec {
    pub package: PackageInfo,

    #[serde(default)]
    dependencies: BTreeMap<String, DependencyRecord>,
}

impl ResolvedSpec {
    /// Create an empty spec for a package.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        ResolvedSpec {
            package: PackageInfo {
                name: name.into(),
                version: version.into(),
                variants: BTreeSet::new(),
            },
            dependencies: BTreeMap::new(),
        }
    }

    /// Load a resolved spec from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = read_to_string(path)?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("failed to parse resolved spec: {}", path.display()))
    }

    /// Parse a resolved spec from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let mut spec: ResolvedSpec = toml::from_str(contents)?;
        for (name, record) in spec.dependencies.iter_mut() {
            record.name = name.clone();
        }
        if spec.version().is_none() {
            tracing::warn!(
                "version `{}` of `{}` is not numeric",
                spec.package.version,
                spec.package.name
            );
        }
        Ok(spec)
    }

    /// The package version as semver, padding missing components with zero.
    ///
    /// Host versions are not always semver (`00.31`, `2.9`), so each dotted
    /// component is read as a plain integer.
    pub fn version(&self) -> Option<semver::Version> {
        let mut parts = self.package.version.trim().split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next().map_or(Some(0), |p| p.parse().ok())?;
        let patch = parts.next().map_or(Some(0), |p| p.parse().ok())?;
        Some(semver::Version::new(major, minor, patch))
    }

    /// Enable a variant.
    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.package.variants.insert(variant.into());
        self
    }

    /// Add (or replace) a dependency.
    pub fn with_dependency(mut self, record: DependencyRecord) -> Self {
        self.dependencies.insert(record.name.clone(), record);
        self
    }

    /// Check whether every listed variant is enabled.
    pub fn satisfies(&self, variants: &[&str]) -> bool {
        variants
            .iter()
            .all(|v| self.package.variants.contains(*v))
    }

    /// Look up a dependency by package-manager name.
    pub fn get(&self, name: &str) -> Option<&DependencyRecord> {
        self.dependencies.get(name)
    }

    /// Check whether a dependency was resolved.
    pub fn contains(&self, name: &str) -> bool {
        self.dependencies.contains_key(name)
    }

    /// Look up a dependency that must be present.
    pub fn require(&self, name: &str) -> Result<&DependencyRecord, RecipeError> {
        self.get(name).ok_or_else(|| RecipeError::MissingDependency {
            package: name.to_string(),
        })
    }

    /// Iterate over all resolved dependencies in name order.
    pub fn dependencies(&self) -> impl Iterator<Item = &DependencyRecord> {
        self.dependencies.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: &str = r#"
[package]
name = "tensorflow2"
version = "2.10.0"
variants = ["cuda", "clang"]

[dependencies.python]
prefix = "/opt/python-3.10"

[dependencies.python.libs]
names = ["python3.10"]
directories = ["/opt/python-3.10/lib"]

[dependencies.eigen]
prefix = "/opt/eigen-3.4"
headers = "/opt/eigen-3.4/include/eigen3"
"#;

    #[test]
    fn test_parse_resolved_spec() {
        let spec = ResolvedSpec::from_toml_str(SPEC).unwrap();

        assert_eq!(spec.package.name, "tensorflow2");
        assert_eq!(spec.version(), Some(semver::Version::new(2, 10, 0)));
        assert!(spec.satisfies(&["cuda"]));
        assert!(spec.satisfies(&["cuda", "clang"]));
        assert!(!spec.satisfies(&["rocm"]));

        let python = spec.get("python").unwrap();
        assert_eq!(python.name, "python");
        assert_eq!(python.primary_lib_dir(), Some(Path::new("/opt/python-3.10/lib")));
        assert_eq!(python.bin_dir(), PathBuf::from("/opt/python-3.10/bin"));

        let eigen = spec.get("eigen").unwrap();
        assert!(eigen.libs.is_none());
        assert_eq!(eigen.include_dir(), PathBuf::from("/opt/eigen-3.4/include/eigen3"));
    }

    #[test]
    fn test_require_missing_dependency() {
        let spec = ResolvedSpec::from_toml_str(SPEC).unwrap();

        assert!(spec.require("python").is_ok());
        let err = spec.require("nccl").unwrap_err();
        assert!(matches!(err, RecipeError::MissingDependency { ref package } if package == "nccl"));
    }

    #[test]
    fn test_builder_methods() {
        let spec = ResolvedSpec::new("py-srproxy", "00.31")
            .with_variant("cuda")
            .with_dependency(DependencyRecord::new("castxml", "/opt/castxml"));

        assert!(spec.contains("castxml"));
        assert!(!spec.contains("py-pygccxml"));
        assert_eq!(spec.dependencies().count(), 1);
        assert_eq!(spec.version(), Some(semver::Version::new(0, 31, 0)));
        assert_eq!(
            spec.get("castxml").unwrap().include_dir(),
            PathBuf::from("/opt/castxml/include")
        );
    }

    #[test]
    fn test_unparseable_version() {
        let spec = ResolvedSpec::new("x", "develop");
        assert!(spec.version().is_none());

        let spec = ResolvedSpec::new("x", "2.9");
        assert_eq!(spec.version(), Some(semver::Version::new(2, 9, 0)));
    }

    #[test]
    fn test_missing_package_table_is_an_error() {
        assert!(ResolvedSpec::from_toml_str("[dependencies]\n").is_err());
    }
}
