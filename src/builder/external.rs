//! External repository synthesis.
//!
//! Bazel fetches and builds its own copies of third-party libraries unless a
//! repository is overridden with a local directory. For each dependency the
//! package manager already installed, this module lays out such a directory:
//!
//! ```text
//! spack-external/<package>/
//!     WORKSPACE      new_local_repository bound to the install prefix
//!     BUILD          license filegroups + one cc_library per library
//!     LICENSE.md     placeholder unless the prefix provides one
//!     COPYING        placeholder unless the prefix provides one
//!     include -> <prefix>/include
//!     lib     -> <prefix>/lib
//!     ...            one symlink per top-level prefix entry
//! ```
//!
//! The directory is named after the package-manager name; Bazel may know the
//! repository under a different name, which is why every call takes an
//! explicit [`RepoBinding`].

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::errors::RecipeError;
use crate::core::spec::{DependencyRecord, ResolvedSpec};
use crate::util::fs::{ensure_dir, symlink, touch_if_absent, write_string};

pub const WORKSPACE_FILE: &str = "WORKSPACE";
pub const BUILD_FILE: &str = "BUILD";

/// License files the generated BUILD exports.
pub const LICENSE_FILES: [&str; 2] = ["LICENSE.md", "COPYING"];

/// Library directory used when the host reports none.
pub const DEFAULT_LIBDIR: &str = "/usr";

/// A Bazel repository name paired with the package providing it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RepoBinding {
    /// Name the Bazel workspace uses (`eigen3`)
    pub bazel_name: String,
    /// Package-manager name (`eigen`)
    pub package: String,
}

impl RepoBinding {
    pub fn new(bazel_name: impl Into<String>, package: impl Into<String>) -> Self {
        RepoBinding {
            bazel_name: bazel_name.into(),
            package: package.into(),
        }
    }
}

impl fmt::Display for RepoBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.bazel_name, self.package)
    }
}

impl FromStr for RepoBinding {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((bazel, package)) if !bazel.is_empty() && !package.is_empty() => {
                Ok(RepoBinding::new(bazel, package))
            }
            _ => Err(RecipeError::InvalidBinding(s.to_string())),
        }
    }
}

/// Libraries to declare for a dependency and where they live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkLibraries {
    pub names: Vec<String>,
    pub libdir: PathBuf,
    /// Header root relative to the repository directory
    pub include: PathBuf,
}

impl LinkLibraries {
    /// Read library metadata, falling back to nothing under `/usr`.
    ///
    /// Missing or partial metadata is not an error. This leniency can hide a
    /// misconfigured dependency, so the fallback is logged.
    pub fn for_dependency(record: &DependencyRecord) -> Self {
        let include = header_root(record);
        match (&record.libs, record.primary_lib_dir()) {
            (Some(libs), Some(dir)) => LinkLibraries {
                names: libs.names.clone(),
                libdir: dir.to_path_buf(),
                include,
            },
            _ => {
                tracing::debug!(
                    "no library metadata for `{}`, declaring no libraries",
                    record.name
                );
                LinkLibraries {
                    names: Vec::new(),
                    libdir: PathBuf::from(DEFAULT_LIBDIR),
                    include,
                }
            }
        }
    }
}

/// Where headers sit inside the synthesized directory.
///
/// Only prefix entries are linked in, so a header location outside the
/// prefix cannot be globbed and falls back to `include`.
fn header_root(record: &DependencyRecord) -> PathBuf {
    let dir = record.include_dir();
    match dir.strip_prefix(&record.prefix) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
        _ => {
            tracing::debug!(
                "headers for `{}` at {} are outside its prefix",
                record.name,
                dir.display()
            );
            PathBuf::from("include")
        }
    }
}

/// A synthesized repository directory.
#[derive(Debug, Clone, Serialize)]
pub struct Descriptor {
    pub binding: RepoBinding,
    /// `<root>/<package>`
    pub path: PathBuf,
    /// Library names declared in BUILD
    pub libraries: Vec<String>,
    /// Symlinks created into the install prefix
    pub links: Vec<PathBuf>,
}

/// Render the WORKSPACE manifest.
pub fn render_workspace(binding: &RepoBinding, prefix: &Path) -> String {
    format!(
        r#"new_local_repository(
    name = "{name}",
    path = "{path}",
    build_file_content = "",
)
"#,
        name = binding.bazel_name,
        path = prefix.display(),
    )
}

/// Render the BUILD manifest.
pub fn render_build(libs: &LinkLibraries) -> String {
    let mut out = String::new();

    for license in LICENSE_FILES {
        out.push_str(&format!(
            r#"filegroup(
    name = "{license}",
    visibility = ["//visibility:public"],
)
"#
        ));
    }

    for lib in &libs.names {
        out.push_str(&format!(
            r#"
cc_library(
    name = "{lib}",
    linkopts = ["-L {libdir} -l{lib}"],
    hdrs = glob(["{include}/**/*.h"]),
    visibility = ["//visibility:public"],
)
"#,
            libdir = libs.libdir.display(),
            include = libs.include.display(),
        ));
    }

    out
}

/// Synthesize the repository directory for `binding` under `root`.
///
/// The dependency must be present in `spec`; nothing under the dependency's
/// own prefix is modified.
pub fn synthesize(spec: &ResolvedSpec, binding: &RepoBinding, root: &Path) -> Result<Descriptor> {
    let record = spec.require(&binding.package)?;
    let dir = root.join(&binding.package);

    tracing::debug!(
        "synthesizing `{}` for `{}` in {}",
        binding.bazel_name,
        binding.package,
        dir.display()
    );

    ensure_dir(&dir)?;

    let libs = LinkLibraries::for_dependency(record);
    write_string(
        &dir.join(WORKSPACE_FILE),
        &render_workspace(binding, &record.prefix),
    )?;
    write_string(&dir.join(BUILD_FILE), &render_build(&libs))?;

    let links = link_prefix_entries(&record.prefix, &dir)?;

    for license in LICENSE_FILES {
        touch_if_absent(&dir.join(license))?;
    }

    Ok(Descriptor {
        binding: binding.clone(),
        path: dir,
        libraries: libs.names,
        links,
    })
}

/// Symlink every top-level entry of `prefix` into `dir`.
fn link_prefix_entries(prefix: &Path, dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(prefix)
        .with_context(|| format!("failed to read install prefix: {}", prefix.display()))?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("failed to read install prefix: {}", prefix.display()))?;
    entries.sort_by_key(|e| e.file_name());

    let mut links = Vec::with_capacity(entries.len());
    for entry in entries {
        let name = entry.file_name();
        if name == WORKSPACE_FILE || name == BUILD_FILE {
            tracing::debug!(
                "not linking {}: name is taken by a generated manifest",
                entry.path().display()
            );
            continue;
        }

        let link = dir.join(&name);
        symlink(&entry.path(), &link).with_context(|| {
            format!(
                "failed to link {} to {}",
                link.display(),
                entry.path().display()
            )
        })?;
        links.push(link);
    }

    Ok(links)
}
