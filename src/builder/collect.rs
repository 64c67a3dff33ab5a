//! Install-phase artifact collection.
//!
//! After Bazel succeeds, public headers and shared libraries are copied out
//! of `bazel-bin` into the install prefix, keeping their relative layout:
//!
//! - `bazel-bin/tensorflow/**/*.h` -> `<prefix>/include/tensorflow/**`,
//!   skipping any path that contains the exclusion substring (`internal`)
//! - `bazel-bin/tensorflow/**/*.so*` -> `<prefix>/lib/**`

use std::io;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;
use walkdir::WalkDir;

use crate::core::errors::RecipeError;
use crate::util::fs::{copy_file, relative_path};

/// Subtree of `bazel-bin` that holds the framework's outputs.
pub const OUTPUT_SUBDIR: &str = "tensorflow";

/// What got installed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectReport {
    pub headers: Vec<PathBuf>,
    pub libraries: Vec<PathBuf>,
}

/// Copy headers and shared libraries from `bazel_bin` into `include_dir`
/// and `lib_dir`.
pub fn collect_artifacts(
    bazel_bin: &Path,
    include_dir: &Path,
    lib_dir: &Path,
    exclude: &str,
) -> Result<CollectReport> {
    let root = bazel_bin.join(OUTPUT_SUBDIR);
    if !root.is_dir() {
        return Err(RecipeError::MissingBuildOutput { path: root }.into());
    }

    let headers = collect_headers(bazel_bin, &root, include_dir, exclude)?;
    let libraries = collect_shared_libraries(&root, lib_dir)?;

    tracing::info!(
        "Installed {} headers and {} shared libraries",
        headers.len(),
        libraries.len()
    );

    Ok(CollectReport { headers, libraries })
}

/// Headers are placed relative to `bazel-bin`, so they keep their
/// `tensorflow/` leading component.
fn collect_headers(
    bazel_bin: &Path,
    root: &Path,
    include_dir: &Path,
    exclude: &str,
) -> Result<Vec<PathBuf>> {
    let mut installed = Vec::new();

    for file in walk_files(root)? {
        if file.extension().and_then(|e| e.to_str()) != Some("h") {
            continue;
        }

        let rel = relative_path(bazel_bin, &file);
        if !exclude.is_empty() && rel.to_string_lossy().contains(exclude) {
            continue;
        }

        let dst = include_dir.join(&rel);
        copy_file(&file, &dst)?;
        installed.push(dst);
    }

    Ok(installed)
}

/// Libraries are placed relative to `bazel-bin/tensorflow`.
fn collect_shared_libraries(root: &Path, lib_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut installed = Vec::new();

    for file in walk_files(root)? {
        if !is_shared_library(&file) {
            continue;
        }

        let dst = lib_dir.join(relative_path(root, &file));
        copy_file(&file, &dst)?;
        installed.push(dst);
    }

    Ok(installed)
}

/// `libfoo.so`, `libfoo.so.2` and `libfoo.so.2.10.0` all count.
pub fn is_shared_library(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.contains(".so"))
}

/// Regular files under `root` in a stable order, following symlinks since
/// Bazel's output tree is built from them.
///
/// Links whose target is gone are skipped; other walk errors are fatal.
fn walk_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if is_dangling_link(&err) => {
                if let Some(path) = err.path() {
                    tracing::debug!("skipping dangling link {}", path.display());
                }
                continue;
            }
            Err(err) => {
                let msg = format!("failed to walk {}", root.display());
                return Err(anyhow::Error::new(err).context(msg));
            }
        };

        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

fn is_dangling_link(err: &walkdir::Error) -> bool {
    let not_found = err
        .io_error()
        .is_some_and(|e| e.kind() == io::ErrorKind::NotFound);

    not_found
        && err
            .path()
            .and_then(|p| p.symlink_metadata().ok())
            .is_some_and(|m| m.file_type().is_symlink())
}
