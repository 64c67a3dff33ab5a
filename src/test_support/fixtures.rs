//! Test fixtures for common test scenarios.
//!
//! Fake install prefixes, resolved specs and Bazel output trees laid out on
//! a real (temporary) filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use crate::builder::bazel::{BASE_BINDINGS, CUDA_BINDINGS};
use crate::builder::context::StageContext;
use crate::core::spec::{DependencyRecord, ResolvedSpec};

/// Create `<root>/prefixes/<name>` holding the given relative files.
///
/// Each file's content is its relative path.
pub fn fake_prefix(root: &Path, name: &str, files: &[&str]) -> PathBuf {
    let prefix = root.join("prefixes").join(name);
    fs::create_dir_all(&prefix).unwrap();

    for file in files {
        let path = prefix.join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, file).unwrap();
    }

    prefix
}

/// A dependency with one library named after it, installed under `root`.
pub fn fake_dependency(root: &Path, name: &str) -> DependencyRecord {
    let lib = name.trim_start_matches("py-").replace('-', "_");
    let lib_file = format!("lib/lib{}.so", lib);
    let header = format!("include/{}.h", lib);
    let prefix = fake_prefix(root, name, &[lib_file.as_str(), header.as_str()]);

    DependencyRecord::new(name, &prefix).with_libs([lib], vec![prefix.join("lib")])
}

/// A resolved tensorflow2 spec with python and every native dependency
/// installed under `root`; CUDA packages only when `gpu` is set.
pub fn tensorflow_spec(root: &Path, gpu: bool) -> ResolvedSpec {
    let mut spec = ResolvedSpec::new("tensorflow2", "2.10.0");

    let python = fake_prefix(root, "python", &["bin/python3", "lib/libpython3.10.so"]);
    spec = spec.with_dependency(
        DependencyRecord::new("python", &python)
            .with_libs(["python3.10"], vec![python.join("lib")]),
    );

    let mut packages: Vec<&str> = BASE_BINDINGS.iter().map(|(_, pkg)| *pkg).collect();
    if gpu {
        spec = spec.with_variant("cuda");
        packages.extend(CUDA_BINDINGS.iter().map(|(_, pkg)| *pkg));
    }

    for package in packages {
        spec = spec.with_dependency(fake_dependency(root, package));
    }

    spec
}

/// A stage for tensorflow2 with `<root>/source` as checkout and
/// `<root>/install` as prefix.
pub fn tensorflow_stage(root: &Path, gpu: bool) -> StageContext {
    let source = root.join("source");
    fs::create_dir_all(&source).unwrap();

    StageContext::new(tensorflow_spec(root, gpu), source, root.join("install"))
}

/// Files [`fake_bazel_bin`] creates, relative to `bazel-bin`.
pub const BAZEL_BIN_FILES: &[&str] = &[
    "tensorflow/c/c_api.h",
    "tensorflow/core/framework/tensor.h",
    "tensorflow/core/framework/tensor_internal.h",
    "tensorflow/core/platform/internal/logging.h",
    "tensorflow/libtensorflow_cc.so",
    "tensorflow/libtensorflow_cc.so.2.10.0",
    "tensorflow/libtensorflow_cc.params",
    "tensorflow/python/_pywrap_tensorflow_internal.so",
];

/// Create `<root>/bazel-bin` as Bazel would leave it after a build.
pub fn fake_bazel_bin(root: &Path) -> PathBuf {
    let bazel_bin = root.join("bazel-bin");

    for file in BAZEL_BIN_FILES {
        let path = bazel_bin.join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, file).unwrap();
    }

    bazel_bin
}

/// A staged srproxy checkout under `<root>/source`.
pub fn srproxy_source(root: &Path) -> PathBuf {
    let source = root.join("source");
    fs::create_dir_all(&source).unwrap();

    fs::write(source.join("gen_srproxy"), "#!/usr/bin/env python\n").unwrap();
    fs::write(source.join("SRProxy.h"), "#pragma once\n").unwrap();
    fs::write(source.join("BasicTypesProxy.h"), "#pragma once\n").unwrap();
    fs::write(source.join("SRProxy.cxx"), "#include \"SRProxy.h\"\n").unwrap();
    fs::write(source.join("README.md"), "SRProxy\n").unwrap();

    source
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_tensorflow_spec_contents() {
        let tmp = TempDir::new().unwrap();

        let cpu = tensorflow_spec(tmp.path(), false);
        assert!(cpu.contains("python"));
        assert!(cpu.contains("libjpeg-turbo"));
        assert!(!cpu.contains("nccl"));

        let gpu = tensorflow_spec(tmp.path(), true);
        assert!(gpu.satisfies(&["cuda"]));
        assert!(gpu.contains("py-pybind11"));
        assert_eq!(
            gpu.get("py-pybind11").unwrap().libs.as_ref().unwrap().names,
            vec!["pybind11"]
        );
    }
}
