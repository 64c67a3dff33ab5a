//! TensorFlow 2, built with Bazel against package-manager installs.
//!
//! The configure script is run non-interactively with its answers taken
//! from the environment. Native dependencies the host already installed are
//! handed to Bazel as overridden repositories so it does not fetch its own.

use std::path::Path;

use anyhow::Result;

use crate::builder::bazel::{BazelBuilder, BazelInvocation};
use crate::builder::collect::collect_artifacts;
use crate::builder::configure::run_configure;
use crate::builder::context::StageContext;
use crate::builder::env::BuildEnvironment;
use crate::core::recipe::{DeclaredDependency, DepKind, Phase, Recipe};
use crate::util::process::CommandRunner;

pub struct Tensorflow;

impl Recipe for Tensorflow {
    fn name(&self) -> &'static str {
        "tensorflow2"
    }

    fn summary(&self) -> &'static str {
        "An end-to-end open source platform for machine learning"
    }

    fn homepage(&self) -> &'static str {
        "https://www.tensorflow.org/"
    }

    fn dependencies(&self) -> Vec<DeclaredDependency> {
        use DepKind::*;

        vec![
            DeclaredDependency::new("cuda", BuildRun).when("cuda"),
            DeclaredDependency::new("nccl", BuildRun).when("cuda"),
            DeclaredDependency::new("bazel", Build),
            DeclaredDependency::new("git", Build),
            DeclaredDependency::new("py-pip", Build),
            DeclaredDependency::new("py-wheel", Build),
            DeclaredDependency::new("py-packaging", Build),
            DeclaredDependency::new("py-pybind11", Build),
            DeclaredDependency::new("curl", BuildRun),
            DeclaredDependency::new("eigen", BuildRun),
            DeclaredDependency::new("hwloc", BuildRun),
            DeclaredDependency::new("jsoncpp", BuildRun),
            DeclaredDependency::new("libjpeg-turbo", BuildRun),
            DeclaredDependency::new("llvm", BuildRun),
            DeclaredDependency::new("protobuf", BuildRun),
            DeclaredDependency::new("py-keras-preprocessing", BuildRun),
            DeclaredDependency::new("py-numpy", BuildRun),
            DeclaredDependency::new("py-opt-einsum", BuildRun),
            DeclaredDependency::new("py-requests", BuildRun),
            DeclaredDependency::new("python", BuildRun),
        ]
    }

    fn phases(&self) -> &'static [Phase] {
        &[Phase::Configure, Phase::Build, Phase::Install]
    }

    fn variants(&self) -> &'static [&'static str] {
        &["cuda", "clang", "rocm", "tensorrt"]
    }

    fn setup_build_environment(
        &self,
        ctx: &StageContext,
        env: &mut BuildEnvironment,
    ) -> Result<()> {
        let spec = ctx.spec();
        let python = spec.require("python")?;

        env.set(
            "PYTHON_BIN_PATH",
            python.bin_dir().join("python3").display().to_string(),
        );
        let python_lib = python
            .primary_lib_dir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| python.prefix.join("lib"));
        env.set("PYTHON_LIB_PATH", python_lib.display().to_string());

        env.set_flag("TF_CUDA_CLANG", spec.satisfies(&["cuda", "clang"]));
        env.set_flag("TF_DOWNLOAD_CLANG", false);
        env.set_flag("TF_ENABLE_XLA", false);
        env.set_flag("TF_NEED_ROCM", spec.satisfies(&["rocm"]));
        env.set_flag("TF_NEED_CUDA", spec.satisfies(&["cuda"]));
        env.set_flag("TF_NEED_TENSORRT", spec.satisfies(&["tensorrt"]));
        env.set_flag("TF_ANDROID_WORKSPACE", false);
        env.set("CC_OPT_FLAGS", ctx.config().cc_opt_flags());

        Ok(())
    }

    fn build_plan(&self, ctx: &StageContext) -> Option<BazelInvocation> {
        Some(BazelInvocation::for_stage(ctx))
    }

    fn run_phase(
        &self,
        phase: Phase,
        ctx: &StageContext,
        runner: &mut dyn CommandRunner,
    ) -> Result<()> {
        match phase {
            Phase::Configure => run_configure(ctx, runner),
            Phase::Build => {
                let descriptors = BazelBuilder::new(ctx)?.build(runner)?;
                tracing::debug!("synthesized {} external repositories", descriptors.len());
                Ok(())
            }
            Phase::Install => {
                collect_artifacts(
                    &ctx.bazel_bin(),
                    &ctx.include_dir(),
                    &ctx.lib_dir(),
                    ctx.config().header_exclude(),
                )?;
                Ok(())
            }
        }
    }
}
