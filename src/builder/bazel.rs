//! Bazel driver.
//!
//! Composes the Bazel command line for a staged checkout, synthesizes one
//! external repository per resolved native dependency, runs the build and
//! then the generated packaging script.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::builder::context::{StageContext, EXTERNAL_DIR};
use crate::builder::external::{synthesize, Descriptor, RepoBinding};
use crate::core::spec::ResolvedSpec;
use crate::util::config::Config;
use crate::util::fs::ensure_dir;
use crate::util::process::{find_bazel, CommandRunner};

/// Repositories overridden on every build, as `(bazel name, package)`.
pub const BASE_BINDINGS: &[(&str, &str)] = &[
    ("curl", "curl"),
    ("eigen3", "eigen"),
    ("git", "git"),
    ("llvm", "llvm"),
    ("protobuf", "protobuf"),
    ("libjpeg_turbo", "libjpeg-turbo"),
];

/// Extra repositories overridden when building with CUDA.
pub const CUDA_BINDINGS: &[(&str, &str)] = &[
    ("cuda", "cuda"),
    ("nccl", "nccl"),
    ("pybind11", "py-pybind11"),
];

/// Targets built in the single Bazel invocation.
pub const BUILD_TARGETS: &[&str] = &[
    "//tensorflow/core:protos_all_cc",
    "//tensorflow:libtensorflow_cc.so",
    "//tensorflow/tools/pip_package:build_pip_package",
];

/// Generated packaging script, relative to the source checkout.
pub const PIP_PACKAGE_SCRIPT: &str = "tensorflow/tools/pip_package/build_pip_package";

/// Repository bindings for a build, in override order.
pub fn repository_bindings(gpu: bool) -> Vec<RepoBinding> {
    let extra: &[(&str, &str)] = if gpu { CUDA_BINDINGS } else { &[] };

    BASE_BINDINGS
        .iter()
        .chain(extra)
        .map(|(bazel, package)| RepoBinding::new(*bazel, *package))
        .collect()
}

/// A repository override on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoOverride {
    pub binding: RepoBinding,
    pub path: PathBuf,
}

impl RepoOverride {
    pub fn flag(&self) -> String {
        format!(
            "--override_repository={}={}",
            self.binding.bazel_name,
            self.path.display()
        )
    }
}

/// A fully composed Bazel invocation. Pure data; nothing has run yet.
#[derive(Debug, Clone, Serialize)]
pub struct BazelInvocation {
    /// Isolated output root (startup option)
    pub output_user_root: PathBuf,

    /// `cuda` or `nonccl`
    pub config: &'static str,

    /// Overrides for dependencies present in the resolved spec
    pub overrides: Vec<RepoOverride>,

    /// Bindings whose package was not resolved
    pub skipped: Vec<RepoBinding>,

    /// Parallel jobs, if configured
    pub jobs: Option<usize>,

    /// Configured extra arguments
    pub extra_args: Vec<String>,

    pub targets: Vec<String>,
}

impl BazelInvocation {
    /// Compose the invocation for a checkout.
    ///
    /// `source_dir` should be absolute; override paths are built from it.
    pub fn plan(
        spec: &ResolvedSpec,
        source_dir: &Path,
        output_user_root: PathBuf,
        config: &Config,
    ) -> Self {
        let gpu = spec.satisfies(&["cuda"]);
        let external_root = source_dir.join(EXTERNAL_DIR);

        let (present, skipped): (Vec<_>, Vec<_>) = repository_bindings(gpu)
            .into_iter()
            .partition(|b| spec.contains(&b.package));

        let overrides = present
            .into_iter()
            .map(|binding| RepoOverride {
                path: external_root.join(&binding.package),
                binding,
            })
            .collect();

        BazelInvocation {
            output_user_root,
            config: if gpu { "cuda" } else { "nonccl" },
            overrides,
            skipped,
            jobs: config.build.jobs,
            extra_args: config.build.extra_args.clone(),
            targets: BUILD_TARGETS.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Plan from a stage context.
    pub fn for_stage(ctx: &StageContext) -> Self {
        Self::plan(
            ctx.spec(),
            ctx.source_dir(),
            ctx.output_user_root(),
            ctx.config(),
        )
    }

    /// Command-line arguments, program excluded.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--output_user_root={}", self.output_user_root.display()),
            "build".to_string(),
            "--experimental_cc_shared_library".to_string(),
            format!("--config={}", self.config),
        ];

        args.extend(self.overrides.iter().map(RepoOverride::flag));

        if let Some(jobs) = self.jobs {
            args.push(format!("--jobs={}", jobs));
        }
        args.extend(self.extra_args.iter().cloned());
        args.extend(self.targets.iter().cloned());

        args
    }
}

/// Runs a planned invocation against a stage.
pub struct BazelBuilder<'a> {
    ctx: &'a StageContext,
    invocation: BazelInvocation,
    bazel: PathBuf,
}

impl<'a> BazelBuilder<'a> {
    /// Create a new Bazel builder.
    pub fn new(ctx: &'a StageContext) -> Result<Self> {
        let Some(bazel) = find_bazel(ctx.config().tools.bazel.as_deref()) else {
            bail!(
                "bazel not found\n\
                 \n\
                 Bazel is required to build this package.\n\
                 Add it as a build dependency or set `tools.bazel` in the galley config."
            );
        };

        Ok(BazelBuilder {
            ctx,
            invocation: BazelInvocation::for_stage(ctx),
            bazel,
        })
    }

    /// Use a specific bazel binary.
    pub fn with_bazel(ctx: &'a StageContext, bazel: PathBuf) -> Self {
        BazelBuilder {
            ctx,
            invocation: BazelInvocation::for_stage(ctx),
            bazel,
        }
    }

    pub fn invocation(&self) -> &BazelInvocation {
        &self.invocation
    }

    /// Synthesize repositories, build, then package.
    pub fn build(&self, runner: &mut dyn CommandRunner) -> Result<Vec<Descriptor>> {
        ensure_dir(&self.invocation.output_user_root)?;

        let descriptors = self.synthesize_repositories()?;
        self.compile(runner)?;
        self.package(runner)?;

        Ok(descriptors)
    }

    fn synthesize_repositories(&self) -> Result<Vec<Descriptor>> {
        for binding in &self.invocation.skipped {
            tracing::warn!(
                "`{}` is not in the resolved spec, not overriding bazel repository `{}`",
                binding.package,
                binding.bazel_name
            );
        }

        let root = self.ctx.external_root();
        self.invocation
            .overrides
            .iter()
            .map(|o| synthesize(self.ctx.spec(), &o.binding, &root))
            .collect()
    }

    fn compile(&self, runner: &mut dyn CommandRunner) -> Result<()> {
        tracing::info!(
            "Building with bazel (--config={}, {} repository overrides)",
            self.invocation.config,
            self.invocation.overrides.len()
        );

        let cmd = self.ctx.command(&self.bazel).args(self.invocation.args());
        runner.run(&cmd).context("bazel build failed")
    }

    fn package(&self, runner: &mut dyn CommandRunner) -> Result<()> {
        tracing::info!("Running build_pip_package");

        let script = self.ctx.source_dir().join(PIP_PACKAGE_SCRIPT);
        let cmd = self.ctx.command(&script);
        runner.run(&cmd).context("build_pip_package failed")
    }
}
