//! Build orchestration.
//!
//! Everything a recipe needs to drive an external build: the stage context,
//! the exported environment, the configure step, external repository
//! synthesis, the Bazel driver and install-phase artifact collection.

pub mod bazel;
pub mod collect;
pub mod configure;
pub mod context;
pub mod env;
pub mod external;

pub use bazel::{BazelBuilder, BazelInvocation};
pub use collect::{collect_artifacts, CollectReport};
pub use context::StageContext;
pub use env::BuildEnvironment;
pub use external::{synthesize, Descriptor, RepoBinding};
