//! `galley external` command

use anyhow::Result;

use crate::cli::ExternalArgs;
use galley::builder::external::{synthesize, RepoBinding};
use galley::core::ResolvedSpec;
use galley::util::GlobalContext;

pub fn execute(args: ExternalArgs) -> Result<()> {
    let gctx = GlobalContext::new()?;

    let spec = ResolvedSpec::load(&gctx.resolve_path(&args.spec))?;
    let bazel_name = args.bazel_name.unwrap_or_else(|| args.package.clone());
    let binding = RepoBinding::new(bazel_name, args.package);

    let descriptor = synthesize(&spec, &binding, &gctx.resolve_path(&args.out))?;

    println!(
        "Created {} ({} links, {} libraries)",
        descriptor.path.display(),
        descriptor.links.len(),
        descriptor.libraries.len()
    );

    Ok(())
}
