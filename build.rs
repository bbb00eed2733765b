use vergen::{BuildBuilder, Emitter, RustcBuilder};
use vergen_git2::Git2Builder;

// Feeds `slangit --version` (see LONG_VERSION in src/cli/mod.rs).
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let build = BuildBuilder::default().build_timestamp(true).build()?;
    let rustc = RustcBuilder::default().semver(true).build()?;

    // Source tarballs have no git metadata.
    let git2_result = Git2Builder::default()
        .describe(true, true, None)
        .sha(true)
        .build();

    let mut emitter = Emitter::default();
    emitter.add_instructions(&build)?.add_instructions(&rustc)?;

    match git2_result {
        Ok(git2) => {
            emitter.add_instructions(&git2)?.emit()?;
        }
        Err(_) => {
            println!("cargo:rustc-env=VERGEN_GIT_DESCRIBE=unknown");
            println!("cargo:rustc-env=VERGEN_GIT_SHA=unknown");
            emitter.emit()?;
        }
    }

    Ok(())
}
