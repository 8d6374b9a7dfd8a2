use anyhow::*;
use fs_extra::copy_items;
use fs_extra::dir::CopyOptions;
use std::env;
use std::path::PathBuf;

// Environment maps, textures and models live in `static/`. They are mirrored next
// to the build output so the binaries find them without extra configuration.
fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=static/*");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let static_src = manifest_dir.join("static");
    if !static_src.exists() {
        println!("cargo:warning=no static/ directory, assets must be provided at runtime");
        return Ok(());
    }

    let out_dir = env::var("OUT_DIR")?;
    let mut copy_options = CopyOptions::new();
    copy_options.overwrite = true;
    copy_items(&[static_src], out_dir, &copy_options)?;

    Ok(())
}
