//! Captures git state and the build timestamp for the metadata record, and
//! puts the `.build_metadata` linker fragment on the search path.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    let out = Command::new("git").args(args).output().ok()?;
    if !out.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&out.stdout).trim().to_string())
}

fn main() {
    let out_dir = PathBuf::from(env::var_os("OUT_DIR").unwrap());
    fs::copy("build_meta.x", out_dir.join("build_meta.x")).unwrap();
    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rerun-if-changed=build_meta.x");

    // Placeholders keep the build working outside a git checkout.
    let commit = git(&["rev-parse", "--short=8", "HEAD"]).unwrap_or_else(|| "00000000".into());
    let branch = git(&["rev-parse", "--abbrev-ref", "HEAD"]).unwrap_or_else(|| "unknown".into());
    let dirty = git(&["status", "--porcelain"]).is_some_and(|s| !s.is_empty());
    println!("cargo:rustc-env=GIT_COMMIT={commit}");
    println!("cargo:rustc-env=GIT_BRANCH={branch}");
    println!("cargo:rustc-env=GIT_DIRTY={}", if dirty { "1" } else { "0" });
    println!("cargo:rerun-if-changed=../.git/HEAD");

    // Same shapes as the C toolchain's __DATE__ / __TIME__: "Mmm dd YYYY"
    // (day space-padded) and "HH:MM:SS", so they fit the record's 12- and
    // 9-byte fields.
    let now = chrono::Utc::now();
    println!("cargo:rustc-env=BUILD_DATE={}", now.format("%b %e %Y"));
    println!("cargo:rustc-env=BUILD_TIME={}", now.format("%H:%M:%S"));
}
