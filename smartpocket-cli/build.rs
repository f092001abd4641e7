use std::env;
use std::path::Path;
use std::process::Command;

const SHA_ENV: &str = "SMARTPOCKET_BUILD_SHA";

fn git_short_sha(workspace: &Path) -> Option<String> {
    let out = Command::new("git")
        .arg("-C")
        .arg(workspace)
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let sha = String::from_utf8(out.stdout).ok()?.trim().to_string();
    (!sha.is_empty()).then_some(sha)
}

fn main() {
    println!("cargo:rerun-if-env-changed={SHA_ENV}");

    // Packagers building from a tarball can pin the revision themselves.
    let sha = env::var(SHA_ENV).ok().filter(|s| !s.trim().is_empty()).or_else(|| {
        let manifest = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
        git_short_sha(&Path::new(&manifest).join(".."))
    });

    println!(
        "cargo:rustc-env={SHA_ENV}={}",
        sha.unwrap_or_else(|| "unknown".to_string())
    );
}
