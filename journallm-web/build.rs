//! Build script for journallm-web
//!
//! Exposes build identification to the binary as `GIT_HASH`,
//! `BUILD_TIMESTAMP` and `BUILD_PROFILE`, logged at startup and reported by
//! the health endpoint.

use std::process::Command;

fn git_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout).ok().map(|s| s.trim().to_string())
}

fn main() {
    let hash = git_hash().unwrap_or_else(|| "unknown".to_string());

    // e.g. 2025-03-14T09:26:53+01:00
    let timestamp = chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, false);

    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=GIT_HASH={hash}");
    println!("cargo:rustc-env=BUILD_TIMESTAMP={timestamp}");
    println!("cargo:rustc-env=BUILD_PROFILE={profile}");

    // No rerun-if-changed: the script runs on every build so the stamp stays current
}
