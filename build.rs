//! Build script for persona-forge
//!
//! Embeds the git revision, build timestamp, target and compiler version
//! so `persona-forge version` can report where a binary came from.

use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    let git_hash = capture("git", &["rev-parse", "--short=8", "HEAD"]);
    let git_dirty = match Command::new("git").args(["status", "--porcelain"]).output() {
        Ok(out) if out.status.success() => {
            if out.stdout.is_empty() {
                "false"
            } else {
                "true"
            }
        }
        _ => "unknown",
    };

    let build_timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let target = env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    let rustc_version = capture("rustc", &["--version"]);

    println!("cargo:rustc-env=PERSONA_FORGE_GIT_HASH={}", git_hash);
    println!("cargo:rustc-env=PERSONA_FORGE_GIT_DIRTY={}", git_dirty);
    println!("cargo:rustc-env=PERSONA_FORGE_BUILD_TIMESTAMP={}", build_timestamp);
    println!("cargo:rustc-env=PERSONA_FORGE_TARGET={}", target);
    println!("cargo:rustc-env=PERSONA_FORGE_PROFILE={}", profile);
    println!("cargo:rustc-env=PERSONA_FORGE_RUSTC_VERSION={}", rustc_version);
}

/// Run a command and return its trimmed stdout, or "unknown" on any failure
fn capture(program: &str, args: &[&str]) -> String {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
