use std::process::Command;

// Exposes CHAPTERWATCH_GIT_SHA, printed by `chapterwatch --version` and in
// the "chapterwatch starting" log line so a running bot can be matched to
// its commit. Falls back to "unknown" outside a git checkout.
fn main() {
    let sha = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .map(|out| String::from_utf8_lossy(&out.stdout).trim().to_string())
        .filter(|sha| !sha.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=CHAPTERWATCH_GIT_SHA={sha}");
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-changed=../../.git/refs/");
}
