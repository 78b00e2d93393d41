use std::process::Command;

/// Embed a version string for `dotfiles-windows version`.
///
/// A release pipeline sets `DOTFILES_VERSION`; local builds use the nearest
/// git tag.
fn main() {
    let version = std::env::var("DOTFILES_VERSION").ok().or_else(git_describe);
    if let Some(version) = version {
        println!("cargo:rustc-env=DOTFILES_VERSION={version}");
    }

    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-changed=../.git/refs/");
    println!("cargo:rerun-if-env-changed=DOTFILES_VERSION");
}

fn git_describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!version.is_empty()).then_some(version)
}
