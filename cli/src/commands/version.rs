//! Command: print version information.

/// Print the plugin version to stdout.
pub fn run() {
    println!("dotfiles-windows {}", super::version());
}
