//! Log file location, ANSI stripping and timestamps.
use std::path::PathBuf;

/// Remove ANSI CSI sequences (`ESC [ … final-byte`) and lone escapes.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\x1b' {
            out.push(c);
            continue;
        }
        if chars.next_if_eq(&'[').is_some() {
            // Parameter and intermediate bytes run until a final byte in `@`..=`~`.
            while chars.next().is_some_and(|b| !('@'..='~').contains(&b)) {}
        } else {
            chars.next();
        }
    }
    out
}

/// Directory holding log files, given an environment lookup.
///
/// `$XDG_CACHE_HOME/dotfiles`, else `<home>/.cache/dotfiles` where home is
/// `HOME` or `USERPROFILE`, else `./.cache/dotfiles`.
pub(super) fn cache_dir_with(lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    let base = lookup("XDG_CACHE_HOME").map_or_else(
        || {
            lookup("HOME")
                .or_else(|| lookup("USERPROFILE"))
                .map_or_else(|| PathBuf::from("."), PathBuf::from)
                .join(".cache")
        },
        PathBuf::from,
    );
    base.join("dotfiles")
}

/// Path of the log file for `command`, creating its directory.
///
/// Returns `None` when the directory cannot be created; logging then goes to
/// the console only.
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    let dir = cache_dir_with(|name| std::env::var(name).ok());
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir.join(format!("{command}.log")))
}

/// Current UTC time rendered with a `chrono` format string.
pub(super) fn utc_now(format: &str) -> String {
    chrono::Utc::now().format(format).to_string()
}
