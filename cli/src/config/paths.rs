//! Environment variable and home directory expansion for config paths.
use std::path::{Path, PathBuf};

/// Expand environment variables, then a leading `~`, in `raw`.
///
/// Recognises `$VAR`, `${VAR}` and `%VAR%`; `%%` is a literal `%`. Variables
/// that `lookup` cannot resolve are left verbatim. `~` resolves to `HOME`,
/// falling back to `USERPROFILE`.
///
/// # Examples
///
/// ```
/// use dotfiles_windows::config::paths::expand;
///
/// let lookup = |name: &str| match name {
///     "LOCALAPPDATA" => Some(r"C:\Users\me\AppData\Local".to_string()),
///     "HOME" => Some("/home/me".to_string()),
///     _ => None,
/// };
/// assert_eq!(expand(r"%LOCALAPPDATA%\Fonts", &lookup), r"C:\Users\me\AppData\Local\Fonts");
/// assert_eq!(expand("~/fonts", &lookup), "/home/me/fonts");
/// assert_eq!(expand("$MISSING/x", &lookup), "$MISSING/x");
/// ```
#[must_use]
pub fn expand(raw: &str, lookup: &dyn Fn(&str) -> Option<String>) -> String {
    expand_home(&expand_vars(raw, lookup), lookup)
}

/// Expand `raw` against the process environment.
#[must_use]
pub fn expand_env(raw: &str) -> String {
    expand(raw, &|name| std::env::var(name).ok())
}

/// Expand `raw` and anchor it at `base` if it is relative.
#[must_use]
pub fn resolve(raw: &str, base: &Path) -> PathBuf {
    anchor(PathBuf::from(expand_env(raw)), base)
}

fn anchor(path: PathBuf, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn expand_vars(raw: &str, lookup: &dyn Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find(['$', '%']) {
        let (before, tail) = rest.split_at(pos);
        out.push_str(before);

        if let Some(after) = tail.strip_prefix('$') {
            if let Some(braced) = after.strip_prefix('{')
                && let Some((name, remainder)) = braced.split_once('}')
            {
                match lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push_str("${");
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = remainder;
                continue;
            }

            let len = after.find(|c: char| !is_name_char(c)).unwrap_or(after.len());
            let (name, remainder) = after.split_at(len);
            match (name.is_empty(), lookup(name)) {
                (false, Some(value)) => out.push_str(&value),
                _ => {
                    out.push('$');
                    out.push_str(name);
                }
            }
            rest = remainder;
        } else if let Some(after) = tail.strip_prefix('%') {
            if let Some(remainder) = after.strip_prefix('%') {
                out.push('%');
                rest = remainder;
            } else if let Some((name, remainder)) = after.split_once('%') {
                match lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push('%');
                        out.push_str(name);
                        out.push('%');
                    }
                }
                rest = remainder;
            } else {
                out.push('%');
                rest = after;
            }
        } else {
            // `find` only stops on the two sigils above.
            out.push_str(tail);
            rest = "";
        }
    }

    out.push_str(rest);
    out
}

fn expand_home(path: &str, lookup: &dyn Fn(&str) -> Option<String>) -> String {
    let Some(rest) = path.strip_prefix('~') else {
        return path.to_string();
    };
    if !(rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\')) {
        return path.to_string();
    }
    lookup("HOME")
        .or_else(|| lookup("USERPROFILE"))
        .map_or_else(|| path.to_string(), |home| format!("{home}{rest}"))
}
