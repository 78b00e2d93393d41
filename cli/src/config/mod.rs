//! Directive loading, shape validation, and the typed `windows` view.
pub mod paths;
pub mod toml_loader;
pub mod validation;

use toml::Value;

use crate::error::ConfigError;

/// Name of the directive handled by this crate.
pub const DIRECTIVE: &str = "windows";

/// Typed view of a validated `windows` directive.
///
/// Every field is optional; an absent section means the corresponding task
/// has nothing to do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowsConfig {
    /// Directory searched recursively for `.reg` files (`registry.import`).
    pub registry_import: Option<String>,
    /// Desktop colour spec (`personalization.background-color`).
    pub background_color: Option<String>,
    /// Directory searched recursively for fonts (`fonts.path`).
    pub fonts_path: Option<String>,
}

impl WindowsConfig {
    /// Validate `tree` and extract its settings.
    ///
    /// # Errors
    ///
    /// Returns the validation error if `tree` does not match the schema.
    pub fn from_tree(tree: &Value) -> Result<Self, ConfigError> {
        validation::validate(DIRECTIVE, tree, &validation::windows_schema())?;

        let lookup = |section: &str, key: &str| {
            tree.get(section)
                .and_then(|s| s.get(key))
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        Ok(Self {
            registry_import: lookup("registry", "import"),
            background_color: lookup("personalization", "background-color"),
            fonts_path: lookup("fonts", "path"),
        })
    }
}
