//! Shape validation of untyped directive trees.
//!
//! A [`Schema`] declares which keys may appear at each level and what type
//! each leaf must have. Every declared key is optional; undeclared keys are
//! rejected.
use std::collections::BTreeMap;
use std::fmt;

use toml::Value;

use crate::error::ConfigError;

/// Primitive value types a schema leaf can require.
///
/// Every leaf of the `windows` directive is a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// A string.
    String,
}

impl Kind {
    /// Whether `value` is an instance of this kind.
    #[must_use]
    pub const fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => matches!(value, Value::String(_)),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("string"),
        }
    }
}

/// Declared shape of a directive tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schema {
    /// A leaf value of the given kind.
    Primitive(Kind),
    /// A table whose keys are all optional and must be declared here.
    Nested(BTreeMap<String, Schema>),
}

impl Schema {
    /// A string leaf.
    #[must_use]
    pub const fn string() -> Self {
        Self::Primitive(Kind::String)
    }

    /// A table with the given fields.
    #[must_use]
    pub fn nested<'k>(fields: impl IntoIterator<Item = (&'k str, Self)>) -> Self {
        Self::Nested(
            fields
                .into_iter()
                .map(|(key, schema)| (key.to_string(), schema))
                .collect(),
        )
    }
}

/// Check `value` against `schema`.
///
/// `path` labels the value in error messages; nested keys are appended with
/// a dot. Validation is pure: the same input always yields the same result.
///
/// # Errors
///
/// Returns the first mismatch found:
/// - [`ConfigError::NotATable`] if a nested schema meets a non-table value
/// - [`ConfigError::UnexpectedKeys`] if a table has undeclared keys
/// - [`ConfigError::WrongType`] if a leaf has the wrong type
pub fn validate(path: &str, value: &Value, schema: &Schema) -> Result<(), ConfigError> {
    match schema {
        Schema::Primitive(kind) => {
            if kind.matches(value) {
                Ok(())
            } else {
                Err(ConfigError::WrongType {
                    path: path.to_string(),
                    expected: *kind,
                })
            }
        }
        Schema::Nested(fields) => {
            let Some(table) = value.as_table() else {
                return Err(ConfigError::NotATable {
                    path: path.to_string(),
                });
            };

            let mut unexpected: Vec<String> = table
                .keys()
                .filter(|key| !fields.contains_key(*key))
                .cloned()
                .collect();
            if !unexpected.is_empty() {
                unexpected.sort();
                return Err(ConfigError::UnexpectedKeys {
                    path: path.to_string(),
                    keys: unexpected,
                });
            }

            for (key, field) in fields {
                if let Some(child) = table.get(key) {
                    validate(&format!("{path}.{key}"), child, field)?;
                }
            }
            Ok(())
        }
    }
}

/// Schema of the `windows` directive.
#[must_use]
pub fn windows_schema() -> Schema {
    Schema::nested([
        ("registry", Schema::nested([("import", Schema::string())])),
        (
            "personalization",
            Schema::nested([("background-color", Schema::string())]),
        ),
        ("fonts", Schema::nested([("path", Schema::string())])),
    ])
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Value {
        Value::Table(toml::from_str(src).unwrap())
    }

    #[test]
    fn empty_tree_is_valid() {
        assert!(validate("windows", &parse(""), &windows_schema()).is_ok());
    }

    #[test]
    fn full_tree_is_valid() {
        let tree = parse(
            r##"
            registry.import = "registry"
            personalization.background-color = "#0099ff"
            fonts.path = "fonts"
            "##,
        );
        assert!(validate("windows", &tree, &windows_schema()).is_ok());
    }

    #[test]
    fn partial_sections_are_valid() {
        let tree = parse("[fonts]\n");
        assert!(validate("windows", &tree, &windows_schema()).is_ok());
    }

    #[test]
    fn non_table_root_is_rejected() {
        let err = validate("windows", &Value::String("x".into()), &windows_schema()).unwrap_err();
        assert!(matches!(err, ConfigError::NotATable { ref path } if path == "windows"));
    }

    #[test]
    fn non_table_section_is_rejected() {
        let tree = parse(r#"fonts = "fonts""#);
        let err = validate("windows", &tree, &windows_schema()).unwrap_err();
        assert!(matches!(err, ConfigError::NotATable { ref path } if path == "windows.fonts"));
    }

    #[test]
    fn unexpected_top_level_keys_are_rejected_sorted() {
        let tree = parse("zeta = 1\nalpha = 2\n");
        let err = validate("windows", &tree, &windows_schema()).unwrap_err();
        match err {
            ConfigError::UnexpectedKeys { path, keys } => {
                assert_eq!(path, "windows");
                assert_eq!(keys, vec!["alpha".to_string(), "zeta".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unexpected_nested_keys_are_rejected() {
        let tree = parse("[fonts]\npath = \"x\"\nrecursive = true\n");
        let err = validate("windows", &tree, &windows_schema()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnexpectedKeys { ref path, .. } if path == "windows.fonts"
        ));
    }

    #[test]
    fn wrong_leaf_type_names_dotted_path() {
        let tree = parse("[personalization]\nbackground-color = 255\n");
        let err = validate("windows", &tree, &windows_schema()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Config value 'windows.personalization.background-color' must be a string"
        );
    }

    #[test]
    fn validation_is_deterministic() {
        let tree = parse("a = 1\nb = 2\nc = 3\n");
        let first = validate("windows", &tree, &windows_schema()).unwrap_err().to_string();
        let second = validate("windows", &tree, &windows_schema()).unwrap_err().to_string();
        assert_eq!(first, second);
    }

    #[test]
    fn kinds_match_their_values() {
        assert!(Kind::String.matches(&Value::String(String::new())));
        assert!(!Kind::String.matches(&Value::Integer(1)));
        assert!(!Kind::String.matches(&Value::Array(vec![])));
    }

    #[test]
    fn custom_schema_nests_arbitrarily() {
        let schema = Schema::nested([(
            "a",
            Schema::nested([("b", Schema::nested([("c", Schema::Primitive(Kind::String))]))]),
        )]);
        let tree = parse("a.b.c = true\n");
        let err = validate("root", &tree, &schema).unwrap_err();
        assert!(err.to_string().contains("'root.a.b.c' must be a string"));
    }
}
