use thiserror::Error;

#[derive(Debug, Error)]
#[cfg_attr(feature = "rich-errors", derive(miette::Diagnostic))]
pub enum ConfbindError {
    #[error("Tried to access an uninitialized config node for '{key}'")]
    #[cfg_attr(
        feature = "rich-errors",
        diagnostic(help("bindings resolve their node before every access; this is a bug"))
    )]
    Uninitialized { key: String },

    #[error("Cannot read '{path}' as {expected}: found {found}")]
    Coerce {
        path: String,
        expected: &'static str,
        found: String,
    },

    #[error("Failed to deserialize '{path}': {source}")]
    Deserialize {
        path: String,
        source: toml::de::Error,
    },

    #[error("Failed to serialize value for '{path}': {source}")]
    Serialize {
        path: String,
        source: toml::ser::Error,
    },

    #[error("'{path}' holds a value, not a table, so it cannot have children")]
    NotATable { path: String },

    #[error("Failed to parse TOML document: {0}")]
    Parse(#[from] toml_edit::TomlError),
}
