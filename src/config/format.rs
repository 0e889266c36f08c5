//! Wire format selection.

use std::fmt;

/// The body format used for requests and responses, and whether resource
/// paths carry a format extension.
///
/// Both variants encode bodies as JSON; they differ only in the path suffix.
///
/// # Example
///
/// ```rust
/// use reactive_resource::Format;
///
/// assert_eq!(Format::Json.extension(), ".json");
/// assert_eq!(Format::ExtensionlessJson.extension(), "");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Format {
    /// JSON bodies, paths end in `.json`.
    #[default]
    Json,
    /// JSON bodies, paths carry no extension.
    ExtensionlessJson,
}

impl Format {
    /// Returns the path extension including the leading dot, or `""`.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Json => ".json",
            Self::ExtensionlessJson => "",
        }
    }

    /// Returns the MIME type sent in `Content-Type` and `Accept` headers.
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        "application/json"
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::ExtensionlessJson => f.write_str("json (no extension)"),
        }
    }
}
