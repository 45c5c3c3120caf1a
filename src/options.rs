//! Configuration for parsing.
//!
//! Two layers of configuration exist:
//!
//! - [`STRICT`]: a compile-time switch (Cargo feature `strict`) selecting the
//!   strict grammar. It disables the lenient extensions: hexadecimal floats,
//!   the `\s` escape, times without seconds, heterogeneous arrays, a lone
//!   carriage return as a line break, trailing commas or line breaks inside
//!   inline tables, and non-ASCII bare keys.
//! - [`ParseOptions`]: per-call settings. Currently only the source-path label
//!   attached to every region for diagnostics.
//!
//! ## Examples
//!
//! ```rust
//! use toml_doc::{parse_with_options, ParseOptions};
//!
//! let options = ParseOptions::new().with_source_path("config/app.toml");
//! let err = parse_with_options("port = 0x\n", options).unwrap_err();
//! assert!(err.to_string().contains("config/app.toml:1:"));
//! ```

use std::sync::Arc;

/// `true` when the crate was built with the `strict` feature.
pub const STRICT: bool = cfg!(feature = "strict");

/// Per-parse configuration.
///
/// # Examples
///
/// ```rust
/// use toml_doc::ParseOptions;
///
/// let options = ParseOptions::new();
/// assert!(options.source_path.is_none());
///
/// let options = ParseOptions::new().with_source_path("settings.toml");
/// assert_eq!(options.source_path.as_deref(), Some("settings.toml"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ParseOptions {
    pub source_path: Option<Arc<str>>,
}

impl ParseOptions {
    /// Creates default options (no source path).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the label attached to every region produced by the parse.
    ///
    /// The label is stored once and shared by all regions.
    #[must_use]
    pub fn with_source_path(mut self, path: impl AsRef<str>) -> Self {
        self.source_path = Some(Arc::from(path.as_ref()));
        self
    }
}
