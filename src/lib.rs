//! # toml_doc
//!
//! A TOML parser that builds an ordered document tree in which every node
//! knows where it came from.
//!
//! ## What it does
//!
//! Parsing turns UTF-8 text into a root [`Table`]. Tables keep their keys in
//! declaration order, and every node (tables, arrays and scalars alike)
//! carries a [`Region`]: the line and column where it begins and ends, plus
//! an optional source path for diagnostics.
//!
//! ## Key Features
//!
//! - **Validating**: redefined keys, malformed literals and out-of-range
//!   dates are rejected with a precise, located [`Error`]
//! - **Typed scalars**: 64-bit integers, floats, booleans, strings and
//!   calendar [`Date`], [`Time`] and [`DateTime`] values
//! - **Format-preserving shape**: inline tables and header-declared tables
//!   stay distinguishable, so a formatter can reproduce the document
//! - **Serde output**: the tree implements `Serialize` for handing the data to
//!   any serde format
//! - **No Unsafe Code**
//!
//! ## Quick Start
//!
//! ```rust
//! use toml_doc::parse;
//!
//! let doc = r#"
//! title = "TOML Example"
//!
//! [owner]
//! name = "Tom Preston-Werner"
//! dob = 1979-05-27T07:32:00-08:00
//!
//! [[products]]
//! name = "Hammer"
//! sku = 738594937
//!
//! [[products]]
//! name = "Nail"
//! "#;
//!
//! let root = parse(doc).unwrap();
//! assert_eq!(root.get("title").and_then(|n| n.as_str()), Some("TOML Example"));
//!
//! let products = root.get("products").and_then(|n| n.as_table_array()).unwrap();
//! assert_eq!(products.len(), 2);
//!
//! let owner = root.get("owner").and_then(|n| n.as_table()).unwrap();
//! assert_eq!(owner.region().begin.line, 4);
//! ```
//!
//! ### Errors carry their location
//!
//! ```rust
//! use toml_doc::{parse, ErrorKind};
//!
//! let err = parse("[server]\nport = 80\nport = 8080\n").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Structural);
//! assert_eq!(err.region().begin.line, 3);
//! assert_eq!(
//!     err.to_string(),
//!     "Attempt to redefine integer 'port' (at line 3, column 1)"
//! );
//! ```
//!
//! ### Building trees in memory
//!
//! ```rust
//! use toml_doc::{toml_array, toml_table};
//!
//! let table = toml_table!({
//!     "name": "demo",
//!     "ports": [80, 443]
//! });
//! assert_eq!(table.len(), 2);
//! assert_eq!(toml_array!([1, 2, 3]).len(), 3);
//! ```
//!
//! ## Strict mode
//!
//! Building with the `strict` Cargo feature rejects the lenient grammar
//! extensions. See [`options`] and the [`format`] module for the grammar.
//!
//! ## Performance Characteristics
//!
//! - **Parsing**: single pass over the input, O(n) in its length
//! - **Lookahead**: bounded to [`reader::MAX_LOOKAHEAD`] codepoints
//! - **Streams**: [`parse_reader`] decodes bytes as they are read

pub mod array;
pub mod datetime;
pub mod error;
pub mod format;
pub mod macros;
pub mod options;
pub mod parser;
pub mod reader;
pub mod region;
pub mod table;
pub mod value;

pub use array::{Array, TableArray};
pub use datetime::{Date, DateTime, Time, TimeOffset};
pub use error::{Error, ErrorKind, Result};
pub use options::{ParseOptions, STRICT};
pub use region::{Position, Region};
pub use table::Table;
pub use value::{Node, NodeType, Value};

use parser::Parser;
use reader::{ByteSource, CodepointReader, SliceSource, StreamSource};
use std::io;
use tracing::debug;

fn parse_source<S: ByteSource>(source: S, options: ParseOptions, input: &'static str) -> Result<Table> {
    debug!(source_path = ?options.source_path, input, "parsing document");

    let reader = CodepointReader::new(source, options.source_path);
    match Parser::new(reader).parse() {
        Ok(root) => {
            debug!(keys = root.len(), "parsed document");
            Ok(root)
        }
        Err(err) => {
            debug!(error = %err.message(), position = %err.region().begin, "failed to parse document");
            Err(err)
        }
    }
}

/// Parse a TOML document from a string.
///
/// # Examples
///
/// ```rust
/// use toml_doc::parse;
///
/// let root = parse("answer = 42\n").unwrap();
/// assert_eq!(root.get("answer").and_then(|n| n.as_integer()), Some(42));
/// ```
///
/// # Errors
///
/// Returns the first syntax, range or redefinition error in the document.
/// Parsing stops there; no partial tree is returned.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse(s: &str) -> Result<Table> {
    parse_with_options(s, ParseOptions::default())
}

/// Parse a TOML document from a string with custom options.
///
/// # Errors
///
/// See [`parse`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_with_options(s: &str, options: ParseOptions) -> Result<Table> {
    parse_source(SliceSource::new(s.as_bytes()), options, "str")
}

/// Parse a TOML document from bytes that should be UTF-8.
///
/// # Examples
///
/// ```rust
/// use toml_doc::{parse_slice, ErrorKind};
///
/// let root = parse_slice(b"\xEF\xBB\xBFkey = 'bom is skipped'").unwrap();
/// assert!(root.contains_key("key"));
///
/// let err = parse_slice(b"key = \"\xFF\"").unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::Encoding);
/// ```
///
/// # Errors
///
/// Returns an encoding error for invalid UTF-8, otherwise as [`parse`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_slice(v: &[u8]) -> Result<Table> {
    parse_slice_with_options(v, ParseOptions::default())
}

/// Parse a TOML document from bytes with custom options.
///
/// # Errors
///
/// See [`parse_slice`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_slice_with_options(v: &[u8], options: ParseOptions) -> Result<Table> {
    parse_source(SliceSource::new(v), options, "slice")
}

/// Parse a TOML document from an I/O stream.
///
/// Bytes are decoded as they are read; the input is never buffered whole.
///
/// # Examples
///
/// ```rust
/// use toml_doc::parse_reader;
/// use std::io::Cursor;
///
/// let root = parse_reader(Cursor::new("[a]\nb = true\n")).unwrap();
/// let a = root.get("a").and_then(|n| n.as_table()).unwrap();
/// assert_eq!(a.get("b").and_then(|n| n.as_bool()), Some(true));
/// ```
///
/// # Errors
///
/// Returns an I/O error if reading fails, otherwise as [`parse_slice`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_reader<R: io::Read>(reader: R) -> Result<Table> {
    parse_reader_with_options(reader, ParseOptions::default())
}

/// Parse a TOML document from an I/O stream with custom options.
///
/// # Errors
///
/// See [`parse_reader`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_reader_with_options<R: io::Read>(reader: R, options: ParseOptions) -> Result<Table> {
    parse_source(StreamSource::new(reader), options, "reader")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_points_agree() {
        let doc = "a = 1\n[b]\nc = 'x'\n";
        let from_str = parse(doc).unwrap();
        let from_slice = parse_slice(doc.as_bytes()).unwrap();
        let from_reader = parse_reader(io::Cursor::new(doc)).unwrap();
        assert_eq!(from_str, from_slice);
        assert_eq!(from_str, from_reader);
    }

    #[test]
    fn test_source_path_reaches_nested_regions() {
        let options = ParseOptions::new().with_source_path("app.toml");
        let root = parse_with_options("[a]\nb = [1]\n", options).unwrap();
        let b = root.get("a").and_then(|n| n.get("b")).unwrap();
        assert_eq!(b.region().source_path.as_deref(), Some("app.toml"));
        assert_eq!(root.region().source_path.as_deref(), Some("app.toml"));
    }

    #[test]
    fn test_empty_document() {
        let root = parse("").unwrap();
        assert!(root.is_empty());
        assert_eq!(root.region().begin, Position::START);
        assert_eq!(root.region().end, Position::START);
    }
}
