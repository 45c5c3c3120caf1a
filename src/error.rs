//! Error types for TOML parsing.
//!
//! Parsing stops at the first violation. The failure is reported as a single
//! [`Error`] value carrying a human-readable message and the [`Region`] it
//! refers to (the offending character, or the last character read when the
//! input ended early).
//!
//! ## Error Categories
//!
//! - **Encoding**: the input is not valid UTF-8
//! - **Lexical**: unexpected characters, unterminated literals, bad escapes
//! - **Range**: numbers, dates and times outside their valid domain
//! - **Structural**: redefinition of keys, tables and table arrays
//! - **Ambiguity**: a value that cannot be classified as one literal kind
//! - **I/O**: the byte stream itself failed
//!
//! ## Examples
//!
//! ```rust
//! use toml_doc::{parse, ErrorKind};
//!
//! let err = parse("a = 1\na = 2\n").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Structural);
//! assert_eq!(err.region().begin.line, 2);
//! ```

use crate::region::Region;
use std::fmt;
use thiserror::Error;

/// The class of a parse failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Encoding,
    Lexical,
    Range,
    Structural,
    Ambiguity,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::Encoding => "encoding error",
            ErrorKind::Lexical => "syntax error",
            ErrorKind::Range => "value out of range",
            ErrorKind::Structural => "structural error",
            ErrorKind::Ambiguity => "ambiguous value",
            ErrorKind::Io => "I/O error",
        })
    }
}

/// Represents every way a parse can fail.
///
/// Each variant carries the message and the source region it refers to.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Malformed UTF-8 in the input
    #[error("{message} (at {region})")]
    Encoding { message: String, region: Region },

    /// Unexpected character, unterminated literal or invalid escape
    #[error("{message} (at {region})")]
    Lexical { message: String, region: Region },

    /// Numeric or calendar value outside its domain
    #[error("{message} (at {region})")]
    Range { message: String, region: Region },

    /// Redefinition of an existing key, table or table array
    #[error("{message} (at {region})")]
    Structural { message: String, region: Region },

    /// Value that could not be classified
    #[error("{message} (at {region})")]
    Ambiguity { message: String, region: Region },

    /// Failure reading the underlying byte stream
    #[error("{message} (at {region})")]
    Io { message: String, region: Region },
}

impl Error {
    /// Creates an encoding error.
    pub fn encoding(region: Region, message: impl Into<String>) -> Self {
        Error::Encoding {
            message: message.into(),
            region,
        }
    }

    /// Creates a lexical (syntax) error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use toml_doc::{Error, Position, Region};
    ///
    /// let err = Error::lexical(Region::at(Position::new(10, 5), None), "unexpected '!'");
    /// assert!(err.to_string().contains("line 10"));
    /// ```
    pub fn lexical(region: Region, message: impl Into<String>) -> Self {
        Error::Lexical {
            message: message.into(),
            region,
        }
    }

    /// Creates a range error.
    pub fn range(region: Region, message: impl Into<String>) -> Self {
        Error::Range {
            message: message.into(),
            region,
        }
    }

    /// Creates a structural (redefinition) error.
    pub fn structural(region: Region, message: impl Into<String>) -> Self {
        Error::Structural {
            message: message.into(),
            region,
        }
    }

    /// Creates a type-ambiguity error.
    pub fn ambiguity(region: Region, message: impl Into<String>) -> Self {
        Error::Ambiguity {
            message: message.into(),
            region,
        }
    }

    /// Creates an I/O error for a failing byte stream.
    pub fn io(region: Region, err: &std::io::Error) -> Self {
        Error::Io {
            message: format!("Error reading input: {}", err),
            region,
        }
    }

    /// The class of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Encoding { .. } => ErrorKind::Encoding,
            Error::Lexical { .. } => ErrorKind::Lexical,
            Error::Range { .. } => ErrorKind::Range,
            Error::Structural { .. } => ErrorKind::Structural,
            Error::Ambiguity { .. } => ErrorKind::Ambiguity,
            Error::Io { .. } => ErrorKind::Io,
        }
    }

    /// The human-readable description, without location information.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Error::Encoding { message, .. }
            | Error::Lexical { message, .. }
            | Error::Range { message, .. }
            | Error::Structural { message, .. }
            | Error::Ambiguity { message, .. }
            | Error::Io { message, .. } => message,
        }
    }

    /// The source region the error refers to.
    #[must_use]
    pub fn region(&self) -> &Region {
        match self {
            Error::Encoding { region, .. }
            | Error::Lexical { region, .. }
            | Error::Range { region, .. }
            | Error::Structural { region, .. }
            | Error::Ambiguity { region, .. }
            | Error::Io { region, .. } => region,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Position;
    use std::sync::Arc;

    #[test]
    fn test_display_includes_location() {
        let err = Error::range(
            Region::at(Position::new(2, 7), Some(Arc::from("a.toml"))),
            "Month value out-of-range",
        );
        assert_eq!(err.to_string(), "Month value out-of-range (at a.toml:2:7)");
        assert_eq!(err.kind(), ErrorKind::Range);
        assert_eq!(err.message(), "Month value out-of-range");
    }

    #[test]
    fn test_io_error_message() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "pipe closed");
        let err = Error::io(Region::default(), &io);
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.message().contains("pipe closed"));
    }
}
