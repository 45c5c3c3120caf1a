//! Source positions and document regions.
//!
//! Every node produced by the parser carries a [`Region`] describing where it
//! came from. Positions are 1-based `(line, column)` pairs counted in decoded
//! codepoints, not bytes. Nodes built in memory carry the default region
//! `(0, 0)..(0, 0)` with no source path.
//!
//! ```rust
//! use toml_doc::{parse_with_options, ParseOptions, Position};
//!
//! let root = parse_with_options("name = \"demo\"\n", ParseOptions::new().with_source_path("app.toml")).unwrap();
//! let region = root.get("name").unwrap().region();
//! assert_eq!(region.begin, Position::new(1, 8));
//! assert_eq!(region.end, Position::new(1, 14));
//! assert_eq!(region.source_path.as_deref(), Some("app.toml"));
//! ```

use std::fmt;
use std::sync::Arc;

/// A 1-based line/column location in a document.
///
/// Ordering compares the line first, then the column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    /// The position of the first character of a document.
    pub const START: Position = Position { line: 1, column: 1 };

    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }

    /// The position one column to the right.
    #[inline]
    #[must_use]
    pub(crate) const fn next_column(self) -> Self {
        Position {
            line: self.line,
            column: self.column + 1,
        }
    }

    /// The first column of the following line.
    #[inline]
    #[must_use]
    pub(crate) const fn next_line(self) -> Self {
        Position {
            line: self.line + 1,
            column: 1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The span of source text a node (or an error) refers to.
///
/// `end` is exclusive: it is the position of the first character after the
/// node, or one past the last character when the node runs to end of input.
/// The source path is shared between all regions of one parse.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Region {
    pub begin: Position,
    pub end: Position,
    pub source_path: Option<Arc<str>>,
}

impl Region {
    #[must_use]
    pub fn new(begin: Position, end: Position, source_path: Option<Arc<str>>) -> Self {
        Region {
            begin,
            end,
            source_path,
        }
    }

    /// A zero-width region at `position`.
    #[must_use]
    pub fn at(position: Position, source_path: Option<Arc<str>>) -> Self {
        Region::new(position, position, source_path)
    }

    /// Returns `true` if `position` lies inside `begin..end`.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        self.begin <= position && position < self.end
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source_path {
            Some(path) => write!(f, "{}:{}", path, self.begin),
            None => write!(f, "line {}, column {}", self.begin.line, self.begin.column),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering() {
        assert!(Position::new(1, 9) < Position::new(2, 1));
        assert!(Position::new(3, 2) > Position::new(3, 1));
        assert_eq!(Position::START.next_column(), Position::new(1, 2));
        assert_eq!(Position::new(4, 7).next_line(), Position::new(5, 1));
    }

    #[test]
    fn test_region_display() {
        let region = Region::at(Position::new(3, 5), None);
        assert_eq!(region.to_string(), "line 3, column 5");

        let region = Region::at(Position::new(3, 5), Some(Arc::from("conf.toml")));
        assert_eq!(region.to_string(), "conf.toml:3:5");
    }

    #[test]
    fn test_region_contains_is_half_open() {
        let region = Region::new(Position::new(1, 1), Position::new(1, 4), None);
        assert!(region.contains(Position::new(1, 3)));
        assert!(!region.contains(Position::new(1, 4)));
    }
}
