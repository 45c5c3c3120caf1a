//! Ordered key/node tables.
//!
//! This module provides [`Table`], the keyed container of a TOML document. The
//! document root is a table; so is every `[header]` section and every
//! `{ inline }` table.
//!
//! ## Why IndexMap?
//!
//! Keys iterate in the order they were declared, so consumers (and formatters)
//! see the document as it was written.
//!
//! ## Examples
//!
//! ```rust
//! use toml_doc::{Node, Table};
//!
//! let mut table = Table::new();
//! table.insert("name", Node::from("Alice")).unwrap();
//! table.insert("age", Node::from(30)).unwrap();
//!
//! // Keys are never overwritten.
//! assert!(table.insert("age", Node::from(31)).is_err());
//!
//! assert_eq!(table.len(), 2);
//! assert_eq!(table.get("age").and_then(|n| n.as_integer()), Some(30));
//! ```

use crate::region::Region;
use crate::value::Node;
use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// An ordered mapping from unique keys to owned child nodes.
///
/// Two flags record how the table came to exist:
///
/// - *inline*: declared with `{ }` syntax (or synthesized by a dotted key);
///   such tables cannot be extended by a later `[header]`.
/// - *implicit*: synthesized as an intermediate segment of a header path such
///   as `a` in `[a.b]`; cleared when the table's own header is declared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub(crate) entries: IndexMap<String, Node>,
    pub(crate) region: Region,
    pub(crate) inline: bool,
    pub(crate) implicit: bool,
    pub(crate) dotted: bool,
}

impl Table {
    /// Creates an empty, explicit, non-inline table.
    #[must_use]
    pub fn new() -> Self {
        Table::default()
    }

    pub(crate) fn with_region(region: Region) -> Self {
        Table {
            region,
            ..Table::default()
        }
    }

    /// Creates the intermediate table of a dotted key such as `a` in `a.b = 1`.
    pub(crate) fn dotted(region: Region) -> Self {
        Table {
            region,
            inline: true,
            dotted: true,
            ..Table::default()
        }
    }

    /// Creates the intermediate table of a header path such as `a` in `[a.b]`.
    pub(crate) fn implicit(region: Region) -> Self {
        Table {
            region,
            implicit: true,
            ..Table::default()
        }
    }

    /// Inserts `value` under `key` if the key is not yet present.
    ///
    /// On success returns the inserted node. If the key already exists the
    /// table is left untouched and the rejected node is handed back.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use toml_doc::{Node, Table};
    ///
    /// let mut table = Table::new();
    /// assert!(table.insert("key", Node::from(42)).is_ok());
    ///
    /// let rejected = table.insert("key", Node::from("other")).unwrap_err();
    /// assert_eq!(rejected.as_str(), Some("other"));
    /// ```
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: Node,
    ) -> std::result::Result<&mut Node, Node> {
        match self.entries.entry(key.into()) {
            Entry::Occupied(_) => Err(value),
            Entry::Vacant(slot) => Ok(slot.insert(value)),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.entries.get_mut(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if the table was declared with `{ }` syntax or
    /// synthesized by a dotted key.
    #[must_use]
    pub fn is_inline(&self) -> bool {
        self.inline
    }

    /// Returns `true` while the table exists only as a header path segment.
    #[must_use]
    pub fn is_implicit(&self) -> bool {
        self.implicit
    }

    #[must_use]
    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Returns an iterator over the keys, in declaration order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Node> {
        self.entries.keys()
    }

    /// Returns an iterator over the child nodes, in declaration order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, Node> {
        self.entries.values()
    }

    /// Returns an iterator over the key/node pairs, in declaration order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Node> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = (&'a String, &'a Node);
    type IntoIter = indexmap::map::Iter<'a, String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for Table {
    type Item = (String, Node);
    type IntoIter = indexmap::map::IntoIter<String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for Table {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, node) in &self.entries {
            map.serialize_entry(key, node)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_is_preserved() {
        let mut table = Table::new();
        for key in ["zeta", "alpha", "mid"] {
            table.insert(key, Node::from(1)).unwrap();
        }
        let keys: Vec<_> = table.keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_duplicate_insert_is_rejected() {
        let mut table = Table::new();
        table.insert("a", Node::from(1)).unwrap();
        let rejected = table.insert("a", Node::from(true)).unwrap_err();
        assert_eq!(rejected.as_bool(), Some(true));
        assert_eq!(table.get("a").and_then(Node::as_integer), Some(1));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_flags() {
        let table = Table::new();
        assert!(!table.is_inline());
        assert!(!table.is_implicit());

        let dotted = Table::dotted(Region::default());
        assert!(dotted.is_inline());
        assert!(dotted.dotted);

        let implicit = Table::implicit(Region::default());
        assert!(implicit.is_implicit());
        assert!(!implicit.is_inline());
    }

    #[test]
    fn test_serialize_as_map() {
        let mut table = Table::new();
        table.insert("b", Node::from(2)).unwrap();
        table.insert("a", Node::from("x")).unwrap();
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"{"b":2,"a":"x"}"#);
    }
}
