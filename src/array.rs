//! Sequence containers: [`Array`] and [`TableArray`].
//!
//! An `Array` is the `[ ... ]` literal and may hold any node kind. A
//! `TableArray` is built by repeated `[[header]]` sections and holds only
//! tables; the most recently appended table receives subsequent key/value
//! pairs.

use crate::region::Region;
use crate::table::Table;
use crate::value::Node;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

/// An ordered sequence of owned nodes.
///
/// # Examples
///
/// ```rust
/// use toml_doc::{parse, STRICT};
///
/// let root = parse("nums = [1, 2, 3]\n").unwrap();
/// let nums = root.get("nums").and_then(|n| n.as_array()).unwrap();
/// assert_eq!(nums.len(), 3);
/// assert!(nums.is_homogeneous());
///
/// // Mixed element types are rejected under the `strict` feature.
/// assert_eq!(parse("mixed = [1, 2.5]\n").is_err(), STRICT);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Array {
    pub(crate) values: Vec<Node>,
    pub(crate) region: Region,
}

impl Array {
    #[must_use]
    pub fn new() -> Self {
        Array::default()
    }

    pub fn push(&mut self, node: impl Into<Node>) {
        self.values.push(node.into());
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Node> {
        self.values.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns `true` if every element has the same [`NodeType`](crate::NodeType).
    /// An empty array is homogeneous.
    #[must_use]
    pub fn is_homogeneous(&self) -> bool {
        match self.values.split_first() {
            Some((first, rest)) => rest.iter().all(|n| n.node_type() == first.node_type()),
            None => true,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.values.iter()
    }

    #[must_use]
    pub fn region(&self) -> &Region {
        &self.region
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl FromIterator<Node> for Array {
    fn from_iter<T: IntoIterator<Item = Node>>(iter: T) -> Self {
        Array {
            values: iter.into_iter().collect(),
            region: Region::default(),
        }
    }
}

impl Serialize for Array {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.values.len()))?;
        for node in &self.values {
            seq.serialize_element(node)?;
        }
        seq.end()
    }
}

/// The tables declared by repeated `[[header]]` sections.
///
/// Appending is the only way it grows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableArray {
    pub(crate) tables: Vec<Table>,
    pub(crate) region: Region,
}

impl TableArray {
    #[must_use]
    pub fn new() -> Self {
        TableArray::default()
    }

    pub(crate) fn with_region(region: Region) -> Self {
        TableArray {
            tables: Vec::new(),
            region,
        }
    }

    /// Appends a table and returns it.
    pub fn push(&mut self, table: Table) -> &mut Table {
        self.tables.push(table);
        let last = self.tables.len() - 1;
        &mut self.tables[last]
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Table> {
        self.tables.get(index)
    }

    /// The most recently appended table.
    #[must_use]
    pub fn last(&self) -> Option<&Table> {
        self.tables.last()
    }

    pub(crate) fn last_mut(&mut self) -> Option<&mut Table> {
        self.tables.last_mut()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Table> {
        self.tables.iter()
    }

    #[must_use]
    pub fn region(&self) -> &Region {
        &self.region
    }
}

impl<'a> IntoIterator for &'a TableArray {
    type Item = &'a Table;
    type IntoIter = std::slice::Iter<'a, Table>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.iter()
    }
}

impl Serialize for TableArray {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.tables.len()))?;
        for table in &self.tables {
            seq.serialize_element(table)?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_homogeneity() {
        let mut array = Array::new();
        assert!(array.is_homogeneous());
        array.push(1);
        array.push(2);
        assert!(array.is_homogeneous());
        array.push("three");
        assert!(!array.is_homogeneous());
        assert_eq!(array.len(), 3);
    }

    #[test]
    fn test_nested_arrays_count_as_one_type() {
        let inner_ints: Array = vec![Node::from(1)].into_iter().collect();
        let inner_strs: Array = vec![Node::from("a")].into_iter().collect();
        let outer: Array = vec![Node::from(inner_ints), Node::from(inner_strs)]
            .into_iter()
            .collect();
        assert!(outer.is_homogeneous());
    }

    #[test]
    fn test_table_array_last() {
        let mut tables = TableArray::new();
        assert!(tables.last().is_none());
        tables.push(Table::new());
        let second = tables.push(Table::new());
        second.insert("k", Node::from(1)).unwrap();
        assert_eq!(tables.len(), 2);
        assert!(tables.last().map_or(false, |t| t.contains_key("k")));
        assert!(tables.get(0).map_or(false, Table::is_empty));
    }

    #[test]
    fn test_serialize_as_sequences() {
        let array: Array = vec![Node::from(1), Node::from(true)].into_iter().collect();
        assert_eq!(serde_json::to_string(&array).unwrap(), "[1,true]");

        let mut tables = TableArray::new();
        tables.push(Table::new());
        assert_eq!(serde_json::to_string(&tables).unwrap(), "[{}]");
    }
}
