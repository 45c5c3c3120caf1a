//! The document tree node types.
//!
//! This module provides [`Node`], a closed sum type over every kind of node a
//! TOML document can contain, and [`Value`], the leaf wrapper that pairs a
//! scalar with its source [`Region`].
//!
//! ## Core Types
//!
//! - [`Node`]: table, array, table array, or one of the seven scalar kinds
//! - [`Value<T>`]: an immutable scalar plus its region
//! - [`NodeType`]: the kind of a node, used in diagnostics
//!
//! ## Usage Patterns
//!
//! ### Inspecting parsed values
//!
//! ```rust
//! use toml_doc::{parse, NodeType};
//!
//! let root = parse("title = \"TOML\"\nports = [8000, 8001]\n").unwrap();
//!
//! let title = root.get("title").unwrap();
//! assert_eq!(title.node_type(), NodeType::String);
//! assert_eq!(title.as_str(), Some("TOML"));
//!
//! let ports = root.get("ports").unwrap();
//! assert_eq!(ports.get_index(1).and_then(|n| n.as_integer()), Some(8001));
//! ```
//!
//! ### Building values in memory
//!
//! ```rust
//! use toml_doc::Node;
//!
//! let node = Node::from(42);
//! assert!(node.is_integer());
//! assert_eq!(node.region().source_path, None);
//! ```

use crate::array::{Array, TableArray};
use crate::datetime::{Date, DateTime, Time};
use crate::region::Region;
use crate::table::Table;
use serde::{Serialize, Serializer};
use std::fmt;

/// The kind of a [`Node`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeType {
    Table,
    Array,
    TableArray,
    String,
    Integer,
    Float,
    Boolean,
    Date,
    Time,
    DateTime,
}

impl NodeType {
    /// Returns `true` for the seven scalar kinds.
    #[inline]
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(self, NodeType::Table | NodeType::Array | NodeType::TableArray)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NodeType::Table => "table",
            NodeType::Array => "array",
            NodeType::TableArray => "table array",
            NodeType::String => "string",
            NodeType::Integer => "integer",
            NodeType::Float => "floating-point",
            NodeType::Boolean => "boolean",
            NodeType::Date => "date",
            NodeType::Time => "time",
            NodeType::DateTime => "date-time",
        })
    }
}

/// A scalar value and the region it was parsed from.
///
/// The wrapped value is fixed at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct Value<T> {
    value: T,
    region: Region,
}

impl<T> Value<T> {
    /// Wraps a value with the default (in-memory) region.
    pub fn new(value: T) -> Self {
        Value {
            value,
            region: Region::default(),
        }
    }

    pub(crate) fn with_region(value: T, region: Region) -> Self {
        Value { value, region }
    }

    #[inline]
    pub fn get(&self) -> &T {
        &self.value
    }

    #[inline]
    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: Serialize> Serialize for Value<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.value.serialize(serializer)
    }
}

/// Any node of a TOML document tree.
///
/// A node's variant never changes after construction; containers own their
/// children exclusively.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Table(Table),
    Array(Array),
    TableArray(TableArray),
    String(Value<String>),
    Integer(Value<i64>),
    Float(Value<f64>),
    Boolean(Value<bool>),
    Date(Value<Date>),
    Time(Value<Time>),
    DateTime(Value<DateTime>),
}

impl Node {
    #[must_use]
    pub const fn node_type(&self) -> NodeType {
        match self {
            Node::Table(_) => NodeType::Table,
            Node::Array(_) => NodeType::Array,
            Node::TableArray(_) => NodeType::TableArray,
            Node::String(_) => NodeType::String,
            Node::Integer(_) => NodeType::Integer,
            Node::Float(_) => NodeType::Float,
            Node::Boolean(_) => NodeType::Boolean,
            Node::Date(_) => NodeType::Date,
            Node::Time(_) => NodeType::Time,
            Node::DateTime(_) => NodeType::DateTime,
        }
    }

    /// The source region of this node.
    #[must_use]
    pub fn region(&self) -> &Region {
        match self {
            Node::Table(t) => t.region(),
            Node::Array(a) => a.region(),
            Node::TableArray(a) => a.region(),
            Node::String(v) => v.region(),
            Node::Integer(v) => v.region(),
            Node::Float(v) => v.region(),
            Node::Boolean(v) => v.region(),
            Node::Date(v) => v.region(),
            Node::Time(v) => v.region(),
            Node::DateTime(v) => v.region(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_table(&self) -> bool {
        matches!(self, Node::Table(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Node::Array(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_table_array(&self) -> bool {
        matches!(self, Node::TableArray(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Node::String(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Node::Integer(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Node::Float(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Node::Boolean(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_date(&self) -> bool {
        matches!(self, Node::Date(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_time(&self) -> bool {
        matches!(self, Node::Time(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_datetime(&self) -> bool {
        matches!(self, Node::DateTime(_))
    }

    /// Returns `true` for the seven scalar kinds.
    #[inline]
    #[must_use]
    pub const fn is_value(&self) -> bool {
        self.node_type().is_scalar()
    }

    #[must_use]
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Node::Table(t) => Some(t),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_table_mut(&mut self) -> Option<&mut Table> {
        match self {
            Node::Table(t) => Some(t),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Node::Array(a) => Some(a),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_table_array(&self) -> Option<&TableArray> {
        match self {
            Node::TableArray(a) => Some(a),
            _ => None,
        }
    }

    /// If the node is a string, returns it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use toml_doc::Node;
    ///
    /// assert_eq!(Node::from("hello").as_str(), Some("hello"));
    /// assert_eq!(Node::from(42).as_str(), None);
    /// ```
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(v) => Some(v.get()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Node::Integer(v) => Some(*v.get()),
            _ => None,
        }
    }

    /// If the node is a float, returns it. Integers are not widened.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Node::Float(v) => Some(*v.get()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Boolean(v) => Some(*v.get()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_date(&self) -> Option<Date> {
        match self {
            Node::Date(v) => Some(*v.get()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_time(&self) -> Option<Time> {
        match self {
            Node::Time(v) => Some(*v.get()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_datetime(&self) -> Option<DateTime> {
        match self {
            Node::DateTime(v) => Some(*v.get()),
            _ => None,
        }
    }

    /// Looks up a child by key. Only tables have keyed children.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_table().and_then(|t| t.get(key))
    }

    /// Looks up an array element by index.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&Node> {
        self.as_array().and_then(|a| a.get(index))
    }
}

impl Serialize for Node {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Node::Table(t) => t.serialize(serializer),
            Node::Array(a) => a.serialize(serializer),
            Node::TableArray(a) => a.serialize(serializer),
            Node::String(v) => v.serialize(serializer),
            Node::Integer(v) => v.serialize(serializer),
            Node::Float(v) => v.serialize(serializer),
            Node::Boolean(v) => v.serialize(serializer),
            Node::Date(v) => v.serialize(serializer),
            Node::Time(v) => v.serialize(serializer),
            Node::DateTime(v) => v.serialize(serializer),
        }
    }
}

macro_rules! node_from_scalar {
    ($($variant:ident: $ty:ty => |$v:ident| $conv:expr),* $(,)?) => {
        $(
            impl From<$ty> for Node {
                fn from($v: $ty) -> Self {
                    Node::$variant(Value::new($conv))
                }
            }
        )*
    };
}

node_from_scalar! {
    String: String => |v| v,
    String: &str => |v| v.to_string(),
    Integer: i64 => |v| v,
    Integer: i32 => |v| i64::from(v),
    Integer: u32 => |v| i64::from(v),
    Float: f64 => |v| v,
    Float: f32 => |v| f64::from(v),
    Boolean: bool => |v| v,
    Date: Date => |v| v,
    Time: Time => |v| v,
    DateTime: DateTime => |v| v,
}

impl From<Table> for Node {
    fn from(value: Table) -> Self {
        Node::Table(value)
    }
}

impl From<Array> for Node {
    fn from(value: Array) -> Self {
        Node::Array(value)
    }
}

impl From<TableArray> for Node {
    fn from(value: TableArray) -> Self {
        Node::TableArray(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_type_names() {
        assert_eq!(NodeType::TableArray.to_string(), "table array");
        assert_eq!(NodeType::Float.to_string(), "floating-point");
        assert_eq!(NodeType::DateTime.to_string(), "date-time");
        assert!(NodeType::Boolean.is_scalar());
        assert!(!NodeType::TableArray.is_scalar());
    }

    #[test]
    fn test_from_primitives() {
        assert_eq!(Node::from(true).as_bool(), Some(true));
        assert_eq!(Node::from(42i32).as_integer(), Some(42));
        assert_eq!(Node::from(42i64).as_integer(), Some(42));
        assert_eq!(Node::from(3.5f64).as_float(), Some(3.5));
        assert_eq!(Node::from("test").as_str(), Some("test"));
        assert_eq!(Node::from("test".to_string()).node_type(), NodeType::String);
    }

    #[test]
    fn test_accessors_do_not_coerce() {
        let node = Node::from(1);
        assert!(node.is_integer());
        assert!(node.is_value());
        assert_eq!(node.as_float(), None);
        assert_eq!(node.as_str(), None);
        assert!(node.get("x").is_none());
        assert!(node.get_index(0).is_none());
    }

    #[test]
    fn test_value_wrapper() {
        let value = Value::new(String::from("x"));
        assert_eq!(value.get(), "x");
        assert_eq!(value.region(), &Region::default());
        assert_eq!(value.into_inner(), "x");
    }

    #[test]
    fn test_serialize_scalars() {
        let node = Node::from(Date::new(2020, 2, 29).unwrap());
        assert_eq!(serde_json::to_value(&node).unwrap(), serde_json::json!("2020-02-29"));
        let node = Node::from(7);
        assert_eq!(serde_json::to_value(&node).unwrap(), serde_json::json!(7));
    }
}
