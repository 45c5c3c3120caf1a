//! Macros for building document trees in memory.
//!
//! [`toml_table!`] and [`toml_array!`] use a JSON-like syntax. Nested `{ }`
//! and `[ ]` become tables and arrays; anything else is converted with
//! `Node::from`. Nodes built this way carry the default region.
//!
//! Duplicate keys keep the first value, matching [`Table::insert`](crate::Table::insert).

/// Builds a [`Node`](crate::Node) from a single token tree.
#[doc(hidden)]
#[macro_export]
macro_rules! toml_node {
    ({ $($body:tt)* }) => {
        $crate::Node::Table($crate::toml_table!({ $($body)* }))
    };

    ([ $($body:tt)* ]) => {
        $crate::Node::Array($crate::toml_array!([ $($body)* ]))
    };

    ($value:expr) => {
        $crate::Node::from($value)
    };
}

/// Builds a [`Table`](crate::Table).
///
/// ```rust
/// use toml_doc::toml_table;
///
/// let server = toml_table!({
///     "host": "localhost",
///     "port": 8080,
///     "tls": { "enabled": false }
/// });
/// assert_eq!(server.get("port").and_then(|n| n.as_integer()), Some(8080));
/// assert!(server.get("tls").map_or(false, |n| n.is_table()));
/// ```
#[macro_export]
macro_rules! toml_table {
    ({}) => {
        $crate::Table::new()
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut table = $crate::Table::new();
        $(
            let _ = table.insert($key, $crate::toml_node!($value));
        )*
        table
    }};
}

/// Builds an [`Array`](crate::Array).
///
/// ```rust
/// use toml_doc::toml_array;
///
/// let matrix = toml_array!([[1, 2], [3, 4]]);
/// assert_eq!(matrix.len(), 2);
/// assert!(matrix.is_homogeneous());
/// ```
#[macro_export]
macro_rules! toml_array {
    ([]) => {
        $crate::Array::new()
    };

    ([ $($elem:tt),* $(,)? ]) => {{
        let mut array = $crate::Array::new();
        $(
            array.push($crate::toml_node!($elem));
        )*
        array
    }};
}

#[cfg(test)]
mod tests {
    use crate::{Array, Node, NodeType, Table};

    #[test]
    fn test_toml_table_macro_scalars() {
        let table = toml_table!({
            "flag": true,
            "count": 42,
            "ratio": 3.5,
            "name": "hello"
        });
        assert_eq!(table.get("flag").map(Node::node_type), Some(NodeType::Boolean));
        assert_eq!(table.get("count").and_then(Node::as_integer), Some(42));
        assert_eq!(table.get("ratio").and_then(Node::as_float), Some(3.5));
        assert_eq!(table.get("name").and_then(Node::as_str), Some("hello"));
    }

    #[test]
    fn test_toml_macro_empty() {
        assert_eq!(toml_table!({}), Table::new());
        assert_eq!(toml_array!([]), Array::new());
    }

    #[test]
    fn test_toml_macro_nesting() {
        let table = toml_table!({
            "outer": { "inner": [1, 2, 3] }
        });
        let inner = table
            .get("outer")
            .and_then(|n| n.get("inner"))
            .and_then(Node::as_array)
            .unwrap();
        assert_eq!(inner.len(), 3);
        assert_eq!(inner.get(2).and_then(Node::as_integer), Some(3));
    }

    #[test]
    fn test_duplicate_keys_keep_first() {
        let table = toml_table!({ "a": 1, "a": 2 });
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("a").and_then(Node::as_integer), Some(1));
    }
}
