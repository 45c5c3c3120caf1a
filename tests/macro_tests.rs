use serde_json::json;
use toml_doc::{parse, toml_array, toml_table, Array, Node, NodeType, Table};

#[test]
fn test_toml_table_macro_booleans() {
    let table = toml_table!({ "on": true, "off": false });
    assert_eq!(table.get("on").and_then(Node::as_bool), Some(true));
    assert_eq!(table.get("off").and_then(Node::as_bool), Some(false));
}

#[test]
fn test_toml_table_macro_numbers() {
    let table = toml_table!({
        "int": 42,
        "float": 3.5,
        "negative": (-123)
    });
    assert_eq!(table.get("int").map(Node::node_type), Some(NodeType::Integer));
    assert_eq!(table.get("float").and_then(Node::as_float), Some(3.5));
    assert_eq!(table.get("negative").and_then(Node::as_integer), Some(-123));
}

#[test]
fn test_toml_table_macro_strings() {
    let table = toml_table!({ "greeting": "hello world", "empty": "" });
    assert_eq!(table.get("greeting").and_then(Node::as_str), Some("hello world"));
    assert_eq!(table.get("empty").and_then(Node::as_str), Some(""));
}

#[test]
fn test_toml_array_macro() {
    assert_eq!(toml_array!([]), Array::new());

    let array = toml_array!([1, 2, 3]);
    assert_eq!(array.len(), 3);
    assert!(array.is_homogeneous());

    let mixed = toml_array!(["a", 1, true]);
    assert!(!mixed.is_homogeneous());
}

#[test]
fn test_toml_macro_nested_structures() {
    let table = toml_table!({
        "server": {
            "host": "localhost",
            "ports": [8080, 8443]
        },
        "features": ["auth", "tls"],
        "matrix": [[1, 2], [3, 4]]
    });

    assert_eq!(
        serde_json::to_value(&table).unwrap(),
        json!({
            "server": { "host": "localhost", "ports": [8080, 8443] },
            "features": ["auth", "tls"],
            "matrix": [[1, 2], [3, 4]]
        })
    );
    assert_eq!(toml_table!({}), Table::new());
}

#[test]
fn test_toml_macro_matches_parsed_shape() {
    let built = toml_table!({
        "name": "demo",
        "limits": { "cpu": 2, "memory": 512 }
    });
    let parsed = parse("name = 'demo'\nlimits = { cpu = 2, memory = 512 }\n").unwrap();

    // Regions and flags differ, the data does not.
    assert_ne!(built, parsed);
    assert_eq!(
        serde_json::to_value(&built).unwrap(),
        serde_json::to_value(&parsed).unwrap()
    );
}

#[test]
fn test_toml_macro_trailing_commas() {
    let table = toml_table!({ "a": 1, "b": [1, 2,], });
    assert_eq!(table.len(), 2);
    assert_eq!(table.get("b").and_then(Node::as_array).map(Array::len), Some(2));
}
