use toml_doc::{parse, parse_with_options, Node, ParseOptions, Position, Region, Table};

fn region_of<'a>(root: &'a Table, path: &[&str]) -> &'a Region {
    let mut node = root.get(path[0]).unwrap();
    for key in &path[1..] {
        node = node.get(key).unwrap();
    }
    node.region()
}

fn span(region: &Region) -> ((u32, u32), (u32, u32)) {
    (
        (region.begin.line, region.begin.column),
        (region.end.line, region.end.column),
    )
}

#[test]
fn test_scalar_regions_are_half_open() {
    let root = parse("a = 1\nbb = \"str\"\nc = 1979-05-27 # date\nd = 3.5").unwrap();
    assert_eq!(span(region_of(&root, &["a"])), ((1, 5), (1, 6)));
    assert_eq!(span(region_of(&root, &["bb"])), ((2, 6), (2, 11)));
    assert_eq!(span(region_of(&root, &["c"])), ((3, 5), (3, 15)));
    // Runs to end of input.
    assert_eq!(span(region_of(&root, &["d"])), ((4, 5), (4, 8)));
}

#[test]
fn test_container_regions() {
    let root = parse("arr = [\n  1,\n  2,\n]\nt = { x = 1 }\n").unwrap();
    assert_eq!(span(region_of(&root, &["arr"])), ((1, 7), (4, 2)));
    assert_eq!(span(region_of(&root, &["t"])), ((5, 5), (5, 14)));
    assert_eq!(span(region_of(&root, &["t", "x"])), ((5, 11), (5, 12)));
}

#[test]
fn test_header_regions() {
    let root = parse("[server]\nport = 80\n\n[[hosts]]\nname = 'a'\n").unwrap();
    assert_eq!(span(region_of(&root, &["server"])), ((1, 1), (1, 9)));
    assert_eq!(span(region_of(&root, &["hosts"])), ((4, 1), (4, 10)));
}

#[test]
fn test_root_region_spans_document() {
    let root = parse("a = 1\nb = 2\n").unwrap();
    assert_eq!(root.region().begin, Position::START);
    assert_eq!(root.region().end, Position::new(3, 1));

    let root = parse("a = 'é'").unwrap();
    assert_eq!(root.region().end, Position::new(1, 8));
}

#[test]
fn test_dotted_table_region_widens() {
    let root = parse("a.b = 1\na.c = 22\n").unwrap();
    let a = region_of(&root, &["a"]);
    assert_eq!(a.begin, Position::new(1, 7));
    assert_eq!(a.end, Position::new(2, 9));
}

#[test]
fn test_error_positions() {
    let err = parse("a = 1\nb = 0x\n").unwrap_err();
    assert_eq!(err.region().begin, Position::new(2, 7));

    let err = parse("a = \"open").unwrap_err();
    assert_eq!(err.region().begin, Position::new(1, 9));

    let err = parse("a = 1\n[a]\n").unwrap_err();
    assert_eq!(err.region().begin, Position::new(2, 1));
    assert_eq!(err.to_string(), "Attempt to redefine existing integer 'a' as table (at line 2, column 1)");
}

#[test]
fn test_source_path_in_diagnostics() {
    let options = ParseOptions::new().with_source_path("conf/app.toml");
    // At end of input errors point at the last character read.
    let err = parse_with_options("x = [1,\n", options).unwrap_err();
    assert_eq!(err.region().source_path.as_deref(), Some("conf/app.toml"));
    assert_eq!(err.to_string(), "Encountered EOF while parsing array (at conf/app.toml:1:8)");
}

fn check_regions(node: &Node, bounds: &Region) {
    let region = node.region();
    assert!(region.begin <= region.end, "{:?}", region);
    assert!(bounds.begin <= region.begin && region.end <= bounds.end, "{:?} outside {:?}", region, bounds);
    match node {
        Node::Table(table) => table.values().for_each(|child| check_regions(child, bounds)),
        Node::Array(array) => array.iter().for_each(|child| check_regions(child, bounds)),
        Node::TableArray(tables) => tables
            .iter()
            .flat_map(Table::values)
            .for_each(|child| check_regions(child, bounds)),
        _ => {}
    }
}

#[test]
fn test_every_region_lies_within_the_document() {
    let doc = "title = 'x'\n[a.b]\nc = [[1], [2, 3]]\nh = [{ d = 4 }]\n[[e]]\nf.g = 1979-05-27T07:32:00Z\n";
    let root = parse(doc).unwrap();
    for node in root.values() {
        check_regions(node, root.region());
    }
}

#[test]
fn test_parsing_is_deterministic() {
    let doc = "a = 1\n[b]\nc = { d = [1.5, 2.5], s = ['x'] }\n[[e]]\n";
    assert_eq!(parse(doc).unwrap(), parse(doc).unwrap());
}
