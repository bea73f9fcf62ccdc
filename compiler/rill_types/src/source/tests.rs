use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

#[test]
fn line_map_offset_to_line_col() {
    let map = LineMap::new("let x = 42\nlet y = 99\nlet z = 0\n");

    assert_eq!(map.offset_to_line_col(0), (1, 1));
    assert_eq!(map.offset_to_line_col(4), (1, 5));
    assert_eq!(map.offset_to_line_col(11), (2, 1));
    assert_eq!(map.offset_to_line_col(15), (2, 5));
    assert_eq!(map.offset_to_line_col(22), (3, 1));
    assert_eq!(map.line_count(), 4);
}

#[test]
fn positions_resolve_to_their_file() {
    let mut fset = FileSet::new();
    let a = fset.add_file("/src/a.go", "package a\nfunc f() {}\n");
    let b = fset.add_file("/src/b.go", "package a\n");

    let p = fset.pos(a, 10);
    assert_eq!(fset.file(p), Some(a));
    assert_eq!(
        fset.position(p),
        Position {
            file: Some(a),
            filename: "/src/a.go".to_string(),
            line: 2,
            column: 1,
        }
    );

    let q = fset.pos(b, 8);
    assert_eq!(fset.file(q), Some(b));
    assert_eq!(fset.line(q), 1);
    assert_eq!(fset.position(q).column, 9);
}

#[test]
fn end_of_file_offset_stays_in_file() {
    let mut fset = FileSet::new();
    let a = fset.add_file("a.go", "xy");
    let b = fset.add_file("b.go", "z");
    assert_eq!(fset.file(fset.pos(a, 2)), Some(a));
    assert_eq!(fset.file(fset.pos(b, 0)), Some(b));
}

#[test]
fn invalid_position_degrades_to_empty() {
    let mut fset = FileSet::new();
    fset.add_file("a.go", "package a\n");

    assert_eq!(fset.file(Pos::NONE), None);
    assert_eq!(fset.position(Pos::NONE), Position::default());
    assert_eq!(fset.position(Pos::from_raw(10_000)).line, 0);
}

#[test]
fn iter_is_registration_order() {
    let mut fset = FileSet::new();
    let a = fset.add_file("a.go", "");
    let b = fset.add_file("b.go", "");
    assert_eq!(fset.iter().collect::<Vec<_>>(), vec![a, b]);
    assert_eq!(fset.name(b), "b.go");
}

proptest! {
    #[test]
    fn every_offset_maps_to_a_line(lines in proptest::collection::vec("[a-z ]{0,12}", 1..8)) {
        let source = lines.join("\n");
        let map = LineMap::new(&source);
        for offset in 0..=source.len() as u32 {
            let (line, col) = map.offset_to_line_col(offset);
            prop_assert!(line >= 1 && line as usize <= map.line_count());
            prop_assert!(col >= 1);
        }
    }
}
