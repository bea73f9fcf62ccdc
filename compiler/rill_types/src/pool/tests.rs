use pretty_assertions::assert_eq;

use super::*;
use crate::data::BasicInfo;

#[test]
fn basics_at_fixed_indices() {
    let pool = Pool::new();

    assert_eq!(pool.get(Idx::BOOL), Some(&TypeData::Basic(BasicKind::Bool)));
    assert_eq!(pool.get(Idx::INT), Some(&TypeData::Basic(BasicKind::Int)));
    assert_eq!(pool.get(Idx::STRING), Some(&TypeData::Basic(BasicKind::String)));
    assert_eq!(
        pool.get(Idx::UNSAFE_POINTER),
        Some(&TypeData::Basic(BasicKind::UnsafePointer))
    );
    assert_eq!(pool.len(), Idx::FIRST_DYNAMIC as usize);
    assert_eq!(pool.get(Idx::NONE), None);
}

#[test]
fn basic_info_categories() {
    assert!(BasicKind::Bool.info().contains(BasicInfo::IS_BOOLEAN));
    assert!(BasicKind::Uintptr.info().contains(BasicInfo::IS_UNSIGNED));
    assert!(BasicKind::Int32.info().contains(BasicInfo::IS_INTEGER));
    assert!(!BasicKind::Int32.info().contains(BasicInfo::IS_UNSIGNED));
    assert!(BasicKind::Complex64.info().intersects(BasicInfo::IS_NUMERIC));
    assert!(BasicKind::UnsafePointer.info().is_empty());
}

#[test]
fn structural_types_are_interned() {
    let mut pool = Pool::new();

    let p1 = pool.pointer(Idx::INT);
    let p2 = pool.pointer(Idx::INT);
    assert_eq!(p1, p2);

    let s1 = pool.struct_type(vec![Field::new("a", Idx::INT)]);
    let s2 = pool.struct_type(vec![Field::new("a", Idx::INT)]);
    let s3 = pool.struct_type(vec![Field::new("b", Idx::INT)]);
    assert_eq!(s1, s2);
    assert_ne!(s1, s3);
}

#[test]
fn named_types_are_distinct_and_resolve_late() {
    let mut pool = Pool::new();

    let a = pool.named("main", "T", Pos::NONE);
    let b = pool.named("main", "T", Pos::NONE);
    assert_ne!(a, b);

    // Unresolved: the named type is its own underlying.
    assert_eq!(pool.underlying(a), a);

    let ptr = pool.pointer(a);
    let body = pool.struct_type(vec![Field::new("next", ptr)]);
    pool.set_underlying(a, body);
    assert_eq!(pool.underlying(a), body);

    // A name defined in terms of another name shares its underlying type.
    pool.set_underlying(b, a);
    assert_eq!(pool.underlying(b), body);
}

#[test]
fn set_underlying_ignores_non_named_types() {
    let mut pool = Pool::new();
    let slice = pool.slice(Idx::INT);
    let before = pool.len();

    assert!(!pool.set_underlying(slice, Idx::BOOL));
    assert!(!pool.set_underlying(Idx::INT, Idx::BOOL));
    assert_eq!(pool.len(), before);
    assert_eq!(pool.underlying(slice), slice);
    assert_eq!(pool.get(slice), Some(&TypeData::Slice(Idx::INT)));
}

#[test]
fn chan_of_sees_through_names() {
    let mut pool = Pool::new();
    let ch = pool.chan(Idx::INT, ChanDir::RecvOnly);
    let named = pool.named("main", "Ticks", Pos::NONE);
    pool.set_underlying(named, ch);

    assert_eq!(pool.chan_of(named), Some((Idx::INT, ChanDir::RecvOnly)));
    assert_eq!(pool.chan_of(Idx::INT), None);
}

#[test]
fn type_strings() {
    let mut pool = Pool::new();

    let slice = pool.slice(Idx::INT);
    let map = pool.map(Idx::STRING, slice);
    let arr = pool.array(Idx::UINT8, 4);
    let send = pool.chan(Idx::FLOAT64, ChanDir::SendOnly);
    let recv = pool.chan(Idx::FLOAT64, ChanDir::RecvOnly);
    let node = pool.named("main", "Node", Pos::NONE);
    let node_ptr = pool.pointer(node);
    let strukt = pool.struct_type(vec![Field::new("next", node_ptr), Field::new("v", Idx::INT)]);

    assert_eq!(pool.type_string(map), "map[string][]int");
    assert_eq!(pool.type_string(arr), "[4]uint8");
    assert_eq!(pool.type_string(send), "chan<- float64");
    assert_eq!(pool.type_string(recv), "<-chan float64");
    assert_eq!(pool.type_string(node_ptr), "*main.Node");
    assert_eq!(pool.type_string(strukt), "struct{next *main.Node; v int}");
    assert_eq!(pool.type_string(Idx::UNSAFE_POINTER), "unsafe.Pointer");
}

#[test]
fn signature_strings() {
    let mut pool = Pool::new();

    let error = pool.named("", "error", Pos::NONE);
    let ints = pool.slice(Idx::INT);
    let sig = pool.signature(
        Signature::new(
            vec![Var::new("format", Idx::STRING), Var::new("args", ints)],
            vec![Var::blank(Idx::INT), Var::new("err", error)],
        )
        .with_variadic(true),
    );
    assert_eq!(
        pool.type_string(sig),
        "func(format string, args ...int) (int, err error)"
    );

    let single = pool.signature(Signature::new(vec![], vec![Var::blank(Idx::BOOL)]));
    assert_eq!(pool.type_string(single), "func() bool");
}
