use pretty_assertions::assert_eq;

use super::*;
use crate::data::{ChanDir, Field};
use crate::source::Pos;

#[test]
fn basic_sizes_follow_word_size() {
    let pool = Pool::new();
    let s64 = StdSizes::LP64;
    let s32 = StdSizes::ILP32;

    assert_eq!(s64.size_of(&pool, Idx::INT), 8);
    assert_eq!(s32.size_of(&pool, Idx::INT), 4);
    assert_eq!(s64.size_of(&pool, Idx::INT16), 2);
    assert_eq!(s64.size_of(&pool, Idx::STRING), 16);
    assert_eq!(s64.size_of(&pool, Idx::COMPLEX128), 16);
    assert_eq!(s64.align_of(&pool, Idx::COMPLEX128), 8);
    assert_eq!(s32.align_of(&pool, Idx::FLOAT64), 4);
}

#[test]
fn struct_offsets_respect_alignment() {
    let mut pool = Pool::new();
    let sizes = StdSizes::LP64;

    let offsets = sizes.offsets_of(&pool, &[Idx::BOOL, Idx::INT64, Idx::UINT8, Idx::INT32]);
    assert_eq!(offsets, vec![0, 8, 16, 20]);

    let s = pool.struct_type(vec![
        Field::new("a", Idx::BOOL),
        Field::new("b", Idx::INT64),
        Field::new("c", Idx::UINT8),
    ]);
    assert_eq!(sizes.size_of(&pool, s), 24);
    assert_eq!(sizes.align_of(&pool, s), 8);
}

#[test]
fn reference_types_are_word_sized() {
    let mut pool = Pool::new();
    let sizes = StdSizes::LP64;

    let ptr = pool.pointer(Idx::INT);
    let map = pool.map(Idx::STRING, Idx::INT);
    let ch = pool.chan(Idx::INT, ChanDir::Both);
    let slice = pool.slice(Idx::INT);
    let iface = pool.interface(vec![]);

    assert_eq!(sizes.size_of(&pool, ptr), 8);
    assert_eq!(sizes.size_of(&pool, map), 8);
    assert_eq!(sizes.size_of(&pool, ch), 8);
    assert_eq!(sizes.size_of(&pool, slice), 24);
    assert_eq!(sizes.size_of(&pool, iface), 16);
}

#[test]
fn arrays_and_named_types() {
    let mut pool = Pool::new();
    let sizes = StdSizes::LP64;

    let arr = pool.array(Idx::INT32, 5);
    assert_eq!(sizes.size_of(&pool, arr), 20);
    assert_eq!(sizes.align_of(&pool, arr), 4);

    let named = pool.named("main", "Buf", Pos::NONE);
    pool.set_underlying(named, arr);
    assert_eq!(sizes.size_of(&pool, named), 20);

    let empty = pool.struct_type(vec![]);
    assert_eq!(sizes.size_of(&pool, empty), 0);
    assert_eq!(sizes.align_of(&pool, empty), 1);
}

#[test]
fn target_selection() {
    assert_eq!(StdSizes::for_target("x86_64-unknown-linux-gnu"), StdSizes::LP64);
    assert_eq!(StdSizes::for_target("aarch64-apple-darwin"), StdSizes::LP64);
    assert_eq!(StdSizes::for_target("i686-pc-windows-msvc"), StdSizes::ILP32);
    assert_eq!(StdSizes::for_target("armv7-unknown-linux-gnueabihf"), StdSizes::ILP32);
    assert_eq!(StdSizes::for_target("wasm32-unknown-unknown"), StdSizes::ILP32);
}
