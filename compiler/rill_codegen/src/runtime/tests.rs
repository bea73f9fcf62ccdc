use pretty_assertions::assert_eq;
use rill_types::StdSizes;

use super::*;
use crate::ir::IrModule;

#[test]
fn runtime_functions_declared() {
    let mut module = IrModule::new("test_runtime");
    let sizes = StdSizes::LP64;
    let mut builder = IrBuilder::new(&mut module, &sizes);

    declare_runtime(&mut builder);

    let expected = [
        "rill_chan_alloc",
        "rill_chan_send",
        "rill_chan_recv",
        "rill_chan_recv_ok",
        "rill_chan_close",
        "rill_select_new",
        "rill_select_default",
        "rill_select_send",
        "rill_select_recv",
        "rill_select_commit",
    ];
    for name in &expected {
        let id = module
            .function_by_name(name)
            .unwrap_or_else(|| panic!("runtime function '{name}' should be declared"));
        assert!(module.function(id).is_declaration());
    }
}

#[test]
fn declaring_twice_is_idempotent() {
    let mut module = IrModule::new("twice");
    let sizes = StdSizes::LP64;
    let mut builder = IrBuilder::new(&mut module, &sizes);

    declare_runtime(&mut builder);
    declare_runtime(&mut builder);

    assert_eq!(module.functions().count(), RuntimeFn::ALL.len());
}

#[test]
fn size_parameter_is_word_sized() {
    let mut module = IrModule::new("ilp32");
    let sizes = StdSizes::ILP32;
    let mut builder = IrBuilder::new(&mut module, &sizes);

    declare_runtime(&mut builder);

    let alloc = module.function(module.function_by_name("rill_chan_alloc").unwrap());
    assert_eq!(alloc.params, vec![IrType::Ptr, IrType::Int(32)]);
    assert_eq!(alloc.ret, IrType::Ptr);

    let commit = module.function(module.function_by_name("rill_select_commit").unwrap());
    assert_eq!(commit.ret, IrType::I32);
}
