//! End-to-end lowering of a function that uses channels, with full debug info.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]

use pretty_assertions::assert_eq;
use rill_codegen::chan::{self, SelectCase, TypedValue};
use rill_codegen::debug::{DebugInfoBuilder, DebugInfoConfig, MetaNode};
use rill_codegen::ir::{BlockId, InstKind, IrBuilder, IrModule, IrType};
use rill_codegen::runtime::{declare_runtime, RuntimeFn};
use rill_types::{ChanDir, FileSet, Idx, Pool, Signature, StdSizes, Var};

const SRC: &str = "package main

func worker(jobs chan int, done chan<- bool) {
	j, ok := <-jobs
	select {
	case done <- ok:
	case j = <-jobs:
	default:
	}
}
";

#[allow(clippy::cast_possible_truncation)]
fn offset(needle: &str) -> u32 {
    SRC.find(needle).unwrap() as u32
}

#[test]
fn worker_lowers_with_debug_info() {
    rill_codegen::init_tracing();

    let mut fset = FileSet::new();
    let file = fset.add_file("/work/src/main.go", SRC);
    let sizes = StdSizes::LP64;
    let mut pool = Pool::new();
    let config = DebugInfoConfig::development().with_prefix_map("/work/", "");
    let mut di = DebugInfoBuilder::new(config, &fset, &sizes).unwrap();

    let jobs_ty = pool.chan(Idx::INT, ChanDir::Both);
    let done_ty = pool.chan(Idx::BOOL, ChanDir::SendOnly);
    let jobs_var = Var::new("jobs", jobs_ty).at(fset.pos(file, offset("jobs chan")));
    let done_var = Var::new("done", done_ty).at(fset.pos(file, offset("done chan")));
    let sig = pool.signature(Signature::new(
        vec![jobs_var.clone(), done_var.clone()],
        Vec::new(),
    ));

    let mut module = IrModule::new("main");
    let errors = {
        let mut b = IrBuilder::new(&mut module, &sizes);
        let func = b.define_function("main.worker", &[IrType::Ptr, IrType::Ptr], IrType::Void);
        b.position_at_end(func, BlockId::ENTRY);

        di.push_function(&mut b, &mut pool, func, sig, fset.pos(file, offset("func")))
            .unwrap();
        di.set_location(&mut b, fset.pos(file, offset("jobs chan")));
        for (i, var) in [&jobs_var, &done_var].into_iter().enumerate() {
            let arg = b.param(func, i as u32);
            let slot = b.entry_alloca(IrType::Ptr, &var.name);
            b.store(arg, slot);
            di.declare_variable(&mut b, &mut pool, var, slot, Some(i as u32))
                .unwrap();
        }
        let jobs = TypedValue::new(b.param(func, 0), jobs_ty);
        let done = TypedValue::new(b.param(func, 1), done_ty);

        di.set_location(&mut b, fset.pos(file, offset("j, ok")));
        let got = chan::receive(&mut b, &pool, jobs, true).unwrap();
        let ok = got.ok.unwrap();

        di.set_location(&mut b, fset.pos(file, offset("select")));
        let outcome = chan::select(
            &mut b,
            &pool,
            &[
                SelectCase::Send {
                    chan: done,
                    value: ok,
                },
                SelectCase::Recv { chan: jobs },
            ],
            false,
        )
        .unwrap();
        assert_eq!(outcome.default_index, Some(2));
        assert!(outcome.load_received(&mut b, &pool, 1).is_some());

        b.ret_void();
        di.pop_function();
        b.codegen_error_count()
    };
    assert_eq!(errors, 0);

    let md = di.finalize();
    assert_eq!(md.nodes.unresolved_temporaries(), 0);
    let params = md
        .nodes
        .iter()
        .filter(|(_, n)| matches!(n, MetaNode::LocalVariable { arg_no: 1..=2, .. }))
        .count();
    assert_eq!(params, 2);
    module.attach_debug_info(md);

    let (_, worker) = module
        .functions()
        .find(|(_, f)| f.name == "main.worker")
        .unwrap();
    assert!(worker.subprogram.is_some());
    assert!(worker.instructions().all(|i| i.loc.is_some()));
    let callees: Vec<_> = worker
        .instructions()
        .filter_map(|i| match &i.kind {
            InstKind::Call { callee, .. } => Some(module.function(*callee).name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(
        callees,
        [
            RuntimeFn::ChanRecvOk.symbol(),
            RuntimeFn::SelectNew.symbol(),
            RuntimeFn::SelectDefault.symbol(),
            RuntimeFn::SelectSend.symbol(),
            RuntimeFn::SelectRecv.symbol(),
            RuntimeFn::SelectCommit.symbol(),
        ]
    );

    let text = module.to_string();
    assert!(text.contains("DIFile(filename: \"src/main.go\""), "{text}");
    assert!(text.contains("@__type.chan int = external global"), "{text}");
    assert!(text.contains("\"Debug Info Version\", i32 1"), "{text}");
}

#[test]
fn runtime_abi_can_be_declared_up_front() {
    let sizes = StdSizes::ILP32;
    let mut module = IrModule::new("rt");
    declare_runtime(&mut IrBuilder::new(&mut module, &sizes));

    for func in RuntimeFn::ALL {
        let id = module.function_by_name(func.symbol()).unwrap();
        let decl = module.function(id);
        assert!(decl.is_declaration());
        assert_eq!(decl.ret, func.return_type());
    }
    let alloc = module.function(module.function_by_name("rill_chan_alloc").unwrap());
    assert_eq!(alloc.params, [IrType::Ptr, IrType::Int(32)]);
}
