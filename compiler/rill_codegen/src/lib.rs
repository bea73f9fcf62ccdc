//! Debug info and channel lowering for the rill backend.
//!
//! Two independent pieces of the backend share this crate:
//!
//! - **Debug info** ([`debug`]): builds the descriptor graph of one compile
//!   unit (types, subprograms, lexical blocks, variables, locations) and
//!   records the module version flags.
//! - **Channel lowering** ([`chan`]): translates `make(chan T, n)`, send,
//!   receive, close and `select` into calls on an injected runtime ABI.
//!
//! Both target the arena IR in [`ir`], an ID-based instruction builder in
//! the style of `rustc_codegen_ssa`: lowering code is written against the
//! traits in [`traits`], and [`IrBuilder`] is the implementation that
//! emits instructions.
//!
//! # Debugging
//!
//! Enable tracing with environment variables:
//! - `RUST_LOG=rill_codegen=debug` - descriptors, functions, selects
//! - `RUST_LOG=rill_codegen=trace` - cache hits, locations, every lowering
//! - `RUST_LOG=rill_codegen::debug=trace` - debug info only
//!
//! # Example
//!
//! ```ignore
//! use rill_codegen::{chan, ir::{IrBuilder, IrModule}};
//!
//! let mut module = IrModule::new("main");
//! let mut b = IrBuilder::new(&mut module, &sizes);
//! let f = b.define_function("main.main", &[], IrType::Void);
//! b.position_at_end(f, entry);
//!
//! let cap = b.const_int(word, 4);
//! let ch = chan::create_channel(&mut b, &mut pool, Idx::INT, TypedValue::new(cap, Idx::INT));
//! chan::send(&mut b, &pool, ch, value)?;
//! ```

pub mod chan;
pub mod debug;
pub mod ir;
pub mod runtime;
pub mod traits;

pub use chan::{LowerError, TypedValue};
pub use debug::{DebugInfoBuilder, DebugInfoConfig, DebugInfoError, DebugLevel};
pub use ir::{IrBuilder, IrModule};
pub use runtime::RuntimeFn;
pub use traits::{BackendTypes, FrameMethods, RuntimeAbi};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Does nothing unless `RUST_LOG` is set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
