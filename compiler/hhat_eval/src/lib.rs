//! Resolution and execution for the H-hat execution core.
//!
//! The [`Executor`] takes an [`IrModule`](hhat_ir::IrModule) from the
//! front-end, registers its types and functions, and resolves its main block
//! node by node against a [`MemoryManager`](hhat_mem::MemoryManager). The
//! resolved memory (containers, qubit indices, symbol tables) is what a
//! quantum backend reads afterwards.
//!
//! # Tracing
//!
//! - `RUST_LOG=hhat_eval=debug`: resolution entry points and type registration.
//! - `RUST_LOG=hhat_mem=trace`: scope push/pop and qubit allocation.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

mod build;
mod executor;
mod resolve;
mod stack;

use std::sync::Once;

pub use build::build_types;
pub use executor::{Executor, ExecutorBuilder, ExecutorConfig};
pub use resolve::{Resolve, Resolver};
pub use stack::ensure_sufficient_stack;

static TRACING_INIT: Once = Once::new();

/// Install a `fmt` subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset, and only ever runs once.
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
