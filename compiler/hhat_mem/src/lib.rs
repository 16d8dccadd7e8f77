//! Memory model of the H-hat execution core.
//!
//! Classical data lives in per-scope stacks and heaps; quantum data draws
//! qubit indices from a single finite pool. The [`MemoryManager`] owns both,
//! together with the symbol table and the built-in type registry.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

mod heap;
mod index;
mod manager;
mod scope;
mod stack;
mod table;

pub use heap::Heap;
pub use index::{IndexManager, IndexSnapshot, QubitIndex};
pub use manager::MemoryManager;
pub use scope::{Scope, ScopeId, ScopeOrigin};
pub use stack::{Stack, TypedValue};
pub use table::{FnLookup, FnQuery, FnTable, SymbolTable, TypeTable};
