//! Types and storage for the H-hat execution core.
//!
//! - [`TypeDataStructure`]: shape, classical size and qubit range of a type
//! - [`BuiltinTypes`]: the primitive registry and implicit conversions
//! - [`cast_literal`]: explicit, range-checked literal conversion
//! - [`VariableContainer`]: runtime storage of one variable

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

mod builtin;
mod cast;
mod container;
mod size;
mod tds;

pub use builtin::{BuiltinNames, BuiltinTypes, IntWidth};
pub use cast::cast_literal;
pub use container::{ContainerFlags, Loan, Ownership, Stored, VariableContainer, VariableKind};
pub use size::{QSize, Size, POINTER_SIZE};
pub use tds::{resolve_qsize, MemberLayout, TdsKind, TypeDataStructure};
