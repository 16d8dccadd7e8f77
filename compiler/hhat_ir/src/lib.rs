//! Working data and IR types for the H-hat execution core.
//!
//! This crate holds the leaf values every other layer is built on:
//! interned names, quantum/classical symbols, typed literals, and the
//! closed IR node set produced by the front-end.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

mod defs;
mod error;
mod interner;
mod ir;
mod literal;
mod name;
mod symbol;
mod working_data;

pub use defs::{FnDef, FnParam, FnSignature, IrModule, TypeDef, TypeDefShape};
pub use error::IrError;
pub use interner::{InternError, SharedInterner, StringInterner, StringLookup, BUILTIN_TYPE_NAMES};
pub use ir::{
    ArgsBlock, ArgsValuesBlock, Assign, Block, BlockFlag, BodyBlock, Call, CallArgs, CallShape,
    Cast, Declare, DeclareAssign, Instr, IrFlag, Node, Operand, OptionBlock,
};
pub use literal::{CompositeLiteral, CoreLiteral, LiteralValue};
pub use name::Name;
pub use symbol::{CompositeSymbol, Paradigm, Symbol, SymbolPath, QUANTUM_KEY_PREFIX, QUANTUM_SIGIL};
pub use working_data::WorkingData;
