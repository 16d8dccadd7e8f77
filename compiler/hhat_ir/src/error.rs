//! Errors raised while building IR values.
//!
//! These stay inside `hhat_ir`, which has no diagnostics dependency. The
//! diagnostics crate converts them into coded core errors.

use std::fmt;

use crate::Symbol;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IrError {
    /// Literal value sigil disagrees with its type (`2` typed `@u3`).
    LiteralParadigmMismatch { value: String, ty: Symbol },
    /// Literal text is empty once the sigil is stripped.
    EmptyLiteral { ty: Symbol },
    /// A composite literal mixes element types.
    MixedCompositeLiteral { expected: Symbol, found: Symbol },
    /// A call was given both an option block and a body block.
    CallWithOptionAndBody { name: Symbol },
}

impl fmt::Display for IrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrError::LiteralParadigmMismatch { value, ty } => write!(
                f,
                "literal `{value}` is {} but its type is {}",
                crate::Paradigm::of(value),
                ty.paradigm()
            ),
            IrError::EmptyLiteral { .. } => f.write_str("empty literal"),
            IrError::MixedCompositeLiteral { .. } => {
                f.write_str("composite literal elements must share one type")
            }
            IrError::CallWithOptionAndBody { .. } => {
                f.write_str("a call cannot carry both an option block and a body block")
            }
        }
    }
}

impl std::error::Error for IrError {}
