//! Explicit literal conversion between built-in types.
//!
//! Casts never truncate. Integer targets are range-checked against their
//! width (qubit width for quantum targets) and floats accept any int or
//! float. Crossing paradigms is always an error.

use hhat_diagnostic::error::{cast_error, cast_int_overflow, cast_neg_to_unsigned};
use hhat_diagnostic::CoreResult;
use hhat_ir::{CoreLiteral, LiteralValue, SymbolPath};

use crate::builtin::{BuiltinTypes, IntWidth};

/// Convert `lit` to the built-in type `to`.
#[allow(clippy::cast_precision_loss)]
pub fn cast_literal(
    builtins: &BuiltinTypes,
    lit: CoreLiteral,
    to: &SymbolPath,
) -> CoreResult<CoreLiteral> {
    let invalid = || cast_error(lit.ty().into(), to.clone());

    let Some(target) = to.as_symbol().filter(|_| builtins.is_builtin(to)) else {
        return Err(invalid());
    };
    if target == lit.ty() {
        return Ok(lit);
    }
    if target.paradigm() != lit.ty().paradigm() {
        return Err(invalid());
    }

    if let Some(width) = builtins.int_width(target) {
        let Some(value) = lit.as_int() else {
            return Err(invalid());
        };
        check_int_range(value, width).map_err(|range| match range {
            RangeError::Negative => cast_neg_to_unsigned(lit, to.clone()),
            RangeError::Overflow => cast_int_overflow(lit, to.clone()),
        })?;
        return Ok(lit.retag(target));
    }

    if builtins.is_float(target) {
        return match lit.value() {
            LiteralValue::Int(int) => Ok(CoreLiteral::new(LiteralValue::Float(int as f64), target)),
            LiteralValue::Float(_) => Ok(lit.retag(target)),
            LiteralValue::Bool(_) | LiteralValue::Str(_) => Err(invalid()),
        };
    }

    Err(invalid())
}

enum RangeError {
    Negative,
    Overflow,
}

fn check_int_range(value: i128, width: IntWidth) -> Result<(), RangeError> {
    match width {
        IntWidth::Arbitrary => Ok(()),
        IntWidth::Unsigned(_) if value < 0 => Err(RangeError::Negative),
        IntWidth::Unsigned(bits) => {
            if bits >= 127 || value < (1i128 << bits) {
                Ok(())
            } else {
                Err(RangeError::Overflow)
            }
        }
        IntWidth::Signed(bits) => {
            let half = 1i128 << bits.saturating_sub(1).min(126);
            if (-half..half).contains(&value) {
                Ok(())
            } else {
                Err(RangeError::Overflow)
            }
        }
    }
}
