//! Structured errors for the execution core.
//!
//! Every fallible operation in the core returns `CoreResult<T>`. The error
//! carries a typed `CoreErrorKind` holding the offending symbols and literals
//! themselves, so names are resolved only when the error is rendered.
//!
//! Factory functions (e.g. `heap_invalid_key()`) are the public way to build
//! errors; they are `#[cold]` since every one of them sits on a failure path.

use std::fmt;

use hhat_ir::{
    CoreLiteral, FnSignature, IrError, IrFlag, StringLookup, Symbol, SymbolPath, WorkingData,
};

use crate::ErrorCode;

pub type CoreResult<T> = Result<T, CoreError>;

/// Why a container rejected an assignment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssignFailure {
    /// Positional value count differs from the member count.
    Arity { expected: usize, got: usize },
    /// Named key is not a member.
    UnknownMember(SymbolPath),
    /// Value type differs from the member's declared type.
    MemberType {
        member: SymbolPath,
        expected: SymbolPath,
        found: SymbolPath,
    },
    /// Enum variant not part of the enum.
    UnknownVariant(SymbolPath),
    /// Value shape cannot be stored (e.g. a bare identifier in a struct slot).
    Unsupported(WorkingData),
}

/// Typed error category.
///
/// Grouped by the layer that raises it; `code()` maps each variant to its
/// `ErrorCode`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CoreErrorKind {
    // Index
    IndexAllocation {
        key: WorkingData,
        requested: usize,
        available: usize,
    },
    IndexVarHasIndexes {
        key: WorkingData,
    },
    IndexInvalidVar {
        key: WorkingData,
    },
    IndexUnknown,

    // Type
    TypeQuantumOnClassical {
        ty: SymbolPath,
        member: SymbolPath,
    },
    TypeAndMemberNoMatch {
        ty: SymbolPath,
        member: Symbol,
        member_type: SymbolPath,
    },
    TypeAddMember {
        ty: SymbolPath,
        member: SymbolPath,
    },
    TypeSingleAssign {
        ty: SymbolPath,
    },
    TypeMismatch {
        expected: SymbolPath,
        found: SymbolPath,
    },
    LiteralParadigmMismatch {
        value: String,
        ty: Symbol,
    },
    MalformedLiteral {
        ty: Symbol,
    },

    // Container
    ContainerVarAssign {
        var: Symbol,
        reason: AssignFailure,
    },
    ContainerVarIsImmutable {
        var: Symbol,
    },
    VariableWrongMember {
        var: Symbol,
        member: Option<SymbolPath>,
    },
    VariableCreation {
        var: Symbol,
        ty: SymbolPath,
    },
    VariableFreeingBorrowed {
        var: Symbol,
    },
    VariableRedeclared {
        var: Symbol,
    },
    VariableTransferred {
        var: Symbol,
    },
    LoanMismatch {
        var: Symbol,
    },

    // Cast
    CastNegToUnsigned {
        value: CoreLiteral,
        to: SymbolPath,
    },
    CastIntOverflow {
        value: CoreLiteral,
        to: SymbolPath,
    },
    Cast {
        from: SymbolPath,
        to: SymbolPath,
    },

    // Memory / lookup
    HeapInvalidKey {
        key: Symbol,
    },
    StackEmpty,
    UnknownType {
        ty: SymbolPath,
    },
    UnknownFunction {
        name: Symbol,
        signature: Option<FnSignature>,
    },

    // Resolution
    NotImplemented {
        feature: &'static str,
    },
    CallWithOptionAndBody {
        name: Symbol,
    },
    MissingValue {
        instr: IrFlag,
    },

    // Fatal
    EmptyMind,
    ScopeOrderViolation {
        expected: u32,
        found: u32,
    },
    MissingScope {
        scope: u32,
    },
    RecursionLimit {
        depth: usize,
        limit: usize,
    },
}

impl CoreErrorKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreErrorKind::IndexAllocation { .. } => ErrorCode::E1001,
            CoreErrorKind::IndexVarHasIndexes { .. } => ErrorCode::E1002,
            CoreErrorKind::IndexInvalidVar { .. } => ErrorCode::E1003,
            CoreErrorKind::IndexUnknown => ErrorCode::E1004,
            CoreErrorKind::TypeQuantumOnClassical { .. } => ErrorCode::E2001,
            CoreErrorKind::TypeAndMemberNoMatch { .. } => ErrorCode::E2002,
            CoreErrorKind::TypeAddMember { .. } => ErrorCode::E2003,
            CoreErrorKind::TypeSingleAssign { .. } => ErrorCode::E2004,
            CoreErrorKind::TypeMismatch { .. } => ErrorCode::E2005,
            CoreErrorKind::LiteralParadigmMismatch { .. } => ErrorCode::E2006,
            CoreErrorKind::MalformedLiteral { .. } => ErrorCode::E2007,
            CoreErrorKind::ContainerVarAssign { .. } => ErrorCode::E3001,
            CoreErrorKind::ContainerVarIsImmutable { .. } => ErrorCode::E3002,
            CoreErrorKind::VariableWrongMember { .. } => ErrorCode::E3003,
            CoreErrorKind::VariableCreation { .. } => ErrorCode::E3004,
            CoreErrorKind::VariableFreeingBorrowed { .. } => ErrorCode::E3005,
            CoreErrorKind::VariableRedeclared { .. } => ErrorCode::E3006,
            CoreErrorKind::VariableTransferred { .. } => ErrorCode::E3007,
            CoreErrorKind::LoanMismatch { .. } => ErrorCode::E3008,
            CoreErrorKind::CastNegToUnsigned { .. } => ErrorCode::E4001,
            CoreErrorKind::CastIntOverflow { .. } => ErrorCode::E4002,
            CoreErrorKind::Cast { .. } => ErrorCode::E4003,
            CoreErrorKind::HeapInvalidKey { .. } => ErrorCode::E5001,
            CoreErrorKind::StackEmpty => ErrorCode::E5002,
            CoreErrorKind::UnknownType { .. } => ErrorCode::E5003,
            CoreErrorKind::UnknownFunction { .. } => ErrorCode::E5004,
            CoreErrorKind::NotImplemented { .. } => ErrorCode::E6001,
            CoreErrorKind::CallWithOptionAndBody { .. } => ErrorCode::E6002,
            CoreErrorKind::MissingValue { .. } => ErrorCode::E6003,
            CoreErrorKind::EmptyMind => ErrorCode::E9001,
            CoreErrorKind::ScopeOrderViolation { .. } => ErrorCode::E9002,
            CoreErrorKind::MissingScope { .. } => ErrorCode::E9003,
            CoreErrorKind::RecursionLimit { .. } => ErrorCode::E9004,
        }
    }

    /// Short name of the failure, usable without an interner.
    pub fn title(&self) -> &'static str {
        match self {
            CoreErrorKind::IndexAllocation { .. } => "not enough qubit indices",
            CoreErrorKind::IndexVarHasIndexes { .. } => "key already has indices",
            CoreErrorKind::IndexInvalidVar { .. } => "key unknown to the index manager",
            CoreErrorKind::IndexUnknown => "index manager in an unknown state",
            CoreErrorKind::TypeQuantumOnClassical { .. } => "quantum member on classical type",
            CoreErrorKind::TypeAndMemberNoMatch { .. } => "member and type paradigm mismatch",
            CoreErrorKind::TypeAddMember { .. } => "cannot add member",
            CoreErrorKind::TypeSingleAssign { .. } => "single type already has a member",
            CoreErrorKind::TypeMismatch { .. } => "type mismatch",
            CoreErrorKind::LiteralParadigmMismatch { .. } => "literal paradigm mismatch",
            CoreErrorKind::MalformedLiteral { .. } => "malformed literal",
            CoreErrorKind::ContainerVarAssign { .. } => "cannot assign to variable",
            CoreErrorKind::ContainerVarIsImmutable { .. } => "variable is immutable",
            CoreErrorKind::VariableWrongMember { .. } => "wrong member",
            CoreErrorKind::VariableCreation { .. } => "cannot create variable",
            CoreErrorKind::VariableFreeingBorrowed { .. } => "freeing a borrowed variable",
            CoreErrorKind::VariableRedeclared { .. } => "variable already declared",
            CoreErrorKind::VariableTransferred { .. } => "variable was transferred",
            CoreErrorKind::LoanMismatch { .. } => "loan does not belong to variable",
            CoreErrorKind::CastNegToUnsigned { .. } => "negative value cast to unsigned",
            CoreErrorKind::CastIntOverflow { .. } => "integer overflow in cast",
            CoreErrorKind::Cast { .. } => "invalid cast",
            CoreErrorKind::HeapInvalidKey { .. } => "invalid heap key",
            CoreErrorKind::StackEmpty => "stack is empty",
            CoreErrorKind::UnknownType { .. } => "unknown type",
            CoreErrorKind::UnknownFunction { .. } => "unknown function",
            CoreErrorKind::NotImplemented { .. } => "not implemented",
            CoreErrorKind::CallWithOptionAndBody { .. } => "call with option and body",
            CoreErrorKind::MissingValue { .. } => "instruction produced no value",
            CoreErrorKind::EmptyMind => "mind is empty",
            CoreErrorKind::ScopeOrderViolation { .. } => "scope freed out of order",
            CoreErrorKind::MissingScope { .. } => "missing scope",
            CoreErrorKind::RecursionLimit { .. } => "recursion limit reached",
        }
    }

    /// Full message with interned names resolved.
    pub fn render(&self, lookup: &impl StringLookup) -> String {
        match self {
            CoreErrorKind::IndexAllocation {
                key,
                requested,
                available,
            } => format!(
                "cannot give {requested} qubit indices to `{}`: {available} available",
                key.render(lookup)
            ),
            CoreErrorKind::IndexVarHasIndexes { key } => {
                format!("`{}` already has qubit indices", key.render(lookup))
            }
            CoreErrorKind::IndexInvalidVar { key } => {
                format!("`{}` has no qubit index record", key.render(lookup))
            }
            CoreErrorKind::TypeQuantumOnClassical { ty, member } => format!(
                "classical type `{}` cannot hold quantum member `{}`",
                ty.render(lookup),
                member.render(lookup)
            ),
            CoreErrorKind::TypeAndMemberNoMatch {
                ty,
                member,
                member_type,
            } => format!(
                "member `{}` of `{}` is {} but its type `{}` is {}",
                member.render(lookup),
                ty.render(lookup),
                member.paradigm(),
                member_type.render(lookup),
                member_type.paradigm()
            ),
            CoreErrorKind::TypeAddMember { ty, member } => format!(
                "type `{}` already has member `{}`",
                ty.render(lookup),
                member.render(lookup)
            ),
            CoreErrorKind::TypeSingleAssign { ty } => {
                format!("single type `{}` already wraps a member", ty.render(lookup))
            }
            CoreErrorKind::TypeMismatch { expected, found } => format!(
                "expected `{}`, found `{}`",
                expected.render(lookup),
                found.render(lookup)
            ),
            CoreErrorKind::LiteralParadigmMismatch { value, ty } => format!(
                "literal `{value}` does not match the paradigm of type `{}`",
                ty.render(lookup)
            ),
            CoreErrorKind::MalformedLiteral { ty } => {
                format!("malformed literal of type `{}`", ty.render(lookup))
            }
            CoreErrorKind::ContainerVarAssign { var, reason } => {
                format!("cannot assign to `{}`: {}", var.render(lookup), render_assign(reason, lookup))
            }
            CoreErrorKind::ContainerVarIsImmutable { var } => {
                format!("`{}` is immutable and already assigned", var.render(lookup))
            }
            CoreErrorKind::VariableWrongMember { var, member } => match member {
                Some(member) => format!(
                    "`{}` has no member `{}`",
                    var.render(lookup),
                    member.render(lookup)
                ),
                None => format!("`{}` holds no value", var.render(lookup)),
            },
            CoreErrorKind::VariableCreation { var, ty } => format!(
                "variable `{}` is {} but type `{}` is {}",
                var.render(lookup),
                var.paradigm(),
                ty.render(lookup),
                ty.paradigm()
            ),
            CoreErrorKind::VariableFreeingBorrowed { var } => {
                format!("`{}` is still borrowed and cannot be freed", var.render(lookup))
            }
            CoreErrorKind::VariableRedeclared { var } => {
                format!("`{}` is already declared in this scope", var.render(lookup))
            }
            CoreErrorKind::VariableTransferred { var } => {
                format!("`{}` was transferred out of this scope", var.render(lookup))
            }
            CoreErrorKind::LoanMismatch { var } => {
                format!("loan was not issued by `{}`", var.render(lookup))
            }
            CoreErrorKind::CastNegToUnsigned { value, to } => format!(
                "cannot cast negative `{}` to unsigned `{}`",
                value.render(lookup),
                to.render(lookup)
            ),
            CoreErrorKind::CastIntOverflow { value, to } => format!(
                "`{}` does not fit in `{}`",
                value.render(lookup),
                to.render(lookup)
            ),
            CoreErrorKind::Cast { from, to } => format!(
                "cannot cast `{}` to `{}`",
                from.render(lookup),
                to.render(lookup)
            ),
            CoreErrorKind::HeapInvalidKey { key } => {
                format!("`{}` is not declared", key.render(lookup))
            }
            CoreErrorKind::UnknownType { ty } => {
                format!("type `{}` not found", ty.render(lookup))
            }
            CoreErrorKind::UnknownFunction { name, signature } => match signature {
                Some(signature) => format!("no function `{}`", signature.render(lookup)),
                None => format!("no function named `{}`", name.render(lookup)),
            },
            CoreErrorKind::NotImplemented { feature } => format!("{feature} is not implemented"),
            CoreErrorKind::CallWithOptionAndBody { name } => format!(
                "call `{}` cannot carry both an option and a body",
                name.render(lookup)
            ),
            CoreErrorKind::MissingValue { instr } => {
                format!("`{instr}` left no value on the stack")
            }
            CoreErrorKind::ScopeOrderViolation { expected, found } => {
                format!("expected to free scope #{expected}, got scope #{found}")
            }
            CoreErrorKind::MissingScope { scope } => format!("scope #{scope} does not exist"),
            CoreErrorKind::RecursionLimit { depth, limit } => {
                format!("call depth {depth} exceeds the limit of {limit}")
            }
            CoreErrorKind::IndexUnknown | CoreErrorKind::StackEmpty | CoreErrorKind::EmptyMind => {
                self.title().to_owned()
            }
        }
    }
}

fn render_assign(reason: &AssignFailure, lookup: &impl StringLookup) -> String {
    match reason {
        AssignFailure::Arity { expected, got } => {
            format!("expected {expected} values, got {got}")
        }
        AssignFailure::UnknownMember(member) => format!("no member `{}`", member.render(lookup)),
        AssignFailure::MemberType {
            member,
            expected,
            found,
        } => format!(
            "member `{}` expects `{}`, found `{}`",
            member.render(lookup),
            expected.render(lookup),
            found.render(lookup)
        ),
        AssignFailure::UnknownVariant(variant) => {
            format!("`{}` is not a variant", variant.render(lookup))
        }
        AssignFailure::Unsupported(data) => {
            format!("`{}` cannot be stored", data.render(lookup))
        }
    }
}

/// Error produced by the execution core.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoreError {
    pub kind: CoreErrorKind,
    pub notes: Vec<String>,
}

impl CoreError {
    pub fn from_kind(kind: CoreErrorKind) -> Self {
        CoreError {
            kind,
            notes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.kind.code()
    }

    /// Whether the engine must halt instead of aborting one instruction.
    pub fn is_fatal(&self) -> bool {
        self.code().is_fatal()
    }

    /// Render as `error[E####]: message`, followed by notes.
    pub fn display(&self, lookup: &impl StringLookup) -> String {
        let mut out = format!("error[{}]: {}", self.code(), self.kind.render(lookup));
        for note in &self.notes {
            out.push_str("\n  = note: ");
            out.push_str(note);
        }
        out
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error[{}]: {}", self.code(), self.kind.title())
    }
}

impl std::error::Error for CoreError {}

impl From<CoreErrorKind> for CoreError {
    fn from(kind: CoreErrorKind) -> Self {
        CoreError::from_kind(kind)
    }
}

impl From<IrError> for CoreError {
    fn from(err: IrError) -> Self {
        let kind = match err {
            IrError::LiteralParadigmMismatch { value, ty } => {
                CoreErrorKind::LiteralParadigmMismatch { value, ty }
            }
            IrError::EmptyLiteral { ty } => CoreErrorKind::MalformedLiteral { ty },
            IrError::MixedCompositeLiteral { expected, found } => CoreErrorKind::TypeMismatch {
                expected: expected.into(),
                found: found.into(),
            },
            IrError::CallWithOptionAndBody { name } => {
                CoreErrorKind::CallWithOptionAndBody { name }
            }
        };
        CoreError::from_kind(kind)
    }
}

// Factory functions

#[cold]
pub fn index_allocation(key: WorkingData, requested: usize, available: usize) -> CoreError {
    CoreErrorKind::IndexAllocation {
        key,
        requested,
        available,
    }
    .into()
}

#[cold]
pub fn index_var_has_indexes(key: WorkingData) -> CoreError {
    CoreErrorKind::IndexVarHasIndexes { key }.into()
}

#[cold]
pub fn index_invalid_var(key: WorkingData) -> CoreError {
    CoreErrorKind::IndexInvalidVar { key }.into()
}

#[cold]
pub fn type_quantum_on_classical(ty: SymbolPath, member: SymbolPath) -> CoreError {
    CoreErrorKind::TypeQuantumOnClassical { ty, member }.into()
}

#[cold]
pub fn type_and_member_no_match(ty: SymbolPath, member: Symbol, member_type: SymbolPath) -> CoreError {
    CoreErrorKind::TypeAndMemberNoMatch {
        ty,
        member,
        member_type,
    }
    .into()
}

#[cold]
pub fn type_add_member(ty: SymbolPath, member: SymbolPath) -> CoreError {
    CoreErrorKind::TypeAddMember { ty, member }.into()
}

#[cold]
pub fn type_single_assign(ty: SymbolPath) -> CoreError {
    CoreErrorKind::TypeSingleAssign { ty }.into()
}

#[cold]
pub fn type_mismatch(expected: SymbolPath, found: SymbolPath) -> CoreError {
    CoreErrorKind::TypeMismatch { expected, found }.into()
}

#[cold]
pub fn container_var_assign(var: Symbol, reason: AssignFailure) -> CoreError {
    CoreErrorKind::ContainerVarAssign { var, reason }.into()
}

#[cold]
pub fn container_var_is_immutable(var: Symbol) -> CoreError {
    CoreErrorKind::ContainerVarIsImmutable { var }.into()
}

#[cold]
pub fn variable_wrong_member(var: Symbol, member: Option<SymbolPath>) -> CoreError {
    CoreErrorKind::VariableWrongMember { var, member }.into()
}

#[cold]
pub fn variable_creation(var: Symbol, ty: SymbolPath) -> CoreError {
    CoreErrorKind::VariableCreation { var, ty }.into()
}

#[cold]
pub fn variable_freeing_borrowed(var: Symbol) -> CoreError {
    CoreErrorKind::VariableFreeingBorrowed { var }.into()
}

#[cold]
pub fn variable_redeclared(var: Symbol) -> CoreError {
    CoreErrorKind::VariableRedeclared { var }.into()
}

#[cold]
pub fn variable_transferred(var: Symbol) -> CoreError {
    CoreErrorKind::VariableTransferred { var }.into()
}

#[cold]
pub fn loan_mismatch(var: Symbol) -> CoreError {
    CoreErrorKind::LoanMismatch { var }.into()
}

#[cold]
pub fn cast_neg_to_unsigned(value: CoreLiteral, to: SymbolPath) -> CoreError {
    CoreErrorKind::CastNegToUnsigned { value, to }.into()
}

#[cold]
pub fn cast_int_overflow(value: CoreLiteral, to: SymbolPath) -> CoreError {
    CoreErrorKind::CastIntOverflow { value, to }.into()
}

#[cold]
pub fn cast_error(from: SymbolPath, to: SymbolPath) -> CoreError {
    CoreErrorKind::Cast { from, to }.into()
}

#[cold]
pub fn heap_invalid_key(key: Symbol) -> CoreError {
    CoreErrorKind::HeapInvalidKey { key }.into()
}

#[cold]
pub fn stack_empty() -> CoreError {
    CoreErrorKind::StackEmpty.into()
}

#[cold]
pub fn unknown_type(ty: SymbolPath) -> CoreError {
    CoreErrorKind::UnknownType { ty }.into()
}

#[cold]
pub fn unknown_function(name: Symbol, signature: Option<FnSignature>) -> CoreError {
    CoreErrorKind::UnknownFunction { name, signature }.into()
}

#[cold]
pub fn not_implemented(feature: &'static str) -> CoreError {
    CoreErrorKind::NotImplemented { feature }.into()
}

#[cold]
pub fn missing_value(instr: IrFlag) -> CoreError {
    CoreErrorKind::MissingValue { instr }.into()
}

#[cold]
pub fn empty_mind() -> CoreError {
    CoreErrorKind::EmptyMind.into()
}

#[cold]
pub fn scope_order_violation(expected: u32, found: u32) -> CoreError {
    CoreErrorKind::ScopeOrderViolation { expected, found }.into()
}

#[cold]
pub fn missing_scope(scope: u32) -> CoreError {
    CoreErrorKind::MissingScope { scope }.into()
}

#[cold]
pub fn recursion_limit(depth: usize, limit: usize) -> CoreError {
    CoreErrorKind::RecursionLimit { depth, limit }.into()
}
