//! Per-scope value stack.

use hhat_diagnostic::error::stack_empty;
use hhat_diagnostic::CoreResult;
use hhat_ir::{SymbolPath, WorkingData};

/// A value together with the type it was produced at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypedValue {
    pub data: WorkingData,
    pub ty: SymbolPath,
}

impl TypedValue {
    pub fn new(data: impl Into<WorkingData>, ty: impl Into<SymbolPath>) -> Self {
        TypedValue {
            data: data.into(),
            ty: ty.into(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Stack {
    values: Vec<TypedValue>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: TypedValue) {
        self.values.push(value);
    }

    pub fn pop(&mut self) -> CoreResult<TypedValue> {
        self.values.pop().ok_or_else(stack_empty)
    }

    pub fn peek(&self) -> Option<&TypedValue> {
        self.values.last()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &TypedValue> + '_ {
        self.values.iter()
    }
}
