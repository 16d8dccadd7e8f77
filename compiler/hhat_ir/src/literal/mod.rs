//! Typed literals.
//!
//! A literal is a value tagged with the name of its primitive type. Quantum
//! literals (`@2` typed `@u3`) carry the sigil on both value and type.
//! Values are stored parsed; the sigil lives on the type alone.

use std::hash::{Hash, Hasher};

use crate::{IrError, Name, Paradigm, StringInterner, StringLookup, Symbol, QUANTUM_SIGIL};

/// Parsed literal payload.
#[derive(Copy, Clone, Debug)]
pub enum LiteralValue {
    Int(i128),
    Float(f64),
    Bool(bool),
    Str(Name),
}

impl LiteralValue {
    /// Read a sigil-free literal: integer, then float, then boolean,
    /// otherwise an interned string.
    pub fn parse(interner: &StringInterner, raw: &str) -> Self {
        if let Ok(int) = raw.parse::<i128>() {
            return LiteralValue::Int(int);
        }
        if let Ok(float) = raw.parse::<f64>() {
            return LiteralValue::Float(float);
        }
        match raw {
            "true" => LiteralValue::Bool(true),
            "false" => LiteralValue::Bool(false),
            _ => LiteralValue::Str(interner.intern(raw)),
        }
    }

    /// Bit-level expansion used when lowering to quantum instructions.
    pub fn bin(&self, lookup: &impl StringLookup) -> String {
        match *self {
            LiteralValue::Int(int) if int >= 0 => format!("{int:b}"),
            LiteralValue::Int(int) => i64::try_from(int)
                .map_or_else(|_| format!("{int:b}"), |narrow| format!("{narrow:064b}")),
            LiteralValue::Float(float) => format!("{:064b}", float.to_bits()),
            LiteralValue::Bool(flag) => if flag { "1" } else { "0" }.to_owned(),
            LiteralValue::Str(name) => lookup
                .lookup(name)
                .chars()
                .map(|ch| format!("{:08b}", u32::from(ch)))
                .collect(),
        }
    }
}

impl PartialEq for LiteralValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (LiteralValue::Int(a), LiteralValue::Int(b)) => a == b,
            (LiteralValue::Float(a), LiteralValue::Float(b)) => a.to_bits() == b.to_bits(),
            (LiteralValue::Bool(a), LiteralValue::Bool(b)) => a == b,
            (LiteralValue::Str(a), LiteralValue::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for LiteralValue {}

impl Hash for LiteralValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            LiteralValue::Int(int) => int.hash(state),
            LiteralValue::Float(float) => float.to_bits().hash(state),
            LiteralValue::Bool(flag) => flag.hash(state),
            LiteralValue::Str(name) => name.hash(state),
        }
    }
}

/// A value tagged with its primitive type name.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct CoreLiteral {
    value: LiteralValue,
    ty: Symbol,
}

impl CoreLiteral {
    pub fn new(value: LiteralValue, ty: Symbol) -> Self {
        CoreLiteral { value, ty }
    }

    pub fn int(value: i128, ty: Symbol) -> Self {
        CoreLiteral::new(LiteralValue::Int(value), ty)
    }

    /// Build a literal from source text such as `108` or `@2`.
    ///
    /// The text's sigil must match the type's sigil.
    pub fn parse(interner: &StringInterner, text: &str, ty: Symbol) -> Result<Self, IrError> {
        if Paradigm::of(text) != ty.paradigm() {
            return Err(IrError::LiteralParadigmMismatch {
                value: text.to_owned(),
                ty,
            });
        }
        let raw = text.strip_prefix(QUANTUM_SIGIL).unwrap_or(text);
        if raw.is_empty() {
            return Err(IrError::EmptyLiteral { ty });
        }
        Ok(CoreLiteral::new(LiteralValue::parse(interner, raw), ty))
    }

    #[inline]
    pub fn value(&self) -> LiteralValue {
        self.value
    }

    #[inline]
    pub fn ty(&self) -> Symbol {
        self.ty
    }

    #[inline]
    pub fn is_quantum(&self) -> bool {
        self.ty.is_quantum()
    }

    pub fn as_int(&self) -> Option<i128> {
        match self.value {
            LiteralValue::Int(int) => Some(int),
            _ => None,
        }
    }

    /// Same value, new type tag. Callers are responsible for the paradigm.
    #[must_use]
    pub fn retag(self, ty: Symbol) -> Self {
        CoreLiteral { ty, ..self }
    }

    pub fn bin(&self, lookup: &impl StringLookup) -> String {
        self.value.bin(lookup)
    }

    pub fn render(&self, lookup: &impl StringLookup) -> String {
        let sigil = if self.is_quantum() { "@" } else { "" };
        let value = match self.value {
            LiteralValue::Int(int) => int.to_string(),
            LiteralValue::Float(float) => format!("{float:?}"),
            LiteralValue::Bool(flag) => flag.to_string(),
            LiteralValue::Str(name) => lookup.lookup(name).to_owned(),
        };
        format!("{sigil}{value}:{}", self.ty.render(lookup))
    }
}

/// An ordered array of literals sharing one type.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct CompositeLiteral {
    items: Vec<CoreLiteral>,
    ty: Symbol,
}

impl CompositeLiteral {
    pub fn new(items: Vec<CoreLiteral>, ty: Symbol) -> Result<Self, IrError> {
        if let Some(odd) = items.iter().find(|item| item.ty() != ty) {
            return Err(IrError::MixedCompositeLiteral {
                expected: ty,
                found: odd.ty(),
            });
        }
        Ok(CompositeLiteral { items, ty })
    }

    pub fn items(&self) -> &[CoreLiteral] {
        &self.items
    }

    pub fn ty(&self) -> Symbol {
        self.ty
    }

    pub fn is_quantum(&self) -> bool {
        self.ty.is_quantum()
    }

    pub fn bin(&self, lookup: &impl StringLookup) -> String {
        self.items.iter().map(|item| item.bin(lookup)).collect()
    }

    pub fn render(&self, lookup: &impl StringLookup) -> String {
        let items: Vec<String> = self.items.iter().map(|item| item.render(lookup)).collect();
        format!("[{}]", items.join(", "))
    }
}
