//! The operand union: anything an instruction can name or carry by value.

use crate::{CompositeLiteral, CompositeSymbol, CoreLiteral, StringLookup, Symbol, SymbolPath};

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum WorkingData {
    Symbol(Symbol),
    Composite(CompositeSymbol),
    Literal(CoreLiteral),
    CompositeLiteral(CompositeLiteral),
}

impl WorkingData {
    pub fn is_quantum(&self) -> bool {
        match self {
            WorkingData::Symbol(sym) => sym.is_quantum(),
            WorkingData::Composite(path) => path.is_quantum(),
            WorkingData::Literal(lit) => lit.is_quantum(),
            WorkingData::CompositeLiteral(lit) => lit.is_quantum(),
        }
    }

    /// Declared type of a literal operand. Identifiers have none of their own.
    pub fn literal_type(&self) -> Option<Symbol> {
        match self {
            WorkingData::Literal(lit) => Some(lit.ty()),
            WorkingData::CompositeLiteral(lit) => Some(lit.ty()),
            WorkingData::Symbol(_) | WorkingData::Composite(_) => None,
        }
    }

    pub fn as_path(&self) -> Option<SymbolPath> {
        match self {
            WorkingData::Symbol(sym) => Some(SymbolPath::Symbol(*sym)),
            WorkingData::Composite(path) => Some(SymbolPath::Composite(path.clone())),
            WorkingData::Literal(_) | WorkingData::CompositeLiteral(_) => None,
        }
    }

    pub fn render(&self, lookup: &impl StringLookup) -> String {
        match self {
            WorkingData::Symbol(sym) => sym.render(lookup),
            WorkingData::Composite(path) => path.render(lookup),
            WorkingData::Literal(lit) => lit.render(lookup),
            WorkingData::CompositeLiteral(lit) => lit.render(lookup),
        }
    }
}

impl From<Symbol> for WorkingData {
    fn from(sym: Symbol) -> Self {
        WorkingData::Symbol(sym)
    }
}

impl From<CompositeSymbol> for WorkingData {
    fn from(path: CompositeSymbol) -> Self {
        WorkingData::Composite(path)
    }
}

impl From<SymbolPath> for WorkingData {
    fn from(path: SymbolPath) -> Self {
        match path {
            SymbolPath::Symbol(sym) => WorkingData::Symbol(sym),
            SymbolPath::Composite(path) => WorkingData::Composite(path),
        }
    }
}

impl From<CoreLiteral> for WorkingData {
    fn from(lit: CoreLiteral) -> Self {
        WorkingData::Literal(lit)
    }
}

impl From<CompositeLiteral> for WorkingData {
    fn from(lit: CompositeLiteral) -> Self {
        WorkingData::CompositeLiteral(lit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StringInterner;

    #[test]
    fn paradigm_follows_variant() {
        let interner = StringInterner::new();
        let q = WorkingData::from(Symbol::new(&interner, "@q"));
        let lit = WorkingData::from(CoreLiteral::int(3, Symbol::new(&interner, "u32")));

        assert!(q.is_quantum());
        assert!(!lit.is_quantum());
        assert_eq!(lit.literal_type(), Some(Symbol::new(&interner, "u32")));
        assert_eq!(q.literal_type(), None);
        assert!(lit.as_path().is_none());
    }
}
