//! Identifiers and their paradigm.
//!
//! A name starting with [`QUANTUM_SIGIL`] is quantum. Everything else is
//! classical. The distinction is computed once, at interning time, and then
//! carried on every `Symbol`.

use std::fmt;

use smallvec::SmallVec;

use crate::{Name, StringInterner, StringLookup};

/// Prefix marking a quantum name (`@q`, `@u3`).
pub const QUANTUM_SIGIL: char = '@';

/// Prefix standing in for [`QUANTUM_SIGIL`] in keyword-argument keys, where
/// `@` is not a valid identifier character (`q__d` names member `@d`).
pub const QUANTUM_KEY_PREFIX: &str = "q__";

/// Quantum or classical.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Paradigm {
    Classical,
    Quantum,
}

impl Paradigm {
    /// Paradigm of a raw name.
    #[inline]
    pub fn of(text: &str) -> Self {
        if text.starts_with(QUANTUM_SIGIL) {
            Paradigm::Quantum
        } else {
            Paradigm::Classical
        }
    }

    #[inline]
    pub fn is_quantum(self) -> bool {
        matches!(self, Paradigm::Quantum)
    }
}

impl fmt::Display for Paradigm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Paradigm::Classical => f.write_str("classical"),
            Paradigm::Quantum => f.write_str("quantum"),
        }
    }
}

/// A single interned identifier.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Symbol {
    name: Name,
    paradigm: Paradigm,
}

impl Symbol {
    /// Intern `text` and classify it.
    pub fn new(interner: &StringInterner, text: &str) -> Self {
        Symbol {
            name: interner.intern(text),
            paradigm: Paradigm::of(text),
        }
    }

    /// Rebuild a symbol from an already interned name.
    pub fn from_name(name: Name, lookup: &impl StringLookup) -> Self {
        Symbol {
            name,
            paradigm: Paradigm::of(lookup.lookup(name)),
        }
    }

    /// Intern a keyword-argument key, mapping `q__d` to `@d`.
    pub fn from_key(interner: &StringInterner, key: &str) -> Self {
        match key.strip_prefix(QUANTUM_KEY_PREFIX) {
            Some(rest) if !rest.is_empty() => {
                Symbol::new(interner, &format!("{QUANTUM_SIGIL}{rest}"))
            }
            _ => Symbol::new(interner, key),
        }
    }

    #[inline]
    pub const fn name(self) -> Name {
        self.name
    }

    #[inline]
    pub const fn paradigm(self) -> Paradigm {
        self.paradigm
    }

    #[inline]
    pub fn is_quantum(self) -> bool {
        self.paradigm.is_quantum()
    }

    pub fn render(self, lookup: &impl StringLookup) -> String {
        lookup.lookup(self.name).to_owned()
    }
}

/// A dotted path such as `geometry.point` or `color.red`.
///
/// Always holds at least one segment. The path is quantum iff its last
/// segment is.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct CompositeSymbol {
    head: Symbol,
    tail: SmallVec<[Symbol; 3]>,
}

impl CompositeSymbol {
    pub fn new(head: Symbol, tail: impl IntoIterator<Item = Symbol>) -> Self {
        CompositeSymbol {
            head,
            tail: tail.into_iter().collect(),
        }
    }

    /// Split `text` on `.` and intern every segment.
    pub fn parse(interner: &StringInterner, text: &str) -> Self {
        let mut parts = text.split('.').map(|part| Symbol::new(interner, part));
        let head = parts
            .next()
            .unwrap_or_else(|| Symbol::new(interner, text));
        CompositeSymbol::new(head, parts)
    }

    pub fn first(&self) -> Symbol {
        self.head
    }

    pub fn last(&self) -> Symbol {
        self.tail.last().copied().unwrap_or(self.head)
    }

    pub fn len(&self) -> usize {
        1 + self.tail.len()
    }

    /// Composite symbols are never empty; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        std::iter::once(self.head).chain(self.tail.iter().copied())
    }

    pub fn is_quantum(&self) -> bool {
        self.last().is_quantum()
    }

    pub fn render(&self, lookup: &impl StringLookup) -> String {
        let mut out = String::new();
        for (i, part) in self.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push_str(lookup.lookup(part.name()));
        }
        out
    }
}

/// Either kind of identifier; used for type names and member keys.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum SymbolPath {
    Symbol(Symbol),
    Composite(CompositeSymbol),
}

impl SymbolPath {
    /// Parse `text`, producing a plain symbol when it has no `.`.
    pub fn parse(interner: &StringInterner, text: &str) -> Self {
        if text.contains('.') {
            SymbolPath::Composite(CompositeSymbol::parse(interner, text))
        } else {
            SymbolPath::Symbol(Symbol::new(interner, text))
        }
    }

    pub fn is_quantum(&self) -> bool {
        match self {
            SymbolPath::Symbol(sym) => sym.is_quantum(),
            SymbolPath::Composite(path) => path.is_quantum(),
        }
    }

    pub fn paradigm(&self) -> Paradigm {
        if self.is_quantum() {
            Paradigm::Quantum
        } else {
            Paradigm::Classical
        }
    }

    pub fn as_symbol(&self) -> Option<Symbol> {
        match self {
            SymbolPath::Symbol(sym) => Some(*sym),
            SymbolPath::Composite(_) => None,
        }
    }

    /// The trailing segment (the symbol itself for a plain path).
    pub fn last(&self) -> Symbol {
        match self {
            SymbolPath::Symbol(sym) => *sym,
            SymbolPath::Composite(path) => path.last(),
        }
    }

    /// `self.segment`, e.g. the path `color.red` of variant `red`.
    pub fn join(&self, segment: Symbol) -> CompositeSymbol {
        match self {
            SymbolPath::Symbol(head) => CompositeSymbol::new(*head, [segment]),
            SymbolPath::Composite(path) => {
                CompositeSymbol::new(path.first(), path.iter().skip(1).chain([segment]))
            }
        }
    }

    pub fn render(&self, lookup: &impl StringLookup) -> String {
        match self {
            SymbolPath::Symbol(sym) => sym.render(lookup),
            SymbolPath::Composite(path) => path.render(lookup),
        }
    }
}

impl From<Symbol> for SymbolPath {
    fn from(sym: Symbol) -> Self {
        SymbolPath::Symbol(sym)
    }
}

impl From<CompositeSymbol> for SymbolPath {
    fn from(path: CompositeSymbol) -> Self {
        SymbolPath::Composite(path)
    }
}

impl PartialEq<Symbol> for SymbolPath {
    fn eq(&self, other: &Symbol) -> bool {
        self.as_symbol() == Some(*other)
    }
}
