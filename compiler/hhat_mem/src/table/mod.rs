//! Symbol tables: user types and function overloads.

use rustc_hash::FxHashMap;

use hhat_diagnostic::error::{unknown_function, unknown_type};
use hhat_diagnostic::CoreResult;
use hhat_ir::{FnDef, FnSignature, Symbol, SymbolPath};
use hhat_types::TypeDataStructure;

/// Type name to TDS, in insertion order.
#[derive(Clone, Debug, Default)]
pub struct TypeTable {
    types: Vec<TypeDataStructure>,
    index: FxHashMap<SymbolPath, usize>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless a type of that name exists. Returns whether it was added.
    pub fn add(&mut self, tds: TypeDataStructure) -> bool {
        if self.index.contains_key(tds.name()) {
            return false;
        }
        tracing::debug!(members = tds.members().len(), "registered type");
        self.index.insert(tds.name().clone(), self.types.len());
        self.types.push(tds);
        true
    }

    pub fn get(&self, key: &SymbolPath) -> CoreResult<&TypeDataStructure> {
        self.lookup(key).ok_or_else(|| unknown_type(key.clone()))
    }

    fn lookup(&self, key: &SymbolPath) -> Option<&TypeDataStructure> {
        self.index.get(key).and_then(|&idx| self.types.get(idx))
    }

    pub fn get_or<'a>(
        &'a self,
        key: &SymbolPath,
        default: &'a TypeDataStructure,
    ) -> &'a TypeDataStructure {
        self.lookup(key).unwrap_or(default)
    }

    pub fn contains(&self, key: &SymbolPath) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeDataStructure> + '_ {
        self.types.iter()
    }
}

/// How to look a function up.
#[derive(Copy, Clone, Debug)]
pub enum FnQuery<'a> {
    /// Every overload of a name.
    Name(Symbol),
    /// Exactly one overload.
    Signature(&'a FnSignature),
}

/// Result of a [`FnTable::lookup`].
#[derive(Copy, Clone, Debug)]
pub enum FnLookup<'a> {
    Overloads(&'a [(FnSignature, FnDef)]),
    Def(&'a FnDef),
}

/// Function name to its overloads, keyed by ordered argument types.
#[derive(Clone, Debug, Default)]
pub struct FnTable {
    fns: FxHashMap<Symbol, Vec<(FnSignature, FnDef)>>,
}

impl FnTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the same signature exists. Returns whether it was added.
    pub fn add(&mut self, def: FnDef) -> bool {
        let signature = def.signature();
        let overloads = self.fns.entry(def.name).or_default();
        if overloads.iter().any(|(known, _)| *known == signature) {
            return false;
        }
        tracing::debug!(params = def.params.len(), "registered function");
        overloads.push((signature, def));
        true
    }

    pub fn lookup(&self, query: FnQuery<'_>) -> CoreResult<FnLookup<'_>> {
        match query {
            FnQuery::Name(name) => self
                .fns
                .get(&name)
                .map(|overloads| FnLookup::Overloads(overloads.as_slice()))
                .ok_or_else(|| unknown_function(name, None)),
            FnQuery::Signature(signature) => self
                .fns
                .get(&signature.name)
                .and_then(|overloads| overloads.iter().find(|(known, _)| known == signature))
                .map(|(_, def)| FnLookup::Def(def))
                .ok_or_else(|| unknown_function(signature.name, Some(signature.clone()))),
        }
    }

    /// Exact-signature lookup.
    pub fn get(&self, signature: &FnSignature) -> CoreResult<&FnDef> {
        match self.lookup(FnQuery::Signature(signature))? {
            FnLookup::Def(def) => Ok(def),
            FnLookup::Overloads(_) => Err(unknown_function(signature.name, Some(signature.clone()))),
        }
    }

    pub fn contains(&self, name: Symbol) -> bool {
        self.fns.contains_key(&name)
    }

    pub fn len(&self) -> usize {
        self.fns.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.fns.is_empty()
    }
}

/// The type and function tables of one program.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    pub types: TypeTable,
    pub fns: FnTable,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }
}
