//! The memory manager: scope arena, symbol table, qubit pool and built-ins.
//!
//! Scopes form a strict LIFO stack. The current scope is the most recently
//! opened one that has not been freed; only it may be freed. Freeing a scope
//! can hand its top stack value to the scope below, frees its heap and
//! retires the qubit demand of every quantum variable it held.
//!
//! Qubit demand is keyed per scope (see [`MemoryManager::qubit_key_in`]), so
//! a parameter or a shadowing block variable never collides with a variable
//! of the same name further down.

use hhat_diagnostic::error::{
    empty_mind, heap_invalid_key, missing_scope, scope_order_violation, stack_empty,
};
use hhat_diagnostic::CoreResult;
use hhat_ir::{CompositeSymbol, SharedInterner, Symbol, SymbolPath, WorkingData};
use hhat_types::{BuiltinTypes, TypeDataStructure, VariableContainer};

use crate::index::IndexManager;
use crate::scope::{Scope, ScopeId, ScopeOrigin};
use crate::table::SymbolTable;

pub struct MemoryManager {
    interner: SharedInterner,
    builtins: BuiltinTypes,
    symbols: SymbolTable,
    indices: IndexManager,
    scopes: Vec<Scope>,
    next_scope: u32,
}

impl MemoryManager {
    pub fn new(interner: SharedInterner, max_qubits: u32) -> Self {
        let builtins = BuiltinTypes::new(&interner);
        MemoryManager {
            interner,
            builtins,
            symbols: SymbolTable::new(),
            indices: IndexManager::new(max_qubits),
            scopes: Vec::new(),
            next_scope: 0,
        }
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn builtins(&self) -> &BuiltinTypes {
        &self.builtins
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    pub fn indices(&self) -> &IndexManager {
        &self.indices
    }

    pub fn indices_mut(&mut self) -> &mut IndexManager {
        &mut self.indices
    }

    /// Number of open scopes.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Open scopes, outermost first.
    pub fn scopes(&self) -> impl Iterator<Item = &Scope> + '_ {
        self.scopes.iter()
    }

    /// Push a fresh scope and make it current.
    pub fn new_scope(&mut self, origin: ScopeOrigin) -> ScopeId {
        let id = ScopeId::new(self.next_scope);
        self.next_scope += 1;
        let depth = self.scopes.len() + 1;
        tracing::trace!(scope = id.raw(), depth, origin = %origin.render(&self.interner), "scope opened");
        self.scopes.push(Scope::new(id, origin, depth));
        id
    }

    /// Free the current scope.
    ///
    /// With `to_return`, the scope's top stack value moves to the scope
    /// below, which becomes current. Freeing anything but the current scope,
    /// or freeing with no scope left, is fatal.
    pub fn free_scope(&mut self, id: ScopeId, to_return: bool) -> CoreResult<()> {
        let Some(top) = self.scopes.last() else {
            return Err(empty_mind());
        };
        if top.id() != id {
            if self.scopes.iter().all(|scope| scope.id() != id) {
                return Err(missing_scope(id.raw()));
            }
            return Err(scope_order_violation(top.id().raw(), id.raw()));
        }
        if to_return {
            if self.scopes.len() < 2 {
                return Err(empty_mind().with_note("no scope left to receive the returned value"));
            }
            if top.stack.is_empty() {
                return Err(stack_empty().with_note("scope was freed to return a value"));
            }
        }

        let quantum = self.current_mut()?.heap.free_all()?;
        let Some(mut scope) = self.scopes.pop() else {
            return Err(empty_mind());
        };

        let returned = if to_return { Some(scope.stack.pop()?) } else { None };
        if !scope.stack.is_empty() {
            tracing::warn!(
                scope = id.raw(),
                discarded = scope.stack.len(),
                "scope freed with values left on its stack"
            );
        }
        if let Some(value) = returned {
            self.current_mut()?.stack.push(value);
        }

        for name in quantum {
            let key = self.qubit_key_in(id, name);
            if self.indices.demand(&key).is_some() {
                self.indices.retire(&key)?;
            }
        }

        tracing::trace!(scope = id.raw(), depth = self.scopes.len(), "scope freed");
        Ok(())
    }

    pub fn current(&self) -> CoreResult<&Scope> {
        self.scopes.last().ok_or_else(empty_mind)
    }

    pub fn current_mut(&mut self) -> CoreResult<&mut Scope> {
        self.scopes.last_mut().ok_or_else(empty_mind)
    }

    pub fn scope(&self, id: ScopeId) -> CoreResult<&Scope> {
        self.scopes
            .iter()
            .find(|scope| scope.id() == id)
            .ok_or_else(|| missing_scope(id.raw()))
    }

    /// User types first, then built-ins.
    pub fn lookup_type(&self, ty: &SymbolPath) -> CoreResult<&TypeDataStructure> {
        match self.builtins.get(ty) {
            Some(builtin) => Ok(self.symbols.types.get_or(ty, builtin)),
            None => self.symbols.types.get(ty),
        }
    }

    /// Index of the innermost scope that can see `name`. Block scopes see
    /// through to their parent; call and main scopes do not.
    fn visible_scope(&self, name: Symbol) -> Option<usize> {
        for (idx, scope) in self.scopes.iter().enumerate().rev() {
            if scope.heap.contains(name) {
                return Some(idx);
            }
            if scope.origin() != ScopeOrigin::Block {
                break;
            }
        }
        None
    }

    pub fn find_var(&self, name: Symbol) -> CoreResult<&VariableContainer> {
        match self.visible_scope(name) {
            Some(idx) => self.scopes[idx].heap.get(name),
            None => self.current()?.heap.get(name),
        }
    }

    pub fn find_var_mut(&mut self, name: Symbol) -> CoreResult<&mut VariableContainer> {
        match self.visible_scope(name) {
            Some(idx) => self.scopes[idx].heap.get_mut(name),
            None => self.current_mut()?.heap.get_mut(name),
        }
    }

    /// Pool key of the quantum variable `name` declared in `scope`:
    /// `scope<id>.<name>`.
    pub fn qubit_key_in(&self, scope: ScopeId, name: Symbol) -> WorkingData {
        let raw = scope.raw();
        let head = Symbol::new(&self.interner, &format!("scope{raw}"));
        CompositeSymbol::new(head, [name]).into()
    }

    /// Pool key of the quantum variable `name` as seen from the current scope.
    pub fn qubit_key(&self, name: Symbol) -> CoreResult<WorkingData> {
        let idx = self.visible_scope(name).ok_or_else(|| heap_invalid_key(name))?;
        Ok(self.qubit_key_in(self.scopes[idx].id(), name))
    }

    /// Insert a container into the current heap.
    pub fn declare(&mut self, container: VariableContainer) -> CoreResult<()> {
        self.current_mut()?.heap.set(container)
    }
}

#[cfg(test)]
mod tests;
