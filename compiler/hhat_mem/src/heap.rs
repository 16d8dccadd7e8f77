//! Per-scope heap of variable containers.

use rustc_hash::FxHashMap;

use hhat_diagnostic::error::{heap_invalid_key, variable_freeing_borrowed, variable_redeclared};
use hhat_diagnostic::CoreResult;
use hhat_ir::Symbol;
use hhat_types::VariableContainer;

#[derive(Clone, Debug)]
enum Slot {
    Live(VariableContainer),
    /// Left behind by `transfer`.
    Tombstone,
}

#[derive(Clone, Debug, Default)]
pub struct Heap {
    slots: FxHashMap<Symbol, Slot>,
    order: Vec<Symbol>,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly declared container. A live variable of the same
    /// name is a redeclaration; a tombstone may be reused.
    pub fn set(&mut self, container: VariableContainer) -> CoreResult<()> {
        let name = container.name();
        match self.slots.get(&name) {
            Some(Slot::Live(_)) => return Err(variable_redeclared(name)),
            Some(Slot::Tombstone) => {}
            None => self.order.push(name),
        }
        self.slots.insert(name, Slot::Live(container));
        Ok(())
    }

    pub fn get(&self, name: Symbol) -> CoreResult<&VariableContainer> {
        match self.slots.get(&name) {
            Some(Slot::Live(container)) => Ok(container),
            Some(Slot::Tombstone) => {
                Err(heap_invalid_key(name).with_note("variable was transferred out"))
            }
            None => Err(heap_invalid_key(name)),
        }
    }

    pub fn get_mut(&mut self, name: Symbol) -> CoreResult<&mut VariableContainer> {
        match self.slots.get_mut(&name) {
            Some(Slot::Live(container)) => Ok(container),
            Some(Slot::Tombstone) => {
                Err(heap_invalid_key(name).with_note("variable was transferred out"))
            }
            None => Err(heap_invalid_key(name)),
        }
    }

    /// Whether `name` is a live variable here.
    pub fn contains(&self, name: Symbol) -> bool {
        matches!(self.slots.get(&name), Some(Slot::Live(_)))
    }

    /// Move a container out, leaving a tombstone.
    pub fn transfer(&mut self, name: Symbol) -> CoreResult<VariableContainer> {
        let moved = self.get_mut(name)?.transfer()?;
        self.slots.insert(name, Slot::Tombstone);
        Ok(moved)
    }

    /// Live containers in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &VariableContainer> + '_ {
        self.order.iter().filter_map(|name| match self.slots.get(name) {
            Some(Slot::Live(container)) => Some(container),
            Some(Slot::Tombstone) | None => None,
        })
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Free every container and empty the heap. Nothing is freed if any
    /// variable is still borrowed. Returns the names of the quantum
    /// variables that were held.
    pub fn free_all(&mut self) -> CoreResult<Vec<Symbol>> {
        if let Some(borrowed) = self.iter().find(|container| container.is_borrowed()) {
            return Err(variable_freeing_borrowed(borrowed.name())
                .with_note("release every loan before the scope ends"));
        }

        let mut quantum = Vec::new();
        for name in std::mem::take(&mut self.order) {
            if let Some(Slot::Live(mut container)) = self.slots.remove(&name) {
                container.free()?;
                if container.is_quantum() {
                    quantum.push(name);
                }
            }
        }
        self.slots.clear();
        Ok(quantum)
    }
}
