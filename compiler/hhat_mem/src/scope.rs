//! Lexical scopes: one stack and one heap per nesting level.

use hhat_ir::{StringLookup, Symbol};

use crate::heap::Heap;
use crate::stack::Stack;

/// Arena index of a scope. Ids grow monotonically and are never reused.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct ScopeId(u32);

impl ScopeId {
    pub(crate) const fn new(raw: u32) -> Self {
        ScopeId(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// What opened a scope.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ScopeOrigin {
    Main,
    Call(Symbol),
    Block,
}

impl ScopeOrigin {
    pub fn render(self, lookup: &impl StringLookup) -> String {
        match self {
            ScopeOrigin::Main => "main".to_owned(),
            ScopeOrigin::Call(name) => format!("call {}", name.render(lookup)),
            ScopeOrigin::Block => "block".to_owned(),
        }
    }
}

#[derive(Debug)]
pub struct Scope {
    id: ScopeId,
    origin: ScopeOrigin,
    depth: usize,
    pub stack: Stack,
    pub heap: Heap,
}

impl Scope {
    pub(crate) fn new(id: ScopeId, origin: ScopeOrigin, depth: usize) -> Self {
        Scope {
            id,
            origin,
            depth,
            stack: Stack::new(),
            heap: Heap::new(),
        }
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn origin(&self) -> ScopeOrigin {
        self.origin
    }

    /// One for the outermost scope.
    pub fn depth(&self) -> usize {
        self.depth
    }
}
