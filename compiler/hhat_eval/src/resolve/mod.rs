//! Resolution of IR nodes against the memory manager.
//!
//! Every node kind implements [`Resolve`]. Resolution is sequential and all
//! of its side effects land on the [`MemoryManager`] a [`Resolver`] wraps:
//! declarations and assignments touch the current heap, calls and casts
//! leave their result on the current stack.

mod assign;
mod call;
mod operand;

use std::ops::{Deref, DerefMut};

use hhat_diagnostic::error::not_implemented;
use hhat_diagnostic::CoreResult;
use hhat_ir::{Block, BodyBlock, Instr, Node, Operand};
use hhat_mem::{MemoryManager, ScopeOrigin};

use crate::stack::ensure_sufficient_stack;

/// A node that can be resolved in the current scope.
pub trait Resolve {
    fn resolve(&self, rt: &mut Resolver<'_>) -> CoreResult<()>;
}

/// Resolution state: the memory manager plus the call-depth budget.
///
/// Derefs to the wrapped [`MemoryManager`].
pub struct Resolver<'m> {
    mem: &'m mut MemoryManager,
    max_call_depth: usize,
    call_depth: usize,
}

impl<'m> Resolver<'m> {
    pub fn new(mem: &'m mut MemoryManager, max_call_depth: usize) -> Self {
        Resolver {
            mem,
            max_call_depth,
            call_depth: 0,
        }
    }

    /// Number of calls currently being resolved.
    pub fn call_depth(&self) -> usize {
        self.call_depth
    }

    /// Resolve `body` node by node in the current scope.
    pub fn resolve_body(&mut self, body: &BodyBlock) -> CoreResult<()> {
        for node in &body.0 {
            node.resolve(self)?;
        }
        Ok(())
    }

    /// Run `f` inside a fresh scope of the given origin.
    ///
    /// On success the scope is freed; with `returns`, its top stack value (if
    /// any) goes to the enclosing scope, otherwise the stack is discarded. On
    /// failure the scope is unwound without a value and the original error
    /// is returned.
    pub(crate) fn with_scope<F>(&mut self, origin: ScopeOrigin, returns: bool, f: F) -> CoreResult<()>
    where
        F: FnOnce(&mut Self) -> CoreResult<()>,
    {
        let id = self.mem.new_scope(origin);
        match f(self) {
            Ok(()) => {
                let to_return = returns && !self.mem.current()?.stack.is_empty();
                self.mem.free_scope(id, to_return)
            }
            Err(err) => {
                if let Err(unwind) = self.mem.free_scope(id, false) {
                    tracing::debug!(code = %unwind.code(), "scope not unwound after a failure");
                }
                Err(err)
            }
        }
    }

    fn push_operands<'a>(&mut self, operands: impl IntoIterator<Item = &'a Operand>) -> CoreResult<()> {
        let mut values = Vec::new();
        for operand in operands {
            values.push(self.eval_operand(operand)?);
        }
        let stack = &mut self.mem.current_mut()?.stack;
        for value in values {
            stack.push(value);
        }
        Ok(())
    }
}

impl Deref for Resolver<'_> {
    type Target = MemoryManager;

    fn deref(&self) -> &MemoryManager {
        self.mem
    }
}

impl DerefMut for Resolver<'_> {
    fn deref_mut(&mut self) -> &mut MemoryManager {
        self.mem
    }
}

impl Resolve for Node {
    fn resolve(&self, rt: &mut Resolver<'_>) -> CoreResult<()> {
        match self {
            Node::Instr(instr) => instr.resolve(rt),
            Node::Block(block) => block.resolve(rt),
        }
    }
}

impl Resolve for Instr {
    fn resolve(&self, rt: &mut Resolver<'_>) -> CoreResult<()> {
        match self {
            Instr::Declare(decl) => rt.declare(decl),
            Instr::Assign(assign) => rt.assign(assign),
            Instr::DeclareAssign(decl) => rt.declare_assign(decl),
            Instr::Call(call) => rt.call(call),
            Instr::Cast(cast) => rt.cast(cast),
        }
    }
}

impl Resolve for Block {
    fn resolve(&self, rt: &mut Resolver<'_>) -> CoreResult<()> {
        match self {
            Block::Body(body) => ensure_sufficient_stack(|| {
                rt.with_scope(ScopeOrigin::Block, true, |rt| rt.resolve_body(body))
            }),
            // Bare argument blocks leave their values on the stack.
            Block::Args(args) => rt.push_operands(&args.0),
            Block::ArgsValues(args) => rt.push_operands(args.0.iter().map(|(_, value)| value)),
            Block::Option(_) => Err(not_implemented("option blocks")),
        }
    }
}

#[cfg(test)]
mod tests;
