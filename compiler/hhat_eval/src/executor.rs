//! Program execution: load a module, resolve its main block, hand the
//! resulting memory to a backend.

use hhat_diagnostic::{CoreError, CoreResult};
use hhat_ir::{BodyBlock, IrModule, SharedInterner};
use hhat_mem::{MemoryManager, ScopeId, ScopeOrigin};

use crate::build::build_types;
use crate::resolve::Resolver;

/// Execution limits.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Capacity of the qubit index pool.
    pub max_qubits: u32,
    /// Deepest call nesting before resolution gives up.
    pub max_call_depth: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        ExecutorConfig {
            max_qubits: 32,
            max_call_depth: 256,
        }
    }
}

/// Builder for [`Executor`].
#[derive(Default)]
pub struct ExecutorBuilder {
    config: ExecutorConfig,
    interner: Option<SharedInterner>,
}

impl ExecutorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn max_qubits(mut self, max_qubits: u32) -> Self {
        self.config.max_qubits = max_qubits;
        self
    }

    #[must_use]
    pub fn max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.config.max_call_depth = max_call_depth;
        self
    }

    /// Share the front-end's interner, so names in the IR and in the
    /// executor's memory are the same.
    #[must_use]
    pub fn interner(mut self, interner: SharedInterner) -> Self {
        self.interner = Some(interner);
        self
    }

    pub fn build(self) -> Executor {
        let interner = self.interner.unwrap_or_default();
        Executor {
            mem: MemoryManager::new(interner, self.config.max_qubits),
            config: self.config,
            main: BodyBlock::default(),
            main_scope: None,
        }
    }
}

/// Resolves IR modules into memory state for a backend.
pub struct Executor {
    mem: MemoryManager,
    config: ExecutorConfig,
    main: BodyBlock,
    main_scope: Option<ScopeId>,
}

impl Executor {
    pub fn builder() -> ExecutorBuilder {
        ExecutorBuilder::new()
    }

    pub fn config(&self) -> ExecutorConfig {
        self.config
    }

    /// Register the module's types and functions and queue its main block.
    ///
    /// Types are registered only if every definition in the module builds.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(types = module.types.len(), fns = module.fns.len())
    )]
    pub fn load(&mut self, module: &IrModule) -> CoreResult<()> {
        let types = build_types(&self.mem, &module.types)?;
        for tds in types {
            let name = tds.name().render(self.mem.interner());
            if !self.mem.symbols_mut().types.add(tds) {
                tracing::warn!(%name, "type already defined; keeping the first definition");
            }
        }
        for def in &module.fns {
            if !self.mem.symbols_mut().fns.add(def.clone()) {
                let signature = def.signature().render(self.mem.interner());
                tracing::warn!(%signature, "function already defined; keeping the first definition");
            }
        }
        self.main.0.extend(module.main.0.iter().cloned());
        Ok(())
    }

    /// Resolve the queued main block in the `Main` scope.
    ///
    /// The scope stays open afterwards so its variables can be read. Each
    /// queued node runs once; a failing node stops the run.
    #[tracing::instrument(level = "debug", skip_all, fields(nodes = self.main.0.len()))]
    pub fn run(&mut self) -> CoreResult<()> {
        if self.main_scope.is_none() {
            self.main_scope = Some(self.mem.new_scope(ScopeOrigin::Main));
        }
        let main = std::mem::take(&mut self.main);
        let mut rt = Resolver::new(&mut self.mem, self.config.max_call_depth);
        let result = rt.resolve_body(&main);
        if let Err(err) = &result {
            if err.is_fatal() {
                tracing::error!(code = %err.code(), "fatal error; run halted");
            } else {
                tracing::debug!(code = %err.code(), "run aborted");
            }
        }
        result
    }

    /// Free the `Main` scope, retiring every qubit its variables held.
    pub fn finish(&mut self) -> CoreResult<()> {
        match self.main_scope.take() {
            Some(id) => self.mem.free_scope(id, false),
            None => Ok(()),
        }
    }

    pub fn memory(&self) -> &MemoryManager {
        &self.mem
    }

    pub fn memory_mut(&mut self) -> &mut MemoryManager {
        &mut self.mem
    }

    pub fn interner(&self) -> &SharedInterner {
        self.mem.interner()
    }

    /// Render `err` with interned names resolved.
    pub fn report(&self, err: &CoreError) -> String {
        err.display(self.mem.interner())
    }
}
