//! Declarations and assignments.

use hhat_diagnostic::error::{
    not_implemented, type_mismatch, variable_redeclared, variable_wrong_member,
};
use hhat_diagnostic::CoreResult;
use hhat_ir::{Assign, Block, Declare, DeclareAssign, Operand, Symbol, SymbolPath, WorkingData};
use hhat_mem::TypedValue;
use hhat_types::{
    cast_literal, QSize, Stored, TdsKind, TypeDataStructure, VariableContainer, VariableKind,
};

use super::Resolver;

/// Resolved right-hand side of an assignment, ready to write.
pub(super) enum Plan {
    /// One value per member, in declaration order.
    Positional(Vec<WorkingData>),
    /// Values keyed by member name.
    Named(Vec<(SymbolPath, WorkingData)>),
    /// Member data copied out of another variable.
    Copy(Vec<(SymbolPath, Stored)>),
}

impl Plan {
    /// Write into `container`. Appendable containers replay every copied
    /// value; the rest take the latest one per member.
    pub(super) fn apply(self, container: &mut VariableContainer) -> CoreResult<()> {
        match self {
            Plan::Positional(values) => container.assign(values),
            Plan::Named(values) => container.assign_named(values),
            Plan::Copy(entries) => {
                let enum_shaped = container.kind() == TdsKind::Enum;
                if container.is_appendable() {
                    for (key, stored) in entries {
                        for value in stored.values() {
                            if enum_shaped {
                                container.assign(vec![value.clone()])?;
                            } else {
                                container.assign_named(vec![(key.clone(), value.clone())])?;
                            }
                        }
                    }
                    return Ok(());
                }
                let latest = entries
                    .into_iter()
                    .filter_map(|(key, stored)| stored.last().cloned().map(|value| (key, value)));
                if enum_shaped {
                    container.assign(latest.map(|(_, value)| value).collect())
                } else {
                    container.assign_named(latest.collect())
                }
            }
        }
    }
}

/// A container not yet in the heap, with the qubits it will declare.
pub(super) struct Pending {
    container: VariableContainer,
    demand: Option<u32>,
}

impl Pending {
    pub(super) fn container_mut(&mut self) -> &mut VariableContainer {
        &mut self.container
    }
}

impl Resolver<'_> {
    #[tracing::instrument(level = "debug", skip_all, fields(var = %decl.var.render(self.interner())))]
    pub(crate) fn declare(&mut self, decl: &Declare) -> CoreResult<()> {
        let pending = self.prepare(decl.var, &decl.ty, VariableKind::Mutable)?;
        self.commit(pending)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(var = %instr.var.render(self.interner())))]
    pub(crate) fn assign(&mut self, instr: &Assign) -> CoreResult<()> {
        let ty = self.find_var(instr.var)?.type_name().clone();
        let tds = self.lookup_type(&ty)?.clone();
        let plan = self.plan(&tds, &instr.value)?;
        plan.apply(self.find_var_mut(instr.var)?)
    }

    /// Declare and assign as one step: nothing lands in the heap unless the
    /// assignment succeeds.
    #[tracing::instrument(level = "debug", skip_all, fields(var = %decl.var.render(self.interner())))]
    pub(crate) fn declare_assign(&mut self, decl: &DeclareAssign) -> CoreResult<()> {
        let mut pending = self.prepare(decl.var, &decl.ty, VariableKind::Mutable)?;
        let tds = self.lookup_type(&decl.ty)?.clone();
        let plan = self.plan(&tds, &decl.value)?;
        plan.apply(pending.container_mut())?;
        self.commit(pending)
    }

    /// Build a container for `var` without touching the heap.
    pub(super) fn prepare(
        &self,
        var: Symbol,
        ty: &SymbolPath,
        kind: VariableKind,
    ) -> CoreResult<Pending> {
        if self.current()?.heap.contains(var) {
            return Err(variable_redeclared(var));
        }
        let tds = self.lookup_type(ty)?;
        let container = tds.call(var, kind)?;
        let demand = if var.is_quantum() {
            Some(tds.qsize().map_or(0, QSize::demand))
        } else {
            None
        };
        Ok(Pending { container, demand })
    }

    /// Register the qubit demand of a prepared container and move it into
    /// the current heap.
    pub(super) fn commit(&mut self, pending: Pending) -> CoreResult<()> {
        let Pending { container, demand } = pending;
        let key = self.qubit_key_in(self.current()?.id(), container.name());
        if let Some(qubits) = demand {
            self.indices_mut().add(key.clone(), qubits as usize)?;
        }
        if let Err(err) = self.mem.declare(container) {
            if demand.is_some() {
                self.indices_mut().retire(&key)?;
            }
            return Err(err);
        }
        Ok(())
    }

    /// Resolve the right-hand side `value` of an assignment to a variable
    /// of type `tds`.
    pub(super) fn plan(&mut self, tds: &TypeDataStructure, value: &Operand) -> CoreResult<Plan> {
        match value {
            Operand::Block(block) => match block.as_ref() {
                Block::Args(args) => {
                    let targets: Vec<SymbolPath> =
                        tds.members().iter().map(|(_, ty)| ty.clone()).collect();
                    let mut values = Vec::with_capacity(args.0.len());
                    for (idx, operand) in args.0.iter().enumerate() {
                        values.push(self.value_for(operand, targets.get(idx))?);
                    }
                    Ok(Plan::Positional(values))
                }
                Block::ArgsValues(args) => {
                    let mut values = Vec::with_capacity(args.0.len());
                    for (key, operand) in &args.0 {
                        let key = self.member_key(*key);
                        let target = tds.members().member_type(&key).cloned();
                        values.push((key, self.value_for(operand, target.as_ref())?));
                    }
                    Ok(Plan::Named(values))
                }
                Block::Body(_) | Block::Option(_) => {
                    Err(not_implemented("assigning a body or option block"))
                }
            },
            Operand::Data(WorkingData::Symbol(src)) if !self.is_variant(tds.name(), *src) => {
                let source = self.find_var(*src)?;
                if source.type_name() != tds.name() {
                    return Err(type_mismatch(tds.name().clone(), source.type_name().clone()));
                }
                let entries: Vec<(SymbolPath, Stored)> = source
                    .entries()
                    .into_iter()
                    .map(|(key, stored)| (key, stored.clone()))
                    .collect();
                if entries.is_empty() {
                    return Err(variable_wrong_member(*src, None));
                }
                Ok(Plan::Copy(entries))
            }
            _ => {
                let target = tds.single_member_type().unwrap_or(tds.name()).clone();
                Ok(Plan::Positional(vec![self.value_for(value, Some(&target))?]))
            }
        }
    }

    /// Evaluate `operand` for a slot of type `target`.
    fn value_for(&mut self, operand: &Operand, target: Option<&SymbolPath>) -> CoreResult<WorkingData> {
        if let Some(target) = target {
            match operand {
                Operand::Data(WorkingData::Symbol(sym)) if self.is_variant(target, *sym) => {
                    return Ok(WorkingData::from(target.join(*sym)));
                }
                Operand::Data(WorkingData::Composite(path))
                    if *path == target.join(path.last()) =>
                {
                    return Ok(WorkingData::from(path.clone()));
                }
                _ => {}
            }
        }
        let value = self.eval_operand(operand)?;
        match target {
            Some(target) => self.coerce(value, target),
            None => Ok(value.data),
        }
    }

    /// Fit a value to a slot of type `target`.
    ///
    /// Literals pass when their type matches or converts through the
    /// built-in compatibility table, range checked. Any other value must
    /// already carry the target type.
    pub(super) fn coerce(&mut self, value: TypedValue, target: &SymbolPath) -> CoreResult<WorkingData> {
        match value.data {
            WorkingData::Literal(lit) => {
                let ty = SymbolPath::from(lit.ty());
                if ty != *target && !self.builtins().converts(lit.ty(), target) {
                    return Err(type_mismatch(target.clone(), ty));
                }
                let lit = cast_literal(self.builtins(), lit, target)?;
                if let Some(builtin) = self.builtins().get(target).cloned() {
                    self.symbols_mut().types.add(builtin);
                }
                Ok(lit.into())
            }
            WorkingData::CompositeLiteral(lit) => {
                let ty = SymbolPath::from(lit.ty());
                if ty != *target {
                    return Err(type_mismatch(target.clone(), ty));
                }
                Ok(lit.into())
            }
            data => {
                if value.ty != *target {
                    return Err(type_mismatch(target.clone(), value.ty));
                }
                Ok(data)
            }
        }
    }

    /// Whether `sym` is a variant of the enum type `ty`.
    fn is_variant(&self, ty: &SymbolPath, sym: Symbol) -> bool {
        self.lookup_type(ty).is_ok_and(|tds| {
            tds.kind() == TdsKind::Enum && tds.members().contains(&SymbolPath::from(sym))
        })
    }

    /// Member key of a keyword argument; `q__d` names the quantum member `@d`.
    pub(super) fn member_key(&self, key: Symbol) -> SymbolPath {
        let interner = self.interner();
        Symbol::from_key(interner, interner.lookup(key.name())).into()
    }
}
