//! Operand evaluation and casts.

use hhat_diagnostic::error::{
    cast_error, heap_invalid_key, missing_value, not_implemented, variable_wrong_member,
};
use hhat_diagnostic::CoreResult;
use hhat_ir::{Cast, CompositeSymbol, Instr, Operand, Symbol, SymbolPath, WorkingData};
use hhat_mem::TypedValue;
use hhat_types::{cast_literal, Stored, TdsKind};

use super::{Resolve, Resolver};
use crate::stack::ensure_sufficient_stack;

impl Resolver<'_> {
    /// Evaluate an operand to a single typed value.
    ///
    /// Nested instructions are resolved first and their result popped from
    /// the current stack.
    pub(crate) fn eval_operand(&mut self, operand: &Operand) -> CoreResult<TypedValue> {
        match operand {
            Operand::Data(data) => self.eval_data(data),
            Operand::Instr(instr) => self.eval_instr(instr),
            Operand::Block(_) => Err(not_implemented("blocks in value position")),
        }
    }

    fn eval_instr(&mut self, instr: &Instr) -> CoreResult<TypedValue> {
        let before = self.current()?.stack.len();
        ensure_sufficient_stack(|| instr.resolve(self))?;
        let stack = &mut self.current_mut()?.stack;
        if stack.len() <= before {
            return Err(missing_value(instr.flag()));
        }
        stack.pop()
    }

    fn eval_data(&self, data: &WorkingData) -> CoreResult<TypedValue> {
        match data {
            WorkingData::Literal(lit) => Ok(TypedValue::new(*lit, lit.ty())),
            WorkingData::CompositeLiteral(lit) => Ok(TypedValue::new(lit.clone(), lit.ty())),
            WorkingData::Symbol(var) => self.read_var(*var),
            WorkingData::Composite(path) => self.read_path(path),
        }
    }

    /// Classical single-member and enum variables read as their value.
    /// Anything else reads as a reference to the variable.
    fn read_var(&self, var: Symbol) -> CoreResult<TypedValue> {
        let container = self.find_var(var)?;
        let ty = container.type_name().clone();
        if container.kind() == TdsKind::Enum {
            let Some(&WorkingData::Symbol(variant)) = container.get(None)?.last() else {
                return Err(variable_wrong_member(var, None));
            };
            return Ok(TypedValue::new(ty.join(variant), ty));
        }
        if container.is_quantum() || container.layout().len() != 1 {
            return Ok(TypedValue::new(var, ty));
        }
        let value = container
            .get(None)?
            .last()
            .cloned()
            .ok_or_else(|| variable_wrong_member(var, None))?;
        Ok(TypedValue::new(value, ty))
    }

    /// `p.x` reads member `x` of variable `p`; `color.red` names a variant.
    fn read_path(&self, path: &CompositeSymbol) -> CoreResult<TypedValue> {
        let head = path.first();
        if let Ok(container) = self.find_var(head) {
            if container.is_quantum() {
                return Err(not_implemented("reading quantum members"));
            }
            let member = SymbolPath::from(path.last());
            let wrong_member = || variable_wrong_member(head, Some(member.clone()));
            let ty = container
                .layout()
                .member_type(&member)
                .cloned()
                .ok_or_else(wrong_member)?;
            let value = container
                .get(Some(&member))?
                .last()
                .cloned()
                .ok_or_else(wrong_member)?;
            return Ok(TypedValue::new(value, ty));
        }

        let ty = SymbolPath::from(head);
        match self.lookup_type(&ty) {
            Ok(tds) if tds.kind() == TdsKind::Enum => Ok(TypedValue::new(path.clone(), ty)),
            _ => Err(heap_invalid_key(head)),
        }
    }

    /// The latest value of a Single-shaped variable read by reference
    /// (quantum variables); anything else stays a reference.
    fn held_literal(&self, var: Symbol) -> CoreResult<WorkingData> {
        let container = self.find_var(var)?;
        if container.kind() != TdsKind::Single || container.layout().len() != 1 {
            return Ok(var.into());
        }
        Ok(container
            .get(None)
            .ok()
            .and_then(Stored::last)
            .cloned()
            .unwrap_or_else(|| var.into()))
    }

    #[tracing::instrument(level = "debug", skip_all, fields(to = %cast.to.render(self.interner())))]
    pub(crate) fn cast(&mut self, cast: &Cast) -> CoreResult<()> {
        let value = self.eval_operand(&cast.value)?;
        let data = match value.data {
            WorkingData::Symbol(var) => self.held_literal(var)?,
            data => data,
        };
        let WorkingData::Literal(lit) = data else {
            return Err(cast_error(value.ty, cast.to.clone()));
        };
        let out = cast_literal(self.builtins(), lit, &cast.to)?;
        self.current_mut()?.stack.push(TypedValue::new(out, cast.to.clone()));
        Ok(())
    }
}
