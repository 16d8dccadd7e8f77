//! Function calls.

use hhat_diagnostic::error::{not_implemented, recursion_limit, unknown_function};
use hhat_diagnostic::CoreResult;
use hhat_ir::{
    ArgsValuesBlock, Call, CallArgs, CallShape, FnDef, FnParam, FnSignature, Operand, Symbol,
    WorkingData,
};
use hhat_mem::{FnLookup, FnQuery, ScopeOrigin, TypedValue};
use hhat_types::VariableKind;

use super::assign::Plan;
use super::Resolver;
use crate::stack::ensure_sufficient_stack;

impl Resolver<'_> {
    /// Resolve a bare call: evaluate the arguments onto the stack, dispatch
    /// on their exact types and run the body in a fresh `Call` scope.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(name = %call.name().render(self.interner()), depth = self.call_depth)
    )]
    pub(crate) fn call(&mut self, call: &Call) -> CoreResult<()> {
        match call.shape() {
            CallShape::Bare => {}
            CallShape::WithOption(_) => return Err(not_implemented("call with option")),
            CallShape::WithBody(_) => return Err(not_implemented("call with body")),
        }
        if self.call_depth >= self.max_call_depth {
            return Err(recursion_limit(self.call_depth + 1, self.max_call_depth));
        }

        let operands: Vec<&Operand> = match call.args() {
            CallArgs::Empty => Vec::new(),
            CallArgs::Args(args) => args.0.iter().collect(),
            CallArgs::ArgsValues(args) => self.ordered_args(call.name(), args)?,
        };
        let args = self.stage_args(&operands)?;

        let signature = FnSignature::new(call.name(), args.iter().map(|arg| arg.ty.clone()));
        let def = self.symbols().fns.get(&signature)?.clone();

        let mut plans = Vec::with_capacity(args.len());
        for arg in args {
            plans.push(self.arg_plan(arg)?);
        }

        // Only functions with a return type hand a value back.
        let returns = def.ret.is_some();
        self.call_depth += 1;
        let result = ensure_sufficient_stack(|| {
            self.with_scope(ScopeOrigin::Call(def.name), returns, |rt| rt.run_fn(&def, plans))
        });
        self.call_depth -= 1;
        result
    }

    /// Push every argument in order, then take them back off as the call's
    /// arguments. A failed argument leaves the stack as it was.
    fn stage_args(&mut self, operands: &[&Operand]) -> CoreResult<Vec<TypedValue>> {
        let mut pushed = 0;
        for operand in operands {
            match self.eval_operand(operand) {
                Ok(value) => {
                    self.current_mut()?.stack.push(value);
                    pushed += 1;
                }
                Err(err) => {
                    let stack = &mut self.current_mut()?.stack;
                    for _ in 0..pushed {
                        stack.pop()?;
                    }
                    return Err(err);
                }
            }
        }

        let stack = &mut self.current_mut()?.stack;
        let mut args = Vec::with_capacity(pushed);
        for _ in 0..pushed {
            args.push(stack.pop()?);
        }
        args.reverse();
        Ok(args)
    }

    /// Keyword arguments must name the parameters of some overload in
    /// declaration order.
    fn ordered_args<'a>(&self, name: Symbol, args: &'a ArgsValuesBlock) -> CoreResult<Vec<&'a Operand>> {
        let names: Vec<Symbol> = args
            .0
            .iter()
            .filter_map(|(key, _)| self.member_key(*key).as_symbol())
            .collect();
        let FnLookup::Overloads(overloads) = self.symbols().fns.lookup(FnQuery::Name(name))? else {
            return Err(unknown_function(name, None));
        };
        if overloads.iter().any(|(_, def)| def.args_in_order(&names)) {
            return Ok(args.0.iter().map(|(_, value)| value).collect());
        }
        if overloads.iter().any(|(_, def)| def.has_args(&names)) {
            return Err(not_implemented("argument reordering"));
        }
        Err(unknown_function(name, None).with_note("no overload takes these argument names"))
    }

    /// Capture an argument's data before the caller's scope goes out of
    /// sight. References copy the referenced variable.
    fn arg_plan(&self, arg: TypedValue) -> CoreResult<Plan> {
        match arg.data {
            WorkingData::Symbol(var) => {
                let entries = self
                    .find_var(var)?
                    .entries()
                    .into_iter()
                    .map(|(key, stored)| (key, stored.clone()))
                    .collect();
                Ok(Plan::Copy(entries))
            }
            data => Ok(Plan::Positional(vec![data])),
        }
    }

    /// Bind parameters, resolve the body and fit any result to the return
    /// type. Runs inside the call scope.
    fn run_fn(&mut self, def: &FnDef, plans: Vec<Plan>) -> CoreResult<()> {
        for (param, plan) in def.params.iter().zip(plans) {
            self.bind(param, plan)?;
        }
        self.resolve_body(&def.body)?;

        if let Some(ret) = &def.ret {
            if let Some(value) = self.current()?.stack.peek().cloned() {
                let data = self.coerce(value, ret)?;
                let stack = &mut self.current_mut()?.stack;
                stack.pop()?;
                stack.push(TypedValue::new(data, ret.clone()));
            }
        }
        Ok(())
    }

    fn bind(&mut self, param: &FnParam, plan: Plan) -> CoreResult<()> {
        let mut pending = self.prepare(param.name, &param.ty, VariableKind::Immutable)?;
        plan.apply(pending.container_mut())?;
        self.commit(pending)
    }
}
