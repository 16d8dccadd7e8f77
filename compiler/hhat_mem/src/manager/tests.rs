use hhat_diagnostic::{CoreErrorKind, ErrorCode};
use hhat_ir::{CoreLiteral, SharedInterner, Symbol, SymbolPath};
use hhat_types::VariableKind;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;
use crate::stack::TypedValue;

fn manager() -> MemoryManager {
    MemoryManager::new(SharedInterner::new(), 8)
}

fn value(mem: &MemoryManager, n: i128) -> TypedValue {
    let u32_ty = Symbol::new(mem.interner(), "u32");
    TypedValue::new(CoreLiteral::int(n, u32_ty), u32_ty)
}

fn declare(mem: &mut MemoryManager, name: &str, ty: &str) {
    let ty = SymbolPath::parse(mem.interner(), ty);
    let var = Symbol::new(mem.interner(), name);
    let container = mem.lookup_type(&ty).unwrap().call(var, VariableKind::Mutable).unwrap();
    mem.declare(container).unwrap();
}

#[test]
fn depth_tracks_nesting() {
    let mut mem = manager();
    let main = mem.new_scope(ScopeOrigin::Main);
    let block = mem.new_scope(ScopeOrigin::Block);

    assert_eq!(mem.current().unwrap().id(), block);
    assert_eq!(mem.current().unwrap().depth(), 2);
    assert_eq!(mem.scope(main).unwrap().depth(), 1);

    mem.free_scope(block, false).unwrap();
    assert_eq!(mem.current().unwrap().id(), main);
}

#[test]
fn returned_value_moves_down() {
    let mut mem = manager();
    let s1 = mem.new_scope(ScopeOrigin::Main);
    let s2 = mem.new_scope(ScopeOrigin::Block);
    let s3 = mem.new_scope(ScopeOrigin::Call(Symbol::new(mem.interner(), "f")));

    let v = value(&mem, 42);
    mem.current_mut().unwrap().stack.push(v.clone());
    mem.free_scope(s3, true).unwrap();

    assert_eq!(mem.current().unwrap().id(), s2);
    assert_eq!(mem.current().unwrap().stack.peek(), Some(&v));
    assert!(mem.scope(s1).unwrap().stack.is_empty());
}

#[test]
fn freeing_out_of_order_is_fatal() {
    let mut mem = manager();
    let s1 = mem.new_scope(ScopeOrigin::Main);
    let s2 = mem.new_scope(ScopeOrigin::Block);

    let err = mem.free_scope(s1, false).unwrap_err();
    assert_eq!(
        err.kind,
        CoreErrorKind::ScopeOrderViolation {
            expected: s2.raw(),
            found: s1.raw(),
        }
    );
    assert!(err.is_fatal());
    assert_eq!(mem.depth(), 2);
}

#[test]
fn empty_mind_is_fatal() {
    let mut mem = manager();
    assert_eq!(mem.current().unwrap_err().code(), ErrorCode::E9001);

    let main = mem.new_scope(ScopeOrigin::Main);
    let v = value(&mem, 1);
    mem.current_mut().unwrap().stack.push(v);
    let err = mem.free_scope(main, true).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E9001);

    mem.free_scope(main, false).unwrap();
    assert_eq!(mem.free_scope(main, false).unwrap_err().code(), ErrorCode::E9001);
}

#[test]
fn unknown_scope_is_missing() {
    let mut mem = manager();
    let main = mem.new_scope(ScopeOrigin::Main);
    let gone = mem.new_scope(ScopeOrigin::Block);
    mem.free_scope(gone, false).unwrap();

    assert_eq!(mem.free_scope(gone, false).unwrap_err().code(), ErrorCode::E9003);
    assert_eq!(mem.current().unwrap().id(), main);
}

#[test]
fn freeing_retires_quantum_variables() {
    let mut mem = manager();
    let _main = mem.new_scope(ScopeOrigin::Main);
    let inner = mem.new_scope(ScopeOrigin::Block);

    declare(&mut mem, "@q", "@u3");
    let key = mem.qubit_key(Symbol::new(mem.interner(), "@q")).unwrap();
    mem.indices_mut().add(key.clone(), 3).unwrap();
    mem.indices_mut().request(&key).unwrap();
    assert_eq!(mem.indices().available(), 5);

    mem.free_scope(inner, false).unwrap();
    assert_eq!(mem.indices().available(), 8);
    assert_eq!(mem.indices().declared(), 0);
}

#[test]
fn shadowed_quantum_names_get_their_own_keys() {
    let mut mem = manager();
    let main = mem.new_scope(ScopeOrigin::Main);
    let q = Symbol::new(mem.interner(), "@q");
    declare(&mut mem, "@q", "@u3");
    let outer = mem.qubit_key(q).unwrap();
    mem.indices_mut().add(outer.clone(), 3).unwrap();

    let inner = mem.new_scope(ScopeOrigin::Block);
    assert_eq!(mem.qubit_key(q).unwrap(), outer);
    declare(&mut mem, "@q", "@u3");
    let shadow = mem.qubit_key(q).unwrap();
    assert_ne!(shadow, outer);
    assert_eq!(shadow, mem.qubit_key_in(inner, q));
    mem.indices_mut().add(shadow.clone(), 3).unwrap();

    mem.free_scope(inner, false).unwrap();
    assert_eq!(mem.indices().demand(&shadow), None);
    assert_eq!(mem.indices().demand(&outer), Some(3));
    assert_eq!(mem.qubit_key_in(main, q), outer);
}

#[test]
fn block_scopes_see_their_parent() {
    let mut mem = manager();
    let _main = mem.new_scope(ScopeOrigin::Main);
    declare(&mut mem, "x", "u32");
    let x = Symbol::new(mem.interner(), "x");

    let block = mem.new_scope(ScopeOrigin::Block);
    assert!(mem.find_var(x).is_ok());
    mem.free_scope(block, false).unwrap();

    let call = mem.new_scope(ScopeOrigin::Call(Symbol::new(mem.interner(), "f")));
    assert_eq!(mem.find_var(x).unwrap_err().code(), ErrorCode::E5001);
    mem.free_scope(call, false).unwrap();
}

#[test]
fn borrowed_variable_blocks_scope_free() {
    let mut mem = manager();
    let main = mem.new_scope(ScopeOrigin::Main);
    declare(&mut mem, "x", "u32");
    let x = Symbol::new(mem.interner(), "x");

    let loan = mem.find_var_mut(x).unwrap().borrow().unwrap();
    assert_eq!(mem.free_scope(main, false).unwrap_err().code(), ErrorCode::E3005);
    assert_eq!(mem.depth(), 1);

    mem.find_var_mut(x).unwrap().release(loan).unwrap();
    mem.free_scope(main, false).unwrap();
    assert_eq!(mem.depth(), 0);
}

#[test]
fn custom_types_shadow_builtins() {
    let mut mem = manager();
    let u32_ty = SymbolPath::parse(mem.interner(), "u32");

    assert!(mem.lookup_type(&u32_ty).unwrap().is_builtin());
    let unknown = SymbolPath::parse(mem.interner(), "point");
    assert_eq!(mem.lookup_type(&unknown).unwrap_err().code(), ErrorCode::E5003);

    let point = hhat_types::TypeDataStructure::new(unknown.clone(), hhat_types::TdsKind::Struct);
    mem.symbols_mut().types.add(point);
    assert!(!mem.lookup_type(&unknown).unwrap().is_builtin());
}

proptest! {
    #[test]
    fn scopes_unwind_in_lifo_order(depth in 1usize..12, returns in prop::collection::vec(any::<bool>(), 12)) {
        let mut mem = manager();
        let mut ids = vec![mem.new_scope(ScopeOrigin::Main)];
        for _ in 0..depth {
            ids.push(mem.new_scope(ScopeOrigin::Block));
        }

        let mut expected_below = 0usize;
        while ids.len() > 1 {
            let id = ids.pop().unwrap();
            let to_return = returns[ids.len()];
            if to_return {
                let pushed = value(&mem, i128::try_from(ids.len()).unwrap());
                mem.current_mut().unwrap().stack.push(pushed);
            }
            let below_before = mem.scope(ids[ids.len() - 1]).unwrap().stack.len();
            mem.free_scope(id, to_return).unwrap();

            prop_assert_eq!(mem.current().unwrap().id(), ids[ids.len() - 1]);
            let below_after = mem.current().unwrap().stack.len();
            prop_assert_eq!(below_after, below_before + usize::from(to_return));
            expected_below = below_after;
        }
        prop_assert_eq!(mem.depth(), 1);
        prop_assert_eq!(mem.current().unwrap().stack.len(), expected_below);
    }
}
