use hhat_diagnostic::{CoreErrorKind, ErrorCode};
use hhat_ir::{
    ArgsBlock, ArgsValuesBlock, BodyBlock, Call, CallArgs, CompositeSymbol, CoreLiteral, FnDef,
    FnParam, LiteralValue, OptionBlock, SharedInterner, StringInterner, Symbol, SymbolPath, WorkingData,
};
use hhat_mem::{MemoryManager, ScopeOrigin, TypedValue};
use hhat_types::{Stored, TdsKind, TypeDataStructure};
use pretty_assertions::assert_eq;

use super::*;

const MAX_CALL_DEPTH: usize = 16;

/// A manager with an open main scope, plus a handle on its interner.
fn manager() -> (MemoryManager, SharedInterner) {
    let interner = SharedInterner::new();
    let mut mem = MemoryManager::new(interner.clone(), 8);
    mem.new_scope(ScopeOrigin::Main);
    (mem, interner)
}

fn sym(interner: &StringInterner, text: &str) -> Symbol {
    Symbol::new(interner, text)
}

fn path(interner: &StringInterner, text: &str) -> SymbolPath {
    SymbolPath::parse(interner, text)
}

fn lit(interner: &StringInterner, value: i128, ty: &str) -> CoreLiteral {
    CoreLiteral::int(value, sym(interner, ty))
}

fn run(mem: &mut MemoryManager, nodes: Vec<Node>) -> CoreResult<()> {
    Resolver::new(mem, MAX_CALL_DEPTH).resolve_body(&BodyBlock(nodes))
}

fn stored(mem: &MemoryManager, var: &str) -> Stored {
    mem.find_var(sym(mem.interner(), var)).unwrap().get(None).unwrap().clone()
}

fn register_point(mem: &mut MemoryManager) {
    let u32_ty = mem.builtins().get(&path(mem.interner(), "u32")).unwrap().clone();
    let mut point = TypeDataStructure::new(path(mem.interner(), "point"), TdsKind::Struct);
    point
        .add_member(&u32_ty, Some(sym(mem.interner(), "x")))
        .unwrap()
        .add_member(&u32_ty, Some(sym(mem.interner(), "y")))
        .unwrap();
    mem.symbols_mut().types.add(point);
}

fn register_color(mem: &mut MemoryManager) {
    let mut color = TypeDataStructure::new(path(mem.interner(), "color"), TdsKind::Enum);
    for variant in ["red", "green", "blue"] {
        color.add_variant(sym(mem.interner(), variant)).unwrap();
    }
    mem.symbols_mut().types.add(color);
}

fn register_fn(mem: &mut MemoryManager, name: &str, params: &[(&str, &str)], ret: Option<&str>, body: Vec<Node>) {
    let def = FnDef {
        name: sym(mem.interner(), name),
        params: params
            .iter()
            .map(|(param, ty)| FnParam {
                name: sym(mem.interner(), param),
                ty: path(mem.interner(), ty),
            })
            .collect(),
        ret: ret.map(|ty| path(mem.interner(), ty)),
        body: BodyBlock(body),
    };
    mem.symbols_mut().fns.add(def);
}

#[test]
fn declare_then_assign_literal() {
    let (mut mem, i) = manager();
    let x = sym(&i, "x");
    let value = lit(&i, 108, "u32");

    run(
        &mut mem,
        vec![
            Instr::declare(x, path(&i, "u32")).into(),
            Instr::assign(x, value).into(),
        ],
    )
    .unwrap();

    assert_eq!(stored(&mem, "x"), Stored::One(value.into()));
    assert!(mem.find_var(x).unwrap().is_mutable());
}

#[test]
fn int_literals_convert_through_the_compatibility_table() {
    let (mut mem, i) = manager();
    let x = sym(&i, "x");
    let u64_ty = path(&i, "u64");
    let five = lit(&i, 5, "int");

    assert!(!mem.symbols().types.contains(&u64_ty));
    run(&mut mem, vec![Instr::declare_assign(x, u64_ty.clone(), five).into()]).unwrap();

    assert_eq!(stored(&mem, "x"), Stored::One(lit(&i, 5, "u64").into()));
    assert!(mem.symbols().types.contains(&u64_ty));
}

#[test]
fn float_into_int_is_a_type_error() {
    let (mut mem, i) = manager();
    let x = sym(&i, "x");
    let half = CoreLiteral::new(LiteralValue::Float(1.5), sym(&i, "float"));

    run(&mut mem, vec![Instr::declare(x, path(&i, "u32")).into()]).unwrap();
    let err = run(&mut mem, vec![Instr::assign(x, half).into()]).unwrap_err();

    assert_eq!(
        err.kind,
        CoreErrorKind::TypeMismatch {
            expected: path(&i, "u32"),
            found: path(&i, "float"),
        }
    );
    assert!(!mem.find_var(x).unwrap().is_assigned());
}

#[test]
fn out_of_range_literal_is_not_truncated() {
    let (mut mem, i) = manager();
    let x = sym(&i, "x");
    let big = lit(&i, 70_000, "int");

    let err = run(&mut mem, vec![Instr::declare_assign(x, path(&i, "u16"), big).into()]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E4002);
    assert!(!mem.current().unwrap().heap.contains(x));
}

#[test]
fn redeclaration_is_rejected() {
    let (mut mem, i) = manager();
    let x = sym(&i, "x");
    let u32_ty = path(&i, "u32");

    let err = run(
        &mut mem,
        vec![Instr::declare(x, u32_ty.clone()).into(), Instr::declare(x, u32_ty).into()],
    )
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::E3006);
}

#[test]
fn unknown_type_is_a_lookup_error() {
    let (mut mem, i) = manager();
    let x = sym(&i, "x");

    let err = run(&mut mem, vec![Instr::declare(x, path(&i, "meters")).into()]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E5003);
}

#[test]
fn quantum_declaration_registers_demand() {
    let (mut mem, i) = manager();
    let q = sym(&i, "@q");

    run(&mut mem, vec![Instr::declare(q, path(&i, "@u3")).into()]).unwrap();

    let container = mem.find_var(q).unwrap();
    assert!(container.is_appendable() && container.is_quantum());
    assert_eq!(mem.indices().demand(&mem.qubit_key(q).unwrap()), Some(3));
}

#[test]
fn struct_from_keyword_values() {
    let (mut mem, i) = manager();
    register_point(&mut mem);
    let p = sym(&i, "p");
    let value = Block::ArgsValues(ArgsValuesBlock(vec![
        (sym(&i, "y"), lit(&i, 17, "int").into()),
        (sym(&i, "x"), lit(&i, 25, "u32").into()),
    ]));

    run(&mut mem, vec![Instr::declare_assign(p, path(&i, "point"), value).into()]).unwrap();

    let container = mem.find_var(p).unwrap();
    assert_eq!(
        container.get(Some(&path(&i, "x"))).unwrap(),
        &Stored::One(lit(&i, 25, "u32").into())
    );
    assert_eq!(
        container.get(Some(&path(&i, "y"))).unwrap(),
        &Stored::One(lit(&i, 17, "u32").into())
    );
}

#[test]
fn struct_from_positional_values() {
    let (mut mem, i) = manager();
    register_point(&mut mem);
    let p = sym(&i, "p");
    let value = Block::Args(ArgsBlock(vec![lit(&i, 1, "int").into(), lit(&i, 2, "int").into()]));

    run(&mut mem, vec![Instr::declare_assign(p, path(&i, "point"), value).into()]).unwrap();
    assert_eq!(mem.find_var(p).unwrap().entries().len(), 2);
}

#[test]
fn member_reads_use_the_member_type() {
    let (mut mem, i) = manager();
    register_point(&mut mem);
    let p = sym(&i, "p");
    let n = sym(&i, "n");
    let value = Block::Args(ArgsBlock(vec![lit(&i, 4, "u32").into(), lit(&i, 9, "u32").into()]));
    let p_y = CompositeSymbol::parse(mem.interner(), "p.y");
    let p_z = CompositeSymbol::parse(mem.interner(), "p.z");

    run(
        &mut mem,
        vec![
            Instr::declare_assign(p, path(&i, "point"), value).into(),
            Instr::declare_assign(n, path(&i, "u32"), p_y).into(),
        ],
    )
    .unwrap();
    assert_eq!(stored(&mem, "n"), Stored::One(lit(&i, 9, "u32").into()));

    let err = run(&mut mem, vec![Instr::assign(n, p_z).into()]).unwrap_err();
    assert_eq!(err.display(mem.interner()), "error[E3003]: `p` has no member `z`");
}

#[test]
fn quantum_keys_map_to_quantum_members() {
    let (mut mem, i) = manager();
    let q_u3 = mem.builtins().get(&path(&i, "@u3")).unwrap().clone();
    let mut reg = TypeDataStructure::new(path(&i, "@reg"), TdsKind::Struct);
    reg.add_member(&q_u3, Some(sym(&i, "@d"))).unwrap();
    mem.symbols_mut().types.add(reg);

    let r = sym(&i, "@r");
    let value = Block::ArgsValues(ArgsValuesBlock(vec![(
        sym(&i, "q__d"),
        lit(&i, 2, "@u3").into(),
    )]));
    run(&mut mem, vec![Instr::declare_assign(r, path(&i, "@reg"), value).into()]).unwrap();

    let container = mem.find_var(r).unwrap();
    assert_eq!(
        container.get(Some(&path(&i, "@d"))).unwrap().values(),
        &[lit(&i, 2, "@u3").into()]
    );
    assert_eq!(container.instr_counter(), 1);
}

#[test]
fn variables_copy_between_equal_types() {
    let (mut mem, i) = manager();
    let (x, y, z) = (sym(&i, "x"), sym(&i, "y"), sym(&i, "z"));
    let seven = lit(&i, 7, "u32");

    run(
        &mut mem,
        vec![
            Instr::declare_assign(x, path(&i, "u32"), seven).into(),
            Instr::declare_assign(y, path(&i, "u32"), x).into(),
        ],
    )
    .unwrap();
    assert_eq!(stored(&mem, "y"), Stored::One(seven.into()));

    let err = run(&mut mem, vec![Instr::declare_assign(z, path(&i, "u64"), x).into()]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2005);
}

#[test]
fn enum_variants_by_name_or_path() {
    let (mut mem, i) = manager();
    register_color(&mut mem);
    let (c, d) = (sym(&i, "c"), sym(&i, "d"));
    let blue = CompositeSymbol::parse(mem.interner(), "color.blue");

    run(&mut mem, vec![Instr::declare_assign(c, path(&i, "color"), sym(&i, "red")).into()]).unwrap();
    assert_eq!(stored(&mem, "c"), Stored::One(sym(&i, "red").into()));

    run(
        &mut mem,
        vec![
            Instr::assign(c, blue).into(),
            Instr::declare_assign(d, path(&i, "color"), c).into(),
        ],
    )
    .unwrap();
    assert_eq!(stored(&mem, "d"), Stored::One(sym(&i, "blue").into()));
}

#[test]
fn variants_of_another_enum_are_a_type_error() {
    let (mut mem, i) = manager();
    register_color(&mut mem);
    let mut shade = TypeDataStructure::new(path(&i, "shade"), TdsKind::Enum);
    for variant in ["red", "dark"] {
        shade.add_variant(sym(&i, variant)).unwrap();
    }
    mem.symbols_mut().types.add(shade);
    let c = sym(&i, "c");
    let foreign = CompositeSymbol::parse(&i, "shade.red");

    let err = run(&mut mem, vec![Instr::declare_assign(c, path(&i, "color"), foreign).into()]).unwrap_err();
    assert_eq!(
        err.kind,
        CoreErrorKind::TypeMismatch {
            expected: path(&i, "color"),
            found: path(&i, "shade"),
        }
    );
    assert!(mem.find_var(c).is_err());

    run(&mut mem, vec![Instr::declare_assign(c, path(&i, "color"), sym(&i, "red")).into()]).unwrap();
    assert_eq!(stored(&mem, "c"), Stored::One(sym(&i, "red").into()));
}

#[test]
fn enum_members_take_bare_variant_names() {
    let (mut mem, i) = manager();
    register_color(&mut mem);
    let color = mem.lookup_type(&path(&i, "color")).unwrap().clone();
    let mut pixel = TypeDataStructure::new(path(&i, "pixel"), TdsKind::Struct);
    pixel.add_member(&color, Some(sym(&i, "tint"))).unwrap();
    mem.symbols_mut().types.add(pixel);

    let value = Block::ArgsValues(ArgsValuesBlock(vec![(sym(&i, "tint"), sym(&i, "green").into())]));
    run(&mut mem, vec![Instr::declare_assign(sym(&i, "px"), path(&i, "pixel"), value).into()]).unwrap();

    let green = CompositeSymbol::parse(&i, "color.green");
    assert_eq!(stored(&mem, "px"), Stored::One(WorkingData::from(green)));
}

#[test]
fn nested_cast_feeds_the_assignment() {
    let (mut mem, i) = manager();
    let x = sym(&i, "x");
    let cast = Instr::cast(lit(&i, 300, "int"), path(&i, "u32"));

    run(&mut mem, vec![Instr::declare_assign(x, path(&i, "u32"), cast).into()]).unwrap();
    assert_eq!(stored(&mem, "x"), Stored::One(lit(&i, 300, "u32").into()));
    assert!(mem.current().unwrap().stack.is_empty());
}

#[test]
fn cast_pushes_its_result() {
    let (mut mem, i) = manager();
    run(&mut mem, vec![Instr::cast(lit(&i, 3, "int"), path(&i, "float")).into()]).unwrap();

    let top = mem.current().unwrap().stack.peek().unwrap().clone();
    assert_eq!(top.ty, path(&i, "float"));
    assert_eq!(
        top.data,
        CoreLiteral::new(LiteralValue::Float(3.0), sym(&i, "float")).into()
    );

    let err = run(&mut mem, vec![Instr::cast(lit(&i, -3, "int"), path(&i, "u32")).into()]).unwrap_err();
    assert_eq!(
        err.display(mem.interner()),
        "error[E4001]: cannot cast negative `-3:int` to unsigned `u32`"
    );
}

#[test]
fn casting_a_struct_is_a_cast_error() {
    let (mut mem, i) = manager();
    register_point(&mut mem);
    let p = sym(&i, "p");

    run(&mut mem, vec![Instr::declare(p, path(&i, "point")).into()]).unwrap();
    let err = run(&mut mem, vec![Instr::cast(p, path(&i, "u32")).into()]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E4003);
}

#[test]
fn casting_a_quantum_variable_reads_its_latest_value() {
    let (mut mem, i) = manager();
    let q = sym(&i, "@q");
    run(&mut mem, vec![Instr::declare(q, path(&i, "@u3")).into()]).unwrap();

    let err = run(&mut mem, vec![Instr::cast(q, path(&i, "@u3")).into()]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E4003);

    run(
        &mut mem,
        vec![
            Instr::assign(q, lit(&i, 1, "@u3")).into(),
            Instr::assign(q, lit(&i, 2, "@u3")).into(),
            Instr::cast(q, path(&i, "@u3")).into(),
        ],
    )
    .unwrap();
    assert_eq!(
        mem.current().unwrap().stack.peek(),
        Some(&TypedValue::new(lit(&i, 2, "@u3"), path(&i, "@u3")))
    );
}

#[test]
fn nested_instruction_without_a_value() {
    let (mut mem, i) = manager();
    let (x, w) = (sym(&i, "x"), sym(&i, "w"));
    let inner = Instr::declare(w, path(&i, "u32"));

    let err = run(&mut mem, vec![Instr::declare_assign(x, path(&i, "u32"), inner).into()]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E6003);
}

#[test]
fn body_blocks_open_a_scope() {
    let (mut mem, i) = manager();
    let z = sym(&i, "z");
    let body = Block::Body(BodyBlock(vec![
        Instr::declare(z, path(&i, "u32")).into(),
        Block::Args(ArgsBlock(vec![lit(&i, 5, "u32").into()])).into(),
    ]));

    run(&mut mem, vec![body.into()]).unwrap();

    assert_eq!(mem.depth(), 1);
    assert!(mem.find_var(z).is_err());
    assert_eq!(
        mem.current().unwrap().stack.peek(),
        Some(&TypedValue::new(lit(&i, 5, "u32"), path(&i, "u32")))
    );
}

#[test]
fn option_blocks_are_not_resolved_here() {
    let (mut mem, i) = manager();
    let option = Block::Option(OptionBlock {
        option: lit(&i, 1, "u32").into(),
        block: BodyBlock::default(),
    });

    let err = run(&mut mem, vec![option.into()]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E6001);
}

#[test]
fn call_returns_through_the_scope() {
    let (mut mem, i) = manager();
    let a = sym(&i, "a");
    register_fn(
        &mut mem,
        "first",
        &[("a", "u64"), ("b", "u64")],
        Some("u64"),
        vec![Block::Args(ArgsBlock(vec![a.into()])).into()],
    );
    let call = Instr::call(sym(&i, "first"), vec![lit(&i, 3, "u64").into(), lit(&i, 4, "u64").into()]);

    run(&mut mem, vec![call.into()]).unwrap();

    assert_eq!(mem.depth(), 1);
    let top = mem.current().unwrap().stack.peek().unwrap();
    assert_eq!(top, &TypedValue::new(lit(&i, 3, "u64"), path(&i, "u64")));
}

#[test]
fn overloads_dispatch_on_exact_types() {
    let (mut mem, i) = manager();
    register_fn(&mut mem, "id", &[("v", "u64")], None, vec![]);
    let call = Instr::call(sym(&i, "id"), vec![lit(&i, 3, "int").into()]);

    let err = run(&mut mem, vec![call.into()]).unwrap_err();
    assert_eq!(err.display(mem.interner()), "error[E5004]: no function `id(int)`");
    assert!(mem.current().unwrap().stack.is_empty());
}

#[test]
fn keyword_arguments_must_be_in_order() {
    let (mut mem, i) = manager();
    register_fn(&mut mem, "pair", &[("a", "u32"), ("b", "u32")], None, vec![]);
    let keyword = |names: [&str; 2]| {
        let args = ArgsValuesBlock(
            names
                .iter()
                .map(|name| (sym(&i, name), lit(&i, 1, "u32").into()))
                .collect(),
        );
        Instr::Call(Call::bare(sym(&i, "pair"), CallArgs::ArgsValues(args)))
    };

    let in_order = keyword(["a", "b"]);
    run(&mut mem, vec![in_order.into()]).unwrap();

    let swapped = keyword(["b", "a"]);
    let err = run(&mut mem, vec![swapped.into()]).unwrap_err();
    assert_eq!(err.kind, CoreErrorKind::NotImplemented { feature: "argument reordering" });
}

#[test]
fn calls_with_bodies_are_delegated() {
    let (mut mem, i) = manager();
    let call = Call::new(sym(&i, "measure"), CallArgs::Empty, None, Some(BodyBlock::default())).unwrap();

    let err = run(&mut mem, vec![Instr::Call(call).into()]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E6001);
}

#[test]
fn parameters_are_immutable() {
    let (mut mem, i) = manager();
    let v = sym(&i, "v");
    register_fn(
        &mut mem,
        "touch",
        &[("v", "u32")],
        None,
        vec![Instr::assign(v, lit(&i, 2, "u32")).into()],
    );
    let call = Instr::call(sym(&i, "touch"), vec![lit(&i, 1, "u32").into()]);

    let err = run(&mut mem, vec![call.into()]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E3002);
    assert_eq!(mem.depth(), 1);
}

#[test]
fn quantum_arguments_replay_into_the_parameter() {
    let (mut mem, i) = manager();
    let (q, r) = (sym(&i, "@q"), sym(&i, "@r"));
    register_fn(&mut mem, "apply", &[("@r", "@u3")], None, vec![]);

    run(
        &mut mem,
        vec![
            Instr::declare(q, path(&i, "@u3")).into(),
            Instr::assign(q, lit(&i, 1, "@u3")).into(),
            Instr::assign(q, lit(&i, 2, "@u3")).into(),
            Instr::call(sym(&i, "apply"), vec![q.into()]).into(),
        ],
    )
    .unwrap();

    // the parameter's demand is retired with the call scope
    assert_eq!(mem.indices().declared(), 3);
    assert_eq!(mem.indices().demand(&mem.qubit_key(q).unwrap()), Some(3));
    assert!(mem.qubit_key(r).is_err());
    assert_eq!(stored(&mem, "@q").values().len(), 2);
}

#[test]
fn quantum_parameter_may_reuse_the_callers_name() {
    let (mut mem, i) = manager();
    let q = sym(&i, "@q");
    register_fn(&mut mem, "apply", &[("@q", "@u3")], None, vec![]);

    run(
        &mut mem,
        vec![
            Instr::declare(q, path(&i, "@u3")).into(),
            Instr::assign(q, lit(&i, 1, "@u3")).into(),
            Instr::call(sym(&i, "apply"), vec![q.into()]).into(),
        ],
    )
    .unwrap();

    assert_eq!(mem.depth(), 1);
    assert_eq!(mem.indices().declared(), 3);
    assert_eq!(mem.indices().demand(&mem.qubit_key(q).unwrap()), Some(3));
}

#[test]
fn nested_calls_reuse_a_quantum_parameter_name() {
    let (mut mem, i) = manager();
    let r = sym(&i, "@r");
    register_fn(&mut mem, "inner", &[("@r", "@u3")], None, vec![]);
    register_fn(
        &mut mem,
        "outer",
        &[("@r", "@u3")],
        None,
        vec![Instr::call(sym(&i, "inner"), vec![r.into()]).into()],
    );

    run(
        &mut mem,
        vec![
            Instr::declare(r, path(&i, "@u3")).into(),
            Instr::assign(r, lit(&i, 2, "@u3")).into(),
            Instr::call(sym(&i, "outer"), vec![r.into()]).into(),
        ],
    )
    .unwrap();

    assert_eq!(mem.depth(), 1);
    assert_eq!(mem.indices().declared(), 3);
    assert_eq!(stored(&mem, "@r").values().len(), 1);
}

#[test]
fn block_may_shadow_a_quantum_variable() {
    let (mut mem, i) = manager();
    let q = sym(&i, "@q");
    let body = Block::Body(BodyBlock(vec![
        Instr::declare(q, path(&i, "@u2")).into(),
        Instr::assign(q, lit(&i, 3, "@u2")).into(),
    ]));

    run(&mut mem, vec![Instr::declare(q, path(&i, "@u2")).into(), body.into()]).unwrap();

    assert_eq!(mem.depth(), 1);
    assert_eq!(mem.indices().declared(), 2);
    assert_eq!(mem.indices().demand(&mem.qubit_key(q).unwrap()), Some(2));
    // the shadowing write stayed in the block
    assert!(mem.find_var(q).unwrap().get(None).is_err());
}

#[test]
fn functions_without_a_return_type_hand_nothing_back() {
    let (mut mem, i) = manager();
    register_fn(
        &mut mem,
        "seven",
        &[],
        Some("u64"),
        vec![Block::Args(ArgsBlock(vec![lit(&i, 7, "u64").into()])).into()],
    );
    register_fn(
        &mut mem,
        "noret",
        &[],
        None,
        vec![Instr::call(sym(&i, "seven"), vec![]).into()],
    );

    run(&mut mem, vec![Instr::call(sym(&i, "noret"), vec![]).into()]).unwrap();
    assert_eq!(mem.depth(), 1);
    assert!(mem.current().unwrap().stack.is_empty());

    run(&mut mem, vec![Instr::call(sym(&i, "seven"), vec![]).into()]).unwrap();
    assert_eq!(mem.current().unwrap().stack.len(), 1);
}

#[test]
fn unbounded_recursion_is_fatal() {
    let (mut mem, i) = manager();
    let spin = sym(&i, "spin");
    register_fn(&mut mem, "spin", &[], None, vec![Instr::call(spin, vec![]).into()]);

    let err = run(&mut mem, vec![Instr::call(spin, vec![]).into()]).unwrap_err();
    assert_eq!(
        err.kind,
        CoreErrorKind::RecursionLimit {
            depth: MAX_CALL_DEPTH + 1,
            limit: MAX_CALL_DEPTH,
        }
    );
    assert!(err.is_fatal());
    assert_eq!(mem.depth(), 1);
}
