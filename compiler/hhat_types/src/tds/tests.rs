use hhat_diagnostic::{CoreErrorKind, ErrorCode};
use hhat_ir::{StringInterner, Symbol, SymbolPath};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

fn prim(interner: &StringInterner, name: &str, bits: u32, qsize: Option<QSize>) -> TypeDataStructure {
    TypeDataStructure::primitive(Symbol::new(interner, name), Size::from_bits(bits), qsize)
}

fn path(interner: &StringInterner, text: &str) -> SymbolPath {
    SymbolPath::parse(interner, text)
}

#[test]
fn struct_sums_member_sizes() {
    let interner = StringInterner::new();
    let u32_ty = prim(&interner, "u32", 32, None);
    let mut point = TypeDataStructure::new(path(&interner, "point"), TdsKind::Struct);

    point
        .add_member(&u32_ty, Some(Symbol::new(&interner, "x")))
        .unwrap()
        .add_member(&u32_ty, Some(Symbol::new(&interner, "y")))
        .unwrap();

    assert_eq!(point.size().bits(), 64);
    assert_eq!(point.size().bytes(), 8);
    assert_eq!(point.members().len(), 2);
    assert_eq!(point.members().get_index(&path(&interner, "y")), Some(1));
    assert_eq!(point.qsize(), None);
}

#[test]
fn struct_rejects_duplicate_member() {
    let interner = StringInterner::new();
    let u32_ty = prim(&interner, "u32", 32, None);
    let mut point = TypeDataStructure::new(path(&interner, "point"), TdsKind::Struct);
    let x = Symbol::new(&interner, "x");

    point.add_member(&u32_ty, Some(x)).unwrap();
    let err = point.add_member(&u32_ty, Some(x)).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2003);
}

#[test]
fn struct_member_sigil_must_match_its_type() {
    let interner = StringInterner::new();
    let qu3 = prim(&interner, "@u3", 64, Some(QSize::fixed(3)));
    let mut reg = TypeDataStructure::new(path(&interner, "@reg"), TdsKind::Struct);

    let err = reg
        .add_member(&qu3, Some(Symbol::new(&interner, "plain")))
        .unwrap_err();
    assert!(matches!(err.kind, CoreErrorKind::TypeAndMemberNoMatch { .. }));
}

#[test]
fn struct_member_needs_a_name() {
    let interner = StringInterner::new();
    let u32_ty = prim(&interner, "u32", 32, None);
    let mut point = TypeDataStructure::new(path(&interner, "point"), TdsKind::Struct);

    assert_eq!(point.add_member(&u32_ty, None).unwrap_err().code(), ErrorCode::E2003);
}

#[test]
fn single_takes_one_member() {
    let interner = StringInterner::new();
    let qu3 = prim(&interner, "@u3", 64, Some(QSize::fixed(3)));
    let mut ty = TypeDataStructure::new(path(&interner, "@type1"), TdsKind::Single);

    ty.add_member(&qu3, None).unwrap();
    assert_eq!(ty.single_member_type(), Some(&path(&interner, "@u3")));
    assert_eq!(ty.qsize(), Some(QSize::unbounded(3)));
    assert_eq!(ty.size(), POINTER_SIZE);

    let err = ty.add_member(&qu3, None).unwrap_err();
    assert!(matches!(err.kind, CoreErrorKind::TypeSingleAssign { .. }));
}

#[test]
fn quantum_struct_keeps_classical_members() {
    let interner = StringInterner::new();
    let qu2 = prim(&interner, "@u2", 64, Some(QSize::fixed(2)));
    let u16_ty = prim(&interner, "u16", 16, None);
    let mut ty = TypeDataStructure::new(path(&interner, "@pair"), TdsKind::Struct);

    ty.add_member(&qu2, Some(Symbol::new(&interner, "@a")))
        .unwrap()
        .add_member(&u16_ty, Some(Symbol::new(&interner, "tag")))
        .unwrap();

    assert_eq!(ty.members().len(), 2);
    assert_eq!(ty.qsize(), Some(QSize::unbounded(2)));
}

#[test]
fn enum_width_grows_with_variants() {
    let interner = StringInterner::new();
    let mut color = TypeDataStructure::new(path(&interner, "color"), TdsKind::Enum);

    color.add_variant(Symbol::new(&interner, "red")).unwrap();
    assert_eq!(color.size().bits(), 1);
    color.add_variant(Symbol::new(&interner, "green")).unwrap();
    assert_eq!(color.size().bits(), 1);
    color.add_variant(Symbol::new(&interner, "blue")).unwrap();
    assert_eq!(color.size().bits(), 2);

    let err = color.add_variant(Symbol::new(&interner, "red")).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2003);
}

#[test]
fn quantum_enum_sets_qsize() {
    let interner = StringInterner::new();
    let mut spin = TypeDataStructure::new(path(&interner, "@spin"), TdsKind::Enum);

    for variant in ["@up", "@down", "@left", "@right", "@none"] {
        spin.add_variant(Symbol::new(&interner, variant)).unwrap();
    }
    assert_eq!(spin.qsize(), Some(QSize::fixed(3)));
}

#[test]
fn unions_are_not_implemented() {
    let interner = StringInterner::new();
    let u32_ty = prim(&interner, "u32", 32, None);
    let mut union = TypeDataStructure::new(path(&interner, "either"), TdsKind::Union);

    let err = union.add_member(&u32_ty, Some(Symbol::new(&interner, "a"))).unwrap_err();
    assert_eq!(err.kind, CoreErrorKind::NotImplemented { feature: "union types" });

    let err = union
        .call(Symbol::new(&interner, "e"), VariableKind::Mutable)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::E6001);
}

#[test]
fn call_picks_flags_by_paradigm() {
    let interner = StringInterner::new();
    let u32_ty = prim(&interner, "u32", 32, None);
    let qu3 = prim(&interner, "@u3", 64, Some(QSize::fixed(3)));

    let x = u32_ty
        .call(Symbol::new(&interner, "x"), VariableKind::Immutable)
        .unwrap();
    assert!(!x.is_mutable() && !x.is_appendable() && !x.is_quantum());

    let q = qu3
        .call(Symbol::new(&interner, "@q"), VariableKind::Immutable)
        .unwrap();
    assert!(q.is_appendable() && q.is_quantum());

    let err = qu3
        .call(Symbol::new(&interner, "q"), VariableKind::Mutable)
        .unwrap_err();
    assert!(matches!(err.kind, CoreErrorKind::VariableCreation { .. }));
}

#[test]
fn call_rejects_memberless_types() {
    let interner = StringInterner::new();
    let empty = TypeDataStructure::new(path(&interner, "empty"), TdsKind::Struct);

    let err = empty
        .call(Symbol::new(&interner, "e"), VariableKind::Mutable)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::E3004);
    assert_eq!(err.notes, vec!["type has no members".to_owned()]);
}

#[test]
fn resolve_qsize_sums_member_maxima() {
    let interner = StringInterner::new();
    let qint = prim(&interner, "@int", 64, Some(QSize::range(2, 4)));
    let qu3 = prim(&interner, "@u3", 64, Some(QSize::fixed(3)));
    let u16_ty = prim(&interner, "u16", 16, None);

    let mut inner = TypeDataStructure::new(path(&interner, "@inner"), TdsKind::Single);
    inner.add_member(&qint, None).unwrap();

    let mut outer = TypeDataStructure::new(path(&interner, "@outer"), TdsKind::Struct);
    outer
        .add_member(&inner, Some(Symbol::new(&interner, "@a")))
        .unwrap()
        .add_member(&qu3, Some(Symbol::new(&interner, "@b")))
        .unwrap()
        .add_member(&u16_ty, Some(Symbol::new(&interner, "c")))
        .unwrap();

    let table = [qint.clone(), qu3.clone(), inner.clone()];
    let lookup = |key: &SymbolPath| table.iter().find(|tds| tds.name() == key);

    assert_eq!(resolve_qsize(&inner, &lookup), Some(QSize::range(2, 4)));
    assert_eq!(resolve_qsize(&outer, &lookup), Some(QSize::range(5, 7)));
    assert_eq!(resolve_qsize(&u16_ty, &lookup), None);
}

proptest! {
    #[test]
    fn classical_types_refuse_quantum_members(
        member in "@[a-z]{1,6}",
        kind in prop_oneof![Just(TdsKind::Single), Just(TdsKind::Struct), Just(TdsKind::Enum)],
    ) {
        let interner = StringInterner::new();
        let member_sym = Symbol::new(&interner, &member);
        let member_ty = prim(&interner, &member, 64, Some(QSize::fixed(1)));
        let mut tds = TypeDataStructure::new(path(&interner, "classic"), kind);

        let err = match kind {
            TdsKind::Single => tds.add_member(&member_ty, None).map(|_| ()),
            TdsKind::Enum => tds.add_variant(member_sym).map(|_| ()),
            _ => {
                // name and type agree, so only the legality check can fire
                tds.add_member(&member_ty, Some(member_sym)).map(|_| ())
            }
        }
        .unwrap_err();

        let is_quantum_on_classical = matches!(err.kind, CoreErrorKind::TypeQuantumOnClassical { .. });
        prop_assert!(is_quantum_on_classical);
        prop_assert!(tds.members().is_empty());
    }
}
