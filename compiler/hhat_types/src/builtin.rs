//! Built-in primitive types and the implicit conversion table.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use hhat_ir::{StringInterner, Symbol, SymbolPath};

use crate::size::{QSize, Size, POINTER_SIZE};
use crate::tds::TypeDataStructure;

/// Integer layout of a built-in type.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum IntWidth {
    /// Fixed-width unsigned; the width is in bits, or qubits for quantum.
    Unsigned(u32),
    Signed(u32),
    /// `int` / `@int`: no range check beyond the paradigm.
    Arbitrary,
}

/// Pre-interned names of the built-in types.
#[derive(Copy, Clone, Debug)]
pub struct BuiltinNames {
    pub int: Symbol,
    pub bool: Symbol,
    pub u16: Symbol,
    pub u32: Symbol,
    pub u64: Symbol,
    pub i16: Symbol,
    pub i32: Symbol,
    pub i64: Symbol,
    pub float: Symbol,
    pub f32: Symbol,
    pub f64: Symbol,
    pub q_bool: Symbol,
    pub q_u2: Symbol,
    pub q_u3: Symbol,
    pub q_u4: Symbol,
    pub q_int: Symbol,
}

impl BuiltinNames {
    pub fn new(interner: &StringInterner) -> Self {
        let sym = |text: &str| Symbol::new(interner, text);
        BuiltinNames {
            int: sym("int"),
            bool: sym("bool"),
            u16: sym("u16"),
            u32: sym("u32"),
            u64: sym("u64"),
            i16: sym("i16"),
            i32: sym("i32"),
            i64: sym("i64"),
            float: sym("float"),
            f32: sym("f32"),
            f64: sym("f64"),
            q_bool: sym("@bool"),
            q_u2: sym("@u2"),
            q_u3: sym("@u3"),
            q_u4: sym("@u4"),
            q_int: sym("@int"),
        }
    }
}

/// Registry of built-in TDSs, keyed by name.
#[derive(Clone, Debug)]
pub struct BuiltinTypes {
    names: BuiltinNames,
    types: FxHashMap<Symbol, TypeDataStructure>,
    compatible: FxHashMap<Symbol, SmallVec<[Symbol; 6]>>,
}

impl BuiltinTypes {
    pub fn new(interner: &StringInterner) -> Self {
        let n = BuiltinNames::new(interner);

        let classical = [
            (n.int, 64),
            (n.bool, 8),
            (n.u16, 16),
            (n.u32, 32),
            (n.u64, 64),
            (n.i16, 16),
            (n.i32, 32),
            (n.i64, 64),
            (n.float, 64),
            (n.f32, 32),
            (n.f64, 64),
        ];
        let quantum = [
            (n.q_bool, QSize::fixed(1)),
            (n.q_u2, QSize::fixed(2)),
            (n.q_u3, QSize::fixed(3)),
            (n.q_u4, QSize::fixed(4)),
            (n.q_int, QSize::range(2, 4)),
        ];

        let mut types = FxHashMap::default();
        for (name, bits) in classical {
            types.insert(name, TypeDataStructure::primitive(name, Size::from_bits(bits), None));
        }
        for (name, qsize) in quantum {
            types.insert(name, TypeDataStructure::primitive(name, POINTER_SIZE, Some(qsize)));
        }

        let mut compatible = FxHashMap::default();
        compatible.insert(
            n.int,
            SmallVec::from_slice(&[n.u16, n.u32, n.u64, n.i16, n.i32, n.i64]),
        );
        compatible.insert(n.float, SmallVec::from_slice(&[n.f32, n.f64]));
        compatible.insert(n.q_int, SmallVec::from_slice(&[n.q_u2, n.q_u3, n.q_u4]));

        BuiltinTypes {
            names: n,
            types,
            compatible,
        }
    }

    pub fn names(&self) -> &BuiltinNames {
        &self.names
    }

    pub fn get(&self, ty: &SymbolPath) -> Option<&TypeDataStructure> {
        ty.as_symbol().and_then(|sym| self.types.get(&sym))
    }

    pub fn is_builtin(&self, ty: &SymbolPath) -> bool {
        self.get(ty).is_some()
    }

    /// Types `from` converts to implicitly.
    pub fn compatible(&self, from: Symbol) -> &[Symbol] {
        self.compatible.get(&from).map(|targets| targets.as_slice()).unwrap_or(&[])
    }

    /// Whether a literal typed `from` may be stored as `to` without a cast.
    pub fn converts(&self, from: Symbol, to: &SymbolPath) -> bool {
        *to == from || to.as_symbol().is_some_and(|to| self.compatible(from).contains(&to))
    }

    pub fn int_width(&self, ty: Symbol) -> Option<IntWidth> {
        let n = &self.names;
        let width = match ty {
            t if t == n.int || t == n.q_int => IntWidth::Arbitrary,
            t if t == n.u16 => IntWidth::Unsigned(16),
            t if t == n.u32 => IntWidth::Unsigned(32),
            t if t == n.u64 => IntWidth::Unsigned(64),
            t if t == n.q_u2 => IntWidth::Unsigned(2),
            t if t == n.q_u3 => IntWidth::Unsigned(3),
            t if t == n.q_u4 => IntWidth::Unsigned(4),
            t if t == n.i16 => IntWidth::Signed(16),
            t if t == n.i32 => IntWidth::Signed(32),
            t if t == n.i64 => IntWidth::Signed(64),
            _ => return None,
        };
        Some(width)
    }

    pub fn is_float(&self, ty: Symbol) -> bool {
        let n = &self.names;
        ty == n.float || ty == n.f32 || ty == n.f64
    }

    /// Built-ins in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDataStructure> + '_ {
        self.types.values()
    }
}
