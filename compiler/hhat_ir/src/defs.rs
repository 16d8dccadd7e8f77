//! Type and function definitions handed over by the front-end.

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::{BodyBlock, StringLookup, Symbol, SymbolPath};

/// Shape of a user type as written in source.
#[derive(Clone, PartialEq, Debug)]
pub enum TypeDefShape {
    /// Wraps exactly one member type.
    Single(SymbolPath),
    /// Named members in declaration order.
    Struct(Vec<(Symbol, SymbolPath)>),
    /// Variant names.
    Enum(Vec<Symbol>),
    Union(Vec<(Symbol, SymbolPath)>),
    RemoteUnion,
}

#[derive(Clone, PartialEq, Debug)]
pub struct TypeDef {
    pub name: SymbolPath,
    pub shape: TypeDefShape,
}

#[derive(Clone, PartialEq, Debug)]
pub struct FnParam {
    pub name: Symbol,
    pub ty: SymbolPath,
}

/// Function name plus ordered argument types; the overload key.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FnSignature {
    pub name: Symbol,
    pub args: SmallVec<[SymbolPath; 4]>,
}

impl FnSignature {
    pub fn new(name: Symbol, args: impl IntoIterator<Item = SymbolPath>) -> Self {
        FnSignature {
            name,
            args: args.into_iter().collect(),
        }
    }

    pub fn render(&self, lookup: &impl StringLookup) -> String {
        let args: Vec<String> = self.args.iter().map(|arg| arg.render(lookup)).collect();
        format!("{}({})", self.name.render(lookup), args.join(", "))
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct FnDef {
    pub name: Symbol,
    pub params: Vec<FnParam>,
    pub ret: Option<SymbolPath>,
    pub body: BodyBlock,
}

impl FnDef {
    pub fn signature(&self) -> FnSignature {
        FnSignature::new(self.name, self.params.iter().map(|param| param.ty.clone()))
    }

    /// Whether `names` is exactly the parameter name set, in any order.
    pub fn has_args(&self, names: &[Symbol]) -> bool {
        let expected: FxHashSet<Symbol> = self.params.iter().map(|param| param.name).collect();
        let given: FxHashSet<Symbol> = names.iter().copied().collect();
        names.len() == self.params.len() && expected == given
    }

    /// Whether `names` lists the parameters in declaration order.
    pub fn args_in_order(&self, names: &[Symbol]) -> bool {
        names.len() == self.params.len()
            && self
                .params
                .iter()
                .zip(names)
                .all(|(param, name)| param.name == *name)
    }
}

/// Everything the front-end produces for one program.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct IrModule {
    pub types: Vec<TypeDef>,
    pub fns: Vec<FnDef>,
    pub main: BodyBlock,
}
