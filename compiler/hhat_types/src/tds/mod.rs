//! Type data structures: the descriptor of a type's shape and size.
//!
//! A TDS is built member by member through `add_member`/`add_variant`, which
//! enforce the paradigm rule: a classical type never holds a quantum member.
//! `call` is the only way to obtain a `VariableContainer` for a type.

use rustc_hash::FxHashMap;

use hhat_diagnostic::error::{
    not_implemented, type_add_member, type_and_member_no_match, type_quantum_on_classical,
    type_single_assign, variable_creation,
};
use hhat_diagnostic::CoreResult;
use hhat_ir::{Paradigm, Symbol, SymbolPath};

use crate::container::{ContainerFlags, VariableContainer, VariableKind};
use crate::size::{QSize, Size, POINTER_SIZE};

/// Shape of a type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TdsKind {
    Single,
    Struct,
    Enum,
    Union,
    RemoteUnion,
}

/// Ordered member mapping: member key to member type.
///
/// For Single types the key is the wrapped type itself; for Struct the
/// member name; for Enum the variant, mapped to itself.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemberLayout {
    members: Vec<(SymbolPath, SymbolPath)>,
    indices: FxHashMap<SymbolPath, usize>,
}

impl MemberLayout {
    fn push(&mut self, key: SymbolPath, ty: SymbolPath) -> bool {
        if self.indices.contains_key(&key) {
            return false;
        }
        self.indices.insert(key.clone(), self.members.len());
        self.members.push((key, ty));
        true
    }

    pub fn get_index(&self, key: &SymbolPath) -> Option<usize> {
        self.indices.get(key).copied()
    }

    pub fn member_type(&self, key: &SymbolPath) -> Option<&SymbolPath> {
        self.get_index(key).map(|idx| &self.members[idx].1)
    }

    pub fn contains(&self, key: &SymbolPath) -> bool {
        self.indices.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&SymbolPath, &SymbolPath)> + '_ {
        self.members.iter().map(|(key, ty)| (key, ty))
    }

    pub fn first(&self) -> Option<(&SymbolPath, &SymbolPath)> {
        self.members.first().map(|(key, ty)| (key, ty))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDataStructure {
    name: SymbolPath,
    kind: TdsKind,
    size: Size,
    qsize: Option<QSize>,
    builtin: bool,
    members: MemberLayout,
}

impl TypeDataStructure {
    /// An empty user type. Quantum types start with an unresolved qubit range.
    pub fn new(name: SymbolPath, kind: TdsKind) -> Self {
        let quantum = name.is_quantum();
        TypeDataStructure {
            name,
            kind,
            size: if quantum { POINTER_SIZE } else { Size::ZERO },
            qsize: quantum.then(|| QSize::unbounded(0)),
            builtin: false,
            members: MemberLayout::default(),
        }
    }

    /// A built-in primitive: a Single whose member is itself.
    pub(crate) fn primitive(name: Symbol, size: Size, qsize: Option<QSize>) -> Self {
        let path = SymbolPath::from(name);
        let mut members = MemberLayout::default();
        members.push(path.clone(), path.clone());
        TypeDataStructure {
            name: path,
            kind: TdsKind::Single,
            size,
            qsize,
            builtin: true,
            members,
        }
    }

    pub fn name(&self) -> &SymbolPath {
        &self.name
    }

    pub fn kind(&self) -> TdsKind {
        self.kind
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn qsize(&self) -> Option<QSize> {
        self.qsize
    }

    pub fn is_builtin(&self) -> bool {
        self.builtin
    }

    pub fn is_quantum(&self) -> bool {
        self.name.is_quantum()
    }

    pub fn paradigm(&self) -> Paradigm {
        self.name.paradigm()
    }

    pub fn members(&self) -> &MemberLayout {
        &self.members
    }

    /// The wrapped type of a Single.
    pub fn single_member_type(&self) -> Option<&SymbolPath> {
        match self.kind {
            TdsKind::Single => self.members.first().map(|(_, ty)| ty),
            _ => None,
        }
    }

    /// A classical type cannot take a quantum-named member.
    pub fn is_valid_member(&self, member: &SymbolPath) -> bool {
        self.is_quantum() || !member.is_quantum()
    }

    /// Add a member of type `member_type`.
    ///
    /// Single takes no name (the member key is the wrapped type). Struct
    /// requires one. Enum treats `member_name` as a variant.
    pub fn add_member(
        &mut self,
        member_type: &TypeDataStructure,
        member_name: Option<Symbol>,
    ) -> CoreResult<&mut Self> {
        match self.kind {
            TdsKind::Single => {
                if !self.members.is_empty() {
                    return Err(type_single_assign(self.name.clone()));
                }
                let key = member_type.name().clone();
                if !self.is_valid_member(&key) {
                    return Err(type_quantum_on_classical(self.name.clone(), key));
                }
                self.members.push(key.clone(), key);
                self.grow(member_type);
                Ok(self)
            }
            TdsKind::Struct => {
                let Some(member) = member_name else {
                    return Err(type_add_member(self.name.clone(), member_type.name().clone())
                        .with_note("struct members need a name"));
                };
                if member.paradigm() != member_type.paradigm() {
                    return Err(type_and_member_no_match(
                        self.name.clone(),
                        member,
                        member_type.name().clone(),
                    ));
                }
                let key = SymbolPath::from(member);
                if !self.is_valid_member(&key) {
                    return Err(type_quantum_on_classical(self.name.clone(), key));
                }
                if !self.members.push(key.clone(), member_type.name().clone()) {
                    return Err(type_add_member(self.name.clone(), key));
                }
                self.grow(member_type);
                Ok(self)
            }
            TdsKind::Enum => match member_name {
                Some(variant) => self.add_variant(variant),
                None => Err(type_add_member(self.name.clone(), member_type.name().clone())
                    .with_note("enum members are variant names")),
            },
            TdsKind::Union => Err(not_implemented("union types")),
            TdsKind::RemoteUnion => Err(not_implemented("remote union types")),
        }
    }

    /// Add an enum variant.
    pub fn add_variant(&mut self, variant: Symbol) -> CoreResult<&mut Self> {
        match self.kind {
            TdsKind::Enum => {}
            TdsKind::Union => return Err(not_implemented("union types")),
            TdsKind::RemoteUnion => return Err(not_implemented("remote union types")),
            TdsKind::Single | TdsKind::Struct => {
                return Err(type_add_member(self.name.clone(), variant.into())
                    .with_note("only enum types take variants"));
            }
        }
        let key = SymbolPath::from(variant);
        if !self.is_valid_member(&key) {
            return Err(type_quantum_on_classical(self.name.clone(), key));
        }
        if !self.members.push(key.clone(), key.clone()) {
            return Err(type_add_member(self.name.clone(), key));
        }
        let width = variant_width(self.members.len());
        if self.is_quantum() {
            self.qsize = Some(QSize::fixed(width));
        } else {
            self.size = Size::from_bits(width);
        }
        Ok(self)
    }

    fn grow(&mut self, member_type: &TypeDataStructure) {
        if !self.is_quantum() {
            self.size = self.size.saturating_add(member_type.size());
        }
        if let (Some(qsize), Some(member_qsize)) = (self.qsize.as_mut(), member_type.qsize()) {
            qsize.min = qsize.min.saturating_add(member_qsize.min);
        }
    }

    /// Set the resolved qubit range of a quantum type.
    pub fn set_qsize(&mut self, qsize: QSize) {
        if self.is_quantum() {
            self.qsize = Some(qsize);
        }
    }

    /// Build a container for variable `var_name` of this type.
    ///
    /// A quantum variable of a quantum type is always Appendable; a classical
    /// pair uses `kind`; any paradigm mismatch is rejected.
    pub fn call(&self, var_name: Symbol, kind: VariableKind) -> CoreResult<VariableContainer> {
        match self.kind {
            TdsKind::Union => return Err(not_implemented("union types")),
            TdsKind::RemoteUnion => return Err(not_implemented("remote union types")),
            TdsKind::Single | TdsKind::Struct | TdsKind::Enum => {}
        }
        if self.members.is_empty() {
            return Err(variable_creation(var_name, self.name.clone())
                .with_note("type has no members"));
        }
        let flags = match (var_name.is_quantum(), self.is_quantum()) {
            (true, true) => ContainerFlags::APPENDABLE | ContainerFlags::QUANTUM,
            (false, false) => kind.flags(),
            _ => return Err(variable_creation(var_name, self.name.clone())),
        };
        Ok(VariableContainer::new(var_name, self, flags))
    }
}

/// Bits (or qubits) needed to tell `variants` apart; at least one.
fn variant_width(variants: usize) -> u32 {
    let variants = u32::try_from(variants).unwrap_or(u32::MAX);
    variants.next_power_of_two().trailing_zeros().max(1)
}

/// Resolve the unbounded qubit maximum of a quantum type as the sum of its
/// members' maxima, looking member types up through `lookup`.
///
/// Classical members contribute nothing. Members whose own maximum is still
/// unresolved are resolved recursively; cycles resolve to the minimum.
pub fn resolve_qsize<'a, F>(tds: &TypeDataStructure, lookup: &F) -> Option<QSize>
where
    F: Fn(&SymbolPath) -> Option<&'a TypeDataStructure>,
{
    let mut visiting = Vec::new();
    resolve_qsize_inner(tds, lookup, &mut visiting)
}

fn resolve_qsize_inner<'a, F>(
    tds: &TypeDataStructure,
    lookup: &F,
    visiting: &mut Vec<SymbolPath>,
) -> Option<QSize>
where
    F: Fn(&SymbolPath) -> Option<&'a TypeDataStructure>,
{
    let qsize = tds.qsize()?;
    if qsize.max.is_some() || tds.kind() == TdsKind::Enum {
        return Some(qsize);
    }
    if visiting.contains(tds.name()) {
        return Some(QSize::fixed(qsize.min));
    }
    visiting.push(tds.name().clone());

    let mut max = 0u32;
    for (_, member_type) in tds.members().iter() {
        if !member_type.is_quantum() {
            continue;
        }
        let member_max = lookup(member_type)
            .and_then(|member| resolve_qsize_inner(member, lookup, visiting))
            .map_or(0, QSize::demand);
        max = max.saturating_add(member_max);
    }

    visiting.pop();
    Some(QSize::range(qsize.min, max.max(qsize.min)))
}

#[cfg(test)]
mod tests;
