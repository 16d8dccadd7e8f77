//! Variable containers: the runtime storage cell of one declared variable.
//!
//! # State machine
//!
//! `Unassigned -> Assigned`. Constant and Immutable containers accept exactly
//! one assignment. Mutable containers overwrite. Appendable and quantum
//! containers append to a member's list and bump `instr_counter` on every
//! append, so program order survives for later lowering. Enum containers
//! hold a single active variant.
//!
//! # Ownership
//!
//! A container is owned by its scope's heap. It may be lent out through a
//! [`Loan`], which must be handed back with [`VariableContainer::release`]
//! before the container can be freed. [`VariableContainer::transfer`] moves
//! the data to a fresh owned container and leaves a transferred husk behind.

use std::num::NonZeroU32;

use bitflags::bitflags;

use hhat_diagnostic::error::{
    container_var_assign, container_var_is_immutable, loan_mismatch, variable_freeing_borrowed,
    variable_transferred, variable_wrong_member,
};
use hhat_diagnostic::{AssignFailure, CoreResult};
use hhat_ir::{Symbol, SymbolPath, WorkingData};

use crate::tds::{MemberLayout, TdsKind, TypeDataStructure};

/// Mutability policy of a classical container. Always given explicitly.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum VariableKind {
    Constant,
    Immutable,
    Mutable,
    Appendable,
}

impl VariableKind {
    pub fn flags(self) -> ContainerFlags {
        match self {
            VariableKind::Constant => ContainerFlags::CONSTANT,
            VariableKind::Immutable => ContainerFlags::empty(),
            VariableKind::Mutable => ContainerFlags::MUTABLE,
            VariableKind::Appendable => ContainerFlags::APPENDABLE,
        }
    }
}

bitflags! {
    /// Policy and state bits of a container.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct ContainerFlags: u8 {
        const CONSTANT = 1 << 0;
        const MUTABLE = 1 << 1;
        const APPENDABLE = 1 << 2;
        const QUANTUM = 1 << 3;
        /// Set by the first successful assignment.
        const ASSIGNED = 1 << 4;
    }
}

/// Stored member data: a single value, or the appended history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Stored {
    One(WorkingData),
    Many(Vec<WorkingData>),
}

impl Stored {
    /// Values in order; a single value yields one element.
    pub fn values(&self) -> &[WorkingData] {
        match self {
            Stored::One(value) => std::slice::from_ref(value),
            Stored::Many(values) => values,
        }
    }

    /// Most recently stored value.
    pub fn last(&self) -> Option<&WorkingData> {
        self.values().last()
    }
}

/// Who holds the container right now.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Ownership {
    Owned,
    Borrowed { loans: NonZeroU32 },
    /// Data moved to another container; reads and writes fail.
    Transferred,
}

/// Outstanding borrow of a container. Hand it back through `release`.
#[must_use = "a loan must be released before its container can be freed"]
#[derive(Debug, PartialEq, Eq)]
pub struct Loan {
    var: Symbol,
}

impl Loan {
    pub fn var(&self) -> Symbol {
        self.var
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Data {
    Members(Vec<Option<Stored>>),
    Enum(Option<Stored>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableContainer {
    name: Symbol,
    type_name: SymbolPath,
    kind: TdsKind,
    layout: MemberLayout,
    data: Data,
    flags: ContainerFlags,
    instr_counter: u64,
    ownership: Ownership,
}

impl VariableContainer {
    pub(crate) fn new(name: Symbol, tds: &TypeDataStructure, flags: ContainerFlags) -> Self {
        let data = match tds.kind() {
            TdsKind::Enum => Data::Enum(None),
            _ => Data::Members(vec![None; tds.members().len()]),
        };
        VariableContainer {
            name,
            type_name: tds.name().clone(),
            kind: tds.kind(),
            layout: tds.members().clone(),
            data,
            flags,
            instr_counter: 0,
            ownership: Ownership::Owned,
        }
    }

    pub fn name(&self) -> Symbol {
        self.name
    }

    pub fn type_name(&self) -> &SymbolPath {
        &self.type_name
    }

    pub fn kind(&self) -> TdsKind {
        self.kind
    }

    pub fn layout(&self) -> &MemberLayout {
        &self.layout
    }

    pub fn flags(&self) -> ContainerFlags {
        self.flags
    }

    pub fn is_constant(&self) -> bool {
        self.flags.contains(ContainerFlags::CONSTANT)
    }

    pub fn is_mutable(&self) -> bool {
        self.flags.contains(ContainerFlags::MUTABLE)
    }

    pub fn is_appendable(&self) -> bool {
        self.flags.contains(ContainerFlags::APPENDABLE)
    }

    pub fn is_quantum(&self) -> bool {
        self.flags.contains(ContainerFlags::QUANTUM)
    }

    pub fn is_assigned(&self) -> bool {
        self.flags.contains(ContainerFlags::ASSIGNED)
    }

    pub fn is_borrowed(&self) -> bool {
        matches!(self.ownership, Ownership::Borrowed { .. })
    }

    pub fn is_transferred(&self) -> bool {
        self.ownership == Ownership::Transferred
    }

    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    /// Number of appends so far.
    pub fn instr_counter(&self) -> u64 {
        self.instr_counter
    }

    fn check_writable(&self) -> CoreResult<()> {
        let write_once = !self.is_mutable() && !self.is_appendable();
        if write_once && self.is_assigned() {
            return Err(container_var_is_immutable(self.name));
        }
        Ok(())
    }

    fn appends(&self, key: &SymbolPath, value: &WorkingData) -> bool {
        value.is_quantum()
            || key.is_quantum()
            || (self.is_appendable() && !self.is_quantum())
    }

    /// Check `value` against the declared type of member `key`.
    fn check_member(&self, key: &SymbolPath, value: &WorkingData) -> CoreResult<()> {
        let Some(expected) = self.layout.member_type(key) else {
            return Err(container_var_assign(
                self.name,
                AssignFailure::UnknownMember(key.clone()),
            ));
        };
        let found = match value {
            WorkingData::Literal(lit) => SymbolPath::from(lit.ty()),
            WorkingData::CompositeLiteral(lit) => SymbolPath::from(lit.ty()),
            // Variant of an enum-typed member, e.g. `color.red` for `color`.
            WorkingData::Composite(path) if *path == expected.join(path.last()) => {
                return Ok(());
            }
            WorkingData::Symbol(_) | WorkingData::Composite(_) => {
                return Err(container_var_assign(
                    self.name,
                    AssignFailure::Unsupported(value.clone()),
                ));
            }
        };
        if found == *expected {
            Ok(())
        } else {
            Err(container_var_assign(
                self.name,
                AssignFailure::MemberType {
                    member: key.clone(),
                    expected: expected.clone(),
                    found,
                },
            ))
        }
    }

    fn write(&mut self, idx: usize, key: &SymbolPath, value: WorkingData) {
        let appends = self.appends(key, &value);
        let Data::Members(slots) = &mut self.data else {
            return;
        };
        let Some(slot) = slots.get_mut(idx) else {
            return;
        };
        if appends {
            match slot {
                Some(Stored::Many(values)) => values.push(value),
                Some(Stored::One(prev)) => *slot = Some(Stored::Many(vec![prev.clone(), value])),
                None => *slot = Some(Stored::Many(vec![value])),
            }
            self.instr_counter += 1;
            tracing::trace!(counter = self.instr_counter, "appended to member {idx}");
        } else {
            *slot = Some(Stored::One(value));
        }
    }

    fn select_variant(&mut self, value: &WorkingData) -> CoreResult<()> {
        let variant = match value {
            WorkingData::Symbol(sym) => SymbolPath::from(*sym),
            // `ty.variant` must name this container's own type.
            WorkingData::Composite(path) if *path == self.type_name.join(path.last()) => {
                SymbolPath::from(path.last())
            }
            WorkingData::Composite(path) => {
                return Err(container_var_assign(
                    self.name,
                    AssignFailure::UnknownVariant(path.clone().into()),
                ));
            }
            WorkingData::Literal(_) | WorkingData::CompositeLiteral(_) => {
                return Err(container_var_assign(
                    self.name,
                    AssignFailure::Unsupported(value.clone()),
                ));
            }
        };
        if !self.layout.contains(&variant) {
            return Err(container_var_assign(
                self.name,
                AssignFailure::UnknownVariant(variant),
            ));
        }
        self.data = Data::Enum(Some(Stored::One(variant.into())));
        Ok(())
    }

    /// Positional assignment: one value per member, in declaration order.
    ///
    /// Everything is validated before anything is written.
    pub fn assign(&mut self, values: Vec<WorkingData>) -> CoreResult<()> {
        if self.is_transferred() {
            return Err(variable_transferred(self.name));
        }
        self.check_writable()?;

        if self.kind == TdsKind::Enum {
            let [value] = values.as_slice() else {
                return Err(container_var_assign(
                    self.name,
                    AssignFailure::Arity {
                        expected: 1,
                        got: values.len(),
                    },
                ));
            };
            self.select_variant(value)?;
            self.flags.insert(ContainerFlags::ASSIGNED);
            return Ok(());
        }

        if values.len() != self.layout.len() {
            return Err(container_var_assign(
                self.name,
                AssignFailure::Arity {
                    expected: self.layout.len(),
                    got: values.len(),
                },
            ));
        }
        let keys: Vec<SymbolPath> = self.layout.iter().map(|(key, _)| key.clone()).collect();
        for (key, value) in keys.iter().zip(&values) {
            self.check_member(key, value)?;
        }
        for (idx, (key, value)) in keys.iter().zip(values).enumerate() {
            self.write(idx, key, value);
        }
        self.flags.insert(ContainerFlags::ASSIGNED);
        Ok(())
    }

    /// Keyword assignment: each key names a member.
    pub fn assign_named(&mut self, values: Vec<(SymbolPath, WorkingData)>) -> CoreResult<()> {
        if self.is_transferred() {
            return Err(variable_transferred(self.name));
        }
        self.check_writable()?;

        if self.kind == TdsKind::Enum {
            let key = values.first().map(|(key, _)| key.clone());
            return Err(container_var_assign(
                self.name,
                match key {
                    Some(key) => AssignFailure::UnknownMember(key),
                    None => AssignFailure::Arity { expected: 1, got: 0 },
                },
            ));
        }

        for (key, value) in &values {
            self.check_member(key, value)?;
        }
        for (key, value) in values {
            if let Some(idx) = self.layout.get_index(&key) {
                self.write(idx, &key, value);
            }
        }
        self.flags.insert(ContainerFlags::ASSIGNED);
        Ok(())
    }

    /// Read a member. `None` means the sole or first member; Enum containers
    /// always answer with their active variant.
    pub fn get(&self, member: Option<&SymbolPath>) -> CoreResult<&Stored> {
        if self.is_transferred() {
            return Err(variable_transferred(self.name));
        }
        match &self.data {
            Data::Enum(active) => active
                .as_ref()
                .ok_or_else(|| variable_wrong_member(self.name, None)),
            Data::Members(slots) => {
                let idx = match member {
                    None => 0,
                    Some(key) => self
                        .layout
                        .get_index(key)
                        .ok_or_else(|| variable_wrong_member(self.name, Some(key.clone())))?,
                };
                slots
                    .get(idx)
                    .and_then(Option::as_ref)
                    .ok_or_else(|| variable_wrong_member(self.name, member.cloned()))
            }
        }
    }

    /// Assigned members in declaration order; the active variant for enums.
    pub fn entries(&self) -> Vec<(SymbolPath, &Stored)> {
        match &self.data {
            Data::Enum(active) => active
                .iter()
                .map(|stored| (self.type_name.clone(), stored))
                .collect(),
            Data::Members(slots) => self
                .layout
                .iter()
                .zip(slots)
                .filter_map(|((key, _), slot)| slot.as_ref().map(|stored| (key.clone(), stored)))
                .collect(),
        }
    }

    /// Lend the container out.
    pub fn borrow(&mut self) -> CoreResult<Loan> {
        self.ownership = match self.ownership {
            Ownership::Owned => Ownership::Borrowed {
                loans: NonZeroU32::MIN,
            },
            Ownership::Borrowed { loans } => Ownership::Borrowed {
                loans: loans.saturating_add(1),
            },
            Ownership::Transferred => return Err(variable_transferred(self.name)),
        };
        Ok(Loan { var: self.name })
    }

    /// Take back a loan issued by this container.
    pub fn release(&mut self, loan: Loan) -> CoreResult<()> {
        if loan.var != self.name {
            return Err(loan_mismatch(self.name));
        }
        self.ownership = match self.ownership {
            Ownership::Owned | Ownership::Transferred => return Err(loan_mismatch(self.name)),
            Ownership::Borrowed { loans } => match NonZeroU32::new(loans.get() - 1) {
                Some(loans) => Ownership::Borrowed { loans },
                None => Ownership::Owned,
            },
        };
        Ok(())
    }

    /// Move the data into a new owned container. `self` is left transferred.
    /// Borrowed containers cannot move.
    pub fn transfer(&mut self) -> CoreResult<VariableContainer> {
        match self.ownership {
            Ownership::Owned => {}
            Ownership::Borrowed { .. } => {
                return Err(variable_freeing_borrowed(self.name)
                    .with_note("a borrowed variable cannot change owner"));
            }
            Ownership::Transferred => return Err(variable_transferred(self.name)),
        }
        let empty = self.empty_data();
        let data = std::mem::replace(&mut self.data, empty);
        let moved = VariableContainer {
            data,
            ..self.clone()
        };
        self.flags.remove(ContainerFlags::ASSIGNED);
        self.ownership = Ownership::Transferred;
        Ok(moved)
    }

    fn empty_data(&self) -> Data {
        match &self.data {
            Data::Enum(_) => Data::Enum(None),
            Data::Members(slots) => Data::Members(vec![None; slots.len()]),
        }
    }

    /// Drop the stored data. Refused while a loan is outstanding.
    pub fn free(&mut self) -> CoreResult<()> {
        if self.is_borrowed() {
            return Err(variable_freeing_borrowed(self.name));
        }
        self.data = self.empty_data();
        self.flags.remove(ContainerFlags::ASSIGNED);
        Ok(())
    }
}
