//! Qubit index manager.
//!
//! A finite pool of qubit indices, handed out under a two-phase protocol:
//! a key first declares its demand with [`IndexManager::add`], then takes
//! indices with [`IndexManager::request`]. Indices come off the front of the
//! free list and go back on its end.
//!
//! The pool is conserved: every index is either available or allocated,
//! never both.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use hhat_diagnostic::error::{index_allocation, index_invalid_var, index_var_has_indexes};
use hhat_diagnostic::CoreResult;
use hhat_ir::{StringLookup, WorkingData};

/// Handle to one unit of quantum storage.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QubitIndex(u32);

impl QubitIndex {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        QubitIndex(raw)
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }
}

type Indices = SmallVec<[QubitIndex; 4]>;

#[derive(Clone, Debug)]
pub struct IndexManager {
    max_index: u32,
    available: VecDeque<QubitIndex>,
    allocated: Vec<QubitIndex>,
    resources: FxHashMap<WorkingData, usize>,
    /// Allocation order is kept for the backend.
    in_use_by: Vec<(WorkingData, Indices)>,
    declared: usize,
}

impl IndexManager {
    pub fn new(max_index: u32) -> Self {
        IndexManager {
            max_index,
            available: (0..max_index).map(QubitIndex).collect(),
            allocated: Vec::new(),
            resources: FxHashMap::default(),
            in_use_by: Vec::new(),
            declared: 0,
        }
    }

    pub fn max_index(&self) -> u32 {
        self.max_index
    }

    pub fn available(&self) -> usize {
        self.available.len()
    }

    pub fn allocated(&self) -> usize {
        self.allocated.len()
    }

    /// Total demand declared through `add` and not yet retired.
    pub fn declared(&self) -> usize {
        self.declared
    }

    /// Declared demand of `key`, if any.
    pub fn demand(&self, key: &WorkingData) -> Option<usize> {
        self.resources.get(key).copied()
    }

    fn capacity(&self) -> usize {
        self.max_index as usize
    }

    fn position(&self, key: &WorkingData) -> Option<usize> {
        self.in_use_by.iter().position(|(held, _)| held == key)
    }

    /// Declare that `key` will need `n` indices.
    pub fn add(&mut self, key: WorkingData, n: usize) -> CoreResult<()> {
        if self.resources.contains_key(&key) {
            return Err(index_var_has_indexes(key).with_note("demand was already declared"));
        }
        let room = self.capacity().saturating_sub(self.declared);
        if n > room {
            return Err(index_allocation(key, n, room));
        }
        self.declared += n;
        self.resources.insert(key, n);
        Ok(())
    }

    /// Allocate the declared demand of `key` from the front of the free list.
    pub fn request(&mut self, key: &WorkingData) -> CoreResult<&[QubitIndex]> {
        let Some(&n) = self.resources.get(key) else {
            return Err(index_invalid_var(key.clone()));
        };
        if self.position(key).is_some() {
            return Err(index_var_has_indexes(key.clone()));
        }
        if n > self.available.len() {
            return Err(index_allocation(key.clone(), n, self.available.len()));
        }

        let taken: Indices = self.available.drain(..n).collect();
        self.allocated.extend_from_slice(&taken);
        tracing::trace!(n, available = self.available.len(), "allocated qubit indices");
        self.in_use_by.push((key.clone(), taken));

        Ok(self
            .in_use_by
            .last()
            .map(|(_, indices)| indices.as_slice())
            .unwrap_or(&[]))
    }

    /// Return the indices of `key` to the end of the free list. Its declared
    /// demand stays, so it may `request` again.
    pub fn free(&mut self, key: &WorkingData) -> CoreResult<()> {
        let Some(pos) = self.position(key) else {
            return Err(index_invalid_var(key.clone()));
        };
        let (_, indices) = self.in_use_by.remove(pos);
        self.allocated.retain(|idx| !indices.contains(idx));
        self.available.extend(indices);
        tracing::trace!(available = self.available.len(), "freed qubit indices");
        Ok(())
    }

    /// Free `key` if allocated and drop its declared demand.
    pub fn retire(&mut self, key: &WorkingData) -> CoreResult<()> {
        if self.position(key).is_some() {
            self.free(key)?;
        }
        let Some(n) = self.resources.remove(key) else {
            return Err(index_invalid_var(key.clone()));
        };
        self.declared -= n;
        Ok(())
    }

    /// Indices currently held by `key`.
    pub fn get(&self, key: &WorkingData) -> CoreResult<&[QubitIndex]> {
        self.position(key)
            .and_then(|pos| self.in_use_by.get(pos))
            .map(|(_, indices)| indices.as_slice())
            .ok_or_else(|| index_invalid_var(key.clone()))
    }

    /// Held indices per key, in allocation order.
    pub fn allocations(&self) -> impl Iterator<Item = (&WorkingData, &[QubitIndex])> + '_ {
        self.in_use_by
            .iter()
            .map(|(key, indices)| (key, indices.as_slice()))
    }

    /// Free list, front first.
    pub fn free_list(&self) -> impl Iterator<Item = QubitIndex> + '_ {
        self.available.iter().copied()
    }

    /// Plain-data copy of the pool with keys rendered through `lookup`.
    pub fn snapshot(&self, lookup: &impl StringLookup) -> IndexSnapshot {
        IndexSnapshot {
            max_index: self.max_index,
            available: self.available.iter().copied().collect(),
            allocations: self
                .in_use_by
                .iter()
                .map(|(key, indices)| (key.render(lookup), indices.to_vec()))
                .collect(),
        }
    }
}

/// State of an [`IndexManager`] for the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexSnapshot {
    pub max_index: u32,
    pub available: Vec<QubitIndex>,
    pub allocations: Vec<(String, Vec<QubitIndex>)>,
}
