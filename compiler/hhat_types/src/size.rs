//! Classical and quantum sizes.

/// Classical storage size, in bits.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Size {
    bits: u32,
}

/// Size of a quantum value on the classical side: a handle to its qubits.
pub const POINTER_SIZE: Size = Size::from_bits(64);

impl Size {
    pub const ZERO: Size = Size::from_bits(0);

    pub const fn from_bits(bits: u32) -> Self {
        Size { bits }
    }

    pub const fn bits(self) -> u32 {
        self.bits
    }

    /// Whole bytes needed, rounding up.
    pub const fn bytes(self) -> u32 {
        self.bits.div_ceil(8)
    }

    #[must_use]
    pub const fn saturating_add(self, other: Size) -> Size {
        Size::from_bits(self.bits.saturating_add(other.bits))
    }
}

/// Qubit width range `[min, max]`. `max` is `None` until resolved.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct QSize {
    pub min: u32,
    pub max: Option<u32>,
}

impl QSize {
    pub const fn fixed(qubits: u32) -> Self {
        QSize {
            min: qubits,
            max: Some(qubits),
        }
    }

    pub const fn range(min: u32, max: u32) -> Self {
        QSize {
            min,
            max: Some(max),
        }
    }

    pub const fn unbounded(min: u32) -> Self {
        QSize { min, max: None }
    }

    /// Qubits to reserve: the resolved maximum, else the minimum.
    pub fn demand(self) -> u32 {
        self.max.unwrap_or(self.min)
    }
}
