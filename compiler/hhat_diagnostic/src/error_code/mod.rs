//! Error codes for every failure the execution core can report.
//!
//! Each code is a unique `E####` identifier whose first digit names the
//! layer that raised it.

use std::fmt;

/// Error codes for core diagnostics.
///
/// Format: E#### where first digit indicates the layer:
/// - E1xxx: Qubit index allocation
/// - E2xxx: Types and literals
/// - E3xxx: Variable containers
/// - E4xxx: Casts
/// - E5xxx: Memory and symbol-table lookups
/// - E6xxx: Instruction resolution
/// - E9xxx: Fatal engine conditions
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Index (E1xxx)
    /// Not enough qubit indices for the requested demand
    E1001,
    /// Key already declared or already holding indices
    E1002,
    /// Key unknown to the index manager
    E1003,
    /// Index manager reached an unexpected state
    E1004,

    // Type (E2xxx)
    /// Quantum member on a classical type
    E2001,
    /// Member name and member type disagree on paradigm
    E2002,
    /// Member cannot be added (duplicate key)
    E2003,
    /// Single type already wraps a member
    E2004,
    /// Value type does not match target type
    E2005,
    /// Literal value and literal type disagree on paradigm
    E2006,
    /// Malformed literal
    E2007,

    // Container (E3xxx)
    /// Value cannot be assigned to the container
    E3001,
    /// Second assignment to an immutable container
    E3002,
    /// Unknown member on a container
    E3003,
    /// Variable name and type disagree on paradigm
    E3004,
    /// Freeing a borrowed container
    E3005,
    /// Variable declared twice in one scope
    E3006,
    /// Variable was moved out of this scope
    E3007,
    /// Loan handle does not belong to the container
    E3008,

    // Cast (E4xxx)
    /// Negative value cast to an unsigned type
    E4001,
    /// Integer does not fit the target width
    E4002,
    /// No cast between the two types
    E4003,

    // Memory / lookup (E5xxx)
    /// Invalid heap key
    E5001,
    /// Pop from an empty stack
    E5002,
    /// Type not found in the type table or built-ins
    E5003,
    /// Function not found in the function table
    E5004,

    // Resolution (E6xxx)
    /// Feature not implemented by the core
    E6001,
    /// Malformed IR node
    E6002,
    /// Instruction produced no value where one was required
    E6003,

    // Fatal (E9xxx)
    /// No scope left ("mind is empty")
    E9001,
    /// Scope freed out of LIFO order
    E9002,
    /// Scope id not found
    E9003,
    /// Call depth limit exceeded
    E9004,
}

impl ErrorCode {
    /// All error code variants, for exhaustive testing.
    ///
    /// When adding a new variant: add it to the enum, `as_str()`, and here.
    pub const ALL: &[ErrorCode] = &[
        // Index
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        // Type
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E2005,
        ErrorCode::E2006,
        ErrorCode::E2007,
        // Container
        ErrorCode::E3001,
        ErrorCode::E3002,
        ErrorCode::E3003,
        ErrorCode::E3004,
        ErrorCode::E3005,
        ErrorCode::E3006,
        ErrorCode::E3007,
        ErrorCode::E3008,
        // Cast
        ErrorCode::E4001,
        ErrorCode::E4002,
        ErrorCode::E4003,
        // Memory / lookup
        ErrorCode::E5001,
        ErrorCode::E5002,
        ErrorCode::E5003,
        ErrorCode::E5004,
        // Resolution
        ErrorCode::E6001,
        ErrorCode::E6002,
        ErrorCode::E6003,
        // Fatal
        ErrorCode::E9001,
        ErrorCode::E9002,
        ErrorCode::E9003,
        ErrorCode::E9004,
    ];

    /// Get the numeric code as a string (e.g., "E1001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E3005 => "E3005",
            ErrorCode::E3006 => "E3006",
            ErrorCode::E3007 => "E3007",
            ErrorCode::E3008 => "E3008",
            ErrorCode::E4001 => "E4001",
            ErrorCode::E4002 => "E4002",
            ErrorCode::E4003 => "E4003",
            ErrorCode::E5001 => "E5001",
            ErrorCode::E5002 => "E5002",
            ErrorCode::E5003 => "E5003",
            ErrorCode::E5004 => "E5004",
            ErrorCode::E6001 => "E6001",
            ErrorCode::E6002 => "E6002",
            ErrorCode::E6003 => "E6003",
            ErrorCode::E9001 => "E9001",
            ErrorCode::E9002 => "E9002",
            ErrorCode::E9003 => "E9003",
            ErrorCode::E9004 => "E9004",
        }
    }

    /// Check if this is an index allocation error (E1xxx range).
    pub fn is_index_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E1001 | ErrorCode::E1002 | ErrorCode::E1003 | ErrorCode::E1004
        )
    }

    /// Check if this is a type or literal error (E2xxx range).
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E2001
                | ErrorCode::E2002
                | ErrorCode::E2003
                | ErrorCode::E2004
                | ErrorCode::E2005
                | ErrorCode::E2006
                | ErrorCode::E2007
        )
    }

    /// Check if this is a container lifecycle error (E3xxx range).
    pub fn is_container_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E3001
                | ErrorCode::E3002
                | ErrorCode::E3003
                | ErrorCode::E3004
                | ErrorCode::E3005
                | ErrorCode::E3006
                | ErrorCode::E3007
                | ErrorCode::E3008
        )
    }

    /// Check if this is a cast error (E4xxx range).
    pub fn is_cast_error(&self) -> bool {
        matches!(self, ErrorCode::E4001 | ErrorCode::E4002 | ErrorCode::E4003)
    }

    /// Check if this is a memory or lookup error (E5xxx range).
    pub fn is_lookup_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E5001 | ErrorCode::E5002 | ErrorCode::E5003 | ErrorCode::E5004
        )
    }

    /// Check if this is a resolution error (E6xxx range).
    pub fn is_resolution_error(&self) -> bool {
        matches!(self, ErrorCode::E6001 | ErrorCode::E6002 | ErrorCode::E6003)
    }

    /// Check if this code halts execution (E9xxx range).
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ErrorCode::E9001 | ErrorCode::E9002 | ErrorCode::E9003 | ErrorCode::E9004
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse an error code string like `"E2001"`. Case-insensitive.
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .find(|code| code.as_str() == upper)
            .copied()
            .ok_or(())
    }
}
