use serde::{Deserialize, Serialize};

use fcn_core::Coord;

/// Kind of structural violation found on a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationKind {
    /// Node carries fewer resolved inputs than its gate kind requires.
    ArityMismatch,
    /// An adjacent input tile does not precede the node in clock order.
    ClockingViolation,
    /// A PO with no resolvable input, or a PI with recorded fanin.
    DanglingIo,
    /// A gate kind the checker cannot classify. Unreachable with the
    /// closed catalog; defined for nodes sourced from documents.
    UnsupportedGate,
}

/// Severity level of a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

/// A single design-rule violation with its location and description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub severity: Severity,
    pub coord: Coord,
    pub message: String,
}

impl Violation {
    pub fn new(kind: ViolationKind, coord: Coord, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Error,
            coord,
            message: message.into(),
        }
    }
}
