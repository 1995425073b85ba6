use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::coord::Coord;

/// The closed catalog of gate kinds placeable on a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateKind {
    Pi,
    Po,
    Buf,
    Inv,
    And,
    Or,
    Nand,
    Nor,
    Xor,
    Xnor,
}

impl GateKind {
    /// Number of input signals the kind requires.
    pub fn arity(&self) -> usize {
        match self {
            GateKind::Pi => 0,
            GateKind::Po | GateKind::Buf | GateKind::Inv => 1,
            GateKind::And
            | GateKind::Or
            | GateKind::Nand
            | GateKind::Nor
            | GateKind::Xor
            | GateKind::Xnor => 2,
        }
    }

    pub fn is_pi(&self) -> bool {
        matches!(self, GateKind::Pi)
    }

    pub fn is_po(&self) -> bool {
        matches!(self, GateKind::Po)
    }

    /// BUF gates double as wire segments placed by the router.
    pub fn is_wire(&self) -> bool {
        matches!(self, GateKind::Buf)
    }

    pub fn tag(&self) -> &'static str {
        match self {
            GateKind::Pi => "PI",
            GateKind::Po => "PO",
            GateKind::Buf => "BUF",
            GateKind::Inv => "INV",
            GateKind::And => "AND",
            GateKind::Or => "OR",
            GateKind::Nand => "NAND",
            GateKind::Nor => "NOR",
            GateKind::Xor => "XOR",
            GateKind::Xnor => "XNOR",
        }
    }

    pub fn all() -> &'static [GateKind] {
        &[
            GateKind::Pi,
            GateKind::Po,
            GateKind::Buf,
            GateKind::Inv,
            GateKind::And,
            GateKind::Or,
            GateKind::Nand,
            GateKind::Nor,
            GateKind::Xor,
            GateKind::Xnor,
        ]
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for GateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GateKind::all()
            .iter()
            .find(|k| k.tag() == s)
            .copied()
            .ok_or_else(|| format!("unknown gate kind '{s}'"))
    }
}

/// A reference to the logical output of an occupied tile.
///
/// Signals are lookup keys, not ownership: once the source tile is
/// cleared, the signal no longer resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signal(pub Coord);

impl Signal {
    pub fn source(&self) -> Coord {
        self.0
    }
}

impl From<Coord> for Signal {
    fn from(c: Coord) -> Self {
        Signal(c)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sig@{}", self.0)
    }
}

/// The logical unit occupying a tile: a gate kind, its ordered input
/// signals, and an optional I/O label (used by PI/PO identification).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub kind: GateKind,
    pub coord: Coord,
    pub inputs: Vec<Signal>,
    pub label: Option<String>,
}

impl Node {
    pub fn new(kind: GateKind, coord: Coord, inputs: Vec<Signal>) -> Self {
        Self {
            kind,
            coord,
            inputs,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// True while the node carries fewer inputs than its kind requires,
    /// which can happen after an upstream tile is cleared.
    pub fn is_arity_deficient(&self) -> bool {
        self.inputs.len() < self.kind.arity()
    }
}
