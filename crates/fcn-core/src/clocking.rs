use std::fmt;

use serde::{Deserialize, Serialize};

use crate::coord::Coord;
use crate::error::LayoutError;

/// A clocking scheme assigns each tile a clock phase and thereby fixes
/// the legal signal-flow direction: a tile may only feed a tile whose
/// phase is the immediate cyclic successor of its own.
///
/// Pure function of coordinates; holds no mutable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockingScheme {
    kind: SchemeKind,
    phases: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum SchemeKind {
    /// Diagonal wave: clock(x, y) = (x + y) mod phases.
    DdWave,
}

impl ClockingScheme {
    /// The default 4-phase 2DDWave scheme.
    pub fn ddwave() -> Self {
        Self {
            kind: SchemeKind::DdWave,
            phases: 4,
        }
    }

    /// Resolve a scheme by its document name.
    pub fn from_name(name: &str) -> Result<Self, LayoutError> {
        match name {
            "2DDWave" => Ok(Self::ddwave()),
            "2DDWave3" => Ok(Self {
                kind: SchemeKind::DdWave,
                phases: 3,
            }),
            _ => Err(LayoutError::UnknownClockingScheme(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match (self.kind, self.phases) {
            (SchemeKind::DdWave, 3) => "2DDWave3",
            (SchemeKind::DdWave, _) => "2DDWave",
        }
    }

    pub fn phases(&self) -> u8 {
        self.phases
    }

    /// Clock number of a tile, in [0, phases).
    pub fn clock_of(&self, c: &Coord) -> u8 {
        match self.kind {
            SchemeKind::DdWave => ((c.x + c.y).rem_euclid(self.phases as i32)) as u8,
        }
    }

    /// Whether `b` sits in the phase immediately after `a`, the
    /// condition for a physical signal hop from `a` to `b`.
    pub fn may_feed(&self, a: &Coord, b: &Coord) -> bool {
        (self.clock_of(a) + 1) % self.phases == self.clock_of(b)
    }
}

impl Default for ClockingScheme {
    fn default() -> Self {
        Self::ddwave()
    }
}

impl fmt::Display for ClockingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
