use thiserror::Error;

use crate::coord::{Coord, Dimensions};

/// Error kinds surfaced by layout mutations and queries.
///
/// Every mutating operation validates fully before touching state, so a
/// returned error guarantees the layout is unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("tile {0} already holds a gate")]
    TileOccupied(Coord),

    #[error("no gate at tile {0}")]
    NodeNotFound(Coord),

    #[error("signal source {0} does not resolve to an occupied tile")]
    InvalidSignal(Coord),

    #[error("gate requires {expected} input(s), {actual} given")]
    ArityMismatch { expected: usize, actual: usize },

    #[error("tile {src} (clock {src_clock}) may not feed tile {target} (clock {target_clock})")]
    ClockingViolation {
        src: Coord,
        target: Coord,
        src_clock: u8,
        target_clock: u8,
    },

    #[error("resize to {dims} would exclude occupied tile {conflict}")]
    ResizeConflict { dims: Dimensions, conflict: Coord },

    #[error("tile {coord} lies outside the layout bounds {dims}")]
    OutOfBounds { coord: Coord, dims: Dimensions },

    #[error("unknown clocking scheme '{0}'")]
    UnknownClockingScheme(String),
}
