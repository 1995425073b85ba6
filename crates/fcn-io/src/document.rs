use serde::{Deserialize, Serialize};

use fcn_core::Coord;

/// Current document format version.
pub const FORMAT_VERSION: u32 = 1;

/// The persisted form of a layout: a header followed by an ordered
/// list of tile records. Gate, topology, and clocking identifiers are
/// stored as their canonical string tags so documents stay
/// self-describing and import can reject unknown tags explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutDocument {
    pub version: u32,
    pub dimensions: DimensionsRecord,
    pub topology: String,
    pub clocking: String,
    pub tiles: Vec<TileRecord>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DimensionsRecord {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileRecord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub gate: String,
    pub inputs: Vec<CoordRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl TileRecord {
    pub fn coord(&self) -> Coord {
        Coord::new(self.x, self.y, self.z)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CoordRecord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl From<Coord> for CoordRecord {
    fn from(c: Coord) -> Self {
        Self {
            x: c.x,
            y: c.y,
            z: c.z,
        }
    }
}

impl From<CoordRecord> for Coord {
    fn from(r: CoordRecord) -> Self {
        Coord::new(r.x, r.y, r.z)
    }
}
