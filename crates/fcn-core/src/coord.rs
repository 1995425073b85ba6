use std::fmt;

use serde::{Deserialize, Serialize};

/// An addressable tile position on the gate grid.
///
/// The z axis is carried through the data model and the document
/// format; z = 0 is the ground plane where all gates live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Coord {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Ground-plane shorthand for the common (x, y, 0) case.
    pub fn ground(x: i32, y: i32) -> Self {
        Self { x, y, z: 0 }
    }

    pub fn manhattan_distance(&self, other: &Coord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y) + self.z.abs_diff(other.z)
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z,
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Coord::ground(x, y)
    }
}

impl From<(i32, i32, i32)> for Coord {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Coord::new(x, y, z)
    }
}

/// Exclusive upper bounds of the tile grid, per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl Dimensions {
    pub fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    pub fn contains(&self, c: &Coord) -> bool {
        c.x >= 0
            && c.y >= 0
            && c.z >= 0
            && (c.x as u32) < self.x
            && (c.y as u32) < self.y
            && (c.z as u32) < self.z
    }

    pub fn tile_count(&self) -> u64 {
        self.x as u64 * self.y as u64 * self.z as u64
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.x, self.y, self.z)
    }
}

/// Grid topology tag. Only tile adjacency differs between variants;
/// the occupancy and connectivity machinery is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topology {
    Cartesian,
    ShiftedCartesian,
    Hexagonal,
}

impl Topology {
    /// In-plane neighbors of `c`. Bounds are not checked here. Signal
    /// flow is planar: a vertical hop keeps the same clock phase, so
    /// tiles on other z layers are never adjacent.
    pub fn neighbors(&self, c: &Coord) -> Vec<Coord> {
        match self {
            Topology::Cartesian => vec![
                c.translate(1, 0),
                c.translate(-1, 0),
                c.translate(0, 1),
                c.translate(0, -1),
            ],
            // Odd rows are offset half a tile to the right, giving six
            // in-plane neighbors whose x offsets depend on row parity.
            Topology::ShiftedCartesian | Topology::Hexagonal => {
                let shift = if c.y.rem_euclid(2) == 1 { 1 } else { -1 };
                vec![
                    c.translate(1, 0),
                    c.translate(-1, 0),
                    c.translate(0, 1),
                    c.translate(0, -1),
                    c.translate(shift, 1),
                    c.translate(shift, -1),
                ]
            }
        }
    }

    /// Whether `b` is an immediate neighbor of `a`.
    pub fn are_adjacent(&self, a: &Coord, b: &Coord) -> bool {
        self.neighbors(a).contains(b)
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Topology::Cartesian => "cartesian",
            Topology::ShiftedCartesian => "shifted-cartesian",
            Topology::Hexagonal => "hexagonal",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "cartesian" => Some(Topology::Cartesian),
            "shifted-cartesian" => Some(Topology::ShiftedCartesian),
            "hexagonal" => Some(Topology::Hexagonal),
            _ => None,
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
