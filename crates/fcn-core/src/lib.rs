//! # FCN Core
//!
//! Gate-level layout engine for field-coupled nanocomputing circuits:
//! a clocked tile grid with placement/deletion/rewiring operations,
//! incremental fanin/fanout bookkeeping, and a session-scoped layout
//! store.
//!
//! This crate is the heart of the FCN Works engine.

pub mod clocking;
pub mod coord;
pub mod error;
pub mod gate;
pub mod layout;
pub mod store;

pub use clocking::ClockingScheme;
pub use coord::{Coord, Dimensions, Topology};
pub use error::LayoutError;
pub use gate::{GateKind, Node, Signal};
pub use layout::GateLayout;
pub use store::{LayoutStore, SessionId};
