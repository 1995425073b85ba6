//! # FCN Route
//!
//! Clocking-aware wire routing for gate-level FCN layouts: finds the
//! shortest tile path between two placed gates that advances the clock
//! phase at every hop, then realizes it as a chain of BUF wire tiles.

pub mod router;

pub use router::{route, RouteError};
