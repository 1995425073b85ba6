//! # FCN I/O
//!
//! Persistence for gate-level FCN layouts: a versioned JSON document
//! holding the grid header and an ordered tile list. Import validates
//! the document structurally and re-inserts tiles in dependency order,
//! so a restored layout satisfies every engine invariant or fails with
//! a decode error.

pub mod codec;
pub mod document;

pub use codec::{export, import, CodecError};
pub use document::{CoordRecord, DimensionsRecord, LayoutDocument, TileRecord, FORMAT_VERSION};
