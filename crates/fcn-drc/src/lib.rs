//! # FCN DRC
//!
//! Structural design-rule checking for gate-level FCN layouts. The
//! checker sweeps every occupied tile and reports arity deficits,
//! clocking-order breaks, and dangling I/O as a list of violations.

pub mod checker;
pub mod violation;

pub use checker::check;
pub use violation::{Severity, Violation, ViolationKind};
