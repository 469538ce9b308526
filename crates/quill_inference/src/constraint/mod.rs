//! Constraint snapshots shared between the call resolutions of one scope.
//!
//! The session layer never solves constraints itself; it accumulates the
//! immutable [`ConstraintStore`] snapshots produced per call site and hands
//! the merged result to whichever resolution runs next.

pub mod store;
pub mod subtype;

pub use store::{ConstraintStore, TypeBound};
pub use subtype::is_subtype_of;
