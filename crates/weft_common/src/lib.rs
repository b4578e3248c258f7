//! Shared foundational types for the weft netlist IR.
//!
//! Provides interned symbols for names that appear inside canonical types
//! and a 128-bit content hash used for structural fingerprints.

#![warn(missing_docs)]

pub mod hash;
pub mod symbol;

pub use hash::{ContentHash, ContentHasher};
pub use symbol::{Interner, Symbol};
