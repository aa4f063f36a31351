#![deny(missing_docs)]

//! Camino SDK - Complete SDK.
//!
//! Re-exports all Camino SDK components for convenient single-crate usage.

pub use camino_primitives as primitives;
pub use camino_transaction as transaction;
pub use camino_avm as avm;
pub use camino_platformvm as platformvm;
pub use camino_evm as evm;
