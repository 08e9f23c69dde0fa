//! fx-core: stable foundation for fluxnet.
//!
//! Contains:
//! - units (uom SI types + constructors, kilo-unit conversion factors)
//! - numeric (Real + tolerances + range clamps)
//! - ids (stable compact IDs for nodes and links)
//! - error (shared error type)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use ids::*;
pub use numeric::*;
