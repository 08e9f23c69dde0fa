//! Chemical species, mixtures, and node fluid state.
//!
//! Fluid networks track a configured set of bulk species plus optional
//! trace compounds per node. Bulk mole fractions sum to 1 on their own;
//! trace compounds are carried as mole fractions relative to the bulk
//! phase and are assumed not to affect bulk thermodynamic state.
//!
//! Property relations are ideal-gas with frozen per-species heat
//! capacities, which is all the network solve needs: enthalpy and
//! temperature interconvert through the mixture cp, and molar density
//! follows p/(R·T).

pub mod catalog;
pub mod error;
pub mod mixture;
pub mod species;
pub mod state;

pub use catalog::FluidCatalog;
pub use error::{FluidError, FluidResult};
pub use species::{Species, TraceCompound};
pub use state::FluidState;

/// Universal gas constant [kJ/(kmol·K)], equivalently [kPa·m³/(kmol·K)].
pub const R_UNIVERSAL: f64 = 8.314_462_618;
