//! Per-network fluid catalogs.

use crate::error::{FluidError, FluidResult};
use crate::species::{Species, TraceCompound};

/// The ordered set of bulk species and trace compounds a network tracks.
///
/// Mixture vectors everywhere in a network are indexed by position in
/// this catalog. Two networks exchanging fluid must agree on species
/// ordering over whatever common prefix they share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FluidCatalog {
    bulk: Vec<Species>,
    trace: Vec<TraceCompound>,
}

impl FluidCatalog {
    /// Create a catalog from an ordered species list.
    ///
    /// The bulk list must be non-empty and free of duplicates; the trace
    /// list may be empty.
    pub fn new(bulk: Vec<Species>, trace: Vec<TraceCompound>) -> FluidResult<Self> {
        if bulk.is_empty() {
            return Err(FluidError::InvalidArg {
                what: "catalog needs at least one bulk species",
            });
        }
        for (i, s) in bulk.iter().enumerate() {
            if bulk[..i].contains(s) {
                return Err(FluidError::InvalidArg {
                    what: "duplicate bulk species in catalog",
                });
            }
        }
        for (i, t) in trace.iter().enumerate() {
            if trace[..i].contains(t) {
                return Err(FluidError::InvalidArg {
                    what: "duplicate trace compound in catalog",
                });
            }
        }
        Ok(Self { bulk, trace })
    }

    pub fn bulk(&self) -> &[Species] {
        &self.bulk
    }

    pub fn trace(&self) -> &[TraceCompound] {
        &self.trace
    }

    pub fn n_bulk(&self) -> usize {
        self.bulk.len()
    }

    pub fn n_trace(&self) -> usize {
        self.trace.len()
    }

    /// Position of a bulk species in this catalog, if tracked.
    pub fn index_of(&self, species: Species) -> Option<usize> {
        self.bulk.iter().position(|s| *s == species)
    }
}
