//! Fluid network graph and per-tick linear solver.
//!
//! A network is a set of nodes holding fluid state, connected by links
//! that contribute admittance and source terms to one linear system per
//! tick. The solve produces node potentials (pressures, kPa) and, for
//! nodes that request it, a network-capacitance measurement with the
//! per-node sensitivity row used by distributed interfaces.
//!
//! Ticks are single-threaded and strictly ordered:
//! process inputs → stamp → solve → compute flows → transport flows →
//! integrate nodes → process outputs.

pub mod capacitor;
pub mod conductor;
pub mod error;
pub mod link;
pub mod network;
pub mod node;
pub mod solver;

pub use capacitor::{CapacitorLink, NodeVolume, VolumeHandle};
pub use conductor::ConductorLink;
pub use error::{NetError, NetResult};
pub use link::{FlowDirection, Link};
pub use network::{Network, GROUND};
pub use node::FluidNode;
pub use solver::SystemAssembly;
