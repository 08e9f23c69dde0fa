//! Distributed interface link pair for coupling two fluid networks.
//!
//! Two networks, each running its own solver asynchronously (possibly
//! in separate processes), share one boundary node through a pair of
//! these links. Each tick, each side reads the payload its peer last
//! published, arbitrates which side owns the Demand role, stamps the
//! interface effect into its local linear system, and publishes its own
//! payload back.
//!
//! The Supply side advertises a pressure and accepts a molar flow; the
//! Demand side advertises a molar flow demand and accepts a pressure.
//! Role assignment follows relative network capacitance: the side with
//! the bigger reservoir acts as the pressure source. A lag-aware gain
//! keeps the coupling stable across arbitrary transport latency, which
//! the links measure live from echoed frame counters.
//!
//! Transport between the two sides is out of scope: each link exposes
//! its payload buffers through a handle, and whatever moves the bytes
//! copies outbound to the peer's inbound. Both sides must agree on
//! species ordering, units (Pa, mol/s on the wire), and the energy
//! convention at construction.

pub mod config;
pub mod error;
pub mod link;
pub mod payload;
pub mod share;

pub use config::{DistributedInterfaceConfig, DistributedInterfaceInput};
pub use error::{InterfaceError, InterfaceResult};
pub use link::{
    BufferHandle, DistributedInterface, InterfaceBuffers, NETWORK_CAPACITANCE_FLUX,
};
pub use payload::InterfaceData;
pub use share::{InterfaceShare, ShareHandle};
