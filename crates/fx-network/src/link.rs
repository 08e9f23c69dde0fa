//! The link capability set.

use crate::error::NetResult;
use crate::node::FluidNode;
use crate::solver::SystemAssembly;
use fx_core::NodeId;

/// Direction of flow through a link port, relative to its node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowDirection {
    #[default]
    None,
    /// The node feeds the link.
    Source,
    /// The link feeds the node.
    Sink,
}

/// Capabilities every network link offers the solver.
///
/// Conductors, capacitors, and distributed interfaces all implement
/// this one trait; the solver never needs to know which is which. The
/// input/output phases are no-ops for links that have no external data
/// to exchange.
pub trait Link {
    fn name(&self) -> &str;

    /// The node each port maps to.
    fn ports(&self) -> &[NodeId];

    /// Pre-solve processing of data arriving from outside the network.
    fn process_inputs(&mut self, nodes: &mut [FluidNode]) -> NetResult<()> {
        let _ = nodes;
        Ok(())
    }

    /// Contribute admittance and source terms for this tick.
    fn stamp(
        &mut self,
        sys: &mut SystemAssembly,
        nodes: &mut [FluidNode],
        dt: f64,
    ) -> NetResult<()>;

    /// Compute the molar flux through the link from solved potentials,
    /// setting flow directions and scheduling outflux from source nodes.
    fn compute_flows(&mut self, nodes: &mut [FluidNode], dt: f64);

    /// Move fluid between the link and its nodes.
    fn transport_flows(&mut self, nodes: &mut [FluidNode], dt: f64);

    /// Post-solve processing of data leaving the network.
    fn process_outputs(&mut self, nodes: &mut [FluidNode]) -> NetResult<()> {
        let _ = nodes;
        Ok(())
    }
}
