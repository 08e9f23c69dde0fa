//! The network container and per-tick runner.

use std::sync::Arc;

use crate::capacitor::{CapacitorLink, VolumeHandle};
use crate::error::{NetError, NetResult};
use crate::link::Link;
use crate::node::FluidNode;
use crate::solver::{self, SystemAssembly};
use fx_core::{LinkId, NodeId};
use fx_fluids::{FluidCatalog, FluidState};

/// The ground (vacuum) node. Always at zero potential, never solved,
/// never holds fluid. Links may stamp against it; the assembly drops
/// those terms.
pub const GROUND: NodeId = NodeId::from_index(u32::MAX - 1);

/// A fluid network: nodes plus the links that connect them, stepped in
/// lock-step once per tick.
///
/// Single-threaded by design. Links are visited in insertion order in
/// every phase, so a tick is fully deterministic.
pub struct Network {
    name: String,
    catalog: Arc<FluidCatalog>,
    nodes: Vec<FluidNode>,
    links: Vec<Box<dyn Link>>,
    assembly: SystemAssembly,
    tick: u64,
}

impl Network {
    pub fn new(name: impl Into<String>, catalog: Arc<FluidCatalog>) -> Self {
        Self {
            name: name.into(),
            catalog,
            nodes: Vec::new(),
            links: Vec::new(),
            assembly: SystemAssembly::new(0),
            tick: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn catalog(&self) -> &Arc<FluidCatalog> {
        &self.catalog
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Add a node with the given initial contents.
    pub fn add_node(&mut self, name: &str, content: FluidState) -> NodeId {
        let id = NodeId::from_index(self.nodes.len() as u32);
        self.nodes.push(FluidNode::new(name, content));
        id
    }

    pub fn node(&self, id: NodeId) -> &FluidNode {
        &self.nodes[id.idx()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut FluidNode {
        &mut self.nodes[id.idx()]
    }

    pub fn nodes(&self) -> &[FluidNode] {
        &self.nodes
    }

    /// Add a capacitor link and give its node the initial volume.
    /// Returns the link id and the volume-edit capability handle.
    pub fn add_capacitor(
        &mut self,
        name: &str,
        node: NodeId,
        volume_m3: f64,
    ) -> NetResult<(LinkId, VolumeHandle)> {
        let cap = CapacitorLink::new(name, node, volume_m3)?;
        let handle = cap.volume_handle();
        self.nodes
            .get_mut(node.idx())
            .ok_or_else(|| NetError::PortMapping {
                what: format!("capacitor {name} maps to unknown node {node}"),
            })?
            .set_volume_m3(volume_m3);
        let id = self.add_link(Box::new(cap))?;
        Ok((id, handle))
    }

    /// Add any link, validating its port mapping.
    pub fn add_link(&mut self, link: Box<dyn Link>) -> NetResult<LinkId> {
        for port in link.ports() {
            if *port != GROUND && port.idx() >= self.nodes.len() {
                return Err(NetError::PortMapping {
                    what: format!("link {} maps to unknown node {port}", link.name()),
                });
            }
        }
        let id = LinkId::from_index(self.links.len() as u32);
        self.links.push(link);
        Ok(id)
    }

    /// Advance the network one tick.
    pub fn step(&mut self, dt: f64) -> NetResult<()> {
        if dt <= 0.0 || !dt.is_finite() {
            return Err(NetError::InvalidArg {
                what: "dt must be positive and finite",
            });
        }

        for link in &mut self.links {
            link.process_inputs(&mut self.nodes)?;
        }

        for node in &mut self.nodes {
            node.reset_flows();
        }

        self.assembly.resize(self.nodes.len());
        for link in &mut self.links {
            link.stamp(&mut self.assembly, &mut self.nodes, dt)?;
        }

        solver::solve(&self.assembly, &mut self.nodes, dt)?;

        for link in &mut self.links {
            link.compute_flows(&mut self.nodes, dt);
        }
        for link in &mut self.links {
            link.transport_flows(&mut self.nodes, dt);
        }
        for node in &mut self.nodes {
            node.integrate(dt);
        }
        for link in &mut self.links {
            link.process_outputs(&mut self.nodes)?;
        }

        self.tick += 1;
        Ok(())
    }
}
