//! Conductor link: constant molar conductance between two nodes.

use crate::error::{NetError, NetResult};
use crate::link::{FlowDirection, Link};
use crate::network::GROUND;
use crate::node::{pair_mut, FluidNode, FLOW_EPSILON};
use crate::solver::SystemAssembly;
use fx_core::NodeId;

/// Two-port link with a fixed conductance G [kmol/(kPa·s)].
///
/// Stamps the usual symmetric pattern and transports fluid from the
/// higher-potential node to the lower. A port may map to [`GROUND`],
/// which behaves as a zero-potential vacuum sink.
pub struct ConductorLink {
    name: String,
    ports: [NodeId; 2],
    conductance: f64,
    flux_kmol: f64,
    directions: [FlowDirection; 2],
}

impl ConductorLink {
    pub fn new(
        name: impl Into<String>,
        node0: NodeId,
        node1: NodeId,
        conductance: f64,
    ) -> NetResult<Self> {
        if node0 == node1 {
            return Err(NetError::PortMapping {
                what: "conductor ports must map to distinct nodes".into(),
            });
        }
        if conductance < 0.0 || !conductance.is_finite() {
            return Err(NetError::InvalidArg {
                what: "conductance must be non-negative and finite",
            });
        }
        Ok(Self {
            name: name.into(),
            ports: [node0, node1],
            conductance,
            flux_kmol: 0.0,
            directions: [FlowDirection::None; 2],
        })
    }

    /// Molar flux from port 0 to port 1 on the last tick [kmol/s].
    pub fn flux_kmol(&self) -> f64 {
        self.flux_kmol
    }

    pub fn directions(&self) -> [FlowDirection; 2] {
        self.directions
    }

    fn potential(&self, port: usize, nodes: &[FluidNode]) -> f64 {
        let id = self.ports[port];
        if id == GROUND {
            0.0
        } else {
            nodes[id.idx()].potential_kpa()
        }
    }
}

impl Link for ConductorLink {
    fn name(&self) -> &str {
        &self.name
    }

    fn ports(&self) -> &[NodeId] {
        &self.ports
    }

    fn stamp(
        &mut self,
        sys: &mut SystemAssembly,
        _nodes: &mut [FluidNode],
        _dt: f64,
    ) -> NetResult<()> {
        let [a, b] = self.ports;
        sys.add_admittance(a, a, self.conductance);
        sys.add_admittance(b, b, self.conductance);
        sys.add_admittance(a, b, -self.conductance);
        sys.add_admittance(b, a, -self.conductance);
        Ok(())
    }

    fn compute_flows(&mut self, nodes: &mut [FluidNode], _dt: f64) {
        let dp = self.potential(0, nodes) - self.potential(1, nodes);
        self.flux_kmol = self.conductance * dp;
        if self.flux_kmol > FLOW_EPSILON {
            self.directions = [FlowDirection::Source, FlowDirection::Sink];
            if self.ports[0] != GROUND {
                nodes[self.ports[0].idx()].schedule_outflux(self.flux_kmol);
            }
        } else if self.flux_kmol < -FLOW_EPSILON {
            self.directions = [FlowDirection::Sink, FlowDirection::Source];
            if self.ports[1] != GROUND {
                nodes[self.ports[1].idx()].schedule_outflux(-self.flux_kmol);
            }
        } else {
            self.directions = [FlowDirection::None; 2];
        }
    }

    fn transport_flows(&mut self, nodes: &mut [FluidNode], _dt: f64) {
        let rate = self.flux_kmol.abs();
        if rate <= FLOW_EPSILON {
            return;
        }
        let (src, dst) = if self.flux_kmol > 0.0 { (0, 1) } else { (1, 0) };
        let src_id = self.ports[src];
        let dst_id = self.ports[dst];
        match (src_id == GROUND, dst_id == GROUND) {
            (false, false) => {
                let (src_node, dst_node) = pair_mut(nodes, src_id.idx(), dst_id.idx());
                src_node.collect_outflux(rate);
                dst_node.collect_influx(rate, src_node.content());
            }
            (false, true) => nodes[src_id.idx()].collect_outflux(rate),
            // Flow out of ground carries nothing.
            (true, _) => {}
        }
    }
}
