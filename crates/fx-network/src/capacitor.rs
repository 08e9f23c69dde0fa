//! Capacitor link: gives a node its volume and capacitance stamp.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{NetError, NetResult};
use crate::link::Link;
use crate::network::GROUND;
use crate::node::FluidNode;
use crate::solver::SystemAssembly;
use fx_core::NodeId;
use fx_fluids::R_UNIVERSAL;

/// Volume-edit capability for a capacitor's node.
///
/// Other links that must change the node's volume (a distributed
/// interface zeroing it in Demand mode) hold a [`VolumeHandle`] and see
/// only this surface; the capacitor link applies pending edits at the
/// top of its stamp so the solver observes a stable volume within any
/// one tick.
#[derive(Debug)]
pub struct NodeVolume {
    volume_m3: f64,
    pending: Option<f64>,
}

impl NodeVolume {
    /// Request a volume edit. `enable = false` cancels a pending edit.
    pub fn edit_volume(&mut self, enable: bool, volume_m3: f64) {
        self.pending = enable.then_some(volume_m3);
    }

    /// The volume as of the last applied edit [m³].
    pub fn get_volume(&self) -> f64 {
        self.volume_m3
    }
}

pub type VolumeHandle = Rc<RefCell<NodeVolume>>;

/// One-port link holding a node's capacitive volume.
///
/// Stamps the implicit capacitance terms `C/dt` and `C/dt · p` with
/// `C = V/(R̄·T)` [kmol/kPa] from the ideal gas law.
pub struct CapacitorLink {
    name: String,
    ports: [NodeId; 1],
    volume: VolumeHandle,
    capacitance: f64,
}

impl CapacitorLink {
    pub fn new(name: impl Into<String>, node: NodeId, volume_m3: f64) -> NetResult<Self> {
        if node == GROUND {
            return Err(NetError::PortMapping {
                what: "capacitor cannot map to the ground node".into(),
            });
        }
        if volume_m3 < 0.0 || !volume_m3.is_finite() {
            return Err(NetError::InvalidArg {
                what: "capacitor volume must be non-negative and finite",
            });
        }
        Ok(Self {
            name: name.into(),
            ports: [node],
            volume: Rc::new(RefCell::new(NodeVolume {
                volume_m3,
                pending: None,
            })),
            capacitance: 0.0,
        })
    }

    /// A handle other links can use to edit the node's volume.
    pub fn volume_handle(&self) -> VolumeHandle {
        Rc::clone(&self.volume)
    }

    /// The capacitance stamped on the last tick [kmol/kPa].
    pub fn capacitance(&self) -> f64 {
        self.capacitance
    }
}

impl Link for CapacitorLink {
    fn name(&self) -> &str {
        &self.name
    }

    fn ports(&self) -> &[NodeId] {
        &self.ports
    }

    fn stamp(
        &mut self,
        sys: &mut SystemAssembly,
        nodes: &mut [FluidNode],
        dt: f64,
    ) -> NetResult<()> {
        let node = &mut nodes[self.ports[0].idx()];

        // Apply a pending volume edit before stamping.
        {
            let mut vol = self.volume.borrow_mut();
            if let Some(v) = vol.pending.take() {
                vol.volume_m3 = v;
            }
            node.set_volume_m3(vol.volume_m3);
        }

        let t = node.content().temperature_k();
        self.capacitance = if t > 0.0 {
            node.volume_m3() / (R_UNIVERSAL * t)
        } else {
            0.0
        };

        if dt > f64::EPSILON && self.capacitance > 0.0 {
            let g = self.capacitance / dt;
            sys.add_admittance(self.ports[0], self.ports[0], g);
            sys.add_source(self.ports[0], g * node.potential_kpa());
        }
        Ok(())
    }

    fn compute_flows(&mut self, _nodes: &mut [FluidNode], _dt: f64) {
        // Storage exchange with the node is implicit in the stamp.
    }

    fn transport_flows(&mut self, _nodes: &mut [FluidNode], _dt: f64) {}
}
