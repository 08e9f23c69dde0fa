//! The distributed interface link.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use fx_core::units::convert::{KILO_PER_UNIT, UNIT_PER_KILO};
use fx_core::{limit_range, limit_range_i64, NodeId};
use fx_fluids::{mixture, FluidCatalog, FluidState};
use fx_network::{
    FlowDirection, FluidNode, Link, NetError, NetResult, SystemAssembly, VolumeHandle, GROUND,
};
use tracing::{info, warn};

use crate::config::{DistributedInterfaceConfig, DistributedInterfaceInput};
use crate::error::{InterfaceError, InterfaceResult};
use crate::payload::InterfaceData;
use crate::share::{InterfaceShare, ShareHandle};

/// Probe flux [kmol/s] for network capacitance measurements. This value
/// gets reliable capacitance readings from the solver for both liquid
/// and gas nodes.
pub const NETWORK_CAPACITANCE_FLUX: f64 = 1.0e-6;

/// Maximum admittance any link may stamp into the system.
const CONDUCTANCE_LIMIT: f64 = 1.0e15;

/// Capacitances below this are treated as absent when shaping the
/// Demand conductance; comparing against single precision epsilon
/// avoids chatter when the supplied capacitance does not exactly cancel
/// the measured network capacitance.
const CAPACITANCE_EPSILON: f64 = f32::EPSILON as f64;

/// Rates smaller than this are treated as no flow.
const FLOW_EPSILON: f64 = 100.0 * f64::EPSILON;

/// The payload buffers one link exchanges with its peer.
///
/// Allocated once at link construction, sized to the negotiated
/// interface widths, and mutated in place from then on. The transport
/// copies `out_data` into the peer's `in_data` however it likes
/// (shared memory, socket, middleware); the link itself never blocks on
/// the peer.
#[derive(Debug)]
pub struct InterfaceBuffers {
    pub in_data: InterfaceData,
    pub out_data: InterfaceData,
}

pub type BufferHandle = Rc<RefCell<InterfaceBuffers>>;

/// One half of a distributed interface pair.
///
/// A one-port link on the shared boundary node. Owns the Supply or
/// Demand role as arbitrated with its peer: in Supply it advertises the
/// node pressure and converts the peer's molar demand into a flow
/// source; in Demand it turns the peer's advertised pressure and
/// capacitance into a conductance-to-pressure-source stamp, with a
/// lag-aware gain filter for stability.
///
/// Because the Demand effect cannot ride on a node with capacitance,
/// the link zeroes the node's volume through the capacitor's volume
/// handle when entering Demand and restores it on the way back. Mass is
/// not conserved across a role flip; the error is proportional to loop
/// lag and the flow transient, which is why role flips quiesce for at
/// least one measured round trip.
pub struct DistributedInterface {
    name: String,
    ports: [NodeId; 1],
    catalog: Arc<FluidCatalog>,

    // configuration
    is_pair_master: bool,
    use_enthalpy: bool,
    demand_option: bool,
    moding_capacitance_ratio: f64,
    demand_filter_const_a: f64,
    demand_filter_const_b: f64,

    // input data
    force_demand_mode: bool,
    force_supply_mode: bool,
    blockage: Option<f64>,

    buffers: BufferHandle,
    volume: VolumeHandle,
    share: ShareHandle,
    siblings: Vec<ShareHandle>,

    // link state
    in_data_last_demand_mode: bool,
    frames_since_flip: i64,
    supply_volume: f64,
    effective_conductivity: f64,
    source_pressure: f64,
    demand_flux: f64,
    loop_latency: i64,
    demand_flux_gain: f64,
    admittance: f64,
    source: f64,
    flux: f64,
    flow_rate: f64,
    potential_drop: f64,
    direction: FlowDirection,

    /// Demand-side fluid arriving from the peer while this side supplies.
    internal_fluid: FluidState,
    /// Shadow of the last agreed node state, for sensors.
    fluid_state: FluidState,

    scratch_mole: Vec<f64>,
    scratch_mass: Vec<f64>,
    scratch_tc: Vec<f64>,
}

impl DistributedInterface {
    /// Create a link on `node`, holding the node capacitor's volume
    /// handle. `initial_state` seeds the internal and shadow fluids;
    /// normally the node's initial contents.
    ///
    /// Both sides start in Supply mode.
    pub fn new(
        name: impl Into<String>,
        node: NodeId,
        catalog: Arc<FluidCatalog>,
        volume: VolumeHandle,
        config: DistributedInterfaceConfig,
        input: DistributedInterfaceInput,
        initial_state: &FluidState,
    ) -> InterfaceResult<Self> {
        config.validate()?;
        input.validate()?;
        if node == GROUND {
            return Err(InterfaceError::Config {
                what: "link must map to a non-ground node",
            });
        }

        let n_bulk = catalog.n_bulk();
        let n_trace = catalog.n_trace();
        let buffers = Rc::new(RefCell::new(InterfaceBuffers {
            in_data: InterfaceData::new(n_bulk, n_trace, config.interface_sizes_override),
            out_data: InterfaceData::new(n_bulk, n_trace, config.interface_sizes_override),
        }));
        let share = Rc::new(RefCell::new(InterfaceShare {
            node,
            supplied_capacitance: 0.0,
        }));

        Ok(Self {
            name: name.into(),
            ports: [node],
            catalog,
            is_pair_master: config.is_pair_master,
            use_enthalpy: config.use_enthalpy,
            demand_option: config.demand_option,
            moding_capacitance_ratio: config.moding_capacitance_ratio,
            demand_filter_const_a: config.demand_filter_const_a,
            demand_filter_const_b: config.demand_filter_const_b,
            force_demand_mode: input.force_demand_mode,
            force_supply_mode: input.force_supply_mode,
            blockage: input.blockage,
            buffers,
            volume,
            share,
            siblings: Vec::new(),
            in_data_last_demand_mode: false,
            frames_since_flip: 0,
            supply_volume: 0.0,
            effective_conductivity: 0.0,
            source_pressure: 0.0,
            demand_flux: 0.0,
            loop_latency: 0,
            demand_flux_gain: 1.0,
            admittance: 0.0,
            source: 0.0,
            flux: 0.0,
            flow_rate: 0.0,
            potential_drop: 0.0,
            direction: FlowDirection::None,
            internal_fluid: initial_state.clone(),
            fluid_state: initial_state.clone(),
            scratch_mole: vec![0.0; n_bulk],
            scratch_mass: vec![0.0; n_bulk],
            scratch_tc: vec![0.0; n_trace],
        })
    }

    /// Handle to the payload buffers for the transport layer.
    pub fn buffers(&self) -> BufferHandle {
        Rc::clone(&self.buffers)
    }

    /// This link's share handle, for registration with siblings.
    pub fn share(&self) -> ShareHandle {
        Rc::clone(&self.share)
    }

    /// Register another interface in the same network so the two do not
    /// count each other's injected capacitance. Duplicates and this
    /// link's own handle are quietly ignored, so one list can be
    /// broadcast to every link in the network.
    pub fn add_sibling(&mut self, other: ShareHandle) {
        let duplicate = Rc::ptr_eq(&other, &self.share)
            || self.siblings.iter().any(|s| Rc::ptr_eq(s, &other));
        if !duplicate {
            self.siblings.push(other);
        }
    }

    /// Reset derived state after a restart. Role and payload buffers
    /// persist; the gain filter returns to unity.
    pub fn restart(&mut self) {
        self.effective_conductivity = 0.0;
        self.source_pressure = 0.0;
        self.demand_flux = 0.0;
        self.loop_latency = 0;
        self.demand_flux_gain = 1.0;
        self.admittance = 0.0;
        self.source = 0.0;
        self.share.borrow_mut().supplied_capacitance = 0.0;
        self.scratch_mass.fill(0.0);
        self.scratch_mole.fill(0.0);
        self.scratch_tc.fill(0.0);
    }

    /// Round-trip data lag, in this side's ticks, measured from the
    /// echoed frame counter.
    pub fn loop_latency(&self) -> i64 {
        self.loop_latency
    }

    /// The lag filter gain applied to the Demand conductance.
    pub fn demand_flux_gain(&self) -> f64 {
        self.demand_flux_gain
    }

    /// Capacitance this link adds to its node in Demand mode [kmol/kPa].
    pub fn supplied_capacitance(&self) -> f64 {
        self.share.borrow().supplied_capacitance
    }

    /// Molar flux through the link on the last tick [kmol/s].
    pub fn flux_kmol(&self) -> f64 {
        self.flux
    }

    /// Mass flow rate through the link on the last tick [kg/s].
    pub fn flow_rate_kg(&self) -> f64 {
        self.flow_rate
    }

    pub fn direction(&self) -> FlowDirection {
        self.direction
    }

    /// The last agreed interface fluid state, for sensors.
    pub fn fluid_state(&self) -> &FluidState {
        &self.fluid_state
    }

    fn node_index(&self) -> usize {
        self.ports[0].idx()
    }

    /// Mode flips driven by incoming data: force flags first, then the
    /// Demand→Supply handshake on the peer's demand-mode rising edge,
    /// then the start-up race where the smaller-capacitance side takes
    /// Demand and the pair master breaks ties.
    fn flip_modes_on_input(&mut self, nodes: &mut [FluidNode]) {
        let (in_valid, in_demand, in_cap, out_demand, out_cap) = {
            let b = self.buffers.borrow();
            (
                b.in_data.valid(),
                b.in_data.demand_mode,
                b.in_data.capacitance,
                b.out_data.demand_mode,
                b.out_data.capacitance,
            )
        };

        if self.force_demand_mode && !out_demand {
            self.flip_to_demand_mode(nodes);
        } else if self.force_supply_mode && out_demand {
            self.flip_to_supply_mode();
        } else if in_valid {
            if out_demand && in_demand && !self.in_data_last_demand_mode {
                // The peer has started the role swap; hand Demand over.
                self.flip_to_supply_mode();
            } else if !in_demand && !out_demand {
                // Start-up race: both sides still supplying.
                if out_cap < in_cap || (self.is_pair_master && out_cap == in_cap) {
                    self.flip_to_demand_mode(nodes);
                }
            }
            self.in_data_last_demand_mode = in_demand;
        }
    }

    /// Supply→Demand flip on relative capacitance, checked after the
    /// solve. Quiesces for at least one measured round trip so large
    /// transients cannot cause limit cycles.
    fn flip_modes_on_capacitance(&mut self, nodes: &mut [FluidNode]) {
        let (out_cap, in_cap) = {
            let b = self.buffers.borrow();
            (b.out_data.capacitance, b.in_data.capacitance)
        };
        if self.frames_since_flip > self.loop_latency
            && out_cap * self.moding_capacitance_ratio < in_cap
            && self.flip_to_demand_mode(nodes)
        {
            // Zero the published source so the peer cannot read our old
            // pressure value as a flow demand.
            self.buffers.borrow_mut().out_data.source = 0.0;
        }
    }

    /// In Demand mode the node must carry no capacitance of its own, so
    /// the node's volume is parked here and zeroed through the
    /// capacitor's edit handle; the interfacing volume follows the
    /// supply side until the roles flip back.
    fn flip_to_demand_mode(&mut self, nodes: &mut [FluidNode]) -> bool {
        if self.force_supply_mode {
            return false;
        }
        self.buffers.borrow_mut().out_data.demand_mode = true;
        self.supply_volume = nodes[self.node_index()].volume_m3();
        self.volume.borrow_mut().edit_volume(true, 0.0);
        self.frames_since_flip = 0;
        info!(link = %self.name, "switched to Demand mode");
        true
    }

    fn flip_to_supply_mode(&mut self) -> bool {
        if self.force_demand_mode {
            return false;
        }
        self.buffers.borrow_mut().out_data.demand_mode = false;
        self.volume.borrow_mut().edit_volume(true, self.supply_volume);
        self.supply_volume = 0.0;
        self.frames_since_flip = 0;
        info!(link = %self.name, "switched to Supply mode");
        true
    }

    /// Demand-side input processing: apply the peer's pressure and
    /// fluid state to the node, or hold the node when the peer has not
    /// yet published valid data.
    fn process_inputs_demand(&mut self, nodes: &mut [FluidNode]) -> InterfaceResult<()> {
        let buffers = Rc::clone(&self.buffers);
        let b = buffers.borrow();
        if !b.out_data.demand_mode {
            return Ok(());
        }
        if b.in_data.valid() && !b.in_data.demand_mode {
            self.source_pressure = b.in_data.source * KILO_PER_UNIT;
            let node = &mut nodes[self.ports[0].idx()];
            ingest_fluid(
                &self.catalog,
                self.use_enthalpy,
                &b.in_data,
                self.source_pressure,
                node.content_mut(),
                &mut self.scratch_mole,
                &mut self.scratch_mass,
                &mut self.scratch_tc,
            )?;
            self.fluid_state.set_state_from(node.content());
        } else {
            self.source_pressure = nodes[self.ports[0].idx()].potential_kpa();
        }
        Ok(())
    }

    /// Supply-side input processing: convert the peer's molar demand
    /// into a flow source and load its fluid into the internal inflow
    /// state. The external mol/s becomes the solver's kmol/s here, and
    /// the bulk-fraction sum scales out the trace compounds the bulk
    /// solver does not track.
    fn process_inputs_supply(&mut self) -> InterfaceResult<()> {
        self.demand_flux = 0.0;
        let buffers = Rc::clone(&self.buffers);
        let b = buffers.borrow();
        if b.out_data.demand_mode {
            return Ok(());
        }
        self.source_pressure = 0.0;
        if b.in_data.valid() && b.in_data.demand_mode {
            let bulk_fraction_sum = ingest_fluid(
                &self.catalog,
                self.use_enthalpy,
                &b.in_data,
                1.0,
                &mut self.internal_fluid,
                &mut self.scratch_mole,
                &mut self.scratch_mass,
                &mut self.scratch_tc,
            )?;
            self.demand_flux = -b.in_data.source * KILO_PER_UNIT * bulk_fraction_sum;
        }
        Ok(())
    }

    /// Publish `capacitance`: the node's measured network capacitance,
    /// less what this link itself injects in Demand mode, less the
    /// effective contribution of every sibling interface currently in
    /// Demand elsewhere in this network. A sibling's effect arrives
    /// through the conductive network, attenuated by the ratio of the
    /// solver's sensitivity row entries at the two nodes.
    fn output_capacitance(&mut self, nodes: &[FluidNode]) {
        let node = &nodes[self.node_index()];
        let mut capacitance =
            node.network_capacitance() - self.share.borrow().supplied_capacitance;

        let dp_row = node.netcap_delta_potential();
        let our_dp = dp_row.get(self.node_index()).copied().unwrap_or(0.0);
        for sibling in &self.siblings {
            let s = sibling.borrow();
            if s.supplied_capacitance > f64::EPSILON {
                if let Some(&sibling_dp) = dp_row.get(s.node.idx()) {
                    if sibling_dp > f64::EPSILON {
                        let ratio = sibling_dp / our_dp.max(f64::EPSILON);
                        capacitance -= s.supplied_capacitance * ratio;
                    }
                }
            }
        }

        self.buffers.borrow_mut().out_data.capacitance = capacitance.max(0.0);
    }

    fn process_outputs_supply(&mut self, nodes: &mut [FluidNode]) -> InterfaceResult<()> {
        self.output_capacitance(nodes);
        let buffers = Rc::clone(&self.buffers);
        let mut b = buffers.borrow_mut();
        let node = &nodes[self.ports[0].idx()];
        b.out_data.source = node.potential_kpa() * UNIT_PER_KILO;
        output_fluid(
            self.use_enthalpy,
            &mut b.out_data,
            node.content(),
            &mut self.scratch_mole,
            &mut self.scratch_tc,
        )?;
        self.fluid_state.set_state_from(node.content());
        Ok(())
    }

    /// Publish the molar demand: the solved flux, widened back to mol/s
    /// and scaled up to include trace compounds. The flow's fluid state
    /// comes from the node's inflow when it saw flow this tick; a stale
    /// or negative-fraction inflow falls back to the node contents.
    fn process_outputs_demand(&mut self, nodes: &mut [FluidNode]) -> InterfaceResult<()> {
        self.output_capacitance(nodes);
        let node = &nodes[self.ports[0].idx()];
        let use_contents = if node.inflow().temperature_k() > 0.0 {
            if node.inflow().has_negative_fractions() {
                warn!(link = %self.name, "demand node inflow has negative mixture fractions");
                true
            } else {
                false
            }
        } else {
            true
        };
        let fluid = if use_contents {
            node.content()
        } else {
            node.inflow()
        };

        let buffers = Rc::clone(&self.buffers);
        let mut b = buffers.borrow_mut();
        let mole_fraction_sum = output_fluid(
            self.use_enthalpy,
            &mut b.out_data,
            fluid,
            &mut self.scratch_mole,
            &mut self.scratch_tc,
        )?;
        b.out_data.source = self.flux * UNIT_PER_KILO * mole_fraction_sum;
        Ok(())
    }
}

impl Link for DistributedInterface {
    fn name(&self) -> &str {
        &self.name
    }

    fn ports(&self) -> &[NodeId] {
        &self.ports
    }

    /// Pre-solve: arbitrate the role from incoming data, apply the
    /// peer's state for the resulting role, then advance the frame
    /// counters and the loop latency measurement.
    fn process_inputs(&mut self, nodes: &mut [FluidNode]) -> NetResult<()> {
        self.flip_modes_on_input(nodes);
        self.process_inputs_demand(nodes).map_err(NetError::from)?;
        self.process_inputs_supply().map_err(NetError::from)?;

        let mut b = self.buffers.borrow_mut();
        b.out_data.frame_count += 1;
        self.loop_latency = b.out_data.frame_count as i64 - b.in_data.frame_loopback as i64;
        b.out_data.frame_loopback = b.in_data.frame_count;
        Ok(())
    }

    /// Contribute this tick's admittance and source terms.
    ///
    /// In Demand mode the conductance mirrors the supply network's
    /// capacitance, `G = gain·Cs/dt`, with the gain shrinking
    /// geometrically in the measured loop latency and recovering toward
    /// unity as the supply capacitance dominates. The default form adds
    /// a series resistance `dt/Cd` that damps the response over one
    /// step; `demand_option` removes it. In Supply mode zero conductance
    /// blocks the potential-source effect and only the demand flux
    /// (if any) is stamped.
    fn stamp(
        &mut self,
        sys: &mut SystemAssembly,
        nodes: &mut [FluidNode],
        dt: f64,
    ) -> NetResult<()> {
        let (out_demand, out_cap, in_cap) = {
            let b = self.buffers.borrow();
            (
                b.out_data.demand_mode,
                b.out_data.capacitance,
                b.in_data.capacitance,
            )
        };

        if out_demand && dt > f64::EPSILON {
            if out_cap > CAPACITANCE_EPSILON && in_cap > CAPACITANCE_EPSILON {
                let cs_over_cd =
                    limit_range(1.0, in_cap / out_cap, self.moding_capacitance_ratio);
                let exponent = limit_range_i64(1, self.loop_latency, 100);
                let gain_limit = (self.demand_filter_const_a
                    * self.demand_filter_const_b.powi(exponent as i32))
                .min(1.0);
                self.demand_flux_gain =
                    gain_limit + (1.0 - gain_limit) * (cs_over_cd - 1.0) * 4.0;
                let conductance = self.demand_flux_gain * in_cap / dt;
                self.effective_conductivity = if self.demand_option {
                    conductance
                } else {
                    1.0 / (1.0 / conductance + dt / out_cap).max(f64::EPSILON)
                };
            } else {
                self.demand_flux_gain = 1.0;
                self.effective_conductivity = self.demand_flux_gain * in_cap / dt;
            }
            if let Some(blockage) = self.blockage {
                self.effective_conductivity *= 1.0 - blockage;
            }
        } else {
            self.effective_conductivity = 0.0;
        }

        self.admittance = limit_range(0.0, self.effective_conductivity, CONDUCTANCE_LIMIT);

        self.share.borrow_mut().supplied_capacitance = if out_demand {
            self.admittance * dt
        } else {
            0.0
        };

        self.source = self.source_pressure * self.admittance + self.demand_flux;
        sys.add_admittance(self.ports[0], self.ports[0], self.admittance);
        sys.add_source(self.ports[0], self.source);

        // Have the solver measure this node's network capacitance.
        nodes[self.node_index()].set_network_capacitance_request(NETWORK_CAPACITANCE_FLUX);
        Ok(())
    }

    /// Flux [kmol/s] = drop [kPa] · admittance [kmol/(kPa·s)] + source.
    fn compute_flows(&mut self, nodes: &mut [FluidNode], _dt: f64) {
        let out_demand = self.buffers.borrow().out_data.demand_mode;
        let node = &mut nodes[self.ports[0].idx()];
        self.potential_drop = -node.potential_kpa();
        self.flux = self.potential_drop * self.admittance + self.source;

        if self.flux > FLOW_EPSILON {
            self.direction = FlowDirection::Sink;
        } else if self.flux < -FLOW_EPSILON {
            if out_demand {
                self.direction = FlowDirection::Source;
                node.schedule_outflux(-self.flux);
            } else {
                self.direction = FlowDirection::Sink;
            }
        } else {
            self.direction = FlowDirection::None;
        }
    }

    /// Move the solved flow to or from the node. In Demand mode the
    /// node's contents already carry the supply fluid, so transfers use
    /// the node's own molar weight; in Supply mode the flow carries the
    /// peer's fluid as loaded into the internal inflow state.
    fn transport_flows(&mut self, nodes: &mut [FluidNode], _dt: f64) {
        let out_demand = self.buffers.borrow().out_data.demand_mode;
        let node = &mut nodes[self.ports[0].idx()];
        let molar_weight = if out_demand {
            node.content().molar_mass()
        } else {
            self.internal_fluid.molar_mass()
        };
        self.flow_rate = self.flux * molar_weight;

        if out_demand {
            if self.flow_rate > FLOW_EPSILON {
                node.collect_influx_of_contents(self.flux);
            } else if self.flow_rate < -FLOW_EPSILON {
                node.collect_outflux(-self.flux);
            }
        } else if self.flow_rate.abs() > FLOW_EPSILON {
            node.collect_influx(self.flux, &self.internal_fluid);
        }
    }

    /// Post-solve: publish this side's payload for the current role,
    /// and in Supply mode check whether the capacitance balance says
    /// the Demand role belongs here now.
    fn process_outputs(&mut self, nodes: &mut [FluidNode]) -> NetResult<()> {
        let out_demand = self.buffers.borrow().out_data.demand_mode;
        if out_demand {
            self.process_outputs_demand(nodes).map_err(NetError::from)?;
        } else {
            self.process_outputs_supply(nodes).map_err(NetError::from)?;
            self.flip_modes_on_capacitance(nodes);
        }
        self.frames_since_flip += 1;
        Ok(())
    }
}

/// Apply an inbound payload's fluid state to `fluid` at the given
/// pressure [kPa]. Returns the inbound bulk mole-fraction sum (≤ 1),
/// which callers use to rescale molar rates between the interface's
/// bulk+trace convention and the solver's bulk-only convention.
///
/// On the wire, bulk and trace fractions sum to 1 together; internally
/// only the bulk set sums to 1 and traces ride relative to it, so both
/// groups are divided by the bulk sum here.
#[allow(clippy::too_many_arguments)]
fn ingest_fluid(
    catalog: &FluidCatalog,
    use_enthalpy: bool,
    in_data: &InterfaceData,
    pressure_kpa: f64,
    fluid: &mut FluidState,
    scratch_mole: &mut [f64],
    scratch_mass: &mut [f64],
    scratch_tc: &mut [f64],
) -> InterfaceResult<f64> {
    in_data.get_bulk(scratch_mole);
    let bulk_sum: f64 = scratch_mole.iter().sum();
    if bulk_sum < f64::EPSILON {
        return Err(InterfaceError::InvalidData {
            what: "incoming bulk mole fractions sum to zero",
        });
    }
    for x in scratch_mole.iter_mut() {
        *x /= bulk_sum;
    }
    mixture::mole_to_mass(catalog, scratch_mole, scratch_mass)?;

    fluid.set_mass_fractions(scratch_mass);
    fluid.set_pressure_kpa(pressure_kpa);
    if use_enthalpy {
        let t = fluid.temperature_from_enthalpy(in_data.energy);
        fluid.set_temperature_k(t);
    } else {
        fluid.set_temperature_k(in_data.energy);
    }

    if !scratch_tc.is_empty() {
        in_data.get_trace(scratch_tc);
        for x in scratch_tc.iter_mut() {
            *x /= bulk_sum;
        }
        fluid.set_trace_mole_fractions(scratch_tc);
    }
    Ok(bulk_sum)
}

/// Publish `fluid` into an outbound payload. Returns the combined bulk
/// plus trace mole-fraction sum before normalization (≥ 1), the factor
/// that widens a bulk-only molar rate to the interface's total-flow
/// convention.
fn output_fluid(
    use_enthalpy: bool,
    out_data: &mut InterfaceData,
    fluid: &FluidState,
    scratch_mole: &mut [f64],
    scratch_tc: &mut [f64],
) -> InterfaceResult<f64> {
    out_data.energy = if use_enthalpy {
        fluid.specific_enthalpy()
    } else {
        fluid.temperature_k()
    };

    fluid.mole_fractions_into(scratch_mole)?;
    scratch_tc.copy_from_slice(fluid.trace_mole_fractions());

    let mole_fraction_sum: f64 =
        scratch_mole.iter().sum::<f64>() + scratch_tc.iter().sum::<f64>();
    for x in scratch_mole.iter_mut() {
        *x /= mole_fraction_sum;
    }
    for x in scratch_tc.iter_mut() {
        *x /= mole_fraction_sum;
    }
    out_data.set_bulk(scratch_mole);
    out_data.set_trace(scratch_tc);
    Ok(mole_fraction_sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fx_fluids::{Species, TraceCompound};
    use fx_network::{solver, CapacitorLink};

    const DT: f64 = 0.1;

    fn catalog() -> Arc<FluidCatalog> {
        Arc::new(
            FluidCatalog::new(
                vec![Species::O2, Species::N2, Species::CO2],
                vec![TraceCompound::CO],
            )
            .unwrap(),
        )
    }

    fn cabin_air(catalog: &Arc<FluidCatalog>) -> FluidState {
        FluidState::new(catalog.clone(), 101.325, 294.261, &[0.21, 0.79, 0.0], &[0.0])
            .unwrap()
    }

    fn rig(
        config: DistributedInterfaceConfig,
        input: DistributedInterfaceInput,
    ) -> (DistributedInterface, Vec<FluidNode>, CapacitorLink) {
        let cat = catalog();
        let state = cabin_air(&cat);
        let mut node = FluidNode::new("n0", state.clone());
        node.set_volume_m3(1.0);
        let cap = CapacitorLink::new("cap0", NodeId::from_index(0), 1.0).unwrap();
        let ifc = DistributedInterface::new(
            "ifc0",
            NodeId::from_index(0),
            cat,
            cap.volume_handle(),
            config,
            input,
            &state,
        )
        .unwrap();
        (ifc, vec![node], cap)
    }

    fn fill_valid_supply(data: &mut InterfaceData, capacitance: f64) {
        data.frame_count = 1;
        data.demand_mode = false;
        data.capacitance = capacitance;
        data.source = 101_325.0;
        data.energy = 294.261;
        data.set_bulk(&[0.21, 0.79, 0.0]);
    }

    fn fill_valid_demand(data: &mut InterfaceData, source_mol_s: f64) {
        data.frame_count = 1;
        data.demand_mode = true;
        data.capacitance = 4.0e-4;
        data.source = source_mol_s;
        data.energy = 294.261;
        data.set_bulk(&[0.21, 0.79, 0.0]);
    }

    #[test]
    fn rejects_ground_node_and_bad_config() {
        let cat = catalog();
        let state = cabin_air(&cat);
        let cap = CapacitorLink::new("cap0", NodeId::from_index(0), 1.0).unwrap();
        assert!(DistributedInterface::new(
            "bad",
            GROUND,
            cat.clone(),
            cap.volume_handle(),
            DistributedInterfaceConfig::default(),
            DistributedInterfaceInput::default(),
            &state,
        )
        .is_err());

        let both_forced = DistributedInterfaceInput {
            force_demand_mode: true,
            force_supply_mode: true,
            ..Default::default()
        };
        assert!(DistributedInterface::new(
            "bad",
            NodeId::from_index(0),
            cat,
            cap.volume_handle(),
            DistributedInterfaceConfig::default(),
            both_forced,
            &state,
        )
        .is_err());
    }

    #[test]
    fn demand_gain_shrinks_geometrically_with_latency() {
        let (mut ifc, mut nodes, _cap) = rig(
            DistributedInterfaceConfig::default(),
            DistributedInterfaceInput::default(),
        );
        {
            let buffers = ifc.buffers();
            let mut b = buffers.borrow_mut();
            b.out_data.demand_mode = true;
            b.out_data.capacitance = 1.0e-3;
            b.in_data.capacitance = 1.0e-3;
        }
        let mut sys = SystemAssembly::new(1);

        // eight frames of lag, equal capacitances: gain = 1.5·0.75^8
        ifc.loop_latency = 8;
        ifc.stamp(&mut sys, &mut nodes, DT).unwrap();
        assert!((ifc.demand_flux_gain - 0.150_169_37).abs() < 1e-6);

        let base_g = ifc.demand_flux_gain * 1.0e-3 / DT;
        let expected = 1.0 / (1.0 / base_g + DT / 1.0e-3);
        assert!((ifc.effective_conductivity - expected).abs() < 1e-12);
        assert!((ifc.supplied_capacitance() - ifc.admittance * DT).abs() < 1e-15);

        // one frame of lag: min(1, 1.125) = 1
        ifc.loop_latency = 1;
        sys.clear();
        ifc.stamp(&mut sys, &mut nodes, DT).unwrap();
        assert!((ifc.demand_flux_gain - 1.0).abs() < 1e-12);
    }

    #[test]
    fn gain_recovers_when_supply_capacitance_dominates() {
        let (mut ifc, mut nodes, _cap) = rig(
            DistributedInterfaceConfig::default(),
            DistributedInterfaceInput::default(),
        );
        {
            let buffers = ifc.buffers();
            let mut b = buffers.borrow_mut();
            b.out_data.demand_mode = true;
            b.out_data.capacitance = 1.0e-3;
            // ratio clamps at the moding band (1.25), driving gain to 1
            b.in_data.capacitance = 10.0e-3;
        }
        ifc.loop_latency = 8;
        let mut sys = SystemAssembly::new(1);
        ifc.stamp(&mut sys, &mut nodes, DT).unwrap();
        assert!((ifc.demand_flux_gain - 1.0).abs() < 1e-9);
    }

    #[test]
    fn demand_option_drops_series_resistance() {
        let config = DistributedInterfaceConfig {
            demand_option: true,
            ..Default::default()
        };
        let (mut ifc, mut nodes, _cap) =
            rig(config, DistributedInterfaceInput::default());
        {
            let buffers = ifc.buffers();
            let mut b = buffers.borrow_mut();
            b.out_data.demand_mode = true;
            b.out_data.capacitance = 1.0e-3;
            b.in_data.capacitance = 1.0e-3;
        }
        ifc.loop_latency = 1;
        let mut sys = SystemAssembly::new(1);
        ifc.stamp(&mut sys, &mut nodes, DT).unwrap();
        let base_g = 1.0 * 1.0e-3 / DT;
        assert!((ifc.effective_conductivity - base_g).abs() < 1e-12);
    }

    #[test]
    fn blockage_scales_conductance() {
        let input = DistributedInterfaceInput {
            blockage: Some(0.5),
            ..Default::default()
        };
        let (mut ifc, mut nodes, _cap) =
            rig(DistributedInterfaceConfig::default(), input);
        {
            let buffers = ifc.buffers();
            let mut b = buffers.borrow_mut();
            b.out_data.demand_mode = true;
            b.out_data.capacitance = 1.0e-3;
            b.in_data.capacitance = 1.0e-3;
        }
        ifc.loop_latency = 1;
        let mut sys = SystemAssembly::new(1);
        ifc.stamp(&mut sys, &mut nodes, DT).unwrap();

        let base_g = 1.0e-3 / DT;
        let undamped = 1.0 / (1.0 / base_g + DT / 1.0e-3);
        assert!((ifc.effective_conductivity - 0.5 * undamped).abs() < 1e-12);
    }

    #[test]
    fn supply_mode_stamps_no_admittance() {
        let (mut ifc, mut nodes, _cap) = rig(
            DistributedInterfaceConfig::default(),
            DistributedInterfaceInput::default(),
        );
        let mut sys = SystemAssembly::new(1);
        ifc.stamp(&mut sys, &mut nodes, DT).unwrap();
        assert_eq!(ifc.admittance, 0.0);
        assert_eq!(ifc.supplied_capacitance(), 0.0);
        assert_eq!(sys.admittance(0, 0), 0.0);
    }

    #[test]
    fn startup_race_smaller_capacitance_takes_demand() {
        let (mut ifc, mut nodes, _cap) = rig(
            DistributedInterfaceConfig::default(),
            DistributedInterfaceInput::default(),
        );
        {
            let buffers = ifc.buffers();
            let mut b = buffers.borrow_mut();
            b.out_data.capacitance = 4.0e-4;
            fill_valid_supply(&mut b.in_data, 8.0e-4);
        }
        ifc.process_inputs(&mut nodes).unwrap();
        assert!(ifc.buffers().borrow().out_data.demand_mode);
        assert_eq!(ifc.supply_volume, 1.0);
        assert_eq!(ifc.frames_since_flip, 0);
    }

    #[test]
    fn startup_race_master_wins_tie() {
        for (master, expect_demand) in [(true, true), (false, false)] {
            let config = DistributedInterfaceConfig {
                is_pair_master: master,
                ..Default::default()
            };
            let (mut ifc, mut nodes, _cap) =
                rig(config, DistributedInterfaceInput::default());
            {
                let buffers = ifc.buffers();
                let mut b = buffers.borrow_mut();
                b.out_data.capacitance = 4.0e-4;
                fill_valid_supply(&mut b.in_data, 4.0e-4);
            }
            ifc.process_inputs(&mut nodes).unwrap();
            assert_eq!(ifc.buffers().borrow().out_data.demand_mode, expect_demand);
        }
    }

    #[test]
    fn invalid_inbound_never_arbitrates() {
        let (mut ifc, mut nodes, _cap) = rig(
            DistributedInterfaceConfig::default(),
            DistributedInterfaceInput::default(),
        );
        {
            let buffers = ifc.buffers();
            let mut b = buffers.borrow_mut();
            b.out_data.capacitance = 4.0e-4;
            fill_valid_supply(&mut b.in_data, 8.0e-4);
            b.in_data.energy = 0.0; // spoils validity
        }
        ifc.process_inputs(&mut nodes).unwrap();
        assert!(!ifc.buffers().borrow().out_data.demand_mode);
    }

    #[test]
    fn handshake_hands_demand_back_on_rising_edge() {
        let (mut ifc, mut nodes, _cap) = rig(
            DistributedInterfaceConfig::default(),
            DistributedInterfaceInput::default(),
        );
        // put this side in Demand with a parked volume
        {
            let buffers = ifc.buffers();
            buffers.borrow_mut().out_data.demand_mode = true;
        }
        ifc.supply_volume = 1.0;
        ifc.in_data_last_demand_mode = false;
        {
            let buffers = ifc.buffers();
            fill_valid_demand(&mut buffers.borrow_mut().in_data, 5.0);
        }

        ifc.process_inputs(&mut nodes).unwrap();

        let buffers = ifc.buffers();
        let b = buffers.borrow();
        assert!(!b.out_data.demand_mode);
        assert_eq!(ifc.supply_volume, 0.0);
        assert!(ifc.in_data_last_demand_mode);
        // now supplying: the peer's 5 mol/s demand becomes -5e-3 kmol/s
        assert!((ifc.demand_flux + 5.0e-3).abs() < 1e-12);
    }

    #[test]
    fn handshake_needs_the_edge_not_the_level() {
        let (mut ifc, mut nodes, _cap) = rig(
            DistributedInterfaceConfig::default(),
            DistributedInterfaceInput::default(),
        );
        {
            let buffers = ifc.buffers();
            buffers.borrow_mut().out_data.demand_mode = true;
        }
        // peer was already demanding on the previous frame
        ifc.in_data_last_demand_mode = true;
        {
            let buffers = ifc.buffers();
            fill_valid_demand(&mut buffers.borrow_mut().in_data, 5.0);
        }
        ifc.process_inputs(&mut nodes).unwrap();
        assert!(ifc.buffers().borrow().out_data.demand_mode);
    }

    #[test]
    fn force_flags_pin_the_role() {
        let input = DistributedInterfaceInput {
            force_demand_mode: true,
            ..Default::default()
        };
        let (mut ifc, mut nodes, _cap) =
            rig(DistributedInterfaceConfig::default(), input);
        ifc.flip_modes_on_input(&mut nodes);
        assert!(ifc.buffers().borrow().out_data.demand_mode);

        // a forced-demand link refuses the flip back to supply
        assert!(!ifc.flip_to_supply_mode());
        assert!(ifc.buffers().borrow().out_data.demand_mode);
    }

    #[test]
    fn frame_counters_advance_and_measure_latency() {
        let (mut ifc, mut nodes, _cap) = rig(
            DistributedInterfaceConfig::default(),
            DistributedInterfaceInput::default(),
        );
        {
            let buffers = ifc.buffers();
            let mut b = buffers.borrow_mut();
            b.in_data.frame_count = 7;
            b.in_data.frame_loopback = 0;
        }
        ifc.process_inputs(&mut nodes).unwrap();
        ifc.process_inputs(&mut nodes).unwrap();

        let buffers = ifc.buffers();
        let b = buffers.borrow();
        assert_eq!(b.out_data.frame_count, 2);
        assert_eq!(b.out_data.frame_loopback, 7);
        assert_eq!(ifc.loop_latency(), 2);
    }

    #[test]
    fn demand_ingest_overwrites_node_and_renormalizes() {
        let (mut ifc, mut nodes, _cap) = rig(
            DistributedInterfaceConfig::default(),
            DistributedInterfaceInput::default(),
        );
        {
            let buffers = ifc.buffers();
            let mut b = buffers.borrow_mut();
            b.out_data.demand_mode = true;
            fill_valid_supply(&mut b.in_data, 8.0e-4);
            // bulk carries 90% of the moles, a trace the other 10%
            b.in_data.set_bulk(&[0.45, 0.45, 0.0]);
            b.in_data.set_trace(&[0.1]);
        }
        ifc.process_inputs(&mut nodes).unwrap();

        assert!((ifc.source_pressure - 101.325).abs() < 1e-9);
        let content = nodes[0].content();
        assert!((content.pressure_kpa() - 101.325).abs() < 1e-9);
        assert!((content.temperature_k() - 294.261).abs() < 1e-9);

        let mut mole = [0.0; 3];
        content.mole_fractions_into(&mut mole).unwrap();
        assert!((mole[0] - 0.5).abs() < 1e-9);
        assert!((mole[1] - 0.5).abs() < 1e-9);
        let sum: f64 = mole.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);

        // trace rescaled to be relative to the bulk phase: 0.1/0.9
        assert!((content.trace_mole_fractions()[0] - 0.1 / 0.9).abs() < 1e-9);

        // shadow state tracks the agreed contents
        assert!((ifc.fluid_state().pressure_kpa() - 101.325).abs() < 1e-9);
    }

    #[test]
    fn demand_ingest_decodes_enthalpy_when_configured() {
        let config = DistributedInterfaceConfig {
            use_enthalpy: true,
            ..Default::default()
        };
        let (mut ifc, mut nodes, _cap) =
            rig(config, DistributedInterfaceInput::default());
        let h = cabin_air(&catalog()).specific_enthalpy();
        {
            let buffers = ifc.buffers();
            let mut b = buffers.borrow_mut();
            b.out_data.demand_mode = true;
            fill_valid_supply(&mut b.in_data, 8.0e-4);
            b.in_data.energy = h;
        }
        ifc.process_inputs(&mut nodes).unwrap();
        assert!((nodes[0].content().temperature_k() - 294.261).abs() < 1e-6);
    }

    #[test]
    fn demand_ingest_zero_mixture_is_an_error() {
        let (mut ifc, mut nodes, _cap) = rig(
            DistributedInterfaceConfig::default(),
            DistributedInterfaceInput::default(),
        );
        {
            let buffers = ifc.buffers();
            let mut b = buffers.borrow_mut();
            b.out_data.demand_mode = true;
            fill_valid_supply(&mut b.in_data, 8.0e-4);
            b.in_data.set_bulk(&[0.0, 0.0, 0.0]);
        }
        let err = ifc.process_inputs(&mut nodes).unwrap_err();
        assert!(err.to_string().contains("sum to zero"));
    }

    #[test]
    fn demand_holds_node_while_peer_is_silent() {
        let (mut ifc, mut nodes, _cap) = rig(
            DistributedInterfaceConfig::default(),
            DistributedInterfaceInput::default(),
        );
        {
            let buffers = ifc.buffers();
            buffers.borrow_mut().out_data.demand_mode = true;
        }
        nodes[0].set_potential_kpa(95.0);
        ifc.process_inputs(&mut nodes).unwrap();
        assert!((ifc.source_pressure - 95.0).abs() < 1e-12);
        assert_eq!(ifc.demand_flux, 0.0);
    }

    #[test]
    fn interface_width_override_drops_and_zero_fills_species() {
        let config = DistributedInterfaceConfig {
            interface_sizes_override: Some((2, 0)),
            ..Default::default()
        };
        let (mut ifc, mut nodes, _cap) =
            rig(config, DistributedInterfaceInput::default());
        {
            let buffers = ifc.buffers();
            let mut b = buffers.borrow_mut();
            b.out_data.demand_mode = true;
            b.in_data.frame_count = 1;
            b.in_data.capacitance = 8.0e-4;
            b.in_data.source = 101_325.0;
            b.in_data.energy = 294.261;
            b.in_data.set_bulk(&[0.21, 0.79]);
            assert_eq!(b.in_data.n_bulk(), 2);
        }
        ifc.process_inputs(&mut nodes).unwrap();

        let mut mole = [0.0; 3];
        nodes[0].content().mole_fractions_into(&mut mole).unwrap();
        assert!((mole[0] - 0.21).abs() < 1e-9);
        assert!((mole[1] - 0.79).abs() < 1e-9);
        assert!(mole[2].abs() < 1e-12);
    }

    #[test]
    fn capacitance_flip_respects_band_and_quiesce_gate() {
        let run = |in_cap_factor: f64, frames: i64, latency: i64| -> bool {
            let (mut ifc, mut nodes, mut cap) = rig(
                DistributedInterfaceConfig::default(),
                DistributedInterfaceInput::default(),
            );
            let mut sys = SystemAssembly::new(1);
            cap.stamp(&mut sys, &mut nodes, DT).unwrap();
            ifc.stamp(&mut sys, &mut nodes, DT).unwrap();
            solver::solve(&sys, &mut nodes, DT).unwrap();

            let local_cap = nodes[0].network_capacitance();
            assert!(local_cap > 0.0);
            {
                let buffers = ifc.buffers();
                buffers.borrow_mut().in_data.capacitance = local_cap * in_cap_factor;
            }
            ifc.frames_since_flip = frames;
            ifc.loop_latency = latency;
            ifc.process_outputs(&mut nodes).unwrap();
            ifc.buffers().borrow().out_data.demand_mode
        };

        // 1.25·C < 100·C, quiesced: flips
        assert!(run(100.0, 5, 1));
        // within the hysteresis band: stays supply
        assert!(!run(1.1, 5, 1));
        // not quiesced for a full round trip yet: stays supply
        assert!(!run(100.0, 1, 4));
    }

    #[test]
    fn capacitance_flip_zeroes_published_source() {
        let (mut ifc, mut nodes, mut cap) = rig(
            DistributedInterfaceConfig::default(),
            DistributedInterfaceInput::default(),
        );
        let mut sys = SystemAssembly::new(1);
        cap.stamp(&mut sys, &mut nodes, DT).unwrap();
        ifc.stamp(&mut sys, &mut nodes, DT).unwrap();
        solver::solve(&sys, &mut nodes, DT).unwrap();
        {
            let buffers = ifc.buffers();
            buffers.borrow_mut().in_data.capacitance =
                nodes[0].network_capacitance() * 100.0;
        }
        ifc.frames_since_flip = 5;
        ifc.loop_latency = 1;
        ifc.process_outputs(&mut nodes).unwrap();

        let buffers = ifc.buffers();
        let b = buffers.borrow();
        assert!(b.out_data.demand_mode);
        assert_eq!(b.out_data.source, 0.0);
    }

    #[test]
    fn demand_role_never_flips_on_capacitance() {
        let (mut ifc, mut nodes, mut cap) = rig(
            DistributedInterfaceConfig::default(),
            DistributedInterfaceInput::default(),
        );
        {
            let buffers = ifc.buffers();
            let mut b = buffers.borrow_mut();
            b.out_data.demand_mode = true;
            b.in_data.capacitance = 1.0; // enormous
        }
        let mut sys = SystemAssembly::new(1);
        cap.stamp(&mut sys, &mut nodes, DT).unwrap();
        ifc.stamp(&mut sys, &mut nodes, DT).unwrap();
        solver::solve(&sys, &mut nodes, DT).unwrap();
        ifc.frames_since_flip = 10;
        ifc.loop_latency = 1;
        ifc.process_outputs(&mut nodes).unwrap();
        assert!(ifc.buffers().borrow().out_data.demand_mode);
    }

    #[test]
    fn supply_publishes_pressure_energy_and_mixture() {
        let (mut ifc, mut nodes, mut cap) = rig(
            DistributedInterfaceConfig::default(),
            DistributedInterfaceInput::default(),
        );
        let mut sys = SystemAssembly::new(1);
        cap.stamp(&mut sys, &mut nodes, DT).unwrap();
        ifc.stamp(&mut sys, &mut nodes, DT).unwrap();
        solver::solve(&sys, &mut nodes, DT).unwrap();
        ifc.process_outputs(&mut nodes).unwrap();

        let buffers = ifc.buffers();
        let b = buffers.borrow();
        assert!((b.out_data.source - 101_325.0).abs() < 1e-6);
        assert!((b.out_data.energy - 294.261).abs() < 1e-9);
        assert!(b.out_data.capacitance > 0.0);
        // wire mixture sums to 1 across bulk and trace together
        let sum: f64 =
            b.out_data.bulk().iter().sum::<f64>() + b.out_data.trace().iter().sum::<f64>();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn sibling_capacitance_is_subtracted_through_the_network() {
        let cat = catalog();
        let state = cabin_air(&cat);
        let mut nodes = vec![
            FluidNode::new("n0", state.clone()),
            FluidNode::new("n1", state.clone()),
        ];
        nodes[0].set_volume_m3(1.0);
        nodes[1].set_volume_m3(1.0);

        let cap0 = CapacitorLink::new("cap0", NodeId::from_index(0), 1.0).unwrap();
        let mut ifc = DistributedInterface::new(
            "ifc0",
            NodeId::from_index(0),
            cat,
            cap0.volume_handle(),
            DistributedInterfaceConfig::default(),
            DistributedInterfaceInput::default(),
            &state,
        )
        .unwrap();

        // a sibling interface demanding at node 1
        let sibling = Rc::new(RefCell::new(InterfaceShare {
            node: NodeId::from_index(1),
            supplied_capacitance: 2.0e-4,
        }));
        ifc.add_sibling(Rc::clone(&sibling));

        // solve a two-node network so the sensitivity row is real
        let mut sys = SystemAssembly::new(2);
        let mut cap0 = cap0;
        let mut cap1 = CapacitorLink::new("cap1", NodeId::from_index(1), 1.0).unwrap();
        let mut pipe = fx_network::ConductorLink::new(
            "pipe",
            NodeId::from_index(0),
            NodeId::from_index(1),
            1.0e-2,
        )
        .unwrap();
        cap0.stamp(&mut sys, &mut nodes, DT).unwrap();
        cap1.stamp(&mut sys, &mut nodes, DT).unwrap();
        pipe.stamp(&mut sys, &mut nodes, DT).unwrap();
        ifc.stamp(&mut sys, &mut nodes, DT).unwrap();
        solver::solve(&sys, &mut nodes, DT).unwrap();

        let netcap = nodes[0].network_capacitance();
        let dp = nodes[0].netcap_delta_potential();
        let expected = netcap - 2.0e-4 * dp[1] / dp[0];

        ifc.output_capacitance(&nodes);
        let published = ifc.buffers().borrow().out_data.capacitance;
        assert!((published - expected).abs() < 1e-12);
        assert!(published < netcap);

        // an absurdly large sibling contribution clamps at zero
        sibling.borrow_mut().supplied_capacitance = 1.0e3;
        ifc.output_capacitance(&nodes);
        assert_eq!(ifc.buffers().borrow().out_data.capacitance, 0.0);
    }

    #[test]
    fn sibling_registration_rejects_self_and_duplicates() {
        let (mut a, _nodes_a, _cap_a) = rig(
            DistributedInterfaceConfig::default(),
            DistributedInterfaceInput::default(),
        );
        let (b, _nodes_b, _cap_b) = rig(
            DistributedInterfaceConfig::default(),
            DistributedInterfaceInput::default(),
        );
        a.add_sibling(a.share());
        assert!(a.siblings.is_empty());
        a.add_sibling(b.share());
        a.add_sibling(b.share());
        assert_eq!(a.siblings.len(), 1);
    }

    #[test]
    fn restart_returns_gain_to_unity() {
        let (mut ifc, _nodes, _cap) = rig(
            DistributedInterfaceConfig::default(),
            DistributedInterfaceInput::default(),
        );
        ifc.demand_flux_gain = 0.3;
        ifc.loop_latency = 12;
        ifc.share.borrow_mut().supplied_capacitance = 1.0e-3;
        ifc.restart();
        assert_eq!(ifc.demand_flux_gain(), 1.0);
        assert_eq!(ifc.loop_latency(), 0);
        assert_eq!(ifc.supplied_capacitance(), 0.0);
    }
}
