//! Fluid network nodes.

use fx_fluids::FluidState;

/// Rates smaller than this are treated as no flow.
pub(crate) const FLOW_EPSILON: f64 = 100.0 * f64::EPSILON;

/// A point in the network at which a potential (pressure, kPa) is
/// solved. Holds fluid contents, an optional capacitive volume, and the
/// per-tick flow accumulators links write into.
#[derive(Debug, Clone)]
pub struct FluidNode {
    name: String,
    potential_kpa: f64,
    content: FluidState,
    /// Mixed state of everything collected into the node this tick.
    inflow: FluidState,
    influx_rate_kmol: f64,
    outflux_rate_kmol: f64,
    scheduled_outflux_kmol: f64,
    volume_m3: f64,
    network_capacitance: f64,
    netcap_request_flux: f64,
    netcap_delta_potential: Vec<f64>,
}

impl FluidNode {
    /// Create a node with the given initial contents. Volume starts at
    /// zero; a capacitor link gives the node its volume.
    pub fn new(name: impl Into<String>, content: FluidState) -> Self {
        let inflow = content.clone();
        let potential_kpa = content.pressure_kpa();
        Self {
            name: name.into(),
            potential_kpa,
            content,
            inflow,
            influx_rate_kmol: 0.0,
            outflux_rate_kmol: 0.0,
            scheduled_outflux_kmol: 0.0,
            volume_m3: 0.0,
            network_capacitance: 0.0,
            netcap_request_flux: 0.0,
            netcap_delta_potential: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn potential_kpa(&self) -> f64 {
        self.potential_kpa
    }

    pub fn set_potential_kpa(&mut self, p: f64) {
        self.potential_kpa = p;
    }

    pub fn content(&self) -> &FluidState {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut FluidState {
        &mut self.content
    }

    /// The mixed inflow collected this tick. Temperature of zero means
    /// nothing has been collected since [`reset_flows`] opened the tick.
    ///
    /// [`reset_flows`]: FluidNode::reset_flows
    pub fn inflow(&self) -> &FluidState {
        &self.inflow
    }

    pub fn volume_m3(&self) -> f64 {
        self.volume_m3
    }

    pub fn set_volume_m3(&mut self, v: f64) {
        self.volume_m3 = v;
    }

    /// Moles currently held by the node [kmol].
    pub fn molar_content(&self) -> f64 {
        self.content.molar_density() * self.volume_m3
    }

    /// Collect a molar flow [kmol/s] into the node, mixing the incoming
    /// fluid into this tick's inflow state. Negative rates accumulate as
    /// outflux instead.
    pub fn collect_influx(&mut self, rate_kmol: f64, fluid: &FluidState) {
        if rate_kmol <= 0.0 {
            self.outflux_rate_kmol += -rate_kmol;
            return;
        }
        if self.influx_rate_kmol < FLOW_EPSILON {
            self.inflow.set_state_from(fluid);
            self.influx_rate_kmol = rate_kmol;
        } else {
            self.inflow
                .blend_with(fluid, self.influx_rate_kmol, rate_kmol);
            self.influx_rate_kmol += rate_kmol;
        }
    }

    /// Collect the node's own contents as influx (used by links whose
    /// incoming fluid has already taken the node's properties).
    pub fn collect_influx_of_contents(&mut self, rate_kmol: f64) {
        if rate_kmol <= 0.0 {
            self.outflux_rate_kmol += -rate_kmol;
            return;
        }
        if self.influx_rate_kmol < FLOW_EPSILON {
            self.inflow.set_state_from(&self.content);
            self.influx_rate_kmol = rate_kmol;
        } else {
            let content = self.content.clone();
            self.inflow
                .blend_with(&content, self.influx_rate_kmol, rate_kmol);
            self.influx_rate_kmol += rate_kmol;
        }
    }

    /// Collect a molar outflow [kmol/s] from the node.
    pub fn collect_outflux(&mut self, rate_kmol: f64) {
        self.outflux_rate_kmol += rate_kmol.max(0.0);
    }

    /// Announce an outflux [kmol/s] before transport so flow
    /// bookkeeping can see it coming.
    pub fn schedule_outflux(&mut self, rate_kmol: f64) {
        self.scheduled_outflux_kmol += rate_kmol.max(0.0);
    }

    pub fn scheduled_outflux(&self) -> f64 {
        self.scheduled_outflux_kmol
    }

    /// Clear the flow accumulators for a new tick. The inflow state's
    /// temperature is zeroed as the "nothing collected yet" marker, so
    /// links can tell a live inflow from a stale one.
    pub fn reset_flows(&mut self) {
        self.influx_rate_kmol = 0.0;
        self.outflux_rate_kmol = 0.0;
        self.scheduled_outflux_kmol = 0.0;
        self.inflow.set_temperature_k(0.0);
    }

    /// Fold this tick's collected flows into the node contents.
    /// Outflows leave composition unchanged; inflows mix by mass and
    /// heat capacity. Accumulators stay readable until [`reset_flows`]
    /// opens the next tick.
    ///
    /// [`reset_flows`]: FluidNode::reset_flows
    pub fn integrate(&mut self, dt: f64) {
        let moles_in = self.influx_rate_kmol * dt;
        if moles_in > 0.0 {
            let held = self.molar_content();
            let inflow = self.inflow.clone();
            self.content.blend_with(&inflow, held, moles_in);
        }
    }

    pub fn network_capacitance(&self) -> f64 {
        self.network_capacitance
    }

    pub(crate) fn set_network_capacitance(&mut self, c: f64) {
        self.network_capacitance = c;
    }

    /// Ask the solver to measure this node's network capacitance with
    /// the given probe flux [kmol/s].
    pub fn set_network_capacitance_request(&mut self, flux_kmol: f64) {
        self.netcap_request_flux = flux_kmol;
    }

    pub(crate) fn network_capacitance_request(&self) -> f64 {
        self.netcap_request_flux
    }

    pub(crate) fn clear_network_capacitance_request(&mut self) {
        self.netcap_request_flux = 0.0;
    }

    /// Read-only view of the capacitance sensitivity row: the potential
    /// rise at every node per probe flux injected here.
    pub fn netcap_delta_potential(&self) -> &[f64] {
        &self.netcap_delta_potential
    }

    pub(crate) fn store_netcap_delta_potential(&mut self, delta: &[f64]) {
        self.netcap_delta_potential.clear();
        self.netcap_delta_potential.extend_from_slice(delta);
    }
}

/// Borrow two distinct nodes mutably.
pub fn pair_mut(nodes: &mut [FluidNode], a: usize, b: usize) -> (&mut FluidNode, &mut FluidNode) {
    assert_ne!(a, b, "pair_mut needs distinct indices");
    if a < b {
        let (lo, hi) = nodes.split_at_mut(b);
        (&mut lo[a], &mut hi[0])
    } else {
        let (lo, hi) = nodes.split_at_mut(a);
        (&mut hi[0], &mut lo[b])
    }
}
