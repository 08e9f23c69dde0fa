//! The payload record exchanged between paired interface links.

use serde::{Deserialize, Serialize};

/// Mixture sizing negotiated at construction.
///
/// The model sizes are the local network's species counts; the
/// interface sizes are what the wire carries (overridable to talk to a
/// dissimilar network). Exchange happens over the common prefix of each
/// pair; everything past it is zero-filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct MixtureSizes {
    n_fluid_model: usize,
    n_tc_model: usize,
    n_fluid_if: usize,
    n_tc_if: usize,
    n_fluid_common: usize,
    n_tc_common: usize,
}

/// One direction's worth of interface data for one tick.
///
/// A value type: the transport copies outbound records to the peer's
/// inbound buffer however it likes. Mixture buffers are sized once at
/// construction and never resized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceData {
    /// Frame count driven by this side; strictly increasing from 1.
    pub frame_count: u64,
    /// The peer's last frame count, echoed back for latency measurement.
    pub frame_loopback: u64,
    /// True iff the publishing side owns the Demand role.
    pub demand_mode: bool,
    /// Publisher's effective network capacitance [mol/Pa].
    pub capacitance: f64,
    /// Pressure [Pa] when supplying, molar flow demand [mol/s] when
    /// demanding (positive = flow from peer into publisher).
    pub source: f64,
    /// Temperature [K] or specific enthalpy [J/kg], per configuration.
    pub energy: f64,
    mole_fractions: Vec<f64>,
    tc_mole_fractions: Vec<f64>,
    #[serde(skip)]
    sizes: MixtureSizes,
}

impl InterfaceData {
    /// Size the record for a network with `n_fluid` bulk species and
    /// `n_tc` trace compounds. `sizes_override` forces the on-wire
    /// mixture widths to a negotiated value instead.
    pub fn new(n_fluid: usize, n_tc: usize, sizes_override: Option<(usize, usize)>) -> Self {
        let (n_fluid_if, n_tc_if) = sizes_override.unwrap_or((n_fluid, n_tc));
        let sizes = MixtureSizes {
            n_fluid_model: n_fluid,
            n_tc_model: n_tc,
            n_fluid_if,
            n_tc_if,
            n_fluid_common: n_fluid.min(n_fluid_if),
            n_tc_common: n_tc.min(n_tc_if),
        };
        Self {
            frame_count: 0,
            frame_loopback: 0,
            demand_mode: false,
            capacitance: 0.0,
            source: 0.0,
            energy: 0.0,
            mole_fractions: vec![0.0; n_fluid_if],
            tc_mole_fractions: vec![0.0; n_tc_if],
            sizes,
        }
    }

    /// Whether this record has ever been filled in by a live peer and
    /// passes the validity predicate: frame count ≥ 1, positive energy,
    /// non-negative capacitance, non-negative pressure when supplying,
    /// and no negative mixture entries.
    pub fn valid(&self) -> bool {
        if self.frame_count < 1
            || self.energy <= 0.0
            || self.capacitance < 0.0
            || (self.source < 0.0 && !self.demand_mode)
        {
            return false;
        }
        self.mole_fractions.iter().all(|x| *x >= 0.0)
            && self.tc_mole_fractions.iter().all(|x| *x >= 0.0)
    }

    /// Copy model-side bulk fractions into the record, zero-filling any
    /// interface entries past the common width.
    pub fn set_bulk(&mut self, fractions: &[f64]) {
        let common = self.sizes.n_fluid_common.min(fractions.len());
        self.mole_fractions[..common].copy_from_slice(&fractions[..common]);
        for x in self.mole_fractions[common..].iter_mut() {
            *x = 0.0;
        }
    }

    /// Copy the record's bulk fractions out to a model-side slice,
    /// zero-filling entries the interface does not carry.
    pub fn get_bulk(&self, fractions: &mut [f64]) {
        let common = self.sizes.n_fluid_common.min(fractions.len());
        fractions[..common].copy_from_slice(&self.mole_fractions[..common]);
        for x in fractions[common..].iter_mut() {
            *x = 0.0;
        }
    }

    /// Trace-compound flavor of [`set_bulk`](InterfaceData::set_bulk).
    pub fn set_trace(&mut self, fractions: &[f64]) {
        let common = self.sizes.n_tc_common.min(fractions.len());
        self.tc_mole_fractions[..common].copy_from_slice(&fractions[..common]);
        for x in self.tc_mole_fractions[common..].iter_mut() {
            *x = 0.0;
        }
    }

    /// Trace-compound flavor of [`get_bulk`](InterfaceData::get_bulk).
    pub fn get_trace(&self, fractions: &mut [f64]) {
        let common = self.sizes.n_tc_common.min(fractions.len());
        fractions[..common].copy_from_slice(&self.tc_mole_fractions[..common]);
        for x in fractions[common..].iter_mut() {
            *x = 0.0;
        }
    }

    /// Field-wise copy from another record, leaving this record's
    /// sizing untouched. This is the transport operation: both records
    /// were sized at initialization to the same interface widths.
    pub fn copy_from(&mut self, other: &InterfaceData) {
        self.frame_count = other.frame_count;
        self.frame_loopback = other.frame_loopback;
        self.demand_mode = other.demand_mode;
        self.capacitance = other.capacitance;
        self.source = other.source;
        self.energy = other.energy;
        let n = self.mole_fractions.len().min(other.mole_fractions.len());
        self.mole_fractions[..n].copy_from_slice(&other.mole_fractions[..n]);
        let n = self
            .tc_mole_fractions
            .len()
            .min(other.tc_mole_fractions.len());
        self.tc_mole_fractions[..n].copy_from_slice(&other.tc_mole_fractions[..n]);
    }

    /// On-wire bulk mixture width.
    pub fn n_bulk(&self) -> usize {
        self.mole_fractions.len()
    }

    /// On-wire trace mixture width.
    pub fn n_trace(&self) -> usize {
        self.tc_mole_fractions.len()
    }

    pub fn bulk(&self) -> &[f64] {
        &self.mole_fractions
    }

    pub fn trace(&self) -> &[f64] {
        &self.tc_mole_fractions
    }
}
