//! Configuration and input data for the distributed interface.

use serde::{Deserialize, Serialize};

use crate::error::{InterfaceError, InterfaceResult};

/// Construction-time configuration. Both sides of a pair must agree on
/// species ordering, units, and the energy convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributedInterfaceConfig {
    /// Tie-breaker for the start-up dual-Supply race; exactly one side
    /// of a pair sets this true.
    pub is_pair_master: bool,
    /// Transport energy as specific enthalpy instead of temperature.
    pub use_enthalpy: bool,
    /// Drop the one-step damping resistor in Demand mode, trading
    /// stability for higher flow. Safe when the supply capacitance
    /// dominates and the loop lag stays small (≤ 4 frames or so).
    pub demand_option: bool,
    /// Supply/Demand capacitance ratio that triggers a mode flip.
    /// Hysteresis band; must be > 1.
    pub moding_capacitance_ratio: f64,
    /// Demand filter gain constant A in `A·B^latency`.
    pub demand_filter_const_a: f64,
    /// Demand filter gain constant B in `A·B^latency`.
    pub demand_filter_const_b: f64,
    /// Force the on-wire mixture widths to `(n_bulk, n_trace)` instead
    /// of the local network's sizes.
    pub interface_sizes_override: Option<(usize, usize)>,
}

impl Default for DistributedInterfaceConfig {
    fn default() -> Self {
        Self {
            is_pair_master: false,
            use_enthalpy: false,
            demand_option: false,
            moding_capacitance_ratio: 1.25,
            demand_filter_const_a: 1.5,
            demand_filter_const_b: 0.75,
            interface_sizes_override: None,
        }
    }
}

impl DistributedInterfaceConfig {
    pub fn validate(&self) -> InterfaceResult<()> {
        if self.moding_capacitance_ratio <= 1.0 {
            return Err(InterfaceError::Config {
                what: "moding capacitance ratio must be > 1",
            });
        }
        if !self.demand_filter_const_a.is_finite() || !self.demand_filter_const_b.is_finite() {
            return Err(InterfaceError::Config {
                what: "demand filter constants must be finite",
            });
        }
        Ok(())
    }
}

/// Runtime input data: role pinning and the blockage malfunction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DistributedInterfaceInput {
    /// Pin the link to the Demand role, disabling arbitration.
    pub force_demand_mode: bool,
    /// Pin the link to the Supply role, disabling arbitration.
    pub force_supply_mode: bool,
    /// Blockage malfunction: scales the Demand conductance by
    /// `1 − blockage`. Fraction in [0, 1].
    pub blockage: Option<f64>,
}

impl DistributedInterfaceInput {
    pub fn validate(&self) -> InterfaceResult<()> {
        if self.force_demand_mode && self.force_supply_mode {
            return Err(InterfaceError::Config {
                what: "both mode force flags are set",
            });
        }
        if let Some(b) = self.blockage {
            if !(0.0..=1.0).contains(&b) {
                return Err(InterfaceError::Config {
                    what: "blockage fraction must be within [0, 1]",
                });
            }
        }
        Ok(())
    }
}
