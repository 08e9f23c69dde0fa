//! Node fluid state.

use std::sync::Arc;

use crate::catalog::FluidCatalog;
use crate::error::{FluidError, FluidResult};
use crate::mixture;
use crate::R_UNIVERSAL;

/// The fluid held at a network node: pressure, temperature, bulk mass
/// fractions, and trace-compound mole fractions.
///
/// Bulk mass fractions sum to 1 on their own. Trace compounds ride along
/// as mole fractions relative to the bulk phase and do not enter the
/// property relations.
#[derive(Debug, Clone)]
pub struct FluidState {
    catalog: Arc<FluidCatalog>,
    pressure_kpa: f64,
    temperature_k: f64,
    mass_fractions: Vec<f64>,
    trace_mole_fractions: Vec<f64>,
}

impl FluidState {
    /// Create a state from bulk mole fractions (normalized internally).
    pub fn new(
        catalog: Arc<FluidCatalog>,
        pressure_kpa: f64,
        temperature_k: f64,
        mole_fractions: &[f64],
        trace_mole_fractions: &[f64],
    ) -> FluidResult<Self> {
        if pressure_kpa < 0.0 || !pressure_kpa.is_finite() {
            return Err(FluidError::NonPhysical {
                what: "pressure must be non-negative and finite",
            });
        }
        if temperature_k <= 0.0 || !temperature_k.is_finite() {
            return Err(FluidError::NonPhysical {
                what: "temperature must be positive and finite",
            });
        }
        if mole_fractions.len() != catalog.n_bulk() {
            return Err(FluidError::InvalidArg {
                what: "mole fraction count does not match catalog",
            });
        }
        if trace_mole_fractions.len() != catalog.n_trace() {
            return Err(FluidError::InvalidArg {
                what: "trace fraction count does not match catalog",
            });
        }
        let mut mole = mole_fractions.to_vec();
        mixture::normalize(&mut mole)?;
        let mut mass = vec![0.0; catalog.n_bulk()];
        mixture::mole_to_mass(&catalog, &mole, &mut mass)?;
        Ok(Self {
            catalog,
            pressure_kpa,
            temperature_k,
            mass_fractions: mass,
            trace_mole_fractions: trace_mole_fractions.to_vec(),
        })
    }

    pub fn catalog(&self) -> &Arc<FluidCatalog> {
        &self.catalog
    }

    pub fn pressure_kpa(&self) -> f64 {
        self.pressure_kpa
    }

    pub fn set_pressure_kpa(&mut self, p: f64) {
        self.pressure_kpa = p;
    }

    pub fn temperature_k(&self) -> f64 {
        self.temperature_k
    }

    pub fn set_temperature_k(&mut self, t: f64) {
        self.temperature_k = t;
    }

    pub fn mass_fractions(&self) -> &[f64] {
        &self.mass_fractions
    }

    /// Overwrite bulk mass fractions (no normalization).
    pub fn set_mass_fractions(&mut self, mass: &[f64]) {
        debug_assert_eq!(mass.len(), self.mass_fractions.len());
        self.mass_fractions.copy_from_slice(mass);
    }

    pub fn trace_mole_fractions(&self) -> &[f64] {
        &self.trace_mole_fractions
    }

    pub fn set_trace_mole_fractions(&mut self, trace: &[f64]) {
        debug_assert_eq!(trace.len(), self.trace_mole_fractions.len());
        self.trace_mole_fractions.copy_from_slice(trace);
    }

    /// Write the bulk mole fractions into `out`.
    pub fn mole_fractions_into(&self, out: &mut [f64]) -> FluidResult<()> {
        mixture::mass_to_mole(&self.catalog, &self.mass_fractions, out)
    }

    /// Overwrite the bulk mixture from mole fractions.
    pub fn set_mole_fractions(&mut self, mole: &[f64]) -> FluidResult<()> {
        let mut mass = std::mem::take(&mut self.mass_fractions);
        let result = mixture::mole_to_mass(&self.catalog, mole, &mut mass);
        self.mass_fractions = mass;
        result
    }

    /// Mixture molar mass [kg/kmol], `1 / Σ (w_i / M_i)`.
    pub fn molar_mass(&self) -> f64 {
        let sum: f64 = self
            .mass_fractions
            .iter()
            .zip(self.catalog.bulk())
            .map(|(w, s)| w / s.molar_mass())
            .sum();
        if sum < f64::EPSILON {
            return 0.0;
        }
        1.0 / sum
    }

    /// Mixture specific heat [J/(kg·K)], mass-fraction weighted.
    pub fn cp(&self) -> f64 {
        self.mass_fractions
            .iter()
            .zip(self.catalog.bulk())
            .map(|(w, s)| w * s.cp())
            .sum()
    }

    /// Specific enthalpy [J/kg] with an h = cp·T reference at 0 K.
    pub fn specific_enthalpy(&self) -> f64 {
        self.cp() * self.temperature_k
    }

    /// Invert the enthalpy relation for this mixture.
    pub fn temperature_from_enthalpy(&self, h: f64) -> f64 {
        let cp = self.cp();
        if cp < f64::EPSILON {
            return self.temperature_k;
        }
        h / cp
    }

    /// Molar density [kmol/m³] from the ideal gas law, p/(R̄·T).
    pub fn molar_density(&self) -> f64 {
        if self.temperature_k <= 0.0 {
            return 0.0;
        }
        self.pressure_kpa / (R_UNIVERSAL * self.temperature_k)
    }

    /// Copy another state's contents into this one (same catalog widths).
    pub fn set_state_from(&mut self, other: &FluidState) {
        self.pressure_kpa = other.pressure_kpa;
        self.temperature_k = other.temperature_k;
        self.mass_fractions.copy_from_slice(&other.mass_fractions);
        self.trace_mole_fractions
            .copy_from_slice(&other.trace_mole_fractions);
    }

    /// True if any bulk or trace fraction is negative.
    pub fn has_negative_fractions(&self) -> bool {
        self.mass_fractions.iter().any(|w| *w < 0.0)
            || self.trace_mole_fractions.iter().any(|x| *x < 0.0)
    }

    /// Blend another stream into this state.
    ///
    /// `self_moles` and `other_moles` weight the two sides [kmol]. Bulk
    /// fractions mix by mass, temperature mixes by heat capacity, trace
    /// fractions mix by moles. Pressure is left untouched.
    pub fn blend_with(&mut self, other: &FluidState, self_moles: f64, other_moles: f64) {
        if other_moles <= 0.0 {
            return;
        }
        let m_self = self_moles.max(0.0) * self.molar_mass();
        let m_other = other_moles * other.molar_mass();
        if m_other < f64::EPSILON {
            return;
        }
        if m_self < f64::EPSILON {
            self.temperature_k = other.temperature_k;
            self.mass_fractions.copy_from_slice(&other.mass_fractions);
            self.trace_mole_fractions
                .copy_from_slice(&other.trace_mole_fractions);
            return;
        }
        let heat_self = m_self * self.cp();
        let heat_other = m_other * other.cp();
        let m_total = m_self + m_other;
        for (w, w_other) in self.mass_fractions.iter_mut().zip(&other.mass_fractions) {
            *w = (m_self * *w + m_other * w_other) / m_total;
        }
        if heat_self + heat_other > f64::EPSILON {
            self.temperature_k = (heat_self * self.temperature_k
                + heat_other * other.temperature_k)
                / (heat_self + heat_other);
        }
        let n_total = self_moles.max(0.0) + other_moles;
        for (x, x_other) in self
            .trace_mole_fractions
            .iter_mut()
            .zip(&other.trace_mole_fractions)
        {
            *x = (self_moles.max(0.0) * *x + other_moles * x_other) / n_total;
        }
    }
}
