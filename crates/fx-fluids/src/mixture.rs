//! Mixture fraction conversions and normalization.
//!
//! Bulk mixtures are held as mass fractions inside node fluid state and
//! as mole fractions on external interfaces; these helpers convert
//! between the two against a catalog's species ordering.

use crate::catalog::FluidCatalog;
use crate::error::{FluidError, FluidResult};

/// Convert bulk mole fractions to mass fractions.
///
/// `w_i = x_i·M_i / Σ x_j·M_j`. Slices must match the catalog width.
pub fn mole_to_mass(
    catalog: &FluidCatalog,
    mole: &[f64],
    mass_out: &mut [f64],
) -> FluidResult<()> {
    debug_assert_eq!(mole.len(), catalog.n_bulk());
    debug_assert_eq!(mass_out.len(), catalog.n_bulk());
    let mut sum = 0.0;
    for (x, species) in mole.iter().zip(catalog.bulk()) {
        sum += x * species.molar_mass();
    }
    if sum < f64::EPSILON {
        return Err(FluidError::NonPhysical {
            what: "mole fractions have zero molar mass sum",
        });
    }
    for ((w, x), species) in mass_out.iter_mut().zip(mole).zip(catalog.bulk()) {
        *w = x * species.molar_mass() / sum;
    }
    Ok(())
}

/// Convert bulk mass fractions to mole fractions.
///
/// `x_i = (w_i/M_i) / Σ (w_j/M_j)`. Slices must match the catalog width.
pub fn mass_to_mole(
    catalog: &FluidCatalog,
    mass: &[f64],
    mole_out: &mut [f64],
) -> FluidResult<()> {
    debug_assert_eq!(mass.len(), catalog.n_bulk());
    debug_assert_eq!(mole_out.len(), catalog.n_bulk());
    let mut sum = 0.0;
    for (w, species) in mass.iter().zip(catalog.bulk()) {
        sum += w / species.molar_mass();
    }
    if sum < f64::EPSILON {
        return Err(FluidError::NonPhysical {
            what: "mass fractions have zero molar sum",
        });
    }
    for ((x, w), species) in mole_out.iter_mut().zip(mass).zip(catalog.bulk()) {
        *x = (w / species.molar_mass()) / sum;
    }
    Ok(())
}

/// Normalize fractions in place to sum to 1, returning the prior sum.
pub fn normalize(fractions: &mut [f64]) -> FluidResult<f64> {
    let sum: f64 = fractions.iter().sum();
    if sum < f64::EPSILON {
        return Err(FluidError::NonPhysical {
            what: "fractions sum to zero",
        });
    }
    for f in fractions.iter_mut() {
        *f /= sum;
    }
    Ok(sum)
}

/// Mixture molar mass [kg/kmol] from mole fractions.
pub fn molar_mass_from_mole(catalog: &FluidCatalog, mole: &[f64]) -> f64 {
    mole.iter()
        .zip(catalog.bulk())
        .map(|(x, s)| x * s.molar_mass())
        .sum()
}
