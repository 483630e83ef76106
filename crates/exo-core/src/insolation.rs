//! Earth-relative insolation and equilibrium temperature.
//!
//! Both quantities are NaN-propagating: a missing input (NaN) yields NaN
//! rather than an error, and no domain validation is performed.

use crate::constants::EARTH_EQ_TEMP_K;

/// Flux received at `semi_major_axis_au` from a star of `log_luminosity`
/// (log10 solar units), relative to Earth.
///
/// `10^L / a^2`
pub fn approx_insolation(log_luminosity: f64, semi_major_axis_au: f64) -> f64 {
    10.0_f64.powf(log_luminosity) / semi_major_axis_au.powi(2)
}

/// Equilibrium temperature in Kelvin from Earth-relative insolation.
///
/// `255 * S^(1/4)`. A negative flux has no real fourth root and gives NaN.
pub fn equilibrium_temperature(insolation: f64) -> f64 {
    EARTH_EQ_TEMP_K * insolation.powf(0.25)
}

/// Insolation of a solar-system orbit at `a_au` (the Sun has L = 1).
pub fn insolation_at_orbit(a_au: f64) -> f64 {
    1.0 / a_au.powi(2)
}
