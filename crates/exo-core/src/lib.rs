pub mod constants;
pub mod insolation;

#[cfg(test)]
mod tests;

pub use insolation::{approx_insolation, equilibrium_temperature, insolation_at_orbit};
