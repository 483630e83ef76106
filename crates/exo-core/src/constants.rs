/// Blackbody equilibrium temperature of Earth in Kelvin (zero albedo scaling)
pub const EARTH_EQ_TEMP_K: f64 = 255.0;

/// Host star whose catalog radius is known to be wrong
pub const GJ_667_C_HOSTNAME: &str = "GJ 667 C";

/// Corrected GJ 667 C stellar radius in solar radii
pub const GJ_667_C_RADIUS: f64 = 0.42;

/// Seconds in one day
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Mars mass in Earth masses
pub const MARS_MASS_EARTH: f64 = 0.107;

/// Neptune mass in Earth masses
pub const NEPTUNE_MASS_EARTH: f64 = 17.15;
