//! Catalog corrections, derived columns and threshold filtering

use exo_core::constants::{GJ_667_C_HOSTNAME, GJ_667_C_RADIUS};
use exo_core::{approx_insolation, equilibrium_temperature};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::{AnnotatedCatalog, AnnotatedPlanet, PlanetCatalog, PlanetRecord};
use crate::error::{ExoError, ExoResult};

/// Upper bounds applied after annotation. All comparisons are strict.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Orbital period (days)
    pub max_period: f64,
    /// Planet mass (Earth masses)
    pub max_mass: f64,
    /// Earth-relative insolation
    pub max_insolation: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_period: 20.0,
            max_mass: 20.0,
            max_insolation: 20.0,
        }
    }
}

impl Thresholds {
    pub fn new(max_period: f64, max_mass: f64, max_insolation: f64) -> Self {
        Self { max_period, max_mass, max_insolation }
    }

    /// NaN on any compared field rejects the planet
    pub fn keeps(&self, planet: &AnnotatedPlanet) -> bool {
        let r = &planet.record;
        r.pl_orbper < self.max_period
            && r.has_all_required()
            && r.pl_bmasse < self.max_mass
            && planet.approx_insolation < self.max_insolation
    }
}

impl fmt::Display for Thresholds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "max_period={} d, max_mass={} M_earth, max_insolation={} S_earth",
            self.max_period, self.max_mass, self.max_insolation)
    }
}

/// Fix the known GJ 667 C radius error. Idempotent.
pub fn apply_overrides(catalog: PlanetCatalog) -> PlanetCatalog {
    let mut corrected = 0usize;
    let planets = catalog.into_records().into_iter()
        .map(|mut p| {
            if p.hostname == GJ_667_C_HOSTNAME {
                p.st_rad = GJ_667_C_RADIUS;
                corrected += 1;
            }
            p
        })
        .collect();
    if corrected > 0 {
        tracing::debug!("Applied {} radius override(s) for {}", corrected, GJ_667_C_HOSTNAME);
    }
    PlanetCatalog::from_records(planets)
}

/// Compute insolation and equilibrium temperature for one record
pub fn annotate_planet(record: PlanetRecord) -> AnnotatedPlanet {
    let approx_insolation = approx_insolation(record.st_lum, record.pl_orbsmax);
    AnnotatedPlanet {
        equilibrium_temperature: equilibrium_temperature(approx_insolation),
        approx_insolation,
        record,
    }
}

/// Override, then derive columns for every row. Nothing is dropped.
pub fn annotate(catalog: PlanetCatalog) -> AnnotatedCatalog {
    let planets = apply_overrides(catalog).into_records()
        .into_iter()
        .map(annotate_planet)
        .collect();
    AnnotatedCatalog::from_planets(planets)
}

/// Full correction pipeline: override, derive, then keep rows under all
/// thresholds. Relative order is preserved.
pub fn annotate_and_filter(catalog: PlanetCatalog, thresholds: &Thresholds) -> AnnotatedCatalog {
    let total = catalog.len();
    let kept: Vec<_> = annotate(catalog).into_planets()
        .into_iter()
        .filter(|p| thresholds.keeps(p))
        .collect();

    tracing::info!("Kept {} of {} planets ({})", kept.len(), total, thresholds);
    AnnotatedCatalog::from_planets(kept)
}

/// An empty selection is fatal for the caller
pub fn ensure_non_empty(catalog: AnnotatedCatalog, thresholds: &Thresholds) -> ExoResult<AnnotatedCatalog> {
    if catalog.is_empty() {
        return Err(ExoError::EmptyResult { thresholds: *thresholds, host: None });
    }
    Ok(catalog)
}
