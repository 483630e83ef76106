//! Selection of nearby systems from the full catalog

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::{AnnotatedCatalog, PlanetCatalog};
use crate::corrections::{annotate_and_filter, Thresholds};
use crate::error::{ExoError, ExoResult};

/// Host-star bounds applied before the planet thresholds
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HostBounds {
    pub max_teff: u32,
    pub max_dist: f64,
}

impl fmt::Display for HostBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "max_teff={} K, max_dist={} pc", self.max_teff, self.max_dist)
    }
}

/// Host-star bounds plus per-planet thresholds
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Stellar effective temperature (K)
    pub max_teff: u32,
    /// System distance (pc)
    pub max_dist: f64,
    pub max_period: f64,
    pub max_mass: f64,
    pub max_insolation: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        let t = Thresholds::default();
        Self {
            max_teff: 4000,
            max_dist: 20.0,
            max_period: t.max_period,
            max_mass: t.max_mass,
            max_insolation: t.max_insolation,
        }
    }
}

impl SelectionConfig {
    pub fn thresholds(&self) -> Thresholds {
        Thresholds::new(self.max_period, self.max_mass, self.max_insolation)
    }

    pub fn host_bounds(&self) -> HostBounds {
        HostBounds { max_teff: self.max_teff, max_dist: self.max_dist }
    }
}

/// Apply host bounds, then the correction pipeline. Fails if nothing is left.
pub fn select(catalog: PlanetCatalog, config: &SelectionConfig) -> ExoResult<AnnotatedCatalog> {
    let host = config.host_bounds();
    let bounded = catalog.within_bounds(host.max_teff, host.max_dist);
    tracing::debug!("{} planets within {}", bounded.len(), host);

    let thresholds = config.thresholds();
    let selected = annotate_and_filter(bounded, &thresholds);
    if selected.is_empty() {
        return Err(ExoError::EmptyResult { thresholds, host: Some(host) });
    }
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PlanetRecord;

    fn planet(name: &str, teff: f64, dist: f64) -> PlanetRecord {
        let mut p = PlanetRecord::new(name, format!("{} b", name));
        p.st_teff = teff;
        p.sy_dist = dist;
        p.st_lum = -2.0;
        p.pl_orbsmax = 0.05;
        p.pl_orbper = 5.0;
        p.pl_bmasse = 2.0;
        p
    }

    #[test]
    fn test_select_applies_host_bounds() {
        let catalog = PlanetCatalog::from_records(vec![
            planet("Cool Near", 3100.0, 5.0),
            planet("Hot Near", 5700.0, 5.0),
            planet("Cool Far", 3100.0, 45.0),
        ]);
        let out = select(catalog, &SelectionConfig::default()).unwrap();
        let names: Vec<_> = out.iter().map(|p| p.record.hostname.as_str()).collect();
        assert_eq!(names, vec!["Cool Near"]);
    }

    #[test]
    fn test_select_empty_is_error() {
        let catalog = PlanetCatalog::from_records(vec![planet("Hot", 6000.0, 3.0)]);
        let err = select(catalog, &SelectionConfig::default()).unwrap_err();
        assert!(matches!(err, ExoError::EmptyResult { .. }));
        assert!(err.to_string().contains("max_period=20"), "{}", err);
    }

    #[test]
    fn test_empty_selection_reports_host_bounds() {
        let config = SelectionConfig { max_teff: 3200, max_dist: 12.5, ..SelectionConfig::default() };
        let catalog = PlanetCatalog::from_records(vec![planet("Cool Far", 3100.0, 30.0)]);
        let err = select(catalog, &config).unwrap_err();
        match &err {
            ExoError::EmptyResult { thresholds, host } => {
                assert_eq!(*thresholds, config.thresholds());
                assert_eq!(*host, Some(HostBounds { max_teff: 3200, max_dist: 12.5 }));
            }
            other => panic!("expected EmptyResult, got {:?}", other),
        }
        let message = err.to_string();
        assert!(message.contains("max_teff=3200 K, max_dist=12.5 pc"), "{}", message);
        assert!(message.contains("max_insolation=20 S_earth"), "{}", message);
    }
}
