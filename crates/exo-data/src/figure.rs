//! Figure data handed to the plotting front end.
//!
//! Nothing here draws. Selected planets are grouped into named series with
//! marker sizes, plus a mass key and solar-system reference lines, and the
//! whole thing is serialized as JSON.

use exo_core::constants::{MARS_MASS_EARTH, NEPTUNE_MASS_EARTH};
use exo_core::insolation_at_orbit;
use hifitime::Epoch;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::cache::retrieval_stamp;
use crate::catalog::{AnnotatedCatalog, AnnotatedPlanet};
use crate::error::{ExoError, ExoResult};
use crate::targets::{TargetList, TargetSet};

/// Marker area per Earth mass at unit size scale
pub const MARKER_SCALE: f64 = 20.0;

/// Semi-major axes (AU) of the reference orbits
pub const A_MERCURY: f64 = 0.387;
pub const A_VENUS: f64 = 0.723;
pub const A_MARS: f64 = 1.523;

/// Mass key placement: fraction of max distance, then insolation per entry
const MASS_KEY_X_FRACTION: f64 = 0.95;
const MASS_KEY: [(&str, f64, f64); 3] = [
    ("Mars-mass", MARS_MASS_EARTH, 0.75),
    ("Earth-mass", 1.0, 1.0),
    ("Neptune-mass", NEPTUNE_MASS_EARTH, 1.5),
];

/// How markers are colored
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Split into transiting and non-transiting series
    #[default]
    Transit,
    /// Single series colored by stellar effective temperature
    Teff,
}

impl FromStr for Method {
    type Err = ExoError;

    fn from_str(s: &str) -> ExoResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "transit" => Ok(Self::Transit),
            "teff" => Ok(Self::Teff),
            other => Err(ExoError::Configuration(format!(
                "unknown coloring method '{}' (expected transit or teff)", other
            ))),
        }
    }
}

/// Appearance options
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    /// Marker size scale factor
    pub size: f64,
    /// Marker opacity
    pub alpha: f64,
    pub method: Method,
    pub target_list: TargetList,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            size: 1.0,
            alpha: 0.5,
            method: Method::Transit,
            target_list: TargetList::None,
        }
    }
}

/// Marker area for a planet of `mass` Earth masses
pub fn marker_size(mass: f64, size_scale: f64) -> f64 {
    MARKER_SCALE * size_scale * mass
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    Planets,
    Overlay,
    MassKey,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Hover {
    pub pl_name: String,
    pub st_teff: f64,
    pub pl_orbper: f64,
    pub pl_bmasse: f64,
    pub pl_eqt_approx: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Point {
    /// Distance (pc)
    pub x: f64,
    /// Insolation (Earth = 1)
    pub y: f64,
    pub size: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hover: Option<Hover>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub kind: SeriesKind,
    pub show_legend: bool,
    pub points: Vec<Point>,
}

/// Horizontal line at the insolation of a solar-system orbit
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReferenceLine {
    pub name: String,
    pub semi_major_axis_au: f64,
    pub insolation: f64,
}

impl ReferenceLine {
    fn at(name: &str, a_au: f64) -> Self {
        Self {
            name: name.to_string(),
            semi_major_axis_au: a_au,
            insolation: insolation_at_orbit(a_au),
        }
    }
}

/// Everything a renderer needs for the distance/insolation scatter plot
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FigureData {
    pub version: u32,
    pub method: Method,
    pub alpha: f64,
    pub max_dist: f64,
    pub x_label: String,
    pub y_label: String,
    pub y_log: bool,
    pub series: Vec<Series>,
    pub reference_lines: Vec<ReferenceLine>,
    pub footer: String,
}

impl FigureData {
    pub fn build(
        catalog: &AnnotatedCatalog,
        config: &FigureConfig,
        max_dist: f64,
        targets: Option<&TargetSet>,
        retrieved: Option<Epoch>,
    ) -> Self {
        let mut series = match config.method {
            Method::Transit => {
                let (transiting, other): (Vec<_>, Vec<_>) =
                    catalog.iter().partition(|p| p.record.tran_flag);
                vec![
                    planet_series("Transiting", &transiting, config, false),
                    planet_series("Non-Transiting", &other, config, false),
                ]
            }
            Method::Teff => {
                let all: Vec<_> = catalog.iter().collect();
                let mut s = planet_series("Planets", &all, config, true);
                s.show_legend = false;
                vec![s]
            }
        };

        if let Some(targets) = targets {
            let members: Vec<Point> = catalog.iter()
                .filter(|p| targets.contains(&p.record))
                .map(|p| Point {
                    x: p.record.sy_dist,
                    y: p.approx_insolation,
                    size: marker_size(p.record.pl_bmasse, config.size),
                    color_value: None,
                    hover: None,
                })
                .collect();
            tracing::debug!("{}: {} selected planets", targets.label(), members.len());
            series.push(Series {
                name: targets.label().to_string(),
                kind: SeriesKind::Overlay,
                show_legend: true,
                points: members,
            });
        }

        let key_x = MASS_KEY_X_FRACTION * max_dist;
        for (name, mass, y) in MASS_KEY {
            series.push(Series {
                name: name.to_string(),
                kind: SeriesKind::MassKey,
                show_legend: false,
                points: vec![Point { x: key_x, y, size: marker_size(mass, config.size), color_value: None, hover: None }],
            });
        }

        let footer = match retrieved {
            Some(epoch) => format!("Data from NExScI, retrieved {}", retrieval_stamp(epoch)),
            None => "Data from NExScI".to_string(),
        };

        Self {
            version: 1,
            method: config.method,
            alpha: config.alpha,
            max_dist,
            x_label: "Distance (pc)".to_string(),
            y_label: "Stellar Insolation Flux (relative to Earth)".to_string(),
            y_log: true,
            series,
            reference_lines: vec![
                ReferenceLine::at("Mercury", A_MERCURY),
                ReferenceLine::at("Venus", A_VENUS),
                ReferenceLine::at("Mars", A_MARS),
            ],
            footer,
        }
    }

    /// Number of catalog planets placed in the main series
    pub fn planet_count(&self) -> usize {
        self.series.iter()
            .filter(|s| s.kind == SeriesKind::Planets)
            .map(|s| s.points.len())
            .sum()
    }

    pub fn save(&self, path: &Path) -> ExoResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &Path) -> ExoResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

fn planet_series(name: &str, planets: &[&AnnotatedPlanet], config: &FigureConfig, color_by_teff: bool) -> Series {
    let points = planets.iter().map(|p| {
        let r = &p.record;
        Point {
            x: r.sy_dist,
            y: p.approx_insolation,
            size: marker_size(r.pl_bmasse, config.size),
            color_value: color_by_teff.then_some(r.st_teff),
            hover: Some(Hover {
                pl_name: r.pl_name.clone(),
                st_teff: r.st_teff,
                pl_orbper: r.pl_orbper,
                pl_bmasse: r.pl_bmasse,
                pl_eqt_approx: p.equilibrium_temperature,
            }),
        }
    }).collect();

    Series {
        name: name.to_string(),
        kind: SeriesKind::Planets,
        show_legend: true,
        points,
    }
}
