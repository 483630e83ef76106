//! Observation target lists used to tag planets for overlays.
//!
//! MIRECLE is a plain list of planet names, one per line. The HWO table is a
//! CSV whose HIP, HD and common-name columns are matched against the host.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use crate::catalog::PlanetRecord;
use crate::error::{ExoError, ExoResult};

/// Which overlay list, if any, to tag planets with
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetList {
    #[default]
    None,
    Mirecle,
    Hwo,
}

impl TargetList {
    /// Resolve the mutually exclusive `--mirecle` / `--hwo` switches
    pub fn from_flags(mirecle: bool, hwo: bool) -> ExoResult<Self> {
        match (mirecle, hwo) {
            (true, true) => Err(ExoError::Configuration(
                "choose at most one target list (MIRECLE or HWO)".to_string(),
            )),
            (true, false) => Ok(Self::Mirecle),
            (false, true) => Ok(Self::Hwo),
            (false, false) => Ok(Self::None),
        }
    }
}

impl FromStr for TargetList {
    type Err = ExoError;

    fn from_str(s: &str) -> ExoResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "mirecle" => Ok(Self::Mirecle),
            "hwo" => Ok(Self::Hwo),
            other => Err(ExoError::Configuration(format!(
                "unknown target list '{}' (expected none, mirecle or hwo)", other
            ))),
        }
    }
}

impl fmt::Display for TargetList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Mirecle => "mirecle",
            Self::Hwo => "hwo",
        };
        f.write_str(name)
    }
}

/// MIRECLE planet names
#[derive(Clone, Debug, Default)]
pub struct MirecleTargets {
    names: HashSet<String>,
}

impl MirecleTargets {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { names: names.into_iter().map(Into::into).collect() }
    }

    /// One name per line, no header. Blank lines are skipped.
    pub fn parse(text: &str) -> Self {
        Self::from_names(text.lines().map(str::trim).filter(|l| !l.is_empty()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read MIRECLE target list: {}", path.display()))?;
        let targets = Self::parse(&contents);
        tracing::info!("Loaded {} MIRECLE targets", targets.len());
        Ok(targets)
    }

    /// Exact match on planet name
    pub fn contains(&self, planet: &PlanetRecord) -> bool {
        self.names.contains(&planet.pl_name)
    }

    pub fn len(&self) -> usize { self.names.len() }
    pub fn is_empty(&self) -> bool { self.names.is_empty() }
}

/// HWO stellar targets keyed three ways
#[derive(Clone, Debug, Default)]
pub struct HwoTargets {
    hip: HashSet<String>,
    hd: HashSet<String>,
    common_names: HashSet<String>,
}

#[derive(Debug, Deserialize)]
struct HwoCsvRecord {
    #[serde(rename = "ID(HIP)", default)]
    hip: Option<String>,
    #[serde(rename = "ID(HD)", default)]
    hd: Option<String>,
    #[serde(rename = "Common Name", default)]
    common_name: Option<String>,
}

impl HwoTargets {
    pub fn from_csv_reader<R: Read>(source: R) -> ExoResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Fields)
            .flexible(true)
            .from_reader(source);

        let mut targets = Self::default();
        for result in reader.deserialize() {
            let row: HwoCsvRecord = result?;
            let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
            if let Some(hip) = non_empty(row.hip) {
                targets.hip.insert(hip);
            }
            if let Some(hd) = non_empty(row.hd) {
                targets.hd.insert(hd);
            }
            if let Some(name) = non_empty(row.common_name) {
                targets.common_names.insert(name);
            }
        }
        Ok(targets)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open HWO target table: {}", path.display()))?;
        let targets = Self::from_csv_reader(file)
            .with_context(|| format!("Failed to parse HWO target table: {}", path.display()))?;
        tracing::info!("Loaded HWO targets: {} HIP, {} HD, {} named",
            targets.hip.len(), targets.hd.len(), targets.common_names.len());
        Ok(targets)
    }

    /// HIP id, HD id or host name appears in the table
    pub fn contains(&self, planet: &PlanetRecord) -> bool {
        planet.hip_name.as_ref().is_some_and(|id| self.hip.contains(id))
            || planet.hd_name.as_ref().is_some_and(|id| self.hd.contains(id))
            || self.common_names.contains(&planet.hostname)
    }
}

/// A loaded overlay list
#[derive(Clone, Debug)]
pub enum TargetSet {
    Mirecle(MirecleTargets),
    Hwo(HwoTargets),
}

impl TargetSet {
    /// Load the list selected by `list`, reading only that file
    pub fn load(list: TargetList, mirecle_path: &Path, hwo_path: &Path) -> Result<Option<Self>> {
        Ok(match list {
            TargetList::None => None,
            TargetList::Mirecle => Some(Self::Mirecle(MirecleTargets::load(mirecle_path)?)),
            TargetList::Hwo => Some(Self::Hwo(HwoTargets::load(hwo_path)?)),
        })
    }

    pub fn contains(&self, planet: &PlanetRecord) -> bool {
        match self {
            Self::Mirecle(t) => t.contains(planet),
            Self::Hwo(t) => t.contains(planet),
        }
    }

    /// Membership column name in annotated CSV output
    pub fn column_name(&self) -> &'static str {
        match self {
            Self::Mirecle(_) => "in_mirecle_targets",
            Self::Hwo(_) => "in_hwo_targets",
        }
    }

    /// Overlay series name
    pub fn label(&self) -> &'static str {
        match self {
            Self::Mirecle(_) => "MIRECLE Targets",
            Self::Hwo(_) => "HWO Targets",
        }
    }
}
