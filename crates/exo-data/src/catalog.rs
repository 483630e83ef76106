//! Planetary-system records from the NASA Exoplanet Archive `pscomppars` table

use serde::{Deserialize, Deserializer};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use crate::error::{ExoError, ExoResult};
use crate::targets::TargetSet;

/// Columns every archive table must carry to be usable
const REQUIRED_COLUMNS: [&str; 2] = ["hostname", "pl_name"];

/// Raw columns written back out, in archive naming
const RAW_COLUMNS: [&str; 12] = [
    "hostname", "pl_name", "hip_name", "hd_name",
    "st_teff", "st_lum", "st_rad", "sy_dist",
    "pl_orbsmax", "pl_orbper", "pl_bmasse", "tran_flag",
];

/// One planet and its host system.
///
/// Missing numeric values are stored as NaN so that comparisons and derived
/// quantities follow IEEE-754 semantics.
#[derive(Clone, Debug)]
pub struct PlanetRecord {
    /// Host star name
    pub hostname: String,
    /// Planet name
    pub pl_name: String,
    /// Hipparcos identifier, e.g. "HIP 57050"
    pub hip_name: Option<String>,
    /// Henry Draper identifier
    pub hd_name: Option<String>,
    /// Stellar effective temperature (K)
    pub st_teff: f64,
    /// Stellar luminosity, log10 solar units
    pub st_lum: f64,
    /// Stellar radius (solar radii)
    pub st_rad: f64,
    /// System distance (pc)
    pub sy_dist: f64,
    /// Orbit semi-major axis (AU)
    pub pl_orbsmax: f64,
    /// Orbital period (days)
    pub pl_orbper: f64,
    /// Planet mass (Earth masses)
    pub pl_bmasse: f64,
    /// Detected by transit
    pub tran_flag: bool,
}

impl PlanetRecord {
    /// Record with only names set; every numeric field is missing.
    pub fn new(hostname: impl Into<String>, pl_name: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            pl_name: pl_name.into(),
            hip_name: None,
            hd_name: None,
            st_teff: f64::NAN,
            st_lum: f64::NAN,
            st_rad: f64::NAN,
            sy_dist: f64::NAN,
            pl_orbsmax: f64::NAN,
            pl_orbper: f64::NAN,
            pl_bmasse: f64::NAN,
            tran_flag: false,
        }
    }

    /// Distance, mass and period are all present
    pub fn has_all_required(&self) -> bool {
        !self.sy_dist.is_nan() && !self.pl_bmasse.is_nan() && !self.pl_orbper.is_nan()
    }

    fn raw_fields(&self) -> Vec<String> {
        vec![
            self.hostname.clone(),
            self.pl_name.clone(),
            self.hip_name.clone().unwrap_or_default(),
            self.hd_name.clone().unwrap_or_default(),
            format_value(self.st_teff),
            format_value(self.st_lum),
            format_value(self.st_rad),
            format_value(self.sy_dist),
            format_value(self.pl_orbsmax),
            format_value(self.pl_orbper),
            format_value(self.pl_bmasse),
            if self.tran_flag { "1".to_string() } else { "0".to_string() },
        ]
    }
}

/// Empty cell for missing values
fn format_value(value: f64) -> String {
    if value.is_nan() { String::new() } else { value.to_string() }
}

/// Ordered collection of planet records. Duplicates are kept as-is.
#[derive(Clone, Debug, Default)]
pub struct PlanetCatalog {
    planets: Vec<PlanetRecord>,
}

impl PlanetCatalog {
    /// Create from existing records
    pub fn from_records(planets: Vec<PlanetRecord>) -> Self {
        Self { planets }
    }

    /// Parse an archive CSV payload. Lines starting with `#` are comments.
    pub fn from_csv_reader<R: Read>(source: R) -> ExoResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .comment(Some(b'#'))
            .trim(csv::Trim::Fields)
            .from_reader(source);

        let headers = reader.headers()?.clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(ExoError::Retrieval(format!(
                    "table has no '{}' column (header: {:?})",
                    column,
                    headers.iter().take(8).collect::<Vec<_>>()
                )));
            }
        }

        let mut planets = Vec::new();
        for result in reader.deserialize() {
            let record: ArchiveCsvRecord = result?;
            planets.push(record.into_planet_record());
        }

        tracing::debug!("Parsed {} planet rows", planets.len());
        Ok(Self { planets })
    }

    pub fn from_csv_str(text: &str) -> ExoResult<Self> {
        Self::from_csv_reader(text.as_bytes())
    }

    /// Load from an archive-format CSV file
    pub fn load_csv(path: &Path) -> ExoResult<Self> {
        tracing::info!("Loading planet catalog from {:?}", path);
        let catalog = Self::from_csv_reader(File::open(path)?)?;
        tracing::info!("Loaded {} planets", catalog.len());
        Ok(catalog)
    }

    /// Write the raw columns. `comment` becomes a leading `# ...` line.
    pub fn write_csv<W: Write>(&self, mut out: W, comment: Option<&str>) -> ExoResult<()> {
        if let Some(comment) = comment {
            writeln!(out, "# {}", comment)?;
        }
        let mut w = csv::Writer::from_writer(out);
        w.write_record(RAW_COLUMNS)?;
        for planet in &self.planets {
            w.write_record(planet.raw_fields())?;
        }
        w.flush()?;
        Ok(())
    }

    pub fn save_csv(&self, path: &Path, comment: Option<&str>) -> ExoResult<()> {
        let file = BufWriter::new(File::create(path)?);
        self.write_csv(file, comment)?;
        tracing::info!("Wrote {} planets to {:?}", self.len(), path);
        Ok(())
    }

    pub fn len(&self) -> usize { self.planets.len() }
    pub fn is_empty(&self) -> bool { self.planets.is_empty() }
    pub fn iter(&self) -> impl Iterator<Item = &PlanetRecord> { self.planets.iter() }
    pub fn into_records(self) -> Vec<PlanetRecord> { self.planets }

    /// Keep systems cooler than `max_teff` and closer than `max_dist`
    pub fn within_bounds(self, max_teff: u32, max_dist: f64) -> Self {
        let max_teff = f64::from(max_teff);
        Self {
            planets: self.planets.into_iter()
                .filter(|p| p.st_teff < max_teff && p.sy_dist < max_dist)
                .collect()
        }
    }

    /// Drop rows that cannot be placed on a distance/temperature plot
    pub fn drop_unlocated(self) -> Self {
        let before = self.planets.len();
        let planets: Vec<_> = self.planets.into_iter()
            .filter(|p| !p.sy_dist.is_nan() && !p.st_teff.is_nan())
            .collect();
        if planets.len() < before {
            tracing::debug!("Dropped {} rows without distance or Teff", before - planets.len());
        }
        Self { planets }
    }
}

/// Planet record plus the quantities derived during annotation
#[derive(Clone, Debug)]
pub struct AnnotatedPlanet {
    pub record: PlanetRecord,
    /// Earth-relative insolation flux, `pl_approx_insol`
    pub approx_insolation: f64,
    /// Blackbody equilibrium temperature (K)
    pub equilibrium_temperature: f64,
}

/// Ordered collection of annotated planets
#[derive(Clone, Debug, Default)]
pub struct AnnotatedCatalog {
    planets: Vec<AnnotatedPlanet>,
}

impl AnnotatedCatalog {
    pub fn from_planets(planets: Vec<AnnotatedPlanet>) -> Self {
        Self { planets }
    }

    pub fn len(&self) -> usize { self.planets.len() }
    pub fn is_empty(&self) -> bool { self.planets.is_empty() }
    pub fn iter(&self) -> impl Iterator<Item = &AnnotatedPlanet> { self.planets.iter() }
    pub fn into_planets(self) -> Vec<AnnotatedPlanet> { self.planets }

    /// Write raw and derived columns. With `targets`, a membership column
    /// (`in_mirecle_targets` or `in_hwo_targets`) is appended.
    pub fn write_csv<W: Write>(&self, out: W, targets: Option<&TargetSet>) -> ExoResult<()> {
        let mut w = csv::Writer::from_writer(out);

        let mut header: Vec<&str> = RAW_COLUMNS.to_vec();
        header.push("pl_approx_insol");
        header.push("pl_eqt_approx");
        if let Some(t) = targets {
            header.push(t.column_name());
        }
        w.write_record(&header)?;

        for planet in &self.planets {
            let mut fields = planet.record.raw_fields();
            fields.push(format_value(planet.approx_insolation));
            fields.push(format_value(planet.equilibrium_temperature));
            if let Some(t) = targets {
                fields.push(t.contains(&planet.record).to_string());
            }
            w.write_record(&fields)?;
        }
        w.flush()?;
        Ok(())
    }

    pub fn save_csv(&self, path: &Path, targets: Option<&TargetSet>) -> ExoResult<()> {
        let file = BufWriter::new(File::create(path)?);
        self.write_csv(file, targets)?;
        tracing::info!("Wrote {} annotated planets to {:?}", self.len(), path);
        Ok(())
    }
}

/// CSV row in archive export format
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ArchiveCsvRecord {
    hostname: String,
    pl_name: String,
    hip_name: Option<String>,
    hd_name: Option<String>,
    st_teff: Option<f64>,
    st_lum: Option<f64>,
    st_rad: Option<f64>,
    sy_dist: Option<f64>,
    pl_orbsmax: Option<f64>,
    pl_orbper: Option<f64>,
    pl_bmasse: Option<f64>,
    #[serde(deserialize_with = "deserialize_flag")]
    tran_flag: bool,
}

impl ArchiveCsvRecord {
    fn into_planet_record(self) -> PlanetRecord {
        let or_nan = |v: Option<f64>| v.unwrap_or(f64::NAN);
        PlanetRecord {
            hostname: self.hostname,
            pl_name: self.pl_name,
            hip_name: self.hip_name.filter(|s| !s.is_empty()),
            hd_name: self.hd_name.filter(|s| !s.is_empty()),
            st_teff: or_nan(self.st_teff),
            st_lum: or_nan(self.st_lum),
            st_rad: or_nan(self.st_rad),
            sy_dist: or_nan(self.sy_dist),
            pl_orbsmax: or_nan(self.pl_orbsmax),
            pl_orbper: or_nan(self.pl_orbper),
            pl_bmasse: or_nan(self.pl_bmasse),
            tran_flag: self.tran_flag,
        }
    }
}

/// Archive flags are integers; pandas exports write `True`/`False`
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") | Some("0") | Some("false") | Some("False") => Ok(false),
        Some("1") | Some("true") | Some("True") => Ok(true),
        Some(other) => Err(serde::de::Error::custom(format!("invalid tran_flag value: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# 2024/03/01 09:30
hostname,pl_name,hip_name,hd_name,st_teff,st_lum,st_rad,sy_dist,pl_orbsmax,pl_orbper,pl_bmasse,tran_flag,disc_year
Proxima Cen,Proxima Cen b,HIP 70890,,2900.0,-2.81,0.14,1.30119,0.04856,11.18427,1.07,0,2016
GJ 667 C,GJ 667 C b,,,3350,-1.86,0.3,7.24396,0.0505,7.2,5.6,0,2009
LHS 1140,LHS 1140 b,,,3096,-2.31,0.21,14.9861,0.0946,24.73694,6.98,1,2017
";

    #[test]
    fn test_parse_archive_csv() {
        let catalog = PlanetCatalog::from_csv_str(SAMPLE).unwrap();
        assert_eq!(catalog.len(), 3);

        let proxima = catalog.iter().next().unwrap();
        assert_eq!(proxima.hostname, "Proxima Cen");
        assert_eq!(proxima.hip_name.as_deref(), Some("HIP 70890"));
        assert_eq!(proxima.hd_name, None);
        assert_eq!(proxima.st_teff, 2900.0);
        assert!(!proxima.tran_flag);

        let lhs = catalog.iter().nth(2).unwrap();
        assert!(lhs.tran_flag);
    }

    #[test]
    fn test_missing_cells_become_nan() {
        let text = "hostname,pl_name,st_teff,sy_dist,pl_bmasse\nTRAPPIST-1,TRAPPIST-1 e,2566,,0.692\n";
        let catalog = PlanetCatalog::from_csv_str(text).unwrap();
        let p = catalog.iter().next().unwrap();
        assert!(p.sy_dist.is_nan());
        assert!(p.st_lum.is_nan(), "absent column should be NaN");
        assert_eq!(p.pl_bmasse, 0.692);
        assert!(!p.has_all_required());
    }

    #[test]
    fn test_non_table_body_rejected() {
        let html = "<html><body>Service unavailable</body></html>\n";
        let err = PlanetCatalog::from_csv_str(html).unwrap_err();
        assert!(matches!(err, ExoError::Retrieval(_)), "got {:?}", err);
    }

    #[test]
    fn test_invalid_flag_rejected() {
        let text = "hostname,pl_name,tran_flag\nA,A b,maybe\n";
        assert!(PlanetCatalog::from_csv_str(text).is_err());
    }

    #[test]
    fn test_within_bounds_and_drop_unlocated() {
        let catalog = PlanetCatalog::from_csv_str(SAMPLE).unwrap();
        let near = catalog.clone().within_bounds(3200, 10.0);
        assert_eq!(near.len(), 1);
        assert_eq!(near.iter().next().unwrap().pl_name, "Proxima Cen b");

        let mut records = catalog.into_records();
        records.push(PlanetRecord::new("Nowhere", "Nowhere b"));
        let located = PlanetCatalog::from_records(records).drop_unlocated();
        assert_eq!(located.len(), 3);
    }

    #[test]
    fn test_write_then_read_keeps_missing_values() {
        let mut record = PlanetRecord::new("GJ 1002", "GJ 1002 b");
        record.sy_dist = 4.846;
        record.tran_flag = true;
        let catalog = PlanetCatalog::from_records(vec![record]);

        let mut buf = Vec::new();
        catalog.write_csv(&mut buf, Some("2024/03/01 09:30")).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("# 2024/03/01 09:30\n"));

        let back = PlanetCatalog::from_csv_str(&text).unwrap();
        let p = back.iter().next().unwrap();
        assert_eq!(p.sy_dist, 4.846);
        assert!(p.pl_bmasse.is_nan());
        assert!(p.tran_flag);
    }

    fn annotated_sample() -> AnnotatedCatalog {
        use crate::corrections::annotate;

        let mut gj = PlanetRecord::new("GJ 667 C", "GJ 667 C c");
        gj.st_teff = 3350.0;
        gj.st_lum = -1.0;
        gj.st_rad = 0.3;
        gj.sy_dist = 6.8;
        gj.pl_orbsmax = 0.125;
        gj.pl_orbper = 7.2;
        gj.pl_bmasse = 3.8;

        let mut dim = PlanetRecord::new("Wolf 1061", "Wolf 1061 c");
        dim.hip_name = Some("HIP 80824".to_string());
        dim.sy_dist = 4.3;
        dim.tran_flag = true;

        annotate(PlanetCatalog::from_records(vec![gj, dim]))
    }

    fn write_annotated(catalog: &AnnotatedCatalog, targets: Option<&TargetSet>) -> Vec<Vec<String>> {
        let mut buf = Vec::new();
        catalog.write_csv(&mut buf, targets).unwrap();
        let mut reader = csv::ReaderBuilder::new().has_headers(false).from_reader(buf.as_slice());
        reader.records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_annotated_csv_derived_columns() {
        let rows = write_annotated(&annotated_sample(), None);
        assert_eq!(rows.len(), 3);

        let header = &rows[0];
        assert_eq!(header.len(), RAW_COLUMNS.len() + 2);
        assert_eq!(&header[..12], &RAW_COLUMNS[..]);
        assert_eq!(header[12], "pl_approx_insol");
        assert_eq!(header[13], "pl_eqt_approx");

        let gj = &rows[1];
        assert_eq!(gj[6], "0.42", "radius override is written");
        let insol: f64 = gj[12].parse().unwrap();
        assert!((insol - 6.4).abs() < 1e-9, "insolation {}", insol);
        let teq: f64 = gj[13].parse().unwrap();
        assert!((teq - 255.0 * 6.4f64.powf(0.25)).abs() < 1e-9, "teq {}", teq);

        // Missing luminosity leaves both derived cells empty
        let dim = &rows[2];
        assert_eq!(dim[2], "HIP 80824");
        assert_eq!(dim[4], "");
        assert_eq!(dim[11], "1");
        assert_eq!(dim[12], "");
        assert_eq!(dim[13], "");
    }

    #[test]
    fn test_annotated_csv_membership_column() {
        use crate::targets::{HwoTargets, MirecleTargets};

        let catalog = annotated_sample();

        let mirecle = TargetSet::Mirecle(MirecleTargets::from_names(["GJ 667 C c"]));
        let rows = write_annotated(&catalog, Some(&mirecle));
        assert_eq!(rows[0].len(), RAW_COLUMNS.len() + 3);
        assert_eq!(rows[0].last().unwrap(), "in_mirecle_targets");
        assert_eq!(rows[1].last().unwrap(), "true");
        assert_eq!(rows[2].last().unwrap(), "false");

        let table = "ID(HIP),ID(HD),Common Name\nHIP 80824,,\n";
        let hwo = TargetSet::Hwo(HwoTargets::from_csv_reader(table.as_bytes()).unwrap());
        let rows = write_annotated(&catalog, Some(&hwo));
        assert_eq!(rows[0].last().unwrap(), "in_hwo_targets");
        assert_eq!(rows[1].last().unwrap(), "false");
        assert_eq!(rows[2].last().unwrap(), "true");
    }

    #[test]
    fn test_annotated_save_csv_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("selected.csv");
        annotated_sample().save_csv(&path, None).unwrap();

        let back = PlanetCatalog::load_csv(&path).unwrap();
        let names: Vec<_> = back.iter().map(|p| p.pl_name.as_str()).collect();
        assert_eq!(names, vec!["GJ 667 C c", "Wolf 1061 c"]);
        assert_eq!(back.iter().next().unwrap().st_rad, 0.42);
    }
}
