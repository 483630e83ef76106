//! Flat-file cache of the full archive table.
//!
//! The whole `pscomppars` table is fetched once and reused until it is older
//! than the shelf life. Writes go straight to the target path: two processes
//! refreshing at the same time race and the last writer wins.

use exo_core::constants::SECONDS_PER_DAY;
use hifitime::Epoch;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::catalog::PlanetCatalog;
use crate::error::ExoResult;
use crate::query::QueryBuilder;

/// Cache location and shelf life
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub path: PathBuf,
    pub shelf_life_days: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("nearby_exoplanets.csv"),
            shelf_life_days: 1,
        }
    }
}

/// True if `path` is missing or more than `shelf_life_days` whole days old
pub fn is_stale(path: &Path, shelf_life_days: u64) -> bool {
    is_stale_at(path, shelf_life_days, SystemTime::now())
}

/// [`is_stale`] against an explicit clock
pub fn is_stale_at(path: &Path, shelf_life_days: u64, now: SystemTime) -> bool {
    let modified = match std::fs::metadata(path).and_then(|m| m.modified()) {
        Ok(t) => t,
        Err(_) => return true,
    };
    // mtime in the future counts as zero age
    let age = now.duration_since(modified).unwrap_or_default();
    age.as_secs() / SECONDS_PER_DAY > shelf_life_days
}

/// Convert a filesystem timestamp to an epoch
pub fn epoch_from_system_time(time: SystemTime) -> Epoch {
    let secs = time.duration_since(UNIX_EPOCH).map(|d| d.as_secs_f64()).unwrap_or(0.0);
    Epoch::from_unix_seconds(secs)
}

/// `YYYY/MM/DD HH:MM` (UTC), the stamp written on the first cache line
pub fn retrieval_stamp(epoch: Epoch) -> String {
    let (y, m, d, h, min, _, _) = epoch.to_gregorian_utc();
    format!("{:04}/{:02}/{:02} {:02}:{:02}", y, m, d, h, min)
}

/// Cached full catalog
#[derive(Clone, Debug)]
pub struct CatalogCache {
    config: CacheConfig,
}

impl CatalogCache {
    pub fn new(config: CacheConfig) -> Self {
        Self { config }
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    pub fn is_stale(&self) -> bool {
        is_stale(&self.config.path, self.config.shelf_life_days)
    }

    /// Reuse the cached table if fresh, otherwise fetch everything and store it
    pub async fn load_or_refresh(&self, query: &QueryBuilder) -> ExoResult<PlanetCatalog> {
        if self.is_stale() {
            tracing::info!("Cache {:?} is stale or missing, refreshing", self.config.path);
            let catalog = query.fetch_all().await?;
            self.store(&catalog)?;
            Ok(catalog)
        } else {
            tracing::info!("Reusing cached catalog {:?}", self.config.path);
            PlanetCatalog::load_csv(&self.config.path)
        }
    }

    /// Overwrite the cache file
    pub fn store(&self, catalog: &PlanetCatalog) -> ExoResult<()> {
        if let Some(parent) = self.config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let stamp = retrieval_stamp(epoch_from_system_time(SystemTime::now()));
        catalog.save_csv(&self.config.path, Some(&stamp))
    }

    /// Modification time of the cache file
    pub fn retrieved_at(&self) -> Option<Epoch> {
        let modified = std::fs::metadata(&self.config.path).and_then(|m| m.modified()).ok()?;
        Some(epoch_from_system_time(modified))
    }
}
