pub mod cache;
pub mod catalog;
pub mod config;
pub mod corrections;
pub mod error;
pub mod figure;
pub mod query;
pub mod selection;
pub mod targets;

pub use cache::{is_stale, CacheConfig, CatalogCache};
pub use catalog::{AnnotatedCatalog, AnnotatedPlanet, PlanetCatalog, PlanetRecord};
pub use config::{PipelineConfig, TargetFiles};
pub use corrections::{annotate, annotate_and_filter, apply_overrides, ensure_non_empty, Thresholds};
pub use error::{ExoError, ExoResult};
pub use figure::{FigureConfig, FigureData, Method};
pub use query::QueryBuilder;
pub use selection::{select, HostBounds, SelectionConfig};
pub use targets::{HwoTargets, MirecleTargets, TargetList, TargetSet};
