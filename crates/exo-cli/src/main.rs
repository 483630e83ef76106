use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use exo_data::{
    select, AnnotatedCatalog, CatalogCache, FigureData, Method, PipelineConfig, QueryBuilder,
    TargetList, TargetSet,
};
use exo_data::cache::{epoch_from_system_time, retrieval_stamp};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::SystemTime;

#[derive(Parser)]
#[command(name = "exoplot")]
#[command(about = "Nearby exoplanet selection from the NASA Exoplanet Archive")]
struct Cli {
    /// JSON configuration file; flags given on the command line take precedence
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the archive query URL for the host bounds
    Query {
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Query the archive with the host bounds and save the raw table
    Fetch {
        #[command(flatten)]
        selection: SelectionArgs,
        #[command(flatten)]
        source: SourceArgs,
        #[arg(short, long, default_value = "nearby_mdwarfs.csv")]
        output: PathBuf,
    },

    /// Select planets from the cached catalog and write the annotated table
    Select {
        #[command(flatten)]
        selection: SelectionArgs,
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        targets: TargetArgs,
        #[arg(short, long, default_value = "nearby_exoplanets_selected.csv")]
        output: PathBuf,
    },

    /// Select planets and write figure data (JSON) for the plotting front end
    Figure {
        #[command(flatten)]
        selection: SelectionArgs,
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        targets: TargetArgs,
        /// Marker coloring: "transit" or "teff"
        #[arg(long)]
        method: Option<String>,
        /// Marker size scale factor
        #[arg(long)]
        size: Option<f64>,
        /// Marker transparency
        #[arg(long)]
        alpha: Option<f64>,
        #[arg(short, long, default_value = "nearby_exoplanets_figure.json")]
        output: PathBuf,
    },

    /// Report whether the cached catalog would be refreshed
    CacheStatus {
        #[command(flatten)]
        source: SourceArgs,
    },
}

/// Host bounds and planet thresholds
#[derive(Args, Clone, Debug, Default)]
struct SelectionArgs {
    /// Maximum stellar effective temperature (K)
    #[arg(long)]
    max_teff: Option<u32>,
    /// Maximum system distance (pc)
    #[arg(long)]
    max_dist: Option<f64>,
    /// Maximum orbital period (days)
    #[arg(long)]
    max_period: Option<f64>,
    /// Maximum planet mass (Earth masses)
    #[arg(long)]
    max_mass: Option<f64>,
    /// Maximum insolation (Earth = 1)
    #[arg(long)]
    max_insolation: Option<f64>,
}

/// Archive endpoint and cache location
#[derive(Args, Clone, Debug, Default)]
struct SourceArgs {
    /// Cached full-catalog CSV
    #[arg(long)]
    cache: Option<PathBuf>,
    /// Days before the cache is refreshed
    #[arg(long)]
    shelf_life_days: Option<u64>,
    /// Archive TAP endpoint (query is appended)
    #[arg(long)]
    endpoint: Option<String>,
}

/// Overlay target list selection
#[derive(Args, Clone, Debug, Default)]
struct TargetArgs {
    /// Mark MIRECLE targets
    #[arg(long)]
    mirecle: bool,
    /// Mark HWO targets
    #[arg(long)]
    hwo: bool,
    #[arg(long)]
    mirecle_file: Option<PathBuf>,
    #[arg(long)]
    hwo_file: Option<PathBuf>,
}

impl SelectionArgs {
    fn apply(&self, config: &mut PipelineConfig) {
        let s = &mut config.selection;
        if let Some(v) = self.max_teff { s.max_teff = v; }
        if let Some(v) = self.max_dist { s.max_dist = v; }
        if let Some(v) = self.max_period { s.max_period = v; }
        if let Some(v) = self.max_mass { s.max_mass = v; }
        if let Some(v) = self.max_insolation { s.max_insolation = v; }
    }
}

impl SourceArgs {
    fn apply(&self, config: &mut PipelineConfig) {
        if let Some(p) = &self.cache { config.cache.path = p.clone(); }
        if let Some(d) = self.shelf_life_days { config.cache.shelf_life_days = d; }
        if let Some(e) = &self.endpoint { config.endpoint = e.clone(); }
    }
}

impl TargetArgs {
    /// Flags override the configured list; both flags at once is an error
    fn apply(&self, config: &mut PipelineConfig) -> Result<()> {
        let from_flags = TargetList::from_flags(self.mirecle, self.hwo)?;
        if from_flags != TargetList::None {
            config.figure.target_list = from_flags;
        }
        if let Some(p) = &self.mirecle_file { config.targets.mirecle = p.clone(); }
        if let Some(p) = &self.hwo_file { config.targets.hwo = p.clone(); }
        Ok(())
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<PipelineConfig> {
    match path {
        Some(p) => PipelineConfig::load(p)
            .with_context(|| format!("Failed to load configuration: {}", p.display())),
        None => Ok(PipelineConfig::default()),
    }
}

/// Cache (or fetch) the full catalog and run the selection
async fn run_selection(config: &PipelineConfig) -> Result<(AnnotatedCatalog, CatalogCache)> {
    let query = QueryBuilder::new().with_endpoint(config.endpoint.clone());
    let cache = CatalogCache::new(config.cache.clone());
    let catalog = cache.load_or_refresh(&query).await?;
    let selected = select(catalog, &config.selection)
        .context("Nothing to plot; loosen the thresholds")?;
    tracing::info!("{} planets selected", selected.len());
    Ok((selected, cache))
}

fn load_targets(config: &PipelineConfig) -> Result<Option<TargetSet>> {
    TargetSet::load(config.figure.target_list, &config.targets.mirecle, &config.targets.hwo)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Query { selection } => {
            selection.apply(&mut config);
            let query = QueryBuilder::new().with_endpoint(config.endpoint.clone());
            println!("{}", query.build_url(config.selection.max_teff, config.selection.max_dist));
        }

        Commands::Fetch { selection, source, output } => {
            selection.apply(&mut config);
            source.apply(&mut config);
            let query = QueryBuilder::new().with_endpoint(config.endpoint.clone());
            let catalog = query.fetch(config.selection.max_teff, config.selection.max_dist).await?;
            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let stamp = retrieval_stamp(epoch_from_system_time(SystemTime::now()));
            catalog.save_csv(&output, Some(&stamp))?;
            println!("Fetched {} planets -> {:?}", catalog.len(), output);
        }

        Commands::Select { selection, source, targets, output } => {
            selection.apply(&mut config);
            source.apply(&mut config);
            targets.apply(&mut config)?;

            let target_set = load_targets(&config)?;
            let (selected, _) = run_selection(&config).await?;
            selected.save_csv(&output, target_set.as_ref())?;
            println!("Selected {} planets -> {:?}", selected.len(), output);
        }

        Commands::Figure { selection, source, targets, method, size, alpha, output } => {
            selection.apply(&mut config);
            source.apply(&mut config);
            targets.apply(&mut config)?;
            if let Some(m) = method { config.figure.method = Method::from_str(&m)?; }
            if let Some(s) = size { config.figure.size = s; }
            if let Some(a) = alpha { config.figure.alpha = a; }

            let target_set = load_targets(&config)?;
            let (selected, cache) = run_selection(&config).await?;
            let figure = FigureData::build(
                &selected,
                &config.figure,
                config.selection.max_dist,
                target_set.as_ref(),
                cache.retrieved_at(),
            );
            figure.save(&output)?;
            println!("Figure data for {} planets -> {:?}", figure.planet_count(), output);
        }

        Commands::CacheStatus { source } => {
            source.apply(&mut config);
            let cache = CatalogCache::new(config.cache.clone());
            match cache.retrieved_at() {
                Some(epoch) => println!("Cache: {:?} (modified {})", cache.path(), epoch),
                None => println!("Cache: {:?} (missing)", cache.path()),
            }
            let verdict = if cache.is_stale() { "stale, will refresh" } else { "fresh" };
            println!("Shelf life: {} day(s), {}", config.cache.shelf_life_days, verdict);
        }
    }

    Ok(())
}
