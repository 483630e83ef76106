//! NASA Exoplanet Archive TAP queries
//!
//! The archive takes an ADQL statement in the `query` parameter. Spaces are
//! encoded as `+` and the result format is requested as CSV.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::catalog::PlanetCatalog;
use crate::error::{ExoError, ExoResult};

/// Synchronous TAP endpoint; the query string is appended directly
pub const DEFAULT_ENDPOINT: &str = "https://exoplanetarchive.ipac.caltech.edu/TAP/sync?query=";

/// Planetary Systems Composite Parameters table
pub const COMPOSITE_TABLE: &str = "pscomppars";

/// Request timeout for a single archive query
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Bounds wide enough to return the whole table
pub const FETCH_ALL_MAX_TEFF: u32 = 1_000_000;
pub const FETCH_ALL_MAX_DIST: f64 = 100_000.0;

/// Builds archive query URLs and performs the single GET
#[derive(Clone, Debug)]
pub struct QueryBuilder {
    endpoint: String,
    table: String,
    timeout: Duration,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            table: COMPOSITE_TABLE.to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point at a mirror or a local test server
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// `select * from <table> where st_teff < T and sy_dist < D`, each space
    /// replaced by `+`, followed by `&format=csv`.
    ///
    /// Thresholds are not range-checked or escaped.
    pub fn build_query(&self, max_teff: u32, max_dist: f64) -> String {
        let statement = format!(
            "select * from {} where st_teff < {} and sy_dist < {}",
            self.table, max_teff, max_dist
        );
        let joined = statement.split(' ').collect::<Vec<_>>().join("+");
        format!("{}&format=csv", joined)
    }

    pub fn build_url(&self, max_teff: u32, max_dist: f64) -> String {
        format!("{}{}", self.endpoint, self.build_query(max_teff, max_dist))
    }

    /// Query the archive and parse the CSV response. One attempt, no retry.
    pub async fn fetch(&self, max_teff: u32, max_dist: f64) -> ExoResult<PlanetCatalog> {
        let url = self.build_url(max_teff, max_dist);
        let body = self.fetch_text(&url).await?;

        let catalog = PlanetCatalog::from_csv_str(&body).map_err(|e| match e {
            ExoError::Csv(e) => ExoError::Retrieval(format!("malformed CSV response: {}", e)),
            other => other,
        })?;

        tracing::info!("Archive returned {} planets", catalog.len());
        Ok(catalog)
    }

    /// Fetch the whole table and drop rows without distance or Teff
    pub async fn fetch_all(&self) -> ExoResult<PlanetCatalog> {
        let catalog = self.fetch(FETCH_ALL_MAX_TEFF, FETCH_ALL_MAX_DIST).await?;
        Ok(catalog.drop_unlocated())
    }

    async fn fetch_text(&self, url: &str) -> ExoResult<String> {
        tracing::info!("Querying {}", url);

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()?;

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()));
        spinner.set_message("Waiting for NASA Exoplanet Archive...");
        spinner.enable_steady_tick(Duration::from_millis(120));

        let result = Self::get_text(&client, url).await;

        spinner.finish_and_clear();
        result
    }

    async fn get_text(client: &reqwest::Client, url: &str) -> ExoResult<String> {
        let response = client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExoError::Retrieval(format!("archive returned status {}", status)));
        }
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};
    use std::net::SocketAddr;

    const TABLE: &str = "\
hostname,pl_name,hip_name,hd_name,st_teff,st_lum,st_rad,sy_dist,pl_orbsmax,pl_orbper,pl_bmasse,tran_flag
GJ 667 C,GJ 667 C c,,,3350,-1.0,0.3,6.8,0.125,7.2,3.8,0
Kepler-1649,Kepler-1649 c,,,3240,,0.23,,0.0827,19.53527,1.2,1
";

    async fn serve(app: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    #[test]
    fn test_build_query_literal() {
        let q = QueryBuilder::new().build_query(3700, 20.0);
        assert_eq!(q, "select+*+from+pscomppars+where+st_teff+<+3700+and+sy_dist+<+20&format=csv");
    }

    #[test]
    fn test_default_timeout_is_thirty_seconds() {
        assert_eq!(REQUEST_TIMEOUT, Duration::from_secs(30));
        assert_eq!(QueryBuilder::default().timeout, REQUEST_TIMEOUT);
        assert_eq!(QueryBuilder::new().with_endpoint("http://localhost/").timeout, REQUEST_TIMEOUT);
    }

    #[test]
    fn test_build_url_and_fractional_distance() {
        let url = QueryBuilder::new().build_url(4000, 12.5);
        assert_eq!(url,
            "https://exoplanetarchive.ipac.caltech.edu/TAP/sync?query=\
             select+*+from+pscomppars+where+st_teff+<+4000+and+sy_dist+<+12.5&format=csv");
        assert!(!url.contains(' '));
    }

    #[tokio::test]
    async fn test_fetch_parses_table() {
        let app = Router::new().route("/sync", get(|| async { TABLE }));
        let addr = serve(app).await;

        let builder = QueryBuilder::new().with_endpoint(format!("http://{}/sync?query=", addr));
        let catalog = builder.fetch(3700, 20.0).await.unwrap();
        assert_eq!(catalog.len(), 2);

        let all = builder.fetch_all().await.unwrap();
        assert_eq!(all.len(), 1, "row without sy_dist is dropped");
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let app = Router::new().route("/sync", get(|| async {
            (StatusCode::SERVICE_UNAVAILABLE, "down for maintenance")
        }));
        let addr = serve(app).await;

        let builder = QueryBuilder::new().with_endpoint(format!("http://{}/sync?query=", addr));
        let err = builder.fetch(3700, 20.0).await.unwrap_err();
        assert!(matches!(err, ExoError::Retrieval(ref m) if m.contains("503")), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_table_body() {
        let app = Router::new().route("/sync", get(|| async { "ERROR: unknown table pscomppars" }));
        let addr = serve(app).await;

        let builder = QueryBuilder::new().with_endpoint(format!("http://{}/sync?query=", addr));
        let err = builder.fetch(3700, 20.0).await.unwrap_err();
        assert!(matches!(err, ExoError::Retrieval(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let app = Router::new().route("/sync", get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            TABLE
        }));
        let addr = serve(app).await;

        let builder = QueryBuilder::new()
            .with_endpoint(format!("http://{}/sync?query=", addr))
            .with_timeout(Duration::from_millis(200));
        let err = builder.fetch(3700, 20.0).await.unwrap_err();
        assert!(matches!(err, ExoError::Retrieval(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        // Bind then drop to get a port with nothing listening
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let builder = QueryBuilder::new().with_endpoint(format!("http://{}/sync?query=", addr));
        assert!(matches!(builder.fetch(3700, 20.0).await, Err(ExoError::Retrieval(_))));
    }
}
