//! Console server configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Console server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment: development | staging | production
    pub environment: String,
    /// HTTP port
    pub http_port: u16,
    /// Icona API base URL, including the `/api` prefix
    pub icona_api_url: String,
    /// Bearer token for Icona
    pub icona_api_key: Option<String>,
    /// Per-request upstream timeout in seconds
    pub icona_timeout_secs: u64,
    /// Max in-flight upstream calls during one fan-out
    pub fanout_concurrency: usize,
    /// Allowed browser origin; any origin when unset
    pub cors_origin: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BoxError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let environment = var("ENVIRONMENT").unwrap_or_else(|| "development".into());
        let is_dev = environment == "development";

        let icona_api_url = match var("ICONA_API_URL") {
            Some(url) => url,
            None if is_dev => "http://localhost:4000/api".into(),
            None => {
                return Err(
                    format!("ICONA_API_URL must be set in {environment} environment").into(),
                );
            }
        };

        let icona_api_key = var("ICONA_API_KEY");
        if icona_api_key.is_none() && !is_dev {
            return Err(format!("ICONA_API_KEY must be set in {environment} environment").into());
        }

        Ok(Self {
            http_port: var("HTTP_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            icona_api_url,
            icona_api_key,
            icona_timeout_secs: var("ICONA_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .filter(|s| *s > 0)
                .unwrap_or(30),
            fanout_concurrency: var("FANOUT_CONCURRENCY")
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(8),
            cors_origin: var("CORS_ORIGIN"),
            environment,
        })
    }
}
