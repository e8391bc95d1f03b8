use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Where and how to reach the external food-detection service.
///
/// One base address plus an optional ordered list of fallbacks. The
/// fallbacks exist for deployments where the service moves between
/// addresses; they are tried strictly in order, never raced.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectConfig {
    pub base_url: String,
    pub fallback_urls: Vec<String>,
    /// Per-attempt timeout for the manual scan flow.
    pub timeout_ms: u64,
    /// Per-attempt timeout for live detection frames.
    pub live_timeout_ms: u64,
}

impl DetectConfig {
    /// Candidate base addresses in attempt order, empties dropped,
    /// trailing slashes trimmed so path joins stay predictable.
    pub fn candidate_urls(&self) -> Vec<String> {
        std::iter::once(self.base_url.as_str())
            .chain(self.fallback_urls.iter().map(String::as_str))
            .map(|url| url.trim().trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .map(String::from)
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub detect: DetectConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "foodprint".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "foodprint-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: std::env::var("JWT_REFRESH_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };
        let detect = DetectConfig {
            base_url: std::env::var("DETECT_BASE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8000".into()),
            fallback_urls: std::env::var("DETECT_FALLBACK_URLS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
            timeout_ms: std::env::var("DETECT_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(10_000),
            live_timeout_ms: std::env::var("DETECT_LIVE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5_000),
        };
        Ok(Self {
            database_url,
            jwt,
            detect,
        })
    }
}
