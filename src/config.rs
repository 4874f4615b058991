use anyhow::{Context, Result, anyhow};
use std::collections::HashMap;

use crate::feeds::{BucketKey, FeedSource, default_sources};

/// Env var holding the tile provider credential.
pub const ACCESS_TOKEN_ENV: &str = "MAPBOX_ACCESS_TOKEN";

/// Per-bucket feed URL overrides.
///
/// Stored as a plain JSON object on disk:
/// ```json
/// {
///   "PAST_HOUR": "https://mirror.example/significant_hour.geojson",
///   "PAST_MONTH": "https://mirror.example/all_month.geojson"
/// }
/// ```
/// Buckets not named keep their USGS default.
#[derive(Debug, Default)]
pub struct FeedConfig {
    overrides: HashMap<BucketKey, String>,
}

impl FeedConfig {
    /// Loads the overrides from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading feed config from {path}"))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let raw: HashMap<String, String> = serde_json::from_str(content)?;
        let overrides = raw
            .into_iter()
            .map(|(name, url)| {
                BucketKey::parse(&name)
                    .map(|b| (b, url))
                    .ok_or_else(|| anyhow!("unknown bucket '{name}' in feed config"))
            })
            .collect::<Result<_>>()?;
        Ok(Self { overrides })
    }

    /// Returns the override for `bucket`, if one is configured.
    pub fn get_url(&self, bucket: BucketKey) -> Option<&str> {
        self.overrides.get(&bucket).map(String::as_str)
    }

    /// Default sources with overrides applied, in bucket order.
    pub fn sources(&self) -> Vec<FeedSource> {
        default_sources()
            .into_iter()
            .map(|src| match self.get_url(src.bucket) {
                Some(url) => FeedSource::new(src.bucket, url),
                None => src,
            })
            .collect()
    }
}

/// Reads the tile access token from the environment.
pub fn access_token() -> Result<String> {
    std::env::var(ACCESS_TOKEN_ENV).with_context(|| format!("{ACCESS_TOKEN_ENV} must be set"))
}
