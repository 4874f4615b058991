//! Feed sources: which remote GeoJSON feed fills which time-window bucket.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Base path of the USGS summary feeds.
pub const USGS_SUMMARY_BASE: &str = "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary";

/// Tectonic plate boundaries (PB2002), loaded once per run.
pub const PLATE_BOUNDARIES_URL: &str =
    "https://raw.githubusercontent.com/fraxen/tectonicplates/master/GeoJSON/PB2002_boundaries.json";

/// A named time window. Each one owns exactly one map layer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BucketKey {
    PastHour,
    PastDay,
    PastWeek,
    PastMonth,
}

impl BucketKey {
    /// All buckets, in legend order.
    pub const ALL: [BucketKey; 4] = [
        BucketKey::PastHour,
        BucketKey::PastDay,
        BucketKey::PastWeek,
        BucketKey::PastMonth,
    ];

    /// Wire name, as used in config files and the ledger CSV.
    pub fn as_str(&self) -> &'static str {
        match self {
            BucketKey::PastHour => "PAST_HOUR",
            BucketKey::PastDay => "PAST_DAY",
            BucketKey::PastWeek => "PAST_WEEK",
            BucketKey::PastMonth => "PAST_MONTH",
        }
    }

    /// Label shown in the layer control.
    pub fn layer_label(&self) -> &'static str {
        match self {
            BucketKey::PastHour => "Past Hour",
            BucketKey::PastDay => "Past Day",
            BucketKey::PastWeek => "Past Week",
            BucketKey::PastMonth => "Past Month",
        }
    }

    /// Label used on the legend count lines.
    pub fn legend_label(&self) -> &'static str {
        match self {
            BucketKey::PastHour => "Past hour",
            BucketKey::PastDay => "Past day",
            BucketKey::PastWeek => "Past week",
            BucketKey::PastMonth => "Past month",
        }
    }

    /// Accepts the wire name or the CLI spelling, in any case:
    /// `PAST_HOUR`, `past_hour` and `past-hour` are all the same bucket.
    pub fn parse(name: &str) -> Option<BucketKey> {
        let name = name.replace('-', "_");
        BucketKey::ALL
            .into_iter()
            .find(|b| b.as_str().eq_ignore_ascii_case(&name))
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One remote feed and the bucket its quakes land in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedSource {
    pub bucket: BucketKey,
    pub url: String,
}

impl FeedSource {
    pub fn new(bucket: BucketKey, url: impl Into<String>) -> Self {
        Self {
            bucket,
            url: url.into(),
        }
    }

    /// Default USGS feed for `bucket`. The hourly window only carries
    /// significant events; the others carry everything.
    pub fn usgs(bucket: BucketKey) -> Self {
        let file = match bucket {
            BucketKey::PastHour => "significant_hour.geojson",
            BucketKey::PastDay => "all_day.geojson",
            BucketKey::PastWeek => "all_week.geojson",
            BucketKey::PastMonth => "all_month.geojson",
        };
        Self::new(bucket, format!("{USGS_SUMMARY_BASE}/{file}"))
    }
}

/// The four USGS feeds, one per bucket.
pub fn default_sources() -> Vec<FeedSource> {
    BucketKey::ALL.into_iter().map(FeedSource::usgs).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sources_cover_every_bucket_once() {
        let sources = default_sources();
        assert_eq!(sources.len(), 4);
        for bucket in BucketKey::ALL {
            assert_eq!(sources.iter().filter(|s| s.bucket == bucket).count(), 1);
        }
    }

    #[test]
    fn test_hour_feed_is_significant_only() {
        let src = FeedSource::usgs(BucketKey::PastHour);
        assert!(src.url.ends_with("/significant_hour.geojson"));
        assert!(FeedSource::usgs(BucketKey::PastMonth).url.ends_with("/all_month.geojson"));
    }

    #[test]
    fn test_parse_bucket_names() {
        assert_eq!(BucketKey::parse("PAST_WEEK"), Some(BucketKey::PastWeek));
        assert_eq!(BucketKey::parse("past_day"), Some(BucketKey::PastDay));
        assert_eq!(BucketKey::parse("PAST_YEAR"), None);
    }

    #[test]
    fn test_parse_cli_spelling() {
        assert_eq!(BucketKey::parse("past-hour"), Some(BucketKey::PastHour));
        assert_eq!(BucketKey::parse("Past-Month"), Some(BucketKey::PastMonth));
        assert_eq!(
            BucketKey::from_str("past-week", false),
            Ok(BucketKey::PastWeek)
        );
    }

    #[test]
    fn test_bucket_serializes_screaming_snake() {
        let json = serde_json::to_string(&BucketKey::PastMonth).unwrap();
        assert_eq!(json, "\"PAST_MONTH\"");
    }
}
