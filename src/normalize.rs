//! Raw GeoJSON feature to [`Quake`].

use serde::Serialize;
use serde_json::Value;

use crate::feeds::BucketKey;
use crate::parser::epoch_millis;

/// A normalized earthquake event.
///
/// Fields missing from the source feature are carried as defaults rather
/// than rejected: empty strings, `None`, or `NaN` for numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quake {
    pub id: String,
    pub magnitude: f64,
    pub title: String,
    /// Epoch milliseconds. Formatted only when presented.
    pub occurred_at: Option<i64>,
    /// 0 to 1000.
    pub significance: Option<i64>,
    pub detail_url: String,
    pub latitude: f64,
    pub longitude: f64,
    pub bucket: BucketKey,
}

impl Quake {
    pub fn has_magnitude(&self) -> bool {
        !self.magnitude.is_nan()
    }

    /// Whether the quake can be placed on a map.
    pub fn is_placeable(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// Builds a [`Quake`] from one feed feature. Never fails.
///
/// GeoJSON coordinates are `[longitude, latitude, depth]`; they are
/// swapped into latitude/longitude here.
pub fn normalize(feature: &Value, bucket: BucketKey) -> Quake {
    let props = &feature["properties"];
    let coords = &feature["geometry"]["coordinates"];

    Quake {
        id: text(&feature["id"]),
        magnitude: number(&props["mag"]),
        title: text(&props["title"]),
        occurred_at: epoch_millis(&props["time"]),
        significance: significance(&props["sig"]),
        detail_url: text(&props["detail"]),
        latitude: number(&coords[1]),
        longitude: number(&coords[0]),
        bucket,
    }
}

/// Normalizes every feature of one response into `bucket`.
pub fn normalize_all(features: &[Value], bucket: BucketKey) -> Vec<Quake> {
    features.iter().map(|f| normalize(f, bucket)).collect()
}

/// `sig` is an integer score. A float is rounded to the nearest one, and
/// values beyond `i64` saturate.
fn significance(v: &Value) -> Option<i64> {
    v.as_i64().or_else(|| v.as_f64().map(|f| f.round() as i64))
}

fn text(v: &Value) -> String {
    v.as_str().unwrap_or_default().to_string()
}

fn number(v: &Value) -> f64 {
    v.as_f64().unwrap_or(f64::NAN)
}
