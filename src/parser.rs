//! GeoJSON parser for earthquake and plate-boundary feeds.
//!
//! Only the envelope is decoded strictly. Individual features stay as raw
//! [`serde_json::Value`]s so a malformed one can be normalized with
//! defaults instead of failing the whole response.

use anyhow::Result;
use serde::Deserialize;
use serde_json::Value;

/// A decoded earthquake feed response.
#[derive(Debug, Clone, Default)]
pub struct QuakeFeed {
    /// `metadata.generated`, epoch milliseconds.
    pub generated_at: Option<i64>,
    pub features: Vec<Value>,
}

/// One tectonic plate boundary line.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateBoundary {
    pub geometry: Value,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    metadata: Value,
    #[serde(default)]
    features: Vec<Value>,
}

/// Decodes an earthquake feed body.
///
/// # Errors
///
/// Returns an error if the body is not a JSON object whose `features`
/// (when present) is an array.
pub fn parse_feed(bytes: &[u8]) -> Result<QuakeFeed> {
    let envelope: Envelope = serde_json::from_slice(bytes)?;
    Ok(QuakeFeed {
        generated_at: epoch_millis(&envelope.metadata["generated"]),
        features: envelope.features,
    })
}

/// Decodes a plate-boundary feature collection, keeping only geometries.
pub fn parse_plates(bytes: &[u8]) -> Result<Vec<PlateBoundary>> {
    let envelope: Envelope = serde_json::from_slice(bytes)?;
    Ok(envelope
        .features
        .into_iter()
        .filter_map(|mut f| match f.get_mut("geometry").map(Value::take) {
            Some(Value::Null) | None => None,
            Some(geometry) => Some(PlateBoundary { geometry }),
        })
        .collect())
}

/// Reads an epoch-millisecond timestamp that may have been written as a
/// float.
pub(crate) fn epoch_millis(v: &Value) -> Option<i64> {
    v.as_i64().or_else(|| v.as_f64().map(|f| f as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_feed_reads_generated_and_features() {
        let body = br#"{"metadata":{"generated":1700000000000},"features":[{"id":"a"},{"id":"b"}]}"#;
        let feed = parse_feed(body).unwrap();
        assert_eq!(feed.generated_at, Some(1_700_000_000_000));
        assert_eq!(feed.features.len(), 2);
    }

    #[test]
    fn test_parse_feed_without_metadata() {
        let feed = parse_feed(br#"{"features":[]}"#).unwrap();
        assert_eq!(feed.generated_at, None);
        assert!(feed.features.is_empty());
    }

    #[test]
    fn test_parse_feed_keeps_malformed_features() {
        let body = br#"{"features":[42, "junk", {"properties":null}]}"#;
        let feed = parse_feed(body).unwrap();
        assert_eq!(feed.features.len(), 3);
    }

    #[test]
    fn test_parse_invalid_bytes() {
        assert!(parse_feed(b"<html>503</html>").is_err());
        assert!(parse_feed(br#"{"features":{}}"#).is_err());
    }

    #[test]
    fn test_parse_plates_drops_missing_geometry() {
        let body = br#"{"type":"FeatureCollection","features":[
            {"geometry":{"type":"LineString","coordinates":[[0,0],[1,1]]}},
            {"geometry":null},
            {"properties":{}}
        ]}"#;
        let plates = parse_plates(body).unwrap();
        assert_eq!(plates.len(), 1);
        assert_eq!(plates[0].geometry["type"], "LineString");
    }
}
