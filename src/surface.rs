//! Rendering surfaces the pipeline draws onto.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::feeds::BucketKey;
use crate::ledger::LedgerSnapshot;
use crate::legend::{Legend, LegendPresenter};
use crate::normalize::Quake;
use crate::parser::PlateBoundary;
use crate::present::Marker;

/// A map widget with one overlay layer per bucket, a plate layer and a
/// legend.
pub trait MapSurface {
    /// Swaps the rendered markers of `bucket` for `quakes`.
    fn replace_layer(&mut self, bucket: BucketKey, quakes: &[Quake]);

    /// Re-renders the legend from the latest snapshot of every bucket.
    fn update_legend(&mut self, snapshot: &LedgerSnapshot);

    fn set_plate_boundaries(&mut self, plates: &[PlateBoundary]);
}

/// Tile provider settings for [`LeafletPage`].
#[derive(Debug, Clone)]
pub struct TileConfig {
    pub access_token: String,
    pub style: String,
    pub max_zoom: u8,
}

impl TileConfig {
    pub fn mapbox_satellite(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            style: "mapbox/satellite-streets-v10".to_string(),
            max_zoom: 18,
        }
    }

    fn url_template(&self) -> String {
        format!(
            "https://api.mapbox.com/styles/v1/{}/tiles/256/{{z}}/{{x}}/{{y}}?access_token={{accessToken}}",
            self.style
        )
    }
}

#[derive(Serialize)]
struct PageLayer<'a> {
    key: BucketKey,
    label: &'static str,
    markers: &'a [Marker],
}

#[derive(Serialize)]
struct PageData<'a> {
    tile_url: String,
    access_token: &'a str,
    max_zoom: u8,
    layers: Vec<PageLayer<'a>>,
    plates: Vec<&'a serde_json::Value>,
    legend_html: String,
}

/// Standalone Leaflet page. Holds the current state of every layer and
/// renders it to one HTML document.
pub struct LeafletPage {
    tiles: TileConfig,
    layers: BTreeMap<BucketKey, Vec<Marker>>,
    plates: Vec<PlateBoundary>,
    legend: Legend,
}

impl LeafletPage {
    pub fn new(tiles: TileConfig) -> Self {
        Self {
            tiles,
            layers: BucketKey::ALL.into_iter().map(|b| (b, Vec::new())).collect(),
            plates: Vec::new(),
            legend: LegendPresenter::present(&LedgerSnapshot::new()),
        }
    }

    pub fn markers(&self, bucket: BucketKey) -> &[Marker] {
        self.layers.get(&bucket).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn legend(&self) -> &Legend {
        &self.legend
    }

    pub fn plate_count(&self) -> usize {
        self.plates.len()
    }

    pub fn render_html(&self) -> anyhow::Result<String> {
        let data = PageData {
            tile_url: self.tiles.url_template(),
            access_token: &self.tiles.access_token,
            max_zoom: self.tiles.max_zoom,
            layers: self
                .layers
                .iter()
                .map(|(key, markers)| PageLayer {
                    key: *key,
                    label: key.layer_label(),
                    markers,
                })
                .collect(),
            plates: self.plates.iter().map(|p| &p.geometry).collect(),
            legend_html: self.legend.to_html(),
        };
        // `</` would close the script element early.
        let json = serde_json::to_string(&data)?.replace("</", "<\\/");
        Ok(PAGE_TEMPLATE.replace("__PAGE_DATA__", &json))
    }
}

impl MapSurface for LeafletPage {
    fn replace_layer(&mut self, bucket: BucketKey, quakes: &[Quake]) {
        let markers: Vec<Marker> = quakes.iter().filter_map(Marker::for_quake).collect();
        let skipped = quakes.len() - markers.len();
        if skipped > 0 {
            debug!(%bucket, skipped, "Quakes without coordinates left off the map");
        }
        self.layers.insert(bucket, markers);
    }

    fn update_legend(&mut self, snapshot: &LedgerSnapshot) {
        self.legend = LegendPresenter::present(snapshot);
    }

    fn set_plate_boundaries(&mut self, plates: &[PlateBoundary]) {
        self.plates = plates.to_vec();
    }
}

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Earthquakes</title>
<meta name="viewport" content="width=device-width, initial-scale=1">
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
<style>
  html, body, #map-id { height: 100%; margin: 0; }
  .legend { background: #fff; padding: 6px 10px; border-radius: 4px; font: 13px sans-serif; }
  .legend p { margin: 2px 0; }
</style>
</head>
<body>
<div id="map-id"></div>
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<script>
const data = __PAGE_DATA__;

const tiles = L.tileLayer(data.tile_url, {
  attribution: "Map data &copy; <a href=\"http://openstreetmap.org\">OpenStreetMap</a> contributors, <a href=\"http://creativecommons.org/licenses/by-sa/2.0/\">CC-BY-SA</a>, Imagery &copy; <a href=\"http://mapbox.com\">Mapbox</a>",
  maxZoom: data.max_zoom,
  accessToken: data.access_token
});

const overlays = {};
const groups = data.layers.map(layer => {
  const group = L.layerGroup();
  layer.markers.forEach(m => {
    L.circleMarker([m.lat, m.lng], {
      radius: Math.max(m.radius || 0, 0),
      fillColor: m.color,
      color: m.color,
      weight: 1,
      opacity: 1,
      fillOpacity: 0.8
    }).bindPopup(m.popup).addTo(group);
  });
  overlays[layer.label] = group;
  return group;
});

const map = L.map("map-id", { center: [40.73, -74.0059], zoom: 2, layers: groups });
tiles.addTo(map);
L.control.layers(null, overlays).addTo(map);

const plates = L.geoJSON(null, { style: { weight: 1.5, opacity: 0.4 } }).addTo(map);
data.plates.forEach(g => plates.addData(g));

const legend = L.control({ position: "bottomright" });
legend.onAdd = function () {
  const div = L.DomUtil.create("div", "legend");
  div.innerHTML = data.legend_html;
  return div;
};
legend.addTo(map);
</script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::AggregationLedger;
    use crate::normalize::normalize;
    use serde_json::json;

    fn quake(mag: f64, coords: serde_json::Value, bucket: BucketKey) -> Quake {
        normalize(
            &json!({"properties": {"mag": mag, "title": "t"}, "geometry": {"coordinates": coords}}),
            bucket,
        )
    }

    #[test]
    fn test_replace_layer_swaps_markers() {
        let mut page = LeafletPage::new(TileConfig::mapbox_satellite("tok"));
        page.replace_layer(
            BucketKey::PastDay,
            &[quake(1.0, json!([0.0, 0.0]), BucketKey::PastDay)],
        );
        page.replace_layer(
            BucketKey::PastDay,
            &[
                quake(2.0, json!([1.0, 1.0]), BucketKey::PastDay),
                quake(3.0, json!([2.0, 2.0]), BucketKey::PastDay),
            ],
        );
        assert_eq!(page.markers(BucketKey::PastDay).len(), 2);
        assert!(page.markers(BucketKey::PastHour).is_empty());
    }

    #[test]
    fn test_replace_layer_leaves_out_unplaceable() {
        let mut page = LeafletPage::new(TileConfig::mapbox_satellite("tok"));
        page.replace_layer(
            BucketKey::PastWeek,
            &[
                quake(1.0, json!(null), BucketKey::PastWeek),
                quake(1.0, json!([5.0, 6.0]), BucketKey::PastWeek),
            ],
        );
        assert_eq!(page.markers(BucketKey::PastWeek).len(), 1);
    }

    #[test]
    fn test_render_html_embeds_layers_legend_and_token() {
        let mut page = LeafletPage::new(TileConfig::mapbox_satellite("pk.secret"));
        let mut ledger = AggregationLedger::new();
        ledger.record(BucketKey::PastMonth, 1, Some(0));
        page.replace_layer(
            BucketKey::PastMonth,
            &[quake(5.5, json!([-74.0, 40.7]), BucketKey::PastMonth)],
        );
        page.update_legend(&ledger.snapshot());
        page.set_plate_boundaries(&[PlateBoundary {
            geometry: json!({"type": "LineString", "coordinates": [[0, 0], [1, 1]]}),
        }]);

        let html = page.render_html().unwrap();
        assert!(html.contains("pk.secret"));
        assert!(html.contains("satellite-streets-v10"));
        assert!(html.contains("Past Month"));
        assert!(html.contains("#fb0d1b"));
        assert!(html.contains("Past month: 1"));
        assert!(html.contains("LineString"));
        assert!(!html.contains("__PAGE_DATA__"));
        assert_eq!(page.plate_count(), 1);
    }

    #[test]
    fn test_render_html_does_not_close_script_early() {
        let mut page = LeafletPage::new(TileConfig::mapbox_satellite("tok"));
        page.replace_layer(
            BucketKey::PastHour,
            &[quake(2.0, json!([0.0, 0.0]), BucketKey::PastHour)],
        );
        let html = page.render_html().unwrap();
        assert_eq!(html.matches("</script>").count(), 2);
    }
}
