#![allow(dead_code)]

use async_trait::async_trait;
use quake_map::feeds::BucketKey;
use quake_map::fetch::HttpClient;
use quake_map::ledger::LedgerSnapshot;
use quake_map::normalize::Quake;
use quake_map::parser::PlateBoundary;
use quake_map::surface::MapSurface;
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::Duration;

/// Canned response for one URL.
#[derive(Clone)]
pub struct Route {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

/// In-memory [`HttpClient`]. Unknown URLs answer 404.
#[derive(Default)]
pub struct FakeClient {
    routes: HashMap<String, Route>,
    pub requests: Mutex<Vec<String>>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, url: &str, status: u16, body: impl Into<String>, delay_ms: u64) -> Self {
        self.routes.insert(
            url.to_string(),
            Route {
                status,
                body: body.into(),
                delay: Duration::from_millis(delay_ms),
            },
        );
        self
    }

    pub fn ok(self, url: &str, body: impl Into<String>) -> Self {
        self.route(url, 200, body, 0)
    }
}

#[async_trait]
impl HttpClient for FakeClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let url = req.url().to_string();
        self.requests.lock().unwrap().push(url.clone());

        let route = self.routes.get(&url).cloned().unwrap_or(Route {
            status: 404,
            body: "not found".to_string(),
            delay: Duration::ZERO,
        });
        if !route.delay.is_zero() {
            tokio::time::sleep(route.delay).await;
        }

        let resp = http::Response::builder()
            .status(route.status)
            .body(route.body)
            .unwrap();
        Ok(reqwest::Response::from(resp))
    }
}

/// [`MapSurface`] that records every call.
#[derive(Default)]
pub struct RecordingSurface {
    pub layers: BTreeMap<BucketKey, Vec<Quake>>,
    pub legends: Vec<LedgerSnapshot>,
    pub layer_updates: Vec<BucketKey>,
    pub plates: usize,
}

impl MapSurface for RecordingSurface {
    fn replace_layer(&mut self, bucket: BucketKey, quakes: &[Quake]) {
        self.layer_updates.push(bucket);
        self.layers.insert(bucket, quakes.to_vec());
    }

    fn update_legend(&mut self, snapshot: &LedgerSnapshot) {
        self.legends.push(snapshot.clone());
    }

    fn set_plate_boundaries(&mut self, plates: &[PlateBoundary]) {
        self.plates = plates.len();
    }
}

/// A feed body with `count` placeable quakes of increasing magnitude.
pub fn feed_body(count: usize, generated: i64) -> String {
    let features: Vec<_> = (0..count)
        .map(|i| {
            json!({
                "type": "Feature",
                "id": format!("q{i}"),
                "properties": {
                    "mag": i as f64 * 0.9,
                    "title": format!("M {:.1} - somewhere", i as f64 * 0.9),
                    "time": generated - 1000 * i as i64,
                    "sig": 10 * i,
                    "detail": format!("https://example.test/q{i}")
                },
                "geometry": { "type": "Point", "coordinates": [10.0 + i as f64, -5.0, 1.0] }
            })
        })
        .collect();

    json!({ "metadata": { "generated": generated }, "features": features }).to_string()
}

pub fn url(bucket: BucketKey) -> String {
    format!("http://feeds.test/{}.geojson", bucket.as_str().to_lowercase())
}
