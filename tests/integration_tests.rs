mod common;

use common::FakeClient;
use quake_map::classify::MagnitudeClass;
use quake_map::feeds::{BucketKey, FeedSource};
use quake_map::normalize::normalize_all;
use quake_map::orchestrator::{FeedOrchestrator, MapState};
use quake_map::parser::parse_feed;
use quake_map::stats::QuakeStats;
use quake_map::surface::{LeafletPage, MapSurface, TileConfig};

const SAMPLE: &str = include_str!("fixtures/sample_all_day.geojson");

#[test]
fn test_full_pipeline() {
    let feed = parse_feed(SAMPLE.as_bytes()).expect("Failed to parse feed");
    let quakes = normalize_all(&feed.features, BucketKey::PastDay);
    let stats = QuakeStats::from_quakes(&quakes);

    assert_eq!(feed.generated_at, Some(1_760_820_000_000));
    assert_eq!(stats.total, 5);
    assert_eq!(stats.class_count(MagnitudeClass::Class0), 2);
    assert_eq!(stats.class_count(MagnitudeClass::Class2), 1);
    // 5.3 and the quake with no magnitude
    assert_eq!(stats.class_count(MagnitudeClass::Class5), 2);
    assert_eq!(stats.missing_magnitude, 1);
    assert_eq!(stats.unplaceable, 1);
    assert_eq!(stats.max_magnitude, Some(5.3));

    let geysers = &quakes[0];
    assert_eq!(geysers.latitude, 38.8195);
    assert_eq!(geysers.longitude, -122.8153333);
}

#[tokio::test]
async fn test_fixture_feed_renders_page() {
    let url = "http://feeds.test/all_day.geojson";
    let orchestrator = FeedOrchestrator::new(FakeClient::new().ok(url, SAMPLE));
    let mut state = MapState::new();
    let mut page = LeafletPage::new(TileConfig::mapbox_satellite("pk.test"));

    let report = orchestrator
        .run(&[FeedSource::new(BucketKey::PastDay, url)], &mut state, &mut page)
        .await;
    assert_eq!(report.processed(), 1);

    // All five count towards the legend; only four can be drawn.
    assert_eq!(state.ledger.get(BucketKey::PastDay).count, 5);
    assert_eq!(state.registry.len(BucketKey::PastDay), 5);
    assert_eq!(page.markers(BucketKey::PastDay).len(), 4);
    assert!(page.legend().lines().contains(&"Past day: 5".to_string()));
    assert_eq!(page.legend().updated, "Sat, 18 Oct 2025 20:40:00 GMT");

    let negative = page
        .markers(BucketKey::PastDay)
        .iter()
        .find(|m| m.radius < 0.0)
        .expect("negative magnitude marker kept");
    assert_eq!(negative.color, "#ddf57e");

    page.set_plate_boundaries(&[]);
    let html = page.render_html().unwrap();
    assert!(html.contains("Kermadec Islands region"));
    assert!(html.contains("432/1000"));
}
