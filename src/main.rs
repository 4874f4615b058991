//! CLI entry point for the earthquake map.
//!
//! Provides subcommands for rendering the map page from the live feeds,
//! listing the configured feeds, inspecting a single feed body, and
//! classifying a magnitude.

use anyhow::Result;
use clap::{Parser, Subcommand};
use quake_map::{
    classify::{classify, marker_radius},
    config::{FeedConfig, access_token},
    feeds::{BucketKey, PLATE_BOUNDARIES_URL},
    fetch::{BasicClient, fetch_bytes},
    normalize::normalize_all,
    orchestrator::{FeedOrchestrator, FeedState, MapState},
    output::{append_snapshot, print_json},
    parser::parse_feed,
    publish::{publish_page, write_json_to_s3},
    stats::QuakeStats,
    surface::{LeafletPage, MapSurface, TileConfig},
};
use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "quake_map")]
#[command(about = "Render recent earthquakes and plate boundaries on a map", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch all feeds once and write the map page
    Render {
        /// HTML file to write
        #[arg(short, long, default_value = "map.html")]
        output: String,

        /// JSON file with per-bucket feed URL overrides
        #[arg(short, long)]
        feeds: Option<String>,

        /// Maximum number of concurrent feed downloads (0 = all at once)
        #[arg(short, long, default_value_t = 0)]
        concurrency: usize,

        /// HTTP timeout per request, in seconds
        #[arg(short, long, default_value_t = 30)]
        timeout: u64,

        /// Optional: CSV file to append the ledger snapshot to
        #[arg(long)]
        history: Option<String>,

        /// Optional: S3 bucket name to upload the page and ledger to
        #[arg(long)]
        s3_bucket: Option<String>,

        /// Optional: Gzip compress the page before uploading to S3
        #[arg(long, default_value_t = false)]
        gzip: bool,

        /// Skip loading tectonic plate boundaries
        #[arg(long, default_value_t = false)]
        no_plates: bool,
    },
    /// List the configured feed sources
    ListFeeds {
        /// JSON file with per-bucket feed URL overrides
        #[arg(short, long)]
        feeds: Option<String>,
    },
    /// Summarize one feed from a file or URL
    Inspect {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Bucket to normalize the quakes into
        #[arg(short, long, value_enum, default_value_t = BucketKey::PastDay)]
        bucket: BucketKey,
    },
    /// Show the class, colour and radius for a magnitude
    Classify {
        #[arg(allow_negative_numbers = true)]
        magnitude: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/quake_map.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("quake_map.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            output,
            feeds,
            concurrency,
            timeout,
            history,
            s3_bucket,
            gzip,
            no_plates,
        } => {
            render(RenderArgs {
                output,
                feeds,
                concurrency,
                timeout,
                history,
                s3_bucket,
                gzip,
                no_plates,
            })
            .await?;
        }
        Commands::ListFeeds { feeds } => {
            let config = load_feed_config(feeds.as_deref())?;
            for source in config.sources() {
                let overridden = config.get_url(source.bucket).is_some();
                info!(bucket = %source.bucket, url = %source.url, overridden, "Feed");
            }
            info!(plates = PLATE_BOUNDARIES_URL, "Plate boundaries");
        }
        Commands::Inspect { source, bucket } => {
            let bytes = fetcher(&source).await?;
            let feed = parse_feed(&bytes)?;
            let quakes = normalize_all(&feed.features, bucket);
            let stats = QuakeStats::from_quakes(&quakes);

            info!(
                %bucket,
                generated_at = ?feed.generated_at,
                total = stats.total,
                missing_magnitude = stats.missing_magnitude,
                unplaceable = stats.unplaceable,
                max_magnitude = ?stats.max_magnitude,
                strong_pct = stats.strong_pct(),
                "Feed summary"
            );
            for (class, count) in quake_map::classify::MagnitudeClass::ALL
                .iter()
                .zip(stats.by_class)
            {
                info!(class = ?class, color = class.color(), count, "Magnitude class");
            }
        }
        Commands::Classify { magnitude } => {
            let class = classify(magnitude);
            info!(
                magnitude,
                class = ?class,
                color = class.color(),
                radius = marker_radius(magnitude),
                "Classified"
            );
        }
    }

    Ok(())
}

struct RenderArgs {
    output: String,
    feeds: Option<String>,
    concurrency: usize,
    timeout: u64,
    history: Option<String>,
    s3_bucket: Option<String>,
    gzip: bool,
    no_plates: bool,
}

fn load_feed_config(path: Option<&str>) -> Result<FeedConfig> {
    match path {
        Some(p) => FeedConfig::load(p),
        None => Ok(FeedConfig::default()),
    }
}

/// Loads feed data from a local file path or fetches it over HTTP.
#[tracing::instrument(fields(source = %url))]
async fn fetcher(url: &str) -> Result<Vec<u8>> {
    let bytes = if url.starts_with("http") {
        let client = BasicClient::new();
        fetch_bytes(&client, url).await?.to_vec()
    } else {
        std::fs::read(url)?
    };
    Ok(bytes)
}

/// Runs the whole pipeline once and writes the page.
#[tracing::instrument(skip_all, fields(output = %args.output))]
async fn render(args: RenderArgs) -> Result<()> {
    let token = access_token()?;
    let sources = load_feed_config(args.feeds.as_deref())?.sources();

    let mut orchestrator =
        FeedOrchestrator::new(BasicClient::with_timeout(Duration::from_secs(args.timeout))?);
    if args.concurrency > 0 {
        orchestrator = orchestrator.with_concurrency(args.concurrency);
    }

    let mut state = MapState::new();
    let mut page = LeafletPage::new(TileConfig::mapbox_satellite(token));

    let plates = async {
        if args.no_plates {
            None
        } else {
            Some(orchestrator.load_plates(PLATE_BOUNDARIES_URL).await)
        }
    };
    let (plates, report) = tokio::join!(plates, orchestrator.run(&sources, &mut state, &mut page));

    match plates {
        Some(Ok(plates)) => page.set_plate_boundaries(&plates),
        Some(Err(e)) => warn!(error = %e, "Plate boundaries unavailable"),
        None => {}
    }

    for (source, feed_state) in &report.feeds {
        if let FeedState::Failed { reason } = feed_state {
            warn!(bucket = %source.bucket, url = %source.url, %reason, "Feed failed");
        }
    }

    let html = page.render_html()?;
    if let Some(dir) = Path::new(&args.output).parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(&args.output, &html)?;
    info!(path = %args.output, legend = %page.legend(), "Map page written");

    let snapshot = state.ledger.snapshot();
    print_json(&snapshot)?;

    if let Some(path) = &args.history {
        append_snapshot(path, &snapshot)?;
    }

    if let Some(bucket) = &args.s3_bucket {
        let config = aws_config::load_from_env().await;
        let s3 = aws_sdk_s3::Client::new(&config);
        info!(bucket = %bucket, gzip = args.gzip, "S3 upload enabled");

        publish_page(&s3, bucket, &html, args.gzip).await?;
        write_json_to_s3(&s3, bucket, "ledger.json", &snapshot).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inspect_accepts_hyphenated_bucket() {
        let cli = Cli::try_parse_from(["quake_map", "inspect", "feed.json", "--bucket", "past-hour"])
            .unwrap();
        match cli.command {
            Commands::Inspect { source, bucket } => {
                assert_eq!(source, "feed.json");
                assert_eq!(bucket, BucketKey::PastHour);
            }
            _ => panic!("expected inspect"),
        }
    }

    #[test]
    fn test_inspect_bucket_defaults_to_past_day() {
        let cli = Cli::try_parse_from(["quake_map", "inspect", "feed.json"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Inspect { bucket: BucketKey::PastDay, .. }
        ));
    }

    #[test]
    fn test_inspect_rejects_unknown_bucket() {
        assert!(Cli::try_parse_from(["quake_map", "inspect", "f", "--bucket", "past-year"]).is_err());
    }
}
