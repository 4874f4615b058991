//! Drives the feed pipeline.
//!
//! Every [`FeedSource`] is fetched in its own task. A task only produces an
//! immutable [`FeedOutcome`]; the run loop is the single owner of
//! [`MapState`] and applies outcomes one at a time in completion order, so
//! no bucket is ever observed half-refreshed and no lock is needed.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Semaphore, mpsc};
use tracing::{Instrument, debug, error, info, warn};

use crate::feeds::FeedSource;
use crate::fetch::{HttpClient, fetch_bytes};
use crate::ledger::AggregationLedger;
use crate::legend::LegendPresenter;
use crate::normalize::{Quake, normalize_all};
use crate::parser::{PlateBoundary, parse_feed, parse_plates};
use crate::registry::LayerRegistry;
use crate::stats::QuakeStats;
use crate::surface::MapSurface;

/// Layers and ledger, owned by the caller and lent to each run.
#[derive(Debug, Clone, Default)]
pub struct MapState {
    pub registry: LayerRegistry,
    pub ledger: AggregationLedger,
}

impl MapState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Lifecycle of one source within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedState {
    Pending,
    Fetching,
    Processed { count: usize },
    Failed { reason: String },
}

impl FeedState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, FeedState::Processed { .. } | FeedState::Failed { .. })
    }
}

/// Terminal state of every source, in the order the sources were given.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub feeds: Vec<(FeedSource, FeedState)>,
}

impl RunReport {
    pub fn processed(&self) -> usize {
        self.feeds
            .iter()
            .filter(|(_, s)| matches!(s, FeedState::Processed { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.feeds
            .iter()
            .filter(|(_, s)| matches!(s, FeedState::Failed { .. }))
            .count()
    }
}

/// Result message of one feed task.
#[derive(Debug)]
enum FeedOutcome {
    Processed {
        index: usize,
        count: usize,
        generated_at: Option<i64>,
        quakes: Vec<Quake>,
    },
    Failed {
        index: usize,
        reason: String,
    },
}

pub struct FeedOrchestrator<C> {
    client: Arc<C>,
    concurrency: Option<usize>,
}

impl<C: HttpClient + 'static> FeedOrchestrator<C> {
    pub fn new(client: C) -> Self {
        Self {
            client: Arc::new(client),
            concurrency: None,
        }
    }

    /// Caps simultaneous fetches. Unset, every feed is fetched at once.
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = Some(limit.max(1));
        self
    }

    /// Fetches every source concurrently and applies each one to `state`
    /// and `surface` as it completes.
    ///
    /// A failed source leaves its bucket, ledger entry and layer exactly as
    /// they were. Failures are reported, never returned as errors.
    #[tracing::instrument(skip_all, fields(feeds = sources.len()))]
    pub async fn run<S: MapSurface>(
        &self,
        sources: &[FeedSource],
        state: &mut MapState,
        surface: &mut S,
    ) -> RunReport {
        let limit = self.concurrency.unwrap_or(sources.len()).max(1);
        let semaphore = Arc::new(Semaphore::new(limit));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut states = vec![FeedState::Pending; sources.len()];

        for (index, source) in sources.iter().enumerate() {
            let feed_span = tracing::info_span!(
                "process_feed",
                bucket = %source.bucket,
                url = %source.url,
            );

            tokio::spawn(
                fetch_feed(
                    self.client.clone(),
                    semaphore.clone(),
                    source.clone(),
                    index,
                    tx.clone(),
                )
                .instrument(feed_span),
            );
            states[index] = FeedState::Fetching;
        }
        drop(tx);

        while let Some(outcome) = rx.recv().await {
            match outcome {
                FeedOutcome::Processed {
                    index,
                    count,
                    generated_at,
                    quakes,
                } => {
                    let bucket = sources[index].bucket;
                    state.registry.replace(bucket, quakes);
                    state.ledger.record(bucket, count, generated_at);

                    surface.replace_layer(bucket, state.registry.get(bucket));
                    let snapshot = state.ledger.snapshot();
                    surface.update_legend(&snapshot);

                    info!(
                        %bucket,
                        count,
                        legend = %LegendPresenter::present(&snapshot),
                        "Bucket refreshed"
                    );
                    states[index] = FeedState::Processed { count };
                }
                FeedOutcome::Failed { index, reason } => {
                    warn!(bucket = %sources[index].bucket, %reason, "Bucket kept its previous data");
                    states[index] = FeedState::Failed { reason };
                }
            }
        }

        // A task that died without reporting back.
        for st in states.iter_mut().filter(|s| !s.is_terminal()) {
            *st = FeedState::Failed {
                reason: "feed task ended without a result".to_string(),
            };
        }

        let report = RunReport {
            feeds: sources.iter().cloned().zip(states).collect(),
        };
        info!(
            processed = report.processed(),
            failed = report.failed(),
            "Feed run finished"
        );
        report
    }

    /// Loads the plate boundary lines.
    #[tracing::instrument(skip(self))]
    pub async fn load_plates(&self, url: &str) -> anyhow::Result<Vec<PlateBoundary>> {
        let bytes = fetch_bytes(self.client.as_ref(), url).await?;
        let plates = parse_plates(&bytes)?;
        info!(count = plates.len(), "Plate boundaries loaded");
        Ok(plates)
    }
}

async fn fetch_feed<C: HttpClient>(
    client: Arc<C>,
    semaphore: Arc<Semaphore>,
    source: FeedSource,
    index: usize,
    tx: mpsc::UnboundedSender<FeedOutcome>,
) {
    let outcome = match process_feed(client.as_ref(), &semaphore, &source).await {
        Ok((count, generated_at, quakes)) => FeedOutcome::Processed {
            index,
            count,
            generated_at,
            quakes,
        },
        Err(e) => {
            error!(error = %e, "Feed fetch failed");
            FeedOutcome::Failed {
                index,
                reason: e.to_string(),
            }
        }
    };

    // The receiver only goes away if the run itself was dropped.
    let _ = tx.send(outcome);
}

async fn process_feed<C: HttpClient>(
    client: &C,
    semaphore: &Semaphore,
    source: &FeedSource,
) -> anyhow::Result<(usize, Option<i64>, Vec<Quake>)> {
    let _permit = semaphore.acquire().await?;

    let fetch_start = Instant::now();
    let bytes = fetch_bytes(client, &source.url).await?;
    let elapsed = fetch_start.elapsed();
    if elapsed.as_secs() > 15 {
        warn!(elapsed_secs = elapsed.as_secs(), "Feed fetch was slow");
    }
    debug!(bytes = bytes.len(), "Feed bytes received, parsing");

    let feed = parse_feed(&bytes)?;
    let quakes = normalize_all(&feed.features, source.bucket);

    let stats = QuakeStats::from_quakes(&quakes);
    debug!(
        total = stats.total,
        missing_magnitude = stats.missing_magnitude,
        unplaceable = stats.unplaceable,
        max_magnitude = ?stats.max_magnitude,
        "Feed normalized"
    );

    Ok((feed.features.len(), feed.generated_at, quakes))
}
