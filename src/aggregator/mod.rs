//! Aggregator: one consumer task per event stream, one blocking scan.
//!
//! Flow of a run:
//! 1. build the ten bounded streams
//! 2. spawn a consumer for every stream (they must all listen before the scan)
//! 3. run the synchronous scan on a blocking thread
//! 4. barrier: wait for the scan and for every consumer to see its stream close
//! 5. unwrap the shared stats into a frozen `Stats` value
//!
//! A failed or cancelled scan discards whatever was aggregated.

pub mod apply;

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::{self, JoinSet};
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::AggregatorConfig;
use crate::error::AggregateError;
use crate::source::{event_channels, EventSource, EventStreams, StreamKind};
use crate::stats::{CollectionKind, Stats};
use crate::utils::utils_time::{current_time_ms, format_elapsed};
use apply::{apply_collection, apply_database, apply_string, drain, ApplyContext};

type SharedStats = Arc<Mutex<Stats>>;

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub stats: Stats,
    /// Malformed records skipped by the source or the consumers
    pub anomalies: u64,
    pub elapsed: Duration,
}

pub struct Aggregator {
    config: AggregatorConfig,
    now_ms: i64,
    cancel: CancellationToken,
}

impl Aggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        Self {
            config,
            now_ms: current_time_ms(),
            cancel: CancellationToken::new(),
        }
    }

    /// Reference time for expiry classification, in Unix milliseconds.
    pub fn with_now(mut self, now_ms: i64) -> Self {
        self.now_ms = now_ms;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub async fn run<S: EventSource>(self, mut source: S) -> Result<RunReport, AggregateError> {
        let started = Instant::now();
        let anomalies = Arc::new(AtomicU64::new(0));
        let (sink, streams) =
            event_channels(self.config.channel_capacity, self.cancel.clone(), anomalies.clone());

        let stats: SharedStats = Arc::new(Mutex::new(Stats::new()));
        let ctx = Arc::new(ApplyContext::new(self.now_ms, source.capabilities(), anomalies));

        let mut consumers = JoinSet::new();
        let ids = spawn_consumers(
            &mut consumers,
            streams,
            &stats,
            &ctx,
            self.config.progress_interval(),
        );
        info!("[Aggregator] {} consumers listening, starting scan", ids.len());

        let scan = task::spawn_blocking(move || {
            let result = source.parse(&sink);
            drop(sink);
            result
        });
        let scan_result = scan.await.map_err(|e| AggregateError::Scan(e.to_string()))?;

        // Completion barrier: every stream must have been drained to its close.
        let mut worker_failure = None;
        while let Some(joined) = consumers.join_next().await {
            match joined {
                Ok(stream) => debug!("[Aggregator] Consumer for '{}' finished", stream),
                Err(e) => {
                    let stream = ids.get(&e.id()).copied();
                    let name = stream.map_or("unknown", |s| s.name());
                    warn!("[Aggregator] Consumer for '{}' failed: {}", name, e);
                    worker_failure.get_or_insert(AggregateError::Worker {
                        stream,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if let Err(e) = scan_result {
            warn!("[Aggregator] Scan failed, discarding partial statistics: {}", e);
            return Err(e.into());
        }
        if let Some(failure) = worker_failure {
            return Err(failure);
        }

        let stats = Arc::try_unwrap(stats)
            .map_err(|_| AggregateError::SnapshotStillShared)?
            .into_inner();
        let elapsed = started.elapsed();
        let anomalies = ctx.anomalies();

        info!("[Aggregator] Parsing time: {}", format_elapsed(elapsed));
        if anomalies > 0 {
            warn!("[Aggregator] {} malformed records skipped", anomalies);
        }

        Ok(RunReport {
            stats,
            anomalies,
            elapsed,
        })
    }
}

fn spawn_consumers(
    set: &mut JoinSet<StreamKind>,
    streams: EventStreams,
    stats: &SharedStats,
    ctx: &Arc<ApplyContext>,
    progress_every: Duration,
) -> HashMap<task::Id, StreamKind> {
    let mut ids = HashMap::new();

    macro_rules! consumer {
        ($kind:expr, $rx:expr, $apply:expr) => {{
            let handle = set.spawn(consume(
                $kind,
                $rx,
                stats.clone(),
                ctx.clone(),
                progress_every,
                $apply,
            ));
            ids.insert(handle.id(), $kind);
        }};
    }

    consumer!(StreamKind::Db, streams.db, apply_database);
    consumer!(StreamKind::String, streams.string, apply_string);
    consumer!(StreamKind::ListMetadata, streams.list_metadata, |s, e, c| {
        apply_collection(CollectionKind::List, s, e, c)
    });
    consumer!(StreamKind::ListData, streams.list_data, drain);
    consumer!(StreamKind::SetMetadata, streams.set_metadata, |s, e, c| {
        apply_collection(CollectionKind::Set, s, e, c)
    });
    consumer!(StreamKind::SetData, streams.set_data, drain);
    consumer!(StreamKind::HashMetadata, streams.hash_metadata, |s, e, c| {
        apply_collection(CollectionKind::Hash, s, e, c)
    });
    consumer!(StreamKind::HashData, streams.hash_data, drain);
    consumer!(StreamKind::SortedSetMetadata, streams.sorted_set_metadata, |s, e, c| {
        apply_collection(CollectionKind::SortedSet, s, e, c)
    });
    consumer!(StreamKind::SortedSetEntries, streams.sorted_set_entries, drain);

    ids
}

/// Drain one stream until the source closes it, applying every event in order.
async fn consume<T, F>(
    stream: StreamKind,
    mut rx: mpsc::Receiver<T>,
    stats: SharedStats,
    ctx: Arc<ApplyContext>,
    progress_every: Duration,
    apply: F,
) -> StreamKind
where
    T: Send + 'static,
    F: Fn(&Mutex<Stats>, T, &ApplyContext) + Send + 'static,
{
    let mut ticker = time::interval(progress_every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker.tick().await; // Skip first immediate tick

    let mut seen: u64 = 0;
    loop {
        tokio::select! {
            maybe_event = rx.recv() => {
                match maybe_event {
                    Some(event) => {
                        seen += 1;
                        apply(&stats, event, &ctx);
                    }
                    None => break, // Source closed the stream
                }
            }
            _ = ticker.tick() => {
                info!("[Aggregator] {}: {} events so far", stream, seen);
            }
        }
    }

    debug!("[Aggregator] {}: drained {} events", stream, seen);
    stream
}
