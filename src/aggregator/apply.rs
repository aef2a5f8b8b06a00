//! Per-event update rules.
//!
//! Each function takes the coarse lock once per event. Element streams never
//! touch the stats: collections are counted at their metadata event.

use parking_lot::Mutex;
use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::source::{Capabilities, CollectionMetadata, DatabaseSelected, KeyInfo, StreamKind, StringObject};
use crate::stats::{classify_expiry, CollectionKind, Stats};

pub struct ApplyContext {
    pub now_ms: i64,
    pub capabilities: Capabilities,
    anomalies: Arc<AtomicU64>,
}

impl ApplyContext {
    pub fn new(now_ms: i64, capabilities: Capabilities, anomalies: Arc<AtomicU64>) -> Self {
        Self {
            now_ms,
            capabilities,
            anomalies,
        }
    }

    pub fn anomaly(&self, stream: StreamKind, reason: impl Display) {
        self.anomalies.fetch_add(1, Ordering::Relaxed);
        warn!("[Aggregator] {}: {}", stream, reason);
    }

    pub fn anomalies(&self) -> u64 {
        self.anomalies.load(Ordering::Relaxed)
    }
}

pub fn apply_database(stats: &Mutex<Stats>, event: DatabaseSelected, _ctx: &ApplyContext) {
    let mut stats = stats.lock();
    stats.record_database();
    debug!("[Aggregator] databases: {} (selected db {})", stats.database.count, event.index);
}

pub fn apply_string(stats: &Mutex<Stats>, event: StringObject, ctx: &ApplyContext) {
    check_key(&event.key, StreamKind::String, ctx);
    let class = classify_expiry(event.key.expiry_ms, ctx.now_ms);

    let fits = {
        let mut stats = stats.lock();
        stats.record_key(class);
        stats.record_string(event.value.len() as u64)
    };
    if !fits {
        ctx.anomaly(StreamKind::String, "string byte total saturated");
    }
}

pub fn apply_collection(
    kind: CollectionKind,
    stats: &Mutex<Stats>,
    event: CollectionMetadata,
    ctx: &ApplyContext,
) {
    let stream = StreamKind::metadata_of(kind);
    check_key(&event.key, stream, ctx);

    let byte_size = match (ctx.capabilities.tracks_bytes(kind), event.byte_size) {
        (true, Some(size)) => size,
        (true, None) => {
            ctx.anomaly(stream, "metadata without a byte size");
            0
        }
        (false, Some(_)) => {
            ctx.anomaly(stream, format_args!("byte size reported for untracked kind '{}'", kind));
            0
        }
        (false, None) => 0,
    };
    let class = classify_expiry(event.key.expiry_ms, ctx.now_ms);

    let fits = {
        let mut stats = stats.lock();
        stats.record_key(class);
        stats.record_collection(kind, byte_size)
    };
    if !fits {
        ctx.anomaly(stream, format_args!("{} byte total saturated while adding {} bytes", kind, byte_size));
    }
}

/// Element streams are drained only.
pub fn drain<T>(_stats: &Mutex<Stats>, _event: T, _ctx: &ApplyContext) {}

// An empty key is still a key: counted, but flagged.
fn check_key(key: &KeyInfo, stream: StreamKind, ctx: &ApplyContext) {
    if key.key.is_empty() {
        ctx.anomaly(stream, "event with an empty key");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_000_000;

    fn ctx(capabilities: Capabilities) -> ApplyContext {
        ApplyContext::new(NOW, capabilities, Arc::new(AtomicU64::new(0)))
    }

    fn meta(key: &str, expiry_ms: Option<i64>, byte_size: Option<u64>) -> CollectionMetadata {
        CollectionMetadata {
            key: KeyInfo::new(key.to_string(), expiry_ms),
            len: 3,
            byte_size,
        }
    }

    #[test]
    fn test_string_counts_key_and_bytes() {
        let stats = Mutex::new(Stats::new());
        let ctx = ctx(Capabilities::all());

        apply_string(
            &stats,
            StringObject { key: KeyInfo::new("a", Some(NOW - 1)), value: "hello".into() },
            &ctx,
        );
        apply_string(
            &stats,
            StringObject { key: KeyInfo::new("b", None), value: "xyz".into() },
            &ctx,
        );

        let stats = stats.into_inner();
        assert_eq!(stats.keys.count, 2);
        assert_eq!(stats.keys.expired, 1);
        assert_eq!(stats.strings.count, 2);
        assert_eq!(stats.strings.total_byte_size, 8);
    }

    #[test]
    fn test_collection_tracked_size() {
        let stats = Mutex::new(Stats::new());
        let ctx = ctx(Capabilities::all());

        apply_collection(CollectionKind::List, &stats, meta("l", Some(NOW + 5), Some(300)), &ctx);

        let stats = stats.into_inner();
        assert_eq!(stats.lists.count, 1);
        assert_eq!(stats.lists.total_byte_size, 300);
        assert_eq!(stats.keys.expiring, 1);
        assert_eq!(ctx.anomalies(), 0);
    }

    #[test]
    fn test_collection_untracked_size_is_ignored_and_flagged() {
        let stats = Mutex::new(Stats::new());
        let ctx = ctx(Capabilities::none());

        apply_collection(CollectionKind::Set, &stats, meta("s", None, Some(99)), &ctx);
        apply_collection(CollectionKind::Set, &stats, meta("t", None, None), &ctx);

        let stats = stats.into_inner();
        assert_eq!(stats.sets.count, 2);
        assert_eq!(stats.sets.total_byte_size, 0);
        assert_eq!(ctx.anomalies(), 1);
    }

    #[test]
    fn test_collection_missing_size_on_tracked_kind_is_flagged() {
        let stats = Mutex::new(Stats::new());
        let ctx = ctx(Capabilities::all());

        apply_collection(CollectionKind::Hash, &stats, meta("h", None, None), &ctx);

        assert_eq!(stats.into_inner().hashes.count, 1);
        assert_eq!(ctx.anomalies(), 1);
    }

    #[test]
    fn test_oversized_collection_saturates_and_is_flagged() {
        let stats = Mutex::new(Stats::new());
        let ctx = ctx(Capabilities::all());

        apply_collection(CollectionKind::List, &stats, meta("a", None, Some(u64::MAX - 1)), &ctx);
        apply_collection(CollectionKind::List, &stats, meta("b", None, Some(2)), &ctx);

        let stats = stats.into_inner();
        assert_eq!(stats.lists.count, 2);
        assert_eq!(stats.lists.total_byte_size, u64::MAX);
        assert_eq!(ctx.anomalies(), 1);
    }

    #[test]
    fn test_empty_key_is_counted_and_flagged() {
        let stats = Mutex::new(Stats::new());
        let ctx = ctx(Capabilities::all());

        apply_string(&stats, StringObject { key: KeyInfo::new("", None), value: "v".into() }, &ctx);

        assert_eq!(stats.into_inner().keys.count, 1);
        assert_eq!(ctx.anomalies(), 1);
    }
}
