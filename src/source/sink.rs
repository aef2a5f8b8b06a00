//! Producer and consumer halves of the ten event streams.
//!
//! The sink is used from the scanning thread: every send blocks while its
//! stream is full, so a stream nobody drains stalls the whole scan.

use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::events::*;
use super::StreamKind;
use crate::error::SourceError;
use crate::stats::CollectionKind;

// ==========================================
// PRODUCER SIDE
// ==========================================

pub struct EventSink {
    db: mpsc::Sender<DatabaseSelected>,
    string: mpsc::Sender<StringObject>,
    list_metadata: mpsc::Sender<CollectionMetadata>,
    list_data: mpsc::Sender<Element>,
    set_metadata: mpsc::Sender<CollectionMetadata>,
    set_data: mpsc::Sender<Element>,
    hash_metadata: mpsc::Sender<CollectionMetadata>,
    hash_data: mpsc::Sender<HashEntry>,
    sorted_set_metadata: mpsc::Sender<CollectionMetadata>,
    sorted_set_entries: mpsc::Sender<SortedSetEntry>,
    cancel: CancellationToken,
    anomalies: Arc<AtomicU64>,
}

impl EventSink {
    pub fn database(&self, event: DatabaseSelected) -> Result<(), SourceError> {
        self.push(StreamKind::Db, &self.db, event)
    }

    pub fn string_object(&self, event: StringObject) -> Result<(), SourceError> {
        self.push(StreamKind::String, &self.string, event)
    }

    pub fn collection_metadata(
        &self,
        kind: CollectionKind,
        event: CollectionMetadata,
    ) -> Result<(), SourceError> {
        let tx = match kind {
            CollectionKind::List => &self.list_metadata,
            CollectionKind::Set => &self.set_metadata,
            CollectionKind::Hash => &self.hash_metadata,
            CollectionKind::SortedSet => &self.sorted_set_metadata,
        };
        self.push(StreamKind::metadata_of(kind), tx, event)
    }

    pub fn list_element(&self, event: Element) -> Result<(), SourceError> {
        self.push(StreamKind::ListData, &self.list_data, event)
    }

    pub fn set_member(&self, event: Element) -> Result<(), SourceError> {
        self.push(StreamKind::SetData, &self.set_data, event)
    }

    pub fn hash_entry(&self, event: HashEntry) -> Result<(), SourceError> {
        self.push(StreamKind::HashData, &self.hash_data, event)
    }

    pub fn sorted_set_entry(&self, event: SortedSetEntry) -> Result<(), SourceError> {
        self.push(StreamKind::SortedSetEntries, &self.sorted_set_entries, event)
    }

    /// Skip a record the source could not decode, without aborting the scan.
    pub fn report_anomaly(&self, reason: impl Display) {
        let total = self.anomalies.fetch_add(1, Ordering::Relaxed) + 1;
        warn!("[Source] Skipping malformed record ({} so far): {}", total, reason);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn push<T>(&self, stream: StreamKind, tx: &mpsc::Sender<T>, event: T) -> Result<(), SourceError> {
        if self.cancel.is_cancelled() {
            return Err(SourceError::Cancelled);
        }
        tx.blocking_send(event)
            .map_err(|_| SourceError::StreamClosed(stream))
    }
}

// ==========================================
// CONSUMER SIDE
// ==========================================

pub struct EventStreams {
    pub db: mpsc::Receiver<DatabaseSelected>,
    pub string: mpsc::Receiver<StringObject>,
    pub list_metadata: mpsc::Receiver<CollectionMetadata>,
    pub list_data: mpsc::Receiver<Element>,
    pub set_metadata: mpsc::Receiver<CollectionMetadata>,
    pub set_data: mpsc::Receiver<Element>,
    pub hash_metadata: mpsc::Receiver<CollectionMetadata>,
    pub hash_data: mpsc::Receiver<HashEntry>,
    pub sorted_set_metadata: mpsc::Receiver<CollectionMetadata>,
    pub sorted_set_entries: mpsc::Receiver<SortedSetEntry>,
}

/// Build the ten bounded streams. `capacity` is clamped to at least 1.
pub fn event_channels(
    capacity: usize,
    cancel: CancellationToken,
    anomalies: Arc<AtomicU64>,
) -> (EventSink, EventStreams) {
    let capacity = capacity.max(1);

    let (db_tx, db_rx) = mpsc::channel(capacity);
    let (string_tx, string_rx) = mpsc::channel(capacity);
    let (list_meta_tx, list_meta_rx) = mpsc::channel(capacity);
    let (list_data_tx, list_data_rx) = mpsc::channel(capacity);
    let (set_meta_tx, set_meta_rx) = mpsc::channel(capacity);
    let (set_data_tx, set_data_rx) = mpsc::channel(capacity);
    let (hash_meta_tx, hash_meta_rx) = mpsc::channel(capacity);
    let (hash_data_tx, hash_data_rx) = mpsc::channel(capacity);
    let (zset_meta_tx, zset_meta_rx) = mpsc::channel(capacity);
    let (zset_entries_tx, zset_entries_rx) = mpsc::channel(capacity);

    let sink = EventSink {
        db: db_tx,
        string: string_tx,
        list_metadata: list_meta_tx,
        list_data: list_data_tx,
        set_metadata: set_meta_tx,
        set_data: set_data_tx,
        hash_metadata: hash_meta_tx,
        hash_data: hash_data_tx,
        sorted_set_metadata: zset_meta_tx,
        sorted_set_entries: zset_entries_tx,
        cancel,
        anomalies,
    };

    let streams = EventStreams {
        db: db_rx,
        string: string_rx,
        list_metadata: list_meta_rx,
        list_data: list_data_rx,
        set_metadata: set_meta_rx,
        set_data: set_data_rx,
        hash_metadata: hash_meta_rx,
        hash_data: hash_data_rx,
        sorted_set_metadata: zset_meta_rx,
        sorted_set_entries: zset_entries_rx,
    };

    (sink, streams)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_sink_refuses_events() {
        let cancel = CancellationToken::new();
        let (sink, _streams) = event_channels(4, cancel.clone(), Arc::new(AtomicU64::new(0)));
        cancel.cancel();

        let result = sink.database(DatabaseSelected { index: 0 });
        assert!(matches!(result, Err(SourceError::Cancelled)));
    }

    #[test]
    fn test_dropped_consumer_is_reported() {
        let (sink, streams) = event_channels(4, CancellationToken::new(), Arc::new(AtomicU64::new(0)));
        drop(streams);

        let result = sink.hash_entry(HashEntry {
            key: "h".into(),
            field: "f".into(),
            value: "v".into(),
        });
        assert!(matches!(result, Err(SourceError::StreamClosed(StreamKind::HashData))));
    }

    #[test]
    fn test_report_anomaly_counts() {
        let anomalies = Arc::new(AtomicU64::new(0));
        let (sink, _streams) = event_channels(1, CancellationToken::new(), anomalies.clone());
        sink.report_anomaly("bad line");
        sink.report_anomaly("another");
        assert_eq!(anomalies.load(Ordering::Relaxed), 2);
    }
}
