//! Event Source contract.
//!
//! A source scans one input exactly once and pushes typed records into ten
//! independent streams. Consumers must be listening on every stream before
//! `parse` is called; returning from `parse` drops the sink and closes them all.

pub mod events;
pub mod json_lines;
pub mod sink;

pub use events::*;
pub use json_lines::JsonLinesSource;
pub use sink::{event_channels, EventSink, EventStreams};

use std::fmt;

use crate::error::SourceError;
use crate::stats::CollectionKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Db,
    String,
    ListMetadata,
    ListData,
    SetMetadata,
    SetData,
    HashMetadata,
    HashData,
    SortedSetMetadata,
    SortedSetEntries,
}

impl StreamKind {
    pub fn metadata_of(kind: CollectionKind) -> Self {
        match kind {
            CollectionKind::List => StreamKind::ListMetadata,
            CollectionKind::Set => StreamKind::SetMetadata,
            CollectionKind::Hash => StreamKind::HashMetadata,
            CollectionKind::SortedSet => StreamKind::SortedSetMetadata,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StreamKind::Db => "db",
            StreamKind::String => "string",
            StreamKind::ListMetadata => "list_metadata",
            StreamKind::ListData => "list_data",
            StreamKind::SetMetadata => "set_metadata",
            StreamKind::SetData => "set_data",
            StreamKind::HashMetadata => "hash_metadata",
            StreamKind::HashData => "hash_data",
            StreamKind::SortedSetMetadata => "sorted_set_metadata",
            StreamKind::SortedSetEntries => "sorted_set_entries",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which collection kinds carry a payload size on their metadata event.
/// Strings always do: their value is part of the event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub list_bytes: bool,
    pub set_bytes: bool,
    pub hash_bytes: bool,
    pub sorted_set_bytes: bool,
}

impl Capabilities {
    pub fn all() -> Self {
        Self {
            list_bytes: true,
            set_bytes: true,
            hash_bytes: true,
            sorted_set_bytes: true,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn tracks_bytes(&self, kind: CollectionKind) -> bool {
        match kind {
            CollectionKind::List => self.list_bytes,
            CollectionKind::Set => self.set_bytes,
            CollectionKind::Hash => self.hash_bytes,
            CollectionKind::SortedSet => self.sorted_set_bytes,
        }
    }
}

pub trait EventSource: Send + 'static {
    fn capabilities(&self) -> Capabilities;

    /// Synchronous scan of the whole input. Blocks the calling thread.
    fn parse(&mut self, sink: &EventSink) -> Result<(), SourceError>;
}
