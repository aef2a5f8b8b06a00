#![allow(dead_code)]

use rdbviz::config::AggregatorConfig;
use rdbviz::error::SourceError;
use rdbviz::source::{
    Capabilities, CollectionMetadata, DatabaseSelected, Element, EventSink, EventSource,
    JsonLinesSource, KeyInfo, StringObject,
};
use rdbviz::stats::{CollectionKind, CollectionStats, KeyStats, Stats, StringStats};
use std::io::Cursor;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

/// Reference "now" for every aggregation test, in Unix milliseconds.
pub const NOW: i64 = 1_700_000_000_000;

pub fn test_config(channel_capacity: usize) -> AggregatorConfig {
    AggregatorConfig {
        channel_capacity,
        progress_interval_secs: 3600,
    }
}

pub fn json_source(lines: &str) -> JsonLinesSource<Cursor<Vec<u8>>> {
    JsonLinesSource::new(Cursor::new(lines.as_bytes().to_vec()))
}

/// Databases 2, keys 10 (3 expired, 2 expiring), strings 5 / 500 bytes,
/// lists 2 / 300 bytes.
pub fn sample_stats() -> Stats {
    let mut stats = Stats::new();
    stats.database.count = 2;
    stats.keys = KeyStats { count: 10, expired: 3, expiring: 2 };
    stats.strings = StringStats { count: 5, total_byte_size: 500 };
    stats.lists = CollectionStats { count: 2, total_byte_size: 300 };
    stats.sets = CollectionStats { count: 3, total_byte_size: 0 };
    stats
}

// ========================================
// SCRIPTED SOURCE
// ========================================

pub enum Scripted {
    Db(u32),
    String { key: String, expiry_ms: Option<i64>, value: String },
    Collection { kind: CollectionKind, key: String, expiry_ms: Option<i64>, byte_size: Option<u64> },
    ListEntry(String),
    /// Cancel the run from inside the scan
    Cancel,
}

pub struct ScriptedSource {
    pub events: Vec<Scripted>,
    pub capabilities: Capabilities,
    pub cancel: Option<CancellationToken>,
}

impl ScriptedSource {
    pub fn new(events: Vec<Scripted>) -> Self {
        Self {
            events,
            capabilities: Capabilities::all(),
            cancel: None,
        }
    }
}

impl EventSource for ScriptedSource {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn parse(&mut self, sink: &EventSink) -> Result<(), SourceError> {
        for event in self.events.drain(..) {
            match event {
                Scripted::Db(index) => sink.database(DatabaseSelected { index })?,
                Scripted::String { key, expiry_ms, value } => sink.string_object(StringObject {
                    key: KeyInfo::new(key, expiry_ms),
                    value: value.into(),
                })?,
                Scripted::Collection { kind, key, expiry_ms, byte_size } => sink.collection_metadata(
                    kind,
                    CollectionMetadata {
                        key: KeyInfo::new(key, expiry_ms),
                        len: 1,
                        byte_size,
                    },
                )?,
                Scripted::ListEntry(value) => sink.list_element(Element {
                    key: "list".into(),
                    value: value.into(),
                })?,
                Scripted::Cancel => {
                    if let Some(token) = &self.cancel {
                        token.cancel();
                    }
                }
            }
        }
        Ok(())
    }
}

// ========================================
// HTTP
// ========================================

pub struct HttpResponse {
    pub status: u16,
    /// Raw header block, lowercased
    pub headers: String,
    pub body: String,
}

pub async fn http_get(addr: SocketAddr, path: &str) -> HttpResponse {
    let mut stream = TcpStream::connect(addr).await.expect("connect to dashboard");
    let request = format!(
        "GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        path
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let text = String::from_utf8_lossy(&raw).to_string();

    let (head, body) = text.split_once("\r\n\r\n").expect("complete HTTP response");
    let status = head
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .expect("status code");

    HttpResponse {
        status,
        headers: head.to_lowercase(),
        body: body.to_string(),
    }
}

// ========================================
// BENCHMARK
// ========================================

pub struct Benchmark {
    pub name: String,
    pub start: Instant,
    pub count: usize,
}

impl Benchmark {
    pub fn start(name: &str, count: usize) -> Self {
        Self {
            name: name.to_string(),
            start: Instant::now(),
            count,
        }
    }

    pub fn stop(self) -> Duration {
        let total_duration = self.start.elapsed();
        let ops_sec = self.count as f64 / total_duration.as_secs_f64();

        println!("\n{}", self.name);
        println!(" 🚀 Throughput:  {:.0} events/sec", ops_sec);
        println!(" ⏱️  Total Time:  {:.2?}", total_duration);
        println!(" 📦 Count:       {}\n", self.count);
        total_duration
    }
}
