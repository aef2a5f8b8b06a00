//! Typed records emitted by an event source, one type per stream.

use bytes::Bytes;

/// Key identity carried by every key-bearing event.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyInfo {
    pub key: Bytes,
    /// Unix milliseconds, `None` when the key never expires
    pub expiry_ms: Option<i64>,
}

impl KeyInfo {
    pub fn new(key: impl Into<Bytes>, expiry_ms: Option<i64>) -> Self {
        Self {
            key: key.into(),
            expiry_ms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseSelected {
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringObject {
    pub key: KeyInfo,
    pub value: Bytes,
}

/// Header of a list, set, hash or sorted set. Sent once per collection,
/// before its elements.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionMetadata {
    pub key: KeyInfo,
    pub len: u64,
    /// Payload size in bytes, when the source reports it for this kind
    pub byte_size: Option<u64>,
}

/// A list element or a set member.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub key: Bytes,
    pub value: Bytes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HashEntry {
    pub key: Bytes,
    pub field: Bytes,
    pub value: Bytes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortedSetEntry {
    pub key: Bytes,
    pub value: Bytes,
    pub score: f64,
}
