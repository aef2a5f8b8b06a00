//! Stats Model: the aggregate record built by one run.
//!
//! Mutated only by the aggregator's consumers, then frozen and handed to the
//! renderer and the JSON dump by value or shared reference.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::expiry::ExpiryClass;

// ========================================
// SUB-RECORDS
// ========================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseStats {
    pub count: u64,
}

/// `expired + expiring <= count`: keys without expiry feed neither counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyStats {
    pub count: u64,
    pub expired: u64,
    pub expiring: u64,
}

impl KeyStats {
    pub fn expired_proportion(&self) -> f64 {
        percent(self.expired, self.count)
    }

    pub fn expiring_proportion(&self) -> f64 {
        percent(self.expiring, self.count)
    }

    pub fn normal_proportion(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let normal = self.count.saturating_sub(self.expired.saturating_add(self.expiring));
        percent(normal, self.count)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringStats {
    pub count: u64,
    pub total_byte_size: u64,
}

/// Shared shape of lists, sets, hashes and sorted sets.
/// `total_byte_size` stays 0 when the source does not report sizes for the kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionStats {
    pub count: u64,
    pub total_byte_size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    List,
    Set,
    Hash,
    SortedSet,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 4] = [
        CollectionKind::List,
        CollectionKind::Set,
        CollectionKind::Hash,
        CollectionKind::SortedSet,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CollectionKind::List => "lists",
            CollectionKind::Set => "sets",
            CollectionKind::Hash => "hashes",
            CollectionKind::SortedSet => "sorted sets",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ========================================
// AGGREGATE ROOT
// ========================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub database: DatabaseStats,
    pub keys: KeyStats,
    pub strings: StringStats,
    pub lists: CollectionStats,
    pub sets: CollectionStats,
    pub hashes: CollectionStats,
    pub sorted_sets: CollectionStats,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_database(&mut self) {
        self.database.count = self.database.count.saturating_add(1);
    }

    pub fn record_key(&mut self, class: ExpiryClass) {
        self.keys.count = self.keys.count.saturating_add(1);
        match class {
            ExpiryClass::Expired => self.keys.expired = self.keys.expired.saturating_add(1),
            ExpiryClass::Expiring => self.keys.expiring = self.keys.expiring.saturating_add(1),
            ExpiryClass::Normal => {}
        }
    }

    /// Returns `false` when the byte total saturated at `u64::MAX`.
    pub fn record_string(&mut self, byte_len: u64) -> bool {
        self.strings.count = self.strings.count.saturating_add(1);
        add_bytes(&mut self.strings.total_byte_size, byte_len)
    }

    /// Returns `false` when the byte total saturated at `u64::MAX`.
    pub fn record_collection(&mut self, kind: CollectionKind, byte_size: u64) -> bool {
        let entry = self.collection_mut(kind);
        entry.count = entry.count.saturating_add(1);
        add_bytes(&mut entry.total_byte_size, byte_size)
    }

    pub fn collection(&self, kind: CollectionKind) -> &CollectionStats {
        match kind {
            CollectionKind::List => &self.lists,
            CollectionKind::Set => &self.sets,
            CollectionKind::Hash => &self.hashes,
            CollectionKind::SortedSet => &self.sorted_sets,
        }
    }

    fn collection_mut(&mut self, kind: CollectionKind) -> &mut CollectionStats {
        match kind {
            CollectionKind::List => &mut self.lists,
            CollectionKind::Set => &mut self.sets,
            CollectionKind::Hash => &mut self.hashes,
            CollectionKind::SortedSet => &mut self.sorted_sets,
        }
    }

    /// Wide enough that five saturated per-kind totals still add up exactly.
    pub fn total_byte_size(&self) -> u128 {
        u128::from(self.strings.total_byte_size)
            + CollectionKind::ALL
                .iter()
                .map(|kind| u128::from(self.collection(*kind).total_byte_size))
                .sum::<u128>()
    }

    /// Per-kind share of all tracked bytes, in percent.
    pub fn space_usage(&self) -> SpaceUsage {
        let total = self.total_byte_size();
        SpaceUsage {
            strings: share(self.strings.total_byte_size, total),
            lists: share(self.lists.total_byte_size, total),
            sets: share(self.sets.total_byte_size, total),
            hashes: share(self.hashes.total_byte_size, total),
            sorted_sets: share(self.sorted_sets.total_byte_size, total),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SpaceUsage {
    pub strings: f64,
    pub lists: f64,
    pub sets: f64,
    pub hashes: f64,
    pub sorted_sets: f64,
}

impl SpaceUsage {
    pub fn sum(&self) -> f64 {
        self.strings + self.lists + self.sets + self.hashes + self.sorted_sets
    }
}

/// `part / whole * 100`, or 0 when there is nothing to divide by.
fn percent(part: u64, whole: u64) -> f64 {
    share(part, u128::from(whole))
}

fn share(part: u64, whole: u128) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

fn add_bytes(total: &mut u64, bytes: u64) -> bool {
    match total.checked_add(bytes) {
        Some(sum) => {
            *total = sum;
            true
        }
        None => {
            *total = u64::MAX;
            false
        }
    }
}

// ==========================================
// TESTS
// ==========================================
