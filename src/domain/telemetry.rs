// Telemetry data domain models
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Maximum number of records kept in the history window
pub const HISTORY_CAPACITY: usize = 50;

/// One decoded sample from the feed
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TelemetryRecord {
    pub value: f64,
    /// Epoch milliseconds as reported by the feed
    pub timestamp: i64,
}

impl TelemetryRecord {
    pub fn new(value: f64, timestamp: i64) -> Self {
        Self { value, timestamp }
    }

    /// Feed timestamp as a UTC instant, if it is representable
    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}

/// Bounded, immutable window of the most recent records in arrival order.
///
/// Cloning is cheap; a window never changes after construction, so readers
/// holding an older window keep seeing exactly what they were handed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryWindow {
    records: Arc<[TelemetryRecord]>,
}

impl HistoryWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TelemetryRecord] {
        &self.records
    }

    pub fn first(&self) -> Option<&TelemetryRecord> {
        self.records.first()
    }

    pub fn latest(&self) -> Option<&TelemetryRecord> {
        self.records.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TelemetryRecord> {
        self.records.iter()
    }

    pub fn append(&self, record: TelemetryRecord) -> Self {
        append(self, record)
    }
}

/// Returns a new window holding `window` followed by `record`, trimmed from
/// the front to the last [`HISTORY_CAPACITY`] entries.
pub fn append(window: &HistoryWindow, record: TelemetryRecord) -> HistoryWindow {
    let prior = window.records();
    let skip = (prior.len() + 1).saturating_sub(HISTORY_CAPACITY);

    let mut records = Vec::with_capacity((prior.len() + 1).min(HISTORY_CAPACITY));
    records.extend_from_slice(&prior[skip..]);
    records.push(record);

    HistoryWindow {
        records: records.into(),
    }
}

impl Serialize for HistoryWindow {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.records().serialize(serializer)
    }
}

impl<'a> IntoIterator for &'a HistoryWindow {
    type Item = &'a TelemetryRecord;
    type IntoIter = std::slice::Iter<'a, TelemetryRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
