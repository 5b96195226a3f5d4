// Status partitioning.
//
// Every fault is exactly one of cancelled / outstanding / recovered, driven
// by two nullable fields: a non-null cancel marker means cancelled no
// matter what else is set, otherwise the presence of a completion
// timestamp decides recovered vs outstanding.
use std::collections::BTreeMap;

use crate::types::{FaultRecord, FaultStatus};

/// Classify a single record. Total and idempotent; no field is mutated.
pub fn status_of(record: &FaultRecord) -> FaultStatus {
    if record.cancel_status.is_some() {
        FaultStatus::Cancelled
    } else if record.work_completed_date.is_some() {
        FaultStatus::Recovered
    } else {
        FaultStatus::Outstanding
    }
}

/// The record set split into the three disjoint status classes. Each vector
/// preserves the fault-number ordering of the source map.
#[derive(Debug, Clone, Default)]
pub struct StatusPartition {
    pub cancelled: Vec<FaultRecord>,
    pub outstanding: Vec<FaultRecord>,
    pub recovered: Vec<FaultRecord>,
}

/// Headline counts for the dashboard KPI row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: usize,
    pub cancelled: usize,
    pub outstanding: usize,
    pub recovered: usize,
}

impl StatusPartition {
    pub fn counts(&self) -> StatusCounts {
        StatusCounts {
            total: self.cancelled.len() + self.outstanding.len() + self.recovered.len(),
            cancelled: self.cancelled.len(),
            outstanding: self.outstanding.len(),
            recovered: self.recovered.len(),
        }
    }
}

/// Split the indexed record set into the three status classes.
pub fn partition(records: &BTreeMap<String, FaultRecord>) -> StatusPartition {
    let mut split = StatusPartition::default();
    for record in records.values() {
        match status_of(record) {
            FaultStatus::Cancelled => split.cancelled.push(record.clone()),
            FaultStatus::Outstanding => split.outstanding.push(record.clone()),
            FaultStatus::Recovered => split.recovered.push(record.clone()),
        }
    }
    split
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::parse_datetime;

    fn record(
        fault_number: &str,
        cancel: Option<&str>,
        completed: Option<&str>,
    ) -> (String, FaultRecord) {
        let record = FaultRecord {
            fault_number: fault_number.to_string(),
            cancel_status: cancel.map(str::to_string),
            work_completed_date: completed.map(|s| parse_datetime(s).unwrap()),
            ..Default::default()
        };
        (fault_number.to_string(), record)
    }

    fn sample_set() -> BTreeMap<String, FaultRecord> {
        BTreeMap::from([
            record("F-001", None, Some("2021-10-02 10:00:00")),
            record("F-002", None, None),
            // Cancelled wins even with a completion timestamp present.
            record("F-003", Some("Duplicate ticket"), Some("2021-10-02 10:00:00")),
            record("F-004", Some("Raised in error"), None),
            record("F-005", None, Some("2021-10-03 11:30:00")),
        ])
    }

    #[test]
    fn classes_partition_the_record_set() {
        let records = sample_set();
        let split = partition(&records);
        let counts = split.counts();
        assert_eq!(counts.total, records.len());
        assert_eq!(counts.cancelled, 2);
        assert_eq!(counts.outstanding, 1);
        assert_eq!(counts.recovered, 2);

        // Pairwise disjoint: each fault number appears in exactly one class.
        let mut seen: Vec<&str> = split
            .cancelled
            .iter()
            .chain(&split.outstanding)
            .chain(&split.recovered)
            .map(|r| r.fault_number.as_str())
            .collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), records.len());
    }

    #[test]
    fn cancellation_wins_over_completion() {
        let (_, cancelled_and_completed) =
            record("F-900", Some("cancelled"), Some("2021-10-02 10:00:00"));
        assert_eq!(status_of(&cancelled_and_completed), FaultStatus::Cancelled);
    }

    #[test]
    fn classification_is_idempotent() {
        let records = sample_set();
        for r in records.values() {
            assert_eq!(status_of(r), status_of(r));
        }
    }
}
