//! Baseline/current split around the automation cutoff

use crate::models::Snapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The instant separating the baseline (manual) period from the automated one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationBoundary {
    pub cutoff: DateTime<Utc>,
}

impl AutomationBoundary {
    pub fn new(cutoff: DateTime<Utc>) -> Self {
        Self { cutoff }
    }

    /// Half-open: the cutoff instant itself belongs to the current period
    #[inline]
    pub fn is_baseline(&self, snapshot: &Snapshot) -> bool {
        snapshot.timestamp < self.cutoff
    }

    /// Split a collection, preserving input order within each side
    pub fn split<'a>(&self, snapshots: &'a [Snapshot]) -> Partition<'a> {
        let (baseline, current): (Vec<_>, Vec<_>) =
            snapshots.iter().partition(|s| self.is_baseline(s));
        Partition {
            boundary: *self,
            baseline,
            current,
        }
    }
}

/// Borrowed baseline and current subsets of one snapshot collection
#[derive(Debug, Clone)]
pub struct Partition<'a> {
    pub boundary: AutomationBoundary,
    pub baseline: Vec<&'a Snapshot>,
    pub current: Vec<&'a Snapshot>,
}

impl<'a> Partition<'a> {
    pub fn cutoff(&self) -> DateTime<Utc> {
        self.boundary.cutoff
    }

    /// Both periods have at least one snapshot
    pub fn is_complete(&self) -> bool {
        !self.baseline.is_empty() && !self.current.is_empty()
    }
}

/// Split `snapshots` at `cutoff`; `None` when no cutoff is known
pub fn partition(snapshots: &[Snapshot], cutoff: Option<DateTime<Utc>>) -> Option<Partition<'_>> {
    let Some(cutoff) = cutoff else {
        debug!(
            event = "metric_unavailable",
            reason = "missing_cutoff",
            "No automation cutoff, skipping partition"
        );
        return None;
    };

    Some(AutomationBoundary::new(cutoff).split(snapshots))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn days(count: i64) -> Vec<Snapshot> {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        (0..count)
            .map(|i| Snapshot::new(start + Duration::days(i)))
            .collect()
    }

    #[test]
    fn test_no_cutoff_is_unavailable() {
        assert!(partition(&days(3), None).is_none());
    }

    #[test]
    fn test_cutoff_instant_belongs_to_current() {
        let snapshots = days(5);
        let cutoff = snapshots[2].timestamp;
        let split = partition(&snapshots, Some(cutoff)).unwrap();

        assert_eq!(split.baseline.len(), 2);
        assert_eq!(split.current.len(), 3);
        assert_eq!(split.current[0].timestamp, cutoff);
        assert!(split.is_complete());
    }

    #[test]
    fn test_total_partition_on_unsorted_input() {
        let mut snapshots = days(10);
        snapshots.reverse();
        snapshots.swap(1, 7);
        let cutoff = Utc.with_ymd_and_hms(2025, 1, 4, 12, 0, 0).unwrap();
        let split = partition(&snapshots, Some(cutoff)).unwrap();

        assert_eq!(split.baseline.len() + split.current.len(), snapshots.len());
        assert!(split.baseline.iter().all(|s| s.timestamp < cutoff));
        assert!(split.current.iter().all(|s| s.timestamp >= cutoff));
        for snapshot in &snapshots {
            let hits = split
                .baseline
                .iter()
                .chain(split.current.iter())
                .filter(|s| std::ptr::eq(**s, snapshot))
                .count();
            assert_eq!(hits, 1);
        }
    }

    #[test]
    fn test_one_sided_partitions() {
        let snapshots = days(3);
        let early = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();

        let all_current = partition(&snapshots, Some(early)).unwrap();
        assert!(all_current.baseline.is_empty());
        assert!(!all_current.is_complete());

        let all_baseline = partition(&snapshots, Some(late)).unwrap();
        assert_eq!(all_baseline.baseline.len(), 3);
        assert!(all_baseline.current.is_empty());

        let nothing = partition(&[], Some(early)).unwrap();
        assert!(nothing.baseline.is_empty() && nothing.current.is_empty());
    }
}
