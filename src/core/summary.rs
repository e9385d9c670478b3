use std::collections::BTreeMap;

use crate::core::classify::{Bucket, JobReport};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub lines_read: usize,
    pub lines_skipped: usize,
    pub jobs_seen: usize,
    pub buckets: BTreeMap<Bucket, usize>,
}

impl RunSummary {
    pub fn from_reports(
        reports: &[JobReport],
        lines_read: usize,
        lines_skipped: usize,
        jobs_seen: usize,
    ) -> Self {
        let mut buckets = BTreeMap::new();
        for report in reports {
            *buckets.entry(report.bucket).or_insert(0) += 1;
        }
        Self {
            lines_read,
            lines_skipped,
            jobs_seen,
            buckets,
        }
    }

    pub fn count(&self, bucket: Bucket) -> usize {
        self.buckets.get(&bucket).copied().unwrap_or(0)
    }

    pub fn needs_attention(&self) -> bool {
        Bucket::ALL
            .iter()
            .any(|bucket| bucket.needs_attention() && self.count(*bucket) > 0)
    }

    /// Jobs that produced a record but not a report (END without START).
    pub fn jobs_unreported(&self) -> usize {
        let reported: usize = self.buckets.values().sum();
        self.jobs_seen.saturating_sub(reported)
    }

    pub fn to_line(&self) -> String {
        let counts = Bucket::ALL
            .iter()
            .map(|bucket| format!("{}={}", bucket.label(), self.count(*bucket)))
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "Summary: lines={} skipped={} jobs={} {counts}",
            self.lines_read, self.lines_skipped, self.jobs_seen
        )
    }
}
