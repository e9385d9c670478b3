use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::error::MonitorError;
use crate::core::job::{JobId, JobRecord, JobTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bucket {
    Ok,
    Warning,
    Error,
    Critical,
}

impl Bucket {
    /// Report section order.
    pub const ALL: [Bucket; 4] = [Bucket::Ok, Bucket::Warning, Bucket::Error, Bucket::Critical];

    pub fn label(self) -> &'static str {
        match self {
            Bucket::Ok => "OK",
            Bucket::Warning => "WARNING",
            Bucket::Error => "ERROR",
            Bucket::Critical => "CRITICAL",
        }
    }

    pub fn needs_attention(self) -> bool {
        !matches!(self, Bucket::Ok)
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Duration thresholds in seconds. A job lands in a bucket only when it is
/// strictly longer than that bucket's threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BucketPolicy {
    pub warning_after_secs: f64,
    pub error_after_secs: f64,
}

impl Default for BucketPolicy {
    fn default() -> Self {
        Self {
            warning_after_secs: 300.0,
            error_after_secs: 600.0,
        }
    }
}

impl BucketPolicy {
    pub fn new(warning_after_secs: f64, error_after_secs: f64) -> Result<Self, MonitorError> {
        let policy = Self {
            warning_after_secs,
            error_after_secs,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), MonitorError> {
        let invalid = |message: String| Err(MonitorError::InvalidPolicy { message });
        for (name, value) in [
            ("warning_after_secs", self.warning_after_secs),
            ("error_after_secs", self.error_after_secs),
        ] {
            if !value.is_finite() || value < 0.0 {
                return invalid(format!("{name} must be a non-negative number, got {value}"));
            }
        }
        if self.warning_after_secs >= self.error_after_secs {
            return invalid(format!(
                "warning_after_secs ({}) must be less than error_after_secs ({})",
                self.warning_after_secs, self.error_after_secs
            ));
        }
        Ok(())
    }

    pub fn bucket_for(&self, duration_secs: f64) -> Bucket {
        if duration_secs > self.error_after_secs {
            Bucket::Error
        } else if duration_secs > self.warning_after_secs {
            Bucket::Warning
        } else {
            Bucket::Ok
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobReport {
    pub job_id: JobId,
    pub description: String,
    pub duration_seconds: Option<f64>,
    pub bucket: Bucket,
}

impl JobReport {
    pub fn is_incomplete(&self) -> bool {
        self.duration_seconds.is_none()
    }

    /// END stamped earlier than START, most likely a job that crossed midnight.
    pub fn ends_before_start(&self) -> bool {
        self.duration_seconds.is_some_and(|secs| secs < 0.0)
    }
}

pub fn classify(table: &JobTable, policy: &BucketPolicy) -> Vec<JobReport> {
    table
        .iter()
        .filter_map(|(job_id, record)| classify_record(job_id, record, policy))
        .collect()
}

pub fn classify_record(job_id: JobId, record: &JobRecord, policy: &BucketPolicy) -> Option<JobReport> {
    let (duration_seconds, bucket) = match (record.start, record.end) {
        (Some(start), Some(end)) => {
            let elapsed = end.signed_duration_since(start);
            let secs = elapsed.num_milliseconds() as f64 / 1000.0;
            if secs < 0.0 {
                warn!(
                    job_id,
                    %start,
                    %end,
                    "job ends before it starts; day rollover is not supported"
                );
            }
            (Some(secs), policy.bucket_for(secs))
        }
        (Some(_), None) => (None, Bucket::Critical),
        (None, Some(end)) => {
            warn!(job_id, %end, "END without START, job left out of the report");
            return None;
        }
        (None, None) => return None,
    };

    Some(JobReport {
        job_id,
        description: record.description.clone(),
        duration_seconds,
        bucket,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::*;

    fn hms(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    fn record(start: Option<NaiveTime>, end: Option<NaiveTime>) -> JobRecord {
        JobRecord {
            description: "job".to_string(),
            start,
            end,
        }
    }

    fn single(start: Option<NaiveTime>, end: Option<NaiveTime>) -> Vec<JobReport> {
        let mut table = JobTable::new();
        table.insert(1, record(start, end));
        classify(&table, &BucketPolicy::default())
    }

    #[test]
    fn sixty_seconds_is_ok() {
        let reports = single(Some(hms(10, 0, 0)), Some(hms(10, 1, 0)));
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].bucket, Bucket::Ok);
        assert_eq!(reports[0].duration_seconds, Some(60.0));
    }

    #[test]
    fn just_over_five_minutes_is_warning() {
        let reports = single(Some(hms(10, 0, 0)), Some(hms(10, 5, 1)));
        assert_eq!(reports[0].bucket, Bucket::Warning);
        assert_eq!(reports[0].duration_seconds, Some(301.0));
    }

    #[test]
    fn just_over_ten_minutes_is_error() {
        let reports = single(Some(hms(10, 0, 0)), Some(hms(10, 10, 1)));
        assert_eq!(reports[0].bucket, Bucket::Error);
        assert_eq!(reports[0].duration_seconds, Some(601.0));
    }

    #[test]
    fn thresholds_are_exclusive() {
        let policy = BucketPolicy::default();
        assert_eq!(policy.bucket_for(300.0), Bucket::Ok);
        assert_eq!(policy.bucket_for(300.01), Bucket::Warning);
        assert_eq!(policy.bucket_for(600.0), Bucket::Warning);
        assert_eq!(policy.bucket_for(600.01), Bucket::Error);
    }

    #[test]
    fn start_without_end_is_critical_without_duration() {
        let reports = single(Some(hms(10, 0, 0)), None);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].bucket, Bucket::Critical);
        assert_eq!(reports[0].duration_seconds, None);
        assert!(reports[0].is_incomplete());
    }

    #[test]
    fn records_without_start_are_excluded() {
        assert!(single(None, Some(hms(10, 0, 0))).is_empty());
        assert!(single(None, None).is_empty());
    }

    #[test]
    fn negative_duration_is_kept_and_flagged() {
        let reports = single(Some(hms(23, 59, 0)), Some(hms(0, 1, 0)));
        let report = &reports[0];
        assert_eq!(report.duration_seconds, Some(-86280.0));
        assert_eq!(report.bucket, Bucket::Ok);
        assert!(report.ends_before_start());
    }

    #[test]
    fn classify_is_idempotent() {
        let mut table = JobTable::new();
        table.insert(1, record(Some(hms(10, 0, 0)), Some(hms(10, 1, 0))));
        table.insert(2, record(Some(hms(10, 0, 0)), None));
        table.insert(3, record(Some(hms(9, 0, 0)), Some(hms(9, 20, 0))));

        let policy = BucketPolicy::default();
        assert_eq!(classify(&table, &policy), classify(&table, &policy));
    }

    #[test]
    fn custom_policy_moves_boundaries() {
        let policy = BucketPolicy::new(60.0, 120.0).unwrap();
        assert_eq!(policy.bucket_for(60.0), Bucket::Ok);
        assert_eq!(policy.bucket_for(61.0), Bucket::Warning);
        assert_eq!(policy.bucket_for(121.0), Bucket::Error);
    }

    #[test]
    fn rejects_inverted_or_invalid_thresholds() {
        assert!(BucketPolicy::new(600.0, 300.0).is_err());
        assert!(BucketPolicy::new(300.0, 300.0).is_err());
        assert!(BucketPolicy::new(-1.0, 300.0).is_err());
        assert!(BucketPolicy::new(f64::NAN, 300.0).is_err());
    }
}
