use tracing::{debug, info};

pub mod alert;
pub mod batch;
pub mod classify;
pub mod error;
pub mod event;
pub mod formatter;
pub mod job;
pub mod parser;
pub mod summary;
pub mod transport;

use classify::{classify, BucketPolicy, JobReport};
use job::JobTable;
use parser::{parse_lines, Diagnostic, DiagnosticSink};
use summary::RunSummary;

/// Everything one pass over a log produces.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub table: JobTable,
    pub reports: Vec<JobReport>,
    pub summary: RunSummary,
}

/// Counts skipped lines on their way to another sink.
struct CountingSink<'a> {
    inner: &'a mut dyn DiagnosticSink,
    count: usize,
}

impl DiagnosticSink for CountingSink<'_> {
    fn skipped(&mut self, diagnostic: Diagnostic) {
        self.count += 1;
        self.inner.skipped(diagnostic);
    }
}

/// Parse, classify and summarize one log. Each call builds its own table.
pub fn run<S: AsRef<str>>(
    lines: &[S],
    policy: &BucketPolicy,
    sink: &mut dyn DiagnosticSink,
) -> RunOutcome {
    let mut counting = CountingSink {
        inner: sink,
        count: 0,
    };
    let table = parse_lines(lines, &mut counting);
    debug!(jobs = table.len(), skipped = counting.count, "log parsed");

    let reports = classify(&table, policy);
    let summary = RunSummary::from_reports(&reports, lines.len(), counting.count, table.len());
    info!("{}", summary.to_line());

    RunOutcome {
        table,
        reports,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::classify::Bucket;
    use super::*;

    #[test]
    fn runs_the_whole_pipeline() {
        let lines = [
            "10:00:00,job A,START,1",
            "10:01:00,job A,END,1",
            "10:00:00,job B,START,2",
            "10:05:01,job B,END,2",
            "10:00:00,job C,START,3",
            "10:10:01,job C,END,3",
            "10:00:00,job D,START,4",
            "garbage,only,two",
        ];
        let mut diagnostics = Vec::new();
        let outcome = run(&lines, &BucketPolicy::default(), &mut diagnostics);

        let buckets: Vec<(i64, Bucket)> = outcome
            .reports
            .iter()
            .map(|r| (r.job_id, r.bucket))
            .collect();
        assert_eq!(
            buckets,
            [
                (1, Bucket::Ok),
                (2, Bucket::Warning),
                (3, Bucket::Error),
                (4, Bucket::Critical)
            ]
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(outcome.summary.lines_read, 8);
        assert_eq!(outcome.summary.lines_skipped, 1);
        assert_eq!(outcome.summary.jobs_seen, 4);
    }

    #[test]
    fn empty_input_yields_empty_outcome() {
        let lines: [&str; 0] = [];
        let mut diagnostics = Vec::new();
        let outcome = run(&lines, &BucketPolicy::default(), &mut diagnostics);
        assert!(outcome.reports.is_empty());
        assert!(!outcome.summary.needs_attention());
    }
}
