use std::fs;
use std::path::Path;

use crate::core::classify::{Bucket, BucketPolicy, JobReport};
use crate::core::error::MonitorError;

pub const REPORT_TITLE: &str = "### Log Monitor Report ###";
pub const EMPTY_SECTION: &str = "- No jobs in this category.";

pub fn render_report(reports: &[JobReport], policy: &BucketPolicy) -> String {
    render_report_styled(reports, policy, |_, header| header.to_string())
}

/// Same layout as `render_report`, with each section header passed through
/// `style` (used for terminal colours).
pub fn render_report_styled<F>(reports: &[JobReport], policy: &BucketPolicy, style: F) -> String
where
    F: Fn(Bucket, &str) -> String,
{
    let mut lines = Vec::new();
    lines.push(REPORT_TITLE.to_string());

    for bucket in Bucket::ALL {
        lines.push(String::new());
        lines.push(style(bucket, &section_header(bucket, policy)));

        let mut empty = true;
        for report in reports.iter().filter(|r| r.bucket == bucket) {
            lines.push(format_job_line(report));
            empty = false;
        }
        if empty {
            lines.push(EMPTY_SECTION.to_string());
        }
    }

    lines.join("\n")
}

/// Writes the plain report, creating missing parent directories.
pub fn save_report(path: &Path, text: &str) -> Result<(), MonitorError> {
    let to_error = |source| MonitorError::Report {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(to_error)?;
    }
    fs::write(path, text).map_err(to_error)
}

pub fn section_header(bucket: Bucket, policy: &BucketPolicy) -> String {
    let warning = format_threshold(policy.warning_after_secs);
    let error = format_threshold(policy.error_after_secs);
    let range = match bucket {
        Bucket::Ok => format!("{warning} or less"),
        Bucket::Warning => format!("{} to {error}", strip_unit_if_shared(&warning, &error)),
        Bucket::Error => format!("More than {error}"),
        Bucket::Critical => "Failed/Incomplete".to_string(),
    };
    format!("--- {} Jobs ({range}) ---", bucket.label())
}

pub fn format_job_line(report: &JobReport) -> String {
    let detail = match report.duration_seconds {
        Some(secs) if report.ends_before_start() => {
            format!("(Duration: {secs:.2}s, ends before start)")
        }
        Some(secs) => format!("(Duration: {secs:.2}s)"),
        None => "(Status: Incomplete/Failed)".to_string(),
    };
    format!("- Job {}: {} {detail}", report.job_id, report.description)
}

/// `300.0` -> `5 minutes`, `90.0` -> `90 seconds`, `1.5` -> `1.5 seconds`.
pub fn format_threshold(secs: f64) -> String {
    if secs >= 60.0 && secs % 60.0 == 0.0 {
        let minutes = secs / 60.0;
        if minutes == 1.0 {
            "1 minute".to_string()
        } else {
            format!("{minutes} minutes")
        }
    } else if secs == 1.0 {
        "1 second".to_string()
    } else {
        format!("{secs} seconds")
    }
}

fn strip_unit_if_shared<'a>(low: &'a str, high: &str) -> &'a str {
    match (low.split_once(' '), high.split_once(' ')) {
        (Some((value, unit)), Some((_, other_unit))) if unit == other_unit => value,
        _ => low,
    }
}
