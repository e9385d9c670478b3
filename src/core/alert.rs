use crate::core::classify::{Bucket, JobReport};

pub const ALERT_SUBJECT: &str = "Log Monitor Alert";
pub const CRITICAL_SUBJECT: &str = "CRITICAL ERROR DETECTED";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub subject: String,
    pub body: String,
}

/// Body sections, most severe first.
const ALERT_ORDER: [(Bucket, &str); 3] = [
    (Bucket::Critical, "--- CRITICAL Jobs (Failed/Incomplete) ---"),
    (Bucket::Warning, "--- WARNING Jobs ---"),
    (Bucket::Error, "--- ERROR Jobs ---"),
];

/// Returns `None` when every job is OK.
pub fn compose_alert(reports: &[JobReport]) -> Option<Alert> {
    if !reports.iter().any(|r| r.bucket.needs_attention()) {
        return None;
    }

    let mut subject = ALERT_SUBJECT;
    let mut body = String::from("The following jobs require attention:\n\n");

    for (bucket, header) in ALERT_ORDER {
        let jobs: Vec<&JobReport> = reports.iter().filter(|r| r.bucket == bucket).collect();
        if jobs.is_empty() {
            continue;
        }
        if bucket == Bucket::Critical {
            subject = CRITICAL_SUBJECT;
        }

        body.push_str(header);
        body.push('\n');
        for job in jobs {
            body.push_str(&format_alert_line(job));
            body.push('\n');
        }
        body.push('\n');
    }

    Some(Alert {
        subject: subject.to_string(),
        body,
    })
}

fn format_alert_line(report: &JobReport) -> String {
    match report.duration_seconds {
        Some(secs) => format!(
            "- Job {}: {}, Duration: {secs:.2}s",
            report.job_id, report.description
        ),
        None => format!(
            "- Job {}: {} (Failed/Incomplete)",
            report.job_id, report.description
        ),
    }
}
