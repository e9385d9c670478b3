use chrono::NaiveTime;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::error::LineError;
use crate::core::job::JobId;

static RE_TIMESTAMP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{2}):([0-9]{2}):([0-9]{2})$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Start,
    End,
    Unrecognized(String),
}

impl Action {
    pub fn from_field(field: &str) -> Self {
        if field.eq_ignore_ascii_case("start") {
            Action::Start
        } else if field.eq_ignore_ascii_case("end") {
            Action::End
        } else {
            Action::Unrecognized(field.to_string())
        }
    }
}

/// One tokenized log line. Only lives until it is folded into a `JobRecord`.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    pub timestamp: NaiveTime,
    pub description: String,
    pub action: Action,
    pub job_id: JobId,
}

/// Splits `line` into its four fields and parses them.
///
/// The action is tokenized but not validated here, so an unknown keyword
/// still yields a `LogEvent` carrying `Action::Unrecognized`.
pub fn tokenize_line(line: &str) -> Result<LogEvent, LineError> {
    let fields: Vec<&str> = line.trim().split(',').map(str::trim).collect();
    let [timestamp, description, action, job_id] = fields[..] else {
        return Err(LineError::FieldCount(fields.len()));
    };

    let job_id = job_id
        .parse::<JobId>()
        .map_err(|_| LineError::InvalidJobId(job_id.to_string()))?;
    let timestamp = parse_timestamp(timestamp)
        .ok_or_else(|| LineError::InvalidTimestamp(timestamp.to_string()))?;

    Ok(LogEvent {
        timestamp,
        description: description.to_string(),
        action: Action::from_field(action),
        job_id,
    })
}

/// Strict zero-padded 24-hour `HH:MM:SS`.
pub fn parse_timestamp(value: &str) -> Option<NaiveTime> {
    let capture = RE_TIMESTAMP.captures(value)?;
    let hours = capture.get(1)?.as_str().parse::<u32>().ok()?;
    let minutes = capture.get(2)?.as_str().parse::<u32>().ok()?;
    let seconds = capture.get(3)?.as_str().parse::<u32>().ok()?;
    NaiveTime::from_hms_opt(hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_well_formed_line_with_padding() {
        let event = tokenize_line("11:35:23,scheduled task 032, START,37980").unwrap();
        assert_eq!(event.timestamp, NaiveTime::from_hms_opt(11, 35, 23).unwrap());
        assert_eq!(event.description, "scheduled task 032");
        assert_eq!(event.action, Action::Start);
        assert_eq!(event.job_id, 37980);
    }

    #[test]
    fn action_is_case_insensitive() {
        assert_eq!(Action::from_field("end"), Action::End);
        assert_eq!(Action::from_field("Start"), Action::Start);
        assert_eq!(
            Action::from_field("RESTART"),
            Action::Unrecognized("RESTART".to_string())
        );
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert_eq!(
            tokenize_line("garbage,only,two"),
            Err(LineError::FieldCount(3))
        );
        assert_eq!(
            tokenize_line("10:00:00,a, b,START,1"),
            Err(LineError::FieldCount(5))
        );
    }

    #[test]
    fn rejects_bad_job_id() {
        assert_eq!(
            tokenize_line("10:00:00,job,START,abc"),
            Err(LineError::InvalidJobId("abc".to_string()))
        );
    }

    #[test]
    fn timestamp_must_be_zero_padded_and_valid() {
        assert!(parse_timestamp("09:05:07").is_some());
        assert!(parse_timestamp("9:05:07").is_none());
        assert!(parse_timestamp("24:00:00").is_none());
        assert!(parse_timestamp("23:59:60").is_none());
        assert!(parse_timestamp("10:00:00.5").is_none());
        assert!(parse_timestamp("2024-01-01 10:00:00").is_none());
    }

    #[test]
    fn bad_timestamp_is_reported() {
        assert_eq!(
            tokenize_line("10:0:00,job,END,7"),
            Err(LineError::InvalidTimestamp("10:0:00".to_string()))
        );
    }
}
