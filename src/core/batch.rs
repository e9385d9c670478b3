use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::core::error::MonitorError;

/// Reads every line of the job log. Invalid UTF-8 is replaced rather than
/// failing the run.
pub fn read_log_lines(path: &Path) -> Result<Vec<String>, MonitorError> {
    let file = File::open(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => MonitorError::InputNotFound {
            path: path.to_path_buf(),
        },
        _ => MonitorError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let mut reader = BufReader::new(file);
    let mut lines = Vec::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| MonitorError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        if read == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf)
            .trim_end_matches(&['\r', '\n'][..])
            .to_string();
        lines.push(line);
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn reads_lines_without_terminators() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"10:00:00,a,START,1\r\n10:01:00,a,END,1\n").unwrap();

        let lines = read_log_lines(file.path()).unwrap();
        assert_eq!(lines, ["10:00:00,a,START,1", "10:01:00,a,END,1"]);
    }

    #[test]
    fn invalid_utf8_does_not_abort() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"10:00:00,\xff\xfe,START,1\n").unwrap();

        let lines = read_log_lines(file.path()).unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with(",START,1"));
    }

    #[test]
    fn missing_file_is_reported_as_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("logs.log");
        let err = read_log_lines(&missing).unwrap_err();

        assert!(matches!(err, MonitorError::InputNotFound { .. }));
        assert_eq!(
            err.to_string(),
            format!("the file '{}' was not found", missing.display())
        );
    }
}
