use tracing::{debug, warn};

use crate::core::error::LineError;
use crate::core::event::{tokenize_line, Action};
use crate::core::job::JobTable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1-based position in the input.
    pub line_number: usize,
    pub raw: String,
    pub reason: LineError,
}

/// Receives lines the parser had to skip.
pub trait DiagnosticSink {
    fn skipped(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn skipped(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Emits every skipped line as a `warn!` event and keeps a count.
#[derive(Debug, Default)]
pub struct TracingSink {
    pub count: usize,
}

impl DiagnosticSink for TracingSink {
    fn skipped(&mut self, diagnostic: Diagnostic) {
        self.count += 1;
        warn!(
            line = diagnostic.line_number,
            reason = %diagnostic.reason,
            "could not parse line: {}",
            diagnostic.raw
        );
    }
}

pub fn parse_lines<I, S>(lines: I, sink: &mut dyn DiagnosticSink) -> JobTable
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut table = JobTable::new();

    for (idx, line) in lines.into_iter().enumerate() {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }

        let skip = |reason: LineError| Diagnostic {
            line_number: idx + 1,
            raw: line.trim().to_string(),
            reason,
        };

        let event = match tokenize_line(line) {
            Ok(event) => event,
            Err(reason) => {
                sink.skipped(skip(reason));
                continue;
            }
        };

        match event.action {
            Action::Start => {
                let record = table.get_or_insert(event.job_id, &event.description);
                if let Some(previous) = record.start.replace(event.timestamp) {
                    debug!(job_id = event.job_id, %previous, "duplicate START overwritten");
                }
            }
            Action::End => {
                let record = table.get_or_insert(event.job_id, &event.description);
                if let Some(previous) = record.end.replace(event.timestamp) {
                    debug!(job_id = event.job_id, %previous, "duplicate END overwritten");
                }
            }
            Action::Unrecognized(action) => {
                sink.skipped(skip(LineError::UnrecognizedAction(action)));
            }
        }
    }

    table
}
