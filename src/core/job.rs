use std::collections::BTreeMap;

use chrono::NaiveTime;

pub type JobId = i64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub description: String,
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
}

impl JobRecord {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            start: None,
            end: None,
        }
    }
}

/// All jobs seen in one run, keyed by job id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobTable {
    records: BTreeMap<JobId, JobRecord>,
}

impl JobTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_insert(&mut self, job_id: JobId, description: &str) -> &mut JobRecord {
        self.records
            .entry(job_id)
            .or_insert_with(|| JobRecord::new(description))
    }

    pub fn get(&self, job_id: JobId) -> Option<&JobRecord> {
        self.records.get(&job_id)
    }

    pub fn insert(&mut self, job_id: JobId, record: JobRecord) {
        self.records.insert(job_id, record);
    }

    pub fn iter(&self) -> impl Iterator<Item = (JobId, &JobRecord)> {
        self.records.iter().map(|(id, record)| (*id, record))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
