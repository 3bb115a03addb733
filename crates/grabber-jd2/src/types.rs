//! Request and result types

use serde_json::Value;

use crate::error::{Jd2Error, TransportError};

/// A link to hand to JD2's link grabber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub link: String,
    pub package_name: String,
    pub autostart: bool,
    /// `ddl_info` id to stamp with the assigned job id
    pub record_id: Option<String>,
}

impl Submission {
    pub fn new(link: impl Into<String>, package_name: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            package_name: package_name.into(),
            autostart: true,
            record_id: None,
        }
    }

    pub fn autostart(mut self, autostart: bool) -> Self {
        self.autostart = autostart;
        self
    }

    pub fn record_id(mut self, record_id: impl Into<String>) -> Self {
        self.record_id = Some(record_id.into());
        self
    }
}

/// What happened to the job id on the record-store side.
///
/// Never affects [`SubmissionResult::success`].
#[derive(Debug, Default)]
pub enum PersistenceOutcome {
    /// No record id, or no job id to record
    #[default]
    NotRequested,
    /// A record id was given but the client has no record store attached
    NoStore,
    Stored,
    Failed(Jd2Error),
}

impl PersistenceOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, PersistenceOutcome::Failed(_))
    }
}

#[derive(Debug)]
pub struct SubmissionResult {
    pub success: bool,
    pub job_id: Option<String>,
    /// Decoded response body; `{}` when the body was not JSON
    pub payload: Option<Value>,
    pub error: Option<TransportError>,
    pub persistence: PersistenceOutcome,
}

impl SubmissionResult {
    pub(crate) fn failed(error: TransportError) -> Self {
        Self {
            success: false,
            job_id: None,
            payload: None,
            error: Some(error),
            persistence: PersistenceOutcome::NotRequested,
        }
    }

    pub(crate) fn submitted(
        job_id: Option<String>,
        payload: Value,
        persistence: PersistenceOutcome,
    ) -> Self {
        Self {
            success: true,
            job_id,
            payload: Some(payload),
            error: None,
            persistence,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobStatus {
    pub found: bool,
    pub status: Option<String>,
    /// Raw record as returned by `queryLinks`
    pub data: Option<Value>,
}

impl JobStatus {
    pub fn not_found() -> Self {
        Self {
            found: false,
            status: None,
            data: None,
        }
    }

    pub(crate) fn from_record(record: Value) -> Self {
        let status = record
            .get("status")
            .and_then(Value::as_str)
            .map(str::to_owned);

        Self {
            found: true,
            status,
            data: Some(record),
        }
    }
}
