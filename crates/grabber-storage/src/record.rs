//! `ddl_info` row

use serde::{Deserialize, Serialize};

/// A direct-download record as stored in `ddl_info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DdlRecord {
    pub id: String,
    pub link: Option<String>,
    pub status: Option<String>,
    pub jd2_job_id: Option<String>,
    /// Local time, `YYYY-MM-DD HH:MM`
    pub updated_date: Option<String>,
}

impl DdlRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            link: None,
            status: None,
            jd2_job_id: None,
            updated_date: None,
        }
    }

    /// Whether the record has been handed off to JD2
    pub fn has_job(&self) -> bool {
        self.jd2_job_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}
