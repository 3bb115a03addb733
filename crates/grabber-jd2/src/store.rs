//! Record store hand-off

use grabber_storage::Database;

/// Where the client records the job id JD2 assigned to a submission.
pub trait JobRecordStore: Send + Sync {
    /// Upsert `record_id` with the job id, status label and `YYYY-MM-DD HH:MM` timestamp.
    fn record_job(
        &self,
        record_id: &str,
        job_id: &str,
        status: &str,
        updated_date: &str,
    ) -> grabber_storage::Result<()>;
}

impl JobRecordStore for Database {
    fn record_job(
        &self,
        record_id: &str,
        job_id: &str,
        status: &str,
        updated_date: &str,
    ) -> grabber_storage::Result<()> {
        self.upsert_ddl_job(record_id, job_id, status, updated_date)
    }
}
