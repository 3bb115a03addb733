//! JD2 remote API client

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{Jd2Error, TransportError};
use crate::payload::{self, AddLinksQuery, QueryLinksQuery};
use crate::store::JobRecordStore;
use crate::transport::{HttpTransport, Transport, TransportRequest, TransportResponse};
use crate::types::{JobStatus, PersistenceOutcome, Submission, SubmissionResult};
use crate::Result;

pub const LINKGRABBER_ENDPOINT: &str = "linkgrabberv2/addLinks";
pub const DOWNLOADS_ENDPOINT: &str = "downloadsV2/queryLinks";

/// Status written to `ddl_info` once JD2 has accepted a link
pub const SUBMITTED_STATUS: &str = "JD2-Submitted";

const QUERY_MAX_RESULTS: u32 = 1000;
const UPDATED_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

pub struct Client<T = HttpTransport> {
    base_url: String,
    timeout: Duration,
    /// Passed to JD2 as `destinationFolder`; `None` lets JD2 use its default
    destination_folder: Option<PathBuf>,
    transport: T,
    record_store: Option<Arc<dyn JobRecordStore>>,
}

impl Client<HttpTransport> {
    /// Build a client over a pooled `reqwest` transport.
    ///
    /// `base_url` takes precedence over `config.base_url`.
    pub fn new(base_url: Option<&str>, config: &ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.timeout)?;
        Self::with_transport(base_url, config, transport)
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(base_url: Option<&str>, config: &ClientConfig, transport: T) -> Result<Self> {
        let base_url = resolve_base_url(base_url, config.base_url.as_deref())
            .ok_or_else(|| Jd2Error::Configuration("JD2 URL is not configured".to_string()))?;

        let destination_folder = config
            .destination_dir
            .as_deref()
            .and_then(prepare_destination);

        tracing::debug!(
            base_url = %base_url,
            destination = ?destination_folder,
            "Created JD2 client"
        );

        Ok(Self {
            base_url,
            timeout: config.timeout,
            destination_folder,
            transport,
            record_store: None,
        })
    }

    /// Attach the store that receives job ids for submissions carrying a record id.
    pub fn with_record_store(mut self, store: Arc<dyn JobRecordStore>) -> Self {
        self.record_store = Some(store);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn destination_folder(&self) -> Option<&Path> {
        self.destination_folder.as_deref()
    }

    /// Submit a link to the link grabber and return the assigned job id, if any.
    ///
    /// Transport failures come back as `success == false`; they are never raised.
    pub fn submit(&self, submission: &Submission) -> SubmissionResult {
        let endpoint = self.endpoint(LINKGRABBER_ENDPOINT);
        let destination = self
            .destination_folder
            .as_deref()
            .map(|dir| dir.to_string_lossy());
        let query = AddLinksQuery {
            assign_job_id: true,
            autostart: submission.autostart,
            links: &submission.link,
            package_name: &submission.package_name,
            destination_folder: destination.as_deref(),
        };

        let response = match self.send(&endpoint, "query", &query) {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(
                    package = %submission.package_name,
                    endpoint = %endpoint,
                    error = %err,
                    "Failed to submit link to JD2"
                );
                return SubmissionResult::failed(err);
            }
        };

        let payload = payload::decode_body(&response.body, "submit");
        let job_id = payload::extract_job_id(&payload);

        let persistence = match (&job_id, submission.record_id.as_deref()) {
            (None, _) => {
                tracing::warn!(package = %submission.package_name, "No job id returned by JD2");
                PersistenceOutcome::NotRequested
            }
            (Some(job_id), Some(record_id)) if !record_id.is_empty() => {
                self.record_job(record_id, job_id)
            }
            (Some(_), _) => PersistenceOutcome::NotRequested,
        };

        tracing::info!(
            package = %submission.package_name,
            job_id = ?job_id,
            "Submitted link to JD2"
        );

        SubmissionResult::submitted(job_id, payload, persistence)
    }

    /// Raw status records for `job_ids`. Failures are logged and yield an empty list.
    pub fn query<S: AsRef<str>>(&self, job_ids: &[S]) -> Vec<Value> {
        if job_ids.is_empty() {
            return Vec::new();
        }

        let ids: Vec<&str> = job_ids.iter().map(AsRef::as_ref).collect();
        let endpoint = self.endpoint(DOWNLOADS_ENDPOINT);
        let query = QueryLinksQuery {
            job_uuid: true,
            job_uuids: &ids,
            status: true,
            max_results: QUERY_MAX_RESULTS,
            start_at: 0,
        };

        let response = match self.send(&endpoint, "queryParams", &query) {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(
                    job_ids = ?ids,
                    endpoint = %endpoint,
                    error = %err,
                    "Failed to query JD2 jobs"
                );
                return Vec::new();
            }
        };

        payload::extract_records(payload::decode_body(&response.body, "query"))
    }

    /// Status of a single job. `None` short-circuits to not-found.
    pub fn status(&self, job_id: Option<&str>) -> JobStatus {
        let Some(job_id) = job_id else {
            return JobStatus::not_found();
        };

        match self.query(&[job_id]).into_iter().next() {
            Some(record) => JobStatus::from_record(record),
            None => JobStatus::not_found(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn send<Q: Serialize>(
        &self,
        endpoint: &str,
        param: &str,
        query: &Q,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let request = TransportRequest {
            url: endpoint.to_string(),
            params: vec![(param.to_string(), serde_json::to_string(query)?)],
            timeout: self.timeout,
        };

        let response = self.transport.get(&request)?;
        if !response.is_success() {
            return Err(TransportError::Status {
                status: response.status,
                url: endpoint.to_string(),
            });
        }

        Ok(response)
    }

    fn record_job(&self, record_id: &str, job_id: &str) -> PersistenceOutcome {
        let Some(store) = &self.record_store else {
            tracing::debug!(record_id, job_id, "No record store attached; job id not persisted");
            return PersistenceOutcome::NoStore;
        };

        let updated_date = chrono::Local::now().format(UPDATED_DATE_FORMAT).to_string();
        match store.record_job(record_id, job_id, SUBMITTED_STATUS, &updated_date) {
            Ok(()) => PersistenceOutcome::Stored,
            Err(err) => {
                tracing::warn!(
                    record_id,
                    job_id,
                    error = %err,
                    "Unable to persist JD2 job id"
                );
                PersistenceOutcome::Failed(Jd2Error::Persistence(err))
            }
        }
    }
}

/// First non-blank candidate, without surrounding whitespace or trailing `/`.
fn resolve_base_url(explicit: Option<&str>, configured: Option<&str>) -> Option<String> {
    let candidate = [explicit, configured]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|url| !url.is_empty())?;

    let trimmed = candidate.trim_end_matches('/');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn prepare_destination(dir: &Path) -> Option<PathBuf> {
    if dir.as_os_str().is_empty() {
        return None;
    }

    match std::fs::create_dir_all(dir) {
        Ok(()) => Some(dir.to_path_buf()),
        Err(err) => {
            tracing::warn!(
                path = %dir.display(),
                error = %err,
                "Unable to ensure JD2 destination folder exists"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, NaiveDateTime};
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    type Reply = std::result::Result<TransportResponse, TransportError>;

    #[derive(Default)]
    struct MockTransport {
        replies: Mutex<VecDeque<Reply>>,
        requests: Mutex<Vec<TransportRequest>>,
    }

    impl MockTransport {
        fn replying(reply: Reply) -> Arc<Self> {
            let transport = Self::default();
            transport.replies.lock().unwrap().push_back(reply);
            Arc::new(transport)
        }

        fn json(status: u16, body: Value) -> Arc<Self> {
            Self::replying(Ok(TransportResponse::new(status, body.to_string())))
        }

        fn requests(&self) -> Vec<TransportRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Transport for MockTransport {
        fn get(&self, request: &TransportRequest) -> Reply {
            self.requests.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(TransportResponse::new(200, "{}")))
        }
    }

    #[derive(Default)]
    struct MockStore {
        fail: bool,
        calls: Mutex<Vec<(String, String, String, String)>>,
    }

    impl JobRecordStore for MockStore {
        fn record_job(
            &self,
            record_id: &str,
            job_id: &str,
            status: &str,
            updated_date: &str,
        ) -> grabber_storage::Result<()> {
            self.calls.lock().unwrap().push((
                record_id.to_string(),
                job_id.to_string(),
                status.to_string(),
                updated_date.to_string(),
            ));
            if self.fail {
                return Err(grabber_storage::StorageError::Io(std::io::Error::other(
                    "database is locked",
                )));
            }
            Ok(())
        }
    }

    fn client(transport: Arc<MockTransport>) -> Client<Arc<MockTransport>> {
        Client::with_transport(None, &ClientConfig::new("http://localhost:3128/"), transport)
            .unwrap()
    }

    fn decoded_param(request: &TransportRequest, name: &str) -> Value {
        serde_json::from_str(request.param(name).unwrap()).unwrap()
    }

    #[test]
    fn test_missing_base_url_is_configuration_error() {
        let transport = Arc::new(MockTransport::default());
        let result = Client::with_transport(None, &ClientConfig::default(), transport.clone());
        assert!(matches!(result, Err(Jd2Error::Configuration(_))));

        let result = Client::with_transport(Some("  "), &ClientConfig::new("/"), transport);
        assert!(matches!(result, Err(Jd2Error::Configuration(_))));
    }

    #[test]
    fn test_base_url_resolution() {
        let transport = Arc::new(MockTransport::default());
        let config = ClientConfig::new("http://configured:3128");

        let client = Client::with_transport(Some("http://explicit:3128//"), &config, transport.clone())
            .unwrap();
        assert_eq!(client.base_url(), "http://explicit:3128");

        let client = Client::with_transport(Some(""), &config, transport).unwrap();
        assert_eq!(client.base_url(), "http://configured:3128");
    }

    #[test]
    fn test_submit_returns_job_id() {
        let transport = MockTransport::json(200, json!({"data": {"id": "42"}}));
        let client = client(transport.clone());

        let result = client.submit(&Submission::new("https://example.com/a.cbz", "Saga #1"));

        assert!(result.success);
        assert_eq!(result.job_id.as_deref(), Some("42"));
        assert!(result.error.is_none());
        assert!(matches!(result.persistence, PersistenceOutcome::NotRequested));

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "http://localhost:3128/linkgrabberv2/addLinks");
        assert_eq!(requests[0].timeout, Duration::from_secs(30));
        assert_eq!(
            decoded_param(&requests[0], "query"),
            json!({
                "assignJobID": true,
                "autostart": true,
                "links": "https://example.com/a.cbz",
                "packageName": "Saga #1",
            })
        );
    }

    #[test]
    fn test_submit_malformed_json_is_not_a_failure() {
        let transport =
            MockTransport::replying(Ok(TransportResponse::new(200, "<html>oops</html>")));
        let client = client(transport);

        let result = client.submit(&Submission::new("https://example.com/a.cbz", "Saga #1"));

        assert!(result.success);
        assert!(result.job_id.is_none());
        assert_eq!(result.payload, Some(json!({})));
    }

    #[test]
    fn test_submit_network_error() {
        let transport = MockTransport::replying(Err(TransportError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        ))));
        let client = client(transport);

        let result = client.submit(&Submission::new("https://example.com/a.cbz", "Saga #1"));

        assert!(!result.success);
        assert!(result.job_id.is_none());
        assert!(result.payload.is_none());
        assert!(matches!(result.error, Some(TransportError::Io(_))));
    }

    #[test]
    fn test_submit_http_error_status() {
        let transport = MockTransport::json(500, json!({"data": {"id": "42"}}));
        let client = client(transport);

        let result = client.submit(&Submission::new("https://example.com/a.cbz", "Saga #1"));

        assert!(!result.success);
        assert!(result.job_id.is_none());
        assert!(matches!(
            result.error,
            Some(TransportError::Status { status: 500, .. })
        ));
    }

    #[test]
    fn test_submit_persists_job_id() {
        let transport = MockTransport::json(200, json!({"jobID": 1700}));
        let store = Arc::new(MockStore::default());
        let client = client(transport).with_record_store(store.clone());

        let before = Local::now().naive_local();
        let result = client.submit(
            &Submission::new("https://example.com/a.cbz", "Saga #1").record_id("ddl-7"),
        );

        assert!(result.success);
        assert_eq!(result.job_id.as_deref(), Some("1700"));
        assert!(matches!(result.persistence, PersistenceOutcome::Stored));

        let calls = store.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (record_id, job_id, status, updated_date) = &calls[0];
        assert_eq!(record_id, "ddl-7");
        assert_eq!(job_id, "1700");
        assert_eq!(status, SUBMITTED_STATUS);

        let stamped = NaiveDateTime::parse_from_str(updated_date, UPDATED_DATE_FORMAT).unwrap();
        let drift = (stamped - before).num_seconds().abs();
        assert!(drift <= 120, "timestamp {updated_date} is not current");
    }

    #[test]
    fn test_submit_persistence_failure_keeps_success() {
        let transport = MockTransport::json(200, json!({"data": {"id": "42"}}));
        let store = Arc::new(MockStore {
            fail: true,
            ..MockStore::default()
        });
        let client = client(transport).with_record_store(store.clone());

        let result = client.submit(
            &Submission::new("https://example.com/a.cbz", "Saga #1").record_id("ddl-7"),
        );

        assert!(result.success);
        assert_eq!(result.job_id.as_deref(), Some("42"));
        assert!(matches!(
            result.persistence,
            PersistenceOutcome::Failed(Jd2Error::Persistence(_))
        ));
        assert_eq!(store.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_submit_without_job_id_skips_store() {
        let transport = MockTransport::json(200, json!({"data": {}}));
        let store = Arc::new(MockStore::default());
        let client = client(transport).with_record_store(store.clone());

        let result = client.submit(
            &Submission::new("https://example.com/a.cbz", "Saga #1").record_id("ddl-7"),
        );

        assert!(result.success);
        assert!(result.job_id.is_none());
        assert!(store.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_submit_record_id_without_store() {
        let transport = MockTransport::json(200, json!({"data": {"id": "42"}}));
        let client = client(transport);

        let result = client.submit(
            &Submission::new("https://example.com/a.cbz", "Saga #1").record_id("ddl-7"),
        );

        assert!(result.success);
        assert!(matches!(result.persistence, PersistenceOutcome::NoStore));
    }

    #[test]
    fn test_submit_sends_destination_folder() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("comics");
        let transport = MockTransport::json(200, json!({"data": {"id": "1"}}));
        let config = ClientConfig::new("http://localhost:3128").with_destination_dir(&destination);
        let client = Client::with_transport(None, &config, transport.clone()).unwrap();

        assert!(destination.is_dir());
        assert_eq!(client.destination_folder(), Some(destination.as_path()));

        client.submit(&Submission::new("https://example.com/a.cbz", "Saga #1").autostart(false));

        let query = decoded_param(&transport.requests()[0], "query");
        assert_eq!(query["autostart"], json!(false));
        assert_eq!(
            query["destinationFolder"],
            json!(destination.to_string_lossy())
        );
    }

    #[test]
    fn test_unusable_destination_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        let transport = MockTransport::json(200, json!({"data": {"id": "1"}}));
        let config =
            ClientConfig::new("http://localhost:3128").with_destination_dir(blocker.join("sub"));
        let client = Client::with_transport(None, &config, transport.clone()).unwrap();

        assert!(client.destination_folder().is_none());

        client.submit(&Submission::new("https://example.com/a.cbz", "Saga #1"));
        let query = decoded_param(&transport.requests()[0], "query");
        assert!(query.get("destinationFolder").is_none());
    }

    #[test]
    fn test_query_empty_makes_no_call() {
        let transport = Arc::new(MockTransport::default());
        let client = client(transport.clone());

        let ids: [&str; 0] = [];
        assert!(client.query(&ids).is_empty());
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_query_request_shape() {
        let transport = MockTransport::json(200, json!({"data": [{"uuid": 42, "status": "Running"}]}));
        let client = client(transport.clone());

        let records = client.query(&["42".to_string(), "43".to_string()]);
        assert_eq!(records, vec![json!({"uuid": 42, "status": "Running"})]);

        let requests = transport.requests();
        assert_eq!(requests[0].url, "http://localhost:3128/downloadsV2/queryLinks");
        assert_eq!(
            decoded_param(&requests[0], "queryParams"),
            json!({
                "jobUUID": true,
                "jobUUIDs": ["42", "43"],
                "status": true,
                "maxResults": 1000,
                "startAt": 0,
            })
        );
    }

    #[test]
    fn test_query_transport_failure_is_empty() {
        let transport = MockTransport::json(503, json!([{"status": "Running"}]));
        let client = client(transport);

        assert!(client.query(&["42"]).is_empty());
    }

    #[test]
    fn test_status_without_job_id() {
        let transport = Arc::new(MockTransport::default());
        let client = client(transport.clone());

        assert_eq!(client.status(None), JobStatus::not_found());
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_status_not_found() {
        let transport = MockTransport::json(200, json!({"data": []}));
        let client = client(transport);

        let status = client.status(Some("42"));
        assert!(!status.found);
        assert!(status.status.is_none());
        assert!(status.data.is_none());
    }

    #[test]
    fn test_status_found() {
        let record = json!({"uuid": 42, "status": "Finished", "bytesLoaded": 1024});
        let transport = MockTransport::json(200, json!([record.clone()]));
        let client = client(transport.clone());

        let status = client.status(Some("42"));
        assert!(status.found);
        assert_eq!(status.status.as_deref(), Some("Finished"));
        assert_eq!(status.data, Some(record));

        let query = decoded_param(&transport.requests()[0], "queryParams");
        assert_eq!(query["jobUUIDs"], json!(["42"]));
    }
}
