//! Grabber JD2 client
//!
//! Hands direct-download links to a local JDownloader2 instance through its
//! remote control API and polls job status:
//! - link submission (`linkgrabberv2/addLinks`) with an assigned job id
//! - job status query (`downloadsV2/queryLinks`)
//! - optional hand-off of the job id to the `ddl_info` record store
//!
//! Calls are blocking and never retried.

mod client;
mod config;
mod error;
mod payload;
mod store;
mod transport;
mod types;

pub use client::{Client, DOWNLOADS_ENDPOINT, LINKGRABBER_ENDPOINT, SUBMITTED_STATUS};
pub use config::ClientConfig;
pub use error::{Jd2Error, TransportError};
pub use store::JobRecordStore;
pub use transport::{HttpTransport, Transport, TransportRequest, TransportResponse};
pub use types::{JobStatus, PersistenceOutcome, Submission, SubmissionResult};

pub type Result<T> = std::result::Result<T, Jd2Error>;
