//! Grabber Core
//!
//! Loads configuration, opens the record store and wires it into the JD2 client.

mod config;
mod error;

use std::sync::Arc;

pub use config::Config;
pub use error::CoreError;

pub use grabber_jd2::{
    Client, ClientConfig, JobStatus, Jd2Error, PersistenceOutcome, Submission, SubmissionResult,
};
pub use grabber_storage::{Database, DdlRecord, StorageError};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Record store plus a JD2 client that writes job ids into it.
pub struct Grabber {
    db: Database,
    client: Client,
}

impl Grabber {
    pub fn open(config: &Config) -> Result<Self> {
        let db = Database::open(&config.database_path)?;
        Self::with_database(config, db)
    }

    pub fn with_database(config: &Config, db: Database) -> Result<Self> {
        let client = Client::new(None, &config.client_config())?
            .with_record_store(Arc::new(db.clone()));

        tracing::info!(
            jd2_url = %client.base_url(),
            database = %config.database_path.display(),
            "Grabber initialized"
        );

        Ok(Self { db, client })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
