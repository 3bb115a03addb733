//! Grabber Storage Layer
//!
//! SQLite-backed record store for direct-download bookkeeping.
//! Only the `ddl_info` columns the JD2 hand-off touches are modelled here.

mod database;
mod error;
mod migrations;
mod record;

pub use database::Database;
pub use error::StorageError;
pub use record::DdlRecord;

pub type Result<T> = std::result::Result<T, StorageError>;
