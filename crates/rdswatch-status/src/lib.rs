//! RDS status fetcher: one control-plane describe call per run,
//! classified into a small closed set of outcomes.

pub mod error;
pub mod fetcher;

pub use error::StatusError;
pub use fetcher::{record_from_instance, StatusFetcher};
