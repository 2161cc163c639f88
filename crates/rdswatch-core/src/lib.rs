//! Shared foundation for rdswatch: configuration, the status record,
//! and HTML report rendering.

pub mod config;
pub mod error;
pub mod record;
pub mod report;
