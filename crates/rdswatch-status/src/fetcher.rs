//! RDS control-plane fetcher.
//!
//! One `DescribeDBInstances` call per run, no retries beyond the SDK
//! defaults. Credentials come from the environment (the scheduled-job
//! secret store), not the shared AWS profile chain.

use aws_config::{BehaviorVersion, Region};
use aws_sdk_rds::config::Credentials;
use aws_sdk_rds::error::SdkError;
use aws_sdk_rds::operation::describe_db_instances::DescribeDBInstancesError;
use aws_sdk_rds::types::{DbInstance, PendingModifiedValues};
use aws_smithy_types::error::display::DisplayErrorContext;
use tracing::debug;

use crate::error::StatusError;
use rdswatch_core::record::DbStatusRecord;

pub const NO_ENDPOINT: &str = "No Endpoint";

pub struct StatusFetcher {
    client: aws_sdk_rds::Client,
    instance_id: String,
}

impl StatusFetcher {
    /// Build an RDS client for one region with explicit credentials.
    pub async fn connect(
        region: &str,
        access_key_id: &str,
        secret_access_key: &str,
        instance_id: &str,
    ) -> Self {
        let credentials = Credentials::new(
            access_key_id.to_string(),
            secret_access_key.to_string(),
            None,
            None,
            "rdswatch-env",
        );
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .credentials_provider(credentials)
            .load()
            .await;
        Self {
            client: aws_sdk_rds::Client::new(&sdk_config),
            instance_id: instance_id.to_string(),
        }
    }

    /// Describe the configured instance and flatten it into a record.
    pub async fn fetch(&self) -> crate::error::Result<DbStatusRecord> {
        debug!(instance = %self.instance_id, "describing RDS instance");
        let response = self
            .client
            .describe_db_instances()
            .db_instance_identifier(&self.instance_id)
            .send()
            .await
            .map_err(|e| classify_sdk_error(e, &self.instance_id))?;

        let instance = response
            .db_instances()
            .first()
            .ok_or_else(|| StatusError::NotFound(self.instance_id.clone()))?;
        Ok(record_from_instance(instance))
    }
}

/// Map the SDK's open error surface onto the closed outcome set.
fn classify_sdk_error<R>(error: SdkError<DescribeDBInstancesError, R>, instance_id: &str) -> StatusError
where
    R: std::fmt::Debug,
{
    if error
        .as_service_error()
        .is_some_and(|e| e.is_db_instance_not_found_fault())
    {
        return StatusError::NotFound(instance_id.to_string());
    }
    let text = DisplayErrorContext(&error).to_string();
    match &error {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => StatusError::Transient(text),
        _ => StatusError::Api(text),
    }
}

/// Extract the six report fields from one `DbInstance`.
pub fn record_from_instance(instance: &DbInstance) -> DbStatusRecord {
    DbStatusRecord {
        engine: field(instance.engine()),
        version: field(instance.engine_version()),
        status: field(instance.db_instance_status()),
        endpoint: instance
            .endpoint()
            .and_then(|e| e.address())
            .unwrap_or(NO_ENDPOINT)
            .to_string(),
        maintenance_window: field(instance.preferred_maintenance_window()),
        pending_mods: instance
            .pending_modified_values()
            .map(pending_map)
            .unwrap_or_default(),
    }
}

fn field(value: Option<&str>) -> String {
    value.unwrap_or("unknown").to_string()
}

/// Flatten the queued modifications into display strings. Only fields
/// the provider actually set appear; the password never does.
fn pending_map(pending: &PendingModifiedValues) -> std::collections::BTreeMap<String, String> {
    let mut map = std::collections::BTreeMap::new();
    if let Some(v) = pending.db_instance_class() {
        map.insert("db_instance_class".to_string(), v.to_string());
    }
    if let Some(v) = pending.engine_version() {
        map.insert("engine_version".to_string(), v.to_string());
    }
    if let Some(v) = pending.allocated_storage() {
        map.insert("allocated_storage".to_string(), v.to_string());
    }
    if let Some(v) = pending.iops() {
        map.insert("iops".to_string(), v.to_string());
    }
    if let Some(v) = pending.port() {
        map.insert("port".to_string(), v.to_string());
    }
    if let Some(v) = pending.multi_az() {
        map.insert("multi_az".to_string(), v.to_string());
    }
    if let Some(v) = pending.storage_type() {
        map.insert("storage_type".to_string(), v.to_string());
    }
    if let Some(v) = pending.backup_retention_period() {
        map.insert("backup_retention_period".to_string(), v.to_string());
    }
    if pending.master_user_password().is_some() {
        map.insert("master_user_password".to_string(), "(pending)".to_string());
    }
    map
}
