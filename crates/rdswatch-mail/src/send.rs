//! SMTP submission of a composed report.

use lettre::transport::smtp::authentication::Credentials;
use lettre::{SmtpTransport, Transport};
use tracing::info;

use crate::compose::ComposedReport;
use crate::error::MailError;

pub struct ReportDispatcher {
    host: String,
    port: u16,
    credentials: Credentials,
}

impl ReportDispatcher {
    pub fn new(host: &str, port: u16, username: &str, password: &str) -> Self {
        Self {
            host: host.to_string(),
            port,
            credentials: Credentials::new(username.to_string(), password.to_string()),
        }
    }

    /// One authenticated STARTTLS submission. `send_raw` is used so the
    /// envelope recipient list can be broader than the displayed To/Cc.
    pub fn send(&self, report: &ComposedReport) -> crate::error::Result<()> {
        let transport = SmtpTransport::starttls_relay(&self.host)
            .map_err(|e| {
                MailError::Connect(format!("smtp relay setup failed for '{}': {e}", self.host))
            })?
            .port(self.port)
            .credentials(self.credentials.clone())
            .build();

        transport
            .send_raw(&report.envelope, &report.formatted())
            .map_err(|e| MailError::Send(e.to_string()))?;
        info!(
            subject = %report.subject,
            recipients = ?report.recipient_addresses(),
            "report submitted"
        );
        Ok(())
    }
}
