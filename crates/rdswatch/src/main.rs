//! rdswatch — one-shot RDS maintenance report mailer.
//!
//! Each invocation performs one sequential run: describe the configured
//! RDS instance, look for last week's report in the inbox, then send a
//! fresh HTML report — threaded as a reply when a prior report exists.
//! Recurrence comes from an external scheduler, not from this process.

use tracing::{error, info, warn};

use rdswatch_core::config::{RdswatchConfig, Secrets};
use rdswatch_core::record::DbStatusRecord;
use rdswatch_core::report::render_report;
use rdswatch_mail::{compose_report, ConversationLocator, ReportDispatcher};
use rdswatch_status::StatusFetcher;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rdswatch=info".into()),
        )
        .init();

    // load config: explicit RDSWATCH_CONFIG path > ~/.rdswatch/rdswatch.toml
    let config_path = std::env::var("RDSWATCH_CONFIG").ok();
    let config = RdswatchConfig::load(config_path.as_deref())?;
    let secrets = Secrets::from_env()?;

    // 1. Status fetch — contained: any failure degrades to a sentinel
    //    record so the report still goes out and shows the error.
    let fetcher = StatusFetcher::connect(
        &config.aws.region,
        &secrets.aws_access_key_id,
        &secrets.aws_secret_access_key,
        &config.aws.instance,
    )
    .await;
    let record = match fetcher.fetch().await {
        Ok(record) => {
            info!(
                instance = %config.aws.instance,
                status = %record.status,
                pending = record.pending_mods.len(),
                "fetched instance status"
            );
            record
        }
        Err(e) => {
            error!(instance = %config.aws.instance, error = %e, "status fetch failed — sending degraded report");
            DbStatusRecord::degraded(e.to_string())
        }
    };

    // 2. Conversation lookup — "nothing found" and "search failed" both
    //    fall back to a fresh thread, but only the failure is a warning.
    let locator = ConversationLocator::new(
        &config.mail.imap_host,
        config.mail.imap_port,
        &secrets.email_user,
        &secrets.email_pass,
        &config.report.subject,
    );
    let context = match locator.find_latest() {
        Ok(Some(context)) => {
            info!(subject = %context.subject, "found existing report thread — replying");
            Some(context)
        }
        Ok(None) => {
            info!("no existing thread — starting a new chain");
            None
        }
        Err(e) => {
            warn!(error = %e, "mailbox search failed — starting a new chain");
            None
        }
    };

    // 3. Compose and send. Compose failures are configuration bugs and
    //    propagate; a send failure ends the run with only a log line.
    let html = render_report(&config.aws.instance, &record);
    let report = compose_report(
        &secrets.email_user,
        &config.mail.recipients,
        &config.report.subject,
        context.as_ref(),
        html,
    )?;

    let dispatcher = ReportDispatcher::new(
        &config.mail.smtp_host,
        config.mail.smtp_port,
        &secrets.email_user,
        &secrets.email_pass,
    );
    match dispatcher.send(&report) {
        Ok(()) => info!(subject = %report.subject, "report sent"),
        Err(e) => error!(error = %e, "smtp send failed — no report delivered this run"),
    }
    Ok(())
}
