//! Conversation locator: find the most recent prior report in the
//! inbox by its fixed subject line.
//!
//! Read-only — the session never flags or deletes messages. "Nothing
//! found" and "search failed" are distinct outcomes; the caller decides
//! that both fall back to a fresh thread, but only the latter is worth
//! a warning in the logs.

use std::io::{Read, Write};

use native_tls::TlsConnector;
use tracing::{debug, warn};

use crate::error::MailError;
use crate::headers::ParsedHeaders;

/// Headers of the most recent prior report, used to thread the reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationContext {
    pub subject: String,
    pub message_id: String,
    pub references: Option<String>,
    /// Raw display headers of the prior message, carried into the reply
    /// so mail clients keep showing the original participant list.
    pub to: Option<String>,
    pub cc: Option<String>,
    pub from: Option<String>,
}

pub struct ConversationLocator {
    host: String,
    port: u16,
    username: String,
    password: String,
    subject: String,
}

impl ConversationLocator {
    pub fn new(host: &str, port: u16, username: &str, password: &str, subject: &str) -> Self {
        Self {
            host: host.to_string(),
            port,
            username: username.to_string(),
            password: password.to_string(),
            subject: subject.to_string(),
        }
    }

    /// Search INBOX for the newest message carrying the report subject.
    ///
    /// `Ok(None)` means no prior report exists (first run, or the
    /// thread was deleted); `Err` means the mailbox could not be
    /// searched at all.
    pub fn find_latest(&self) -> crate::error::Result<Option<ConversationContext>> {
        let tls = TlsConnector::builder()
            .build()
            .map_err(|e| MailError::Connect(format!("tls connector: {e}")))?;
        let client = imap::connect((self.host.as_str(), self.port), &self.host, &tls)
            .map_err(|e| {
                MailError::Connect(format!(
                    "imap connect failed for '{}:{}': {e}",
                    self.host, self.port
                ))
            })?;
        let mut session = client
            .login(&self.username, &self.password)
            .map_err(|(e, _)| {
                MailError::Auth(format!("imap login failed for '{}': {e}", self.username))
            })?;

        let result = self.search_session(&mut session);
        let _ = session.logout();
        result
    }

    fn search_session<T: Read + Write>(
        &self,
        session: &mut imap::Session<T>,
    ) -> crate::error::Result<Option<ConversationContext>> {
        session
            .select("INBOX")
            .map_err(|e| MailError::Mailbox(format!("select INBOX failed: {e}")))?;

        let query = format!("SUBJECT {}", quote_imap_string(&self.subject));
        let sequence_ids = session
            .search(&query)
            .map_err(|e| MailError::Mailbox(format!("imap search failed: {e}")))?;

        // Highest sequence number = most recent arrival in this mailbox.
        let Some(latest) = sequence_ids.iter().max().copied() else {
            debug!(subject = %self.subject, "no prior report in INBOX");
            return Ok(None);
        };

        let fetches = session
            .fetch(latest.to_string(), "RFC822.HEADER")
            .map_err(|e| MailError::Mailbox(format!("imap fetch failed: {e}")))?;
        let Some(fetch) = fetches.iter().next() else {
            return Ok(None);
        };
        let Some(raw) = fetch.header() else {
            return Ok(None);
        };

        let headers = ParsedHeaders::parse(&String::from_utf8_lossy(raw));
        let Some(message_id) = headers.message_id else {
            warn!(seq = latest, "prior report has no Message-ID — cannot thread, starting fresh");
            return Ok(None);
        };
        Ok(Some(ConversationContext {
            subject: headers.subject.unwrap_or_else(|| self.subject.clone()),
            message_id,
            references: headers.references,
            to: headers.to,
            cc: headers.cc,
            from: headers.from,
        }))
    }
}

/// Quote a value for an IMAP search key.
fn quote_imap_string(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_plain_subject() {
        assert_eq!(
            quote_imap_string("Weekly RDS Maintenance Report"),
            "\"Weekly RDS Maintenance Report\""
        );
    }

    #[test]
    fn escapes_quotes_and_backslashes() {
        assert_eq!(quote_imap_string(r#"a "b" c\d"#), r#""a \"b\" c\\d""#);
    }
}
