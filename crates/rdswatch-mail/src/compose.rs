//! Report composition: the NEW-vs-REPLY decision applied to a lettre
//! message plus an explicit send-envelope.
//!
//! Display headers and the envelope are deliberately separate: a reply
//! shows the prior To/Cc so mail clients render the original
//! participant list, while the envelope is the full union so nobody is
//! dropped from the thread.

use lettre::address::Envelope;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, Mailboxes, Message};
use lettre::Address;
use tracing::warn;

use crate::error::MailError;
use crate::headers::extract_addresses;
use crate::locator::ConversationContext;
use crate::thread::{chained_references, compute_envelope, reply_subject};

/// A fully assembled report, ready for one SMTP submission.
pub struct ComposedReport {
    pub subject: String,
    pub message: Message,
    pub envelope: Envelope,
}

impl ComposedReport {
    /// Serialized message, for transports and tests.
    pub fn formatted(&self) -> Vec<u8> {
        self.message.formatted()
    }

    /// Envelope recipients as plain addresses.
    pub fn recipient_addresses(&self) -> Vec<String> {
        self.envelope.to().iter().map(|a| a.to_string()).collect()
    }
}

/// Build the outgoing report. `context` present → reply into the
/// existing thread; absent → start a new one.
pub fn compose_report(
    sender: &str,
    mandatory_recipients: &[String],
    base_subject: &str,
    context: Option<&ConversationContext>,
    html_body: String,
) -> crate::error::Result<ComposedReport> {
    let sender_mailbox = parse_mailbox(sender)?;
    let mut builder = Message::builder().from(sender_mailbox.clone());

    let subject;
    let envelope_members;
    match context {
        None => {
            subject = base_subject.to_string();
            for recipient in mandatory_recipients {
                builder = builder.to(parse_mailbox(recipient)?);
            }
            builder = builder.cc(sender_mailbox.clone());
            envelope_members = compute_envelope(&[], mandatory_recipients, sender);
        }
        Some(prior) => {
            subject = reply_subject(&prior.subject);
            builder = builder
                .in_reply_to(prior.message_id.clone())
                .references(chained_references(
                    prior.references.as_deref(),
                    &prior.message_id,
                ));

            // Display headers follow the prior message; configured
            // recipients / sender only fill in when the prior header is
            // absent or unparsable.
            for mailbox in display_list(prior.to.as_deref(), || {
                mandatory_recipients
                    .iter()
                    .filter_map(|r| r.parse::<Mailbox>().ok())
                    .collect()
            }) {
                builder = builder.to(mailbox);
            }
            for mailbox in display_list(prior.cc.as_deref(), || vec![sender_mailbox.clone()]) {
                builder = builder.cc(mailbox);
            }

            let mut participants = Vec::new();
            for raw in [&prior.to, &prior.cc, &prior.from].into_iter().flatten() {
                participants.extend(extract_addresses(raw));
            }
            envelope_members = compute_envelope(&participants, mandatory_recipients, sender);
        }
    }

    let message = builder
        .subject(subject.clone())
        .header(ContentType::TEXT_HTML)
        .body(html_body)
        .map_err(|e| MailError::Compose(format!("message build failed: {e}")))?;

    let envelope = build_envelope(&sender_mailbox, mandatory_recipients, envelope_members)?;
    Ok(ComposedReport {
        subject,
        message,
        envelope,
    })
}

/// Parse a prior display header into mailboxes, or fall back.
fn display_list(raw: Option<&str>, fallback: impl FnOnce() -> Vec<Mailbox>) -> Vec<Mailbox> {
    let parsed: Vec<Mailbox> = raw
        .and_then(|value| value.parse::<Mailboxes>().ok())
        .map(|mailboxes| mailboxes.into_iter().collect())
        .unwrap_or_default();
    if parsed.is_empty() {
        fallback()
    } else {
        parsed
    }
}

/// Turn the computed member set into an SMTP envelope. Configured
/// addresses must parse; addresses inherited from a prior message are
/// skipped with a warning when malformed.
fn build_envelope(
    sender: &Mailbox,
    mandatory_recipients: &[String],
    members: std::collections::BTreeSet<String>,
) -> crate::error::Result<Envelope> {
    let sender_address = sender.email.to_string();
    let mut recipients: Vec<Address> = Vec::with_capacity(members.len());
    for member in &members {
        match member.parse::<Address>() {
            Ok(address) => recipients.push(address),
            Err(e) => {
                let configured =
                    member == &sender_address || mandatory_recipients.contains(member);
                if configured {
                    return Err(MailError::Compose(format!(
                        "invalid configured address '{member}': {e}"
                    )));
                }
                warn!(address = %member, error = %e, "skipping malformed prior participant");
            }
        }
    }
    Envelope::new(Some(sender.email.clone()), recipients)
        .map_err(|e| MailError::Compose(format!("envelope build failed: {e}")))
}

fn parse_mailbox(raw: &str) -> crate::error::Result<Mailbox> {
    raw.parse::<Mailbox>()
        .map_err(|e| MailError::Compose(format!("invalid address '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mandatory() -> Vec<String> {
        vec!["ops@example.com".to_string(), "dba@example.com".to_string()]
    }

    fn prior_context() -> ConversationContext {
        ConversationContext {
            subject: "Weekly RDS Maintenance Report".into(),
            message_id: "<prior@mail.example.com>".into(),
            references: Some("<root@mail.example.com>".into()),
            to: Some("ops@example.com, guest@example.com".into()),
            cc: Some("bot@example.com".into()),
            from: Some("Cloud Bot <bot@example.com>".into()),
        }
    }

    #[test]
    fn new_thread_uses_base_subject_without_threading_headers() {
        let report = compose_report(
            "bot@example.com",
            &mandatory(),
            "Weekly RDS Maintenance Report",
            None,
            "<html></html>".into(),
        )
        .unwrap();

        assert_eq!(report.subject, "Weekly RDS Maintenance Report");
        let rendered = String::from_utf8_lossy(&report.formatted()).to_string();
        assert!(!rendered.contains("In-Reply-To"));
        assert!(!rendered.contains("References"));
        assert!(rendered.contains("Subject: Weekly RDS Maintenance Report"));
    }

    #[test]
    fn new_thread_envelope_is_recipients_plus_sender() {
        let report = compose_report(
            "bot@example.com",
            &mandatory(),
            "Weekly RDS Maintenance Report",
            None,
            String::new(),
        )
        .unwrap();
        let addresses = report.recipient_addresses();
        assert_eq!(addresses.len(), 3);
        assert!(addresses.contains(&"bot@example.com".to_string()));
        assert!(addresses.contains(&"ops@example.com".to_string()));
        assert!(addresses.contains(&"dba@example.com".to_string()));
    }

    #[test]
    fn reply_threads_off_prior_message() {
        let report = compose_report(
            "bot@example.com",
            &mandatory(),
            "Weekly RDS Maintenance Report",
            Some(&prior_context()),
            String::new(),
        )
        .unwrap();

        assert_eq!(report.subject, "Re: Weekly RDS Maintenance Report");
        let rendered = String::from_utf8_lossy(&report.formatted()).to_string();
        assert!(rendered.contains("In-Reply-To: <prior@mail.example.com>"));
        assert!(rendered.contains("References: <root@mail.example.com> <prior@mail.example.com>"));
    }

    #[test]
    fn reply_envelope_unions_prior_participants_with_mandatory() {
        let report = compose_report(
            "bot@example.com",
            &mandatory(),
            "Weekly RDS Maintenance Report",
            Some(&prior_context()),
            String::new(),
        )
        .unwrap();
        let addresses = report.recipient_addresses();
        // guest from prior To, both mandatory, bot (sender/cc/from dedup to one)
        assert_eq!(addresses.len(), 4);
        assert!(addresses.contains(&"guest@example.com".to_string()));
        assert!(addresses.contains(&"ops@example.com".to_string()));
        assert!(addresses.contains(&"dba@example.com".to_string()));
        assert!(addresses.contains(&"bot@example.com".to_string()));
    }

    #[test]
    fn reply_with_re_subject_is_unchanged() {
        let mut prior = prior_context();
        prior.subject = "Re: Weekly RDS Maintenance Report".into();
        let report = compose_report(
            "bot@example.com",
            &mandatory(),
            "Weekly RDS Maintenance Report",
            Some(&prior),
            String::new(),
        )
        .unwrap();
        assert_eq!(report.subject, "Re: Weekly RDS Maintenance Report");
    }

    #[test]
    fn reply_with_empty_references_has_clean_chain() {
        let mut prior = prior_context();
        prior.references = Some(String::new());
        let report = compose_report(
            "bot@example.com",
            &mandatory(),
            "Weekly RDS Maintenance Report",
            Some(&prior),
            String::new(),
        )
        .unwrap();
        let rendered = String::from_utf8_lossy(&report.formatted()).to_string();
        assert!(rendered.contains("References: <prior@mail.example.com>"));
        assert!(!rendered.contains("References:  "));
    }

    #[test]
    fn malformed_prior_participant_is_skipped_not_fatal() {
        let mut prior = prior_context();
        prior.to = Some("not an address, guest@example.com".into());
        let report = compose_report(
            "bot@example.com",
            &mandatory(),
            "Weekly RDS Maintenance Report",
            Some(&prior),
            String::new(),
        )
        .unwrap();
        let addresses = report.recipient_addresses();
        assert!(addresses.contains(&"guest@example.com".to_string()));
        assert!(!addresses.iter().any(|a| a.contains("not an address")));
    }

    #[test]
    fn invalid_configured_recipient_is_fatal() {
        let bad = vec!["definitely not an address".to_string()];
        let result = compose_report(
            "bot@example.com",
            &bad,
            "Weekly RDS Maintenance Report",
            None,
            String::new(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn html_body_carries_content_type() {
        let report = compose_report(
            "bot@example.com",
            &mandatory(),
            "Weekly RDS Maintenance Report",
            None,
            "<p>hello</p>".into(),
        )
        .unwrap();
        let rendered = String::from_utf8_lossy(&report.formatted()).to_string();
        assert!(rendered.contains("Content-Type: text/html"));
        assert!(rendered.contains("<p>hello</p>"));
    }
}
