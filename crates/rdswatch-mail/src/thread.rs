//! The threading decision helpers: reply subject, References chain,
//! and the send-envelope union. All pure functions — the dispatch code
//! stays a thin transport shell around these.

use std::collections::BTreeSet;

/// Reply form of a prior subject. Prefixes "Re: " unless the prior
/// subject already starts with it, case-insensitively, so repeated
/// weekly replies never stack into "Re: Re: ...".
pub fn reply_subject(prior_subject: &str) -> String {
    if prior_subject.to_lowercase().starts_with("re:") {
        prior_subject.to_string()
    } else {
        format!("Re: {prior_subject}")
    }
}

/// References header for a reply: the prior chain with the prior
/// Message-ID appended. An empty or absent prior chain yields just the
/// Message-ID — no leading separator.
pub fn chained_references(prior_references: Option<&str>, prior_message_id: &str) -> String {
    match prior_references.map(str::trim) {
        Some(refs) if !refs.is_empty() => format!("{refs} {prior_message_id}"),
        _ => prior_message_id.to_string(),
    }
}

/// The send-envelope: every prior participant, every mandatory
/// recipient, and the sender, deduplicated as a set.
///
/// The union guarantees no participant is silently dropped even when a
/// human edited the display headers of an earlier reply, and the
/// sender's self-inclusion is what lets the next run find this message
/// in its own inbox.
pub fn compute_envelope(
    prior_participants: &[String],
    mandatory: &[String],
    sender: &str,
) -> BTreeSet<String> {
    prior_participants
        .iter()
        .chain(mandatory.iter())
        .map(String::as_str)
        .chain(std::iter::once(sender))
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .map(str::to_string)
        .collect()
}
