//! Minimal RFC 5322 header handling for the prior-report lookup.
//!
//! Only the six headers the threading decision needs are kept; values
//! are stored raw so display headers can be carried into the reply
//! unchanged.

use lettre::message::Mailboxes;

/// Raw header values parsed out of an RFC822 header block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedHeaders {
    pub subject: Option<String>,
    pub message_id: Option<String>,
    pub references: Option<String>,
    pub to: Option<String>,
    pub cc: Option<String>,
    pub from: Option<String>,
}

impl ParsedHeaders {
    /// Parse a header block, unfolding continuation lines. Header names
    /// match case-insensitively; repeated To/Cc headers are joined with
    /// a comma, for other headers the first occurrence wins.
    pub fn parse(raw: &str) -> Self {
        let mut parsed = Self::default();
        let mut current: Option<(String, String)> = None;

        for line in raw.lines() {
            if line.is_empty() {
                break; // end of header block
            }
            if line.starts_with(' ') || line.starts_with('\t') {
                // folded continuation of the previous header
                if let Some((_, ref mut value)) = current {
                    value.push(' ');
                    value.push_str(line.trim());
                }
                continue;
            }
            if let Some(header) = current.take() {
                parsed.store(header);
            }
            if let Some((name, value)) = line.split_once(':') {
                current = Some((name.trim().to_ascii_lowercase(), value.trim().to_string()));
            }
        }
        if let Some(header) = current.take() {
            parsed.store(header);
        }
        parsed
    }

    fn store(&mut self, (name, value): (String, String)) {
        let slot = match name.as_str() {
            "subject" => &mut self.subject,
            "message-id" => &mut self.message_id,
            "references" => &mut self.references,
            "to" => &mut self.to,
            "cc" => &mut self.cc,
            "from" => &mut self.from,
            _ => return,
        };
        match (name.as_str(), slot.as_mut()) {
            ("to" | "cc", Some(existing)) => {
                existing.push_str(", ");
                existing.push_str(&value);
            }
            (_, Some(_)) => {}
            (_, None) => *slot = Some(value),
        }
    }
}

/// Extract bare addresses from a raw address-list header value.
///
/// Delegates to lettre's mailbox-list parser; falls back to a plain
/// scan when the header is not strictly parseable (hand-edited replies
/// are exactly where that happens).
pub fn extract_addresses(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if let Ok(mailboxes) = trimmed.parse::<Mailboxes>() {
        return mailboxes
            .into_iter()
            .map(|mailbox| mailbox.email.to_string())
            .collect();
    }
    trimmed
        .split(',')
        .filter_map(|part| {
            part.split_whitespace()
                .find(|token| token.contains('@'))
                .map(|token| token.trim_matches(['<', '>', '"', ';']).to_string())
        })
        .filter(|address| !address.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "From: Cloud Bot <bot@example.com>\r\n\
To: alice@example.com,\r\n bob@example.com\r\n\
CC: carol@example.com\r\n\
Subject: Weekly RDS\r\n Maintenance Report\r\n\
Message-ID: <abc123@mail.example.com>\r\n\
References: <first@mail.example.com> <second@mail.example.com>\r\n\
X-Other: ignored\r\n\
\r\n\
body text is not header data\r\n";

    #[test]
    fn parses_and_unfolds_headers() {
        let headers = ParsedHeaders::parse(RAW);
        assert_eq!(headers.subject.as_deref(), Some("Weekly RDS Maintenance Report"));
        assert_eq!(
            headers.message_id.as_deref(),
            Some("<abc123@mail.example.com>")
        );
        assert_eq!(
            headers.references.as_deref(),
            Some("<first@mail.example.com> <second@mail.example.com>")
        );
        assert_eq!(
            headers.to.as_deref(),
            Some("alice@example.com, bob@example.com")
        );
        assert_eq!(headers.cc.as_deref(), Some("carol@example.com"));
        assert_eq!(headers.from.as_deref(), Some("Cloud Bot <bot@example.com>"));
    }

    #[test]
    fn header_names_match_case_insensitively() {
        let headers = ParsedHeaders::parse("MESSAGE-id: <x@y>\r\nsubject: hi\r\n");
        assert_eq!(headers.message_id.as_deref(), Some("<x@y>"));
        assert_eq!(headers.subject.as_deref(), Some("hi"));
    }

    #[test]
    fn missing_headers_stay_none() {
        let headers = ParsedHeaders::parse("Subject: only\r\n");
        assert!(headers.message_id.is_none());
        assert!(headers.references.is_none());
        assert!(headers.to.is_none());
    }

    #[test]
    fn body_lines_are_not_parsed_as_headers() {
        let headers = ParsedHeaders::parse("Subject: s\r\n\r\nTo: fake@example.com\r\n");
        assert!(headers.to.is_none());
    }

    #[test]
    fn extracts_addresses_with_display_names() {
        let addresses =
            extract_addresses("Alice A <alice@example.com>, Bob <bob@example.com>, carol@example.com");
        assert_eq!(
            addresses,
            vec!["alice@example.com", "bob@example.com", "carol@example.com"]
        );
    }

    #[test]
    fn extracts_from_loose_header_values() {
        // not strictly RFC-parseable; the fallback scan should still
        // find the addresses
        let addresses = extract_addresses("alice@example.com,, <bob@example.com> (old)");
        assert!(addresses.contains(&"alice@example.com".to_string()));
        assert!(addresses.contains(&"bob@example.com".to_string()));
    }

    #[test]
    fn empty_value_yields_no_addresses() {
        assert!(extract_addresses("  ").is_empty());
    }
}
