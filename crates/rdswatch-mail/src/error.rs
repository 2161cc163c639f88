use thiserror::Error;

/// Errors from the mailbox search and report dispatch paths.
#[derive(Debug, Error)]
pub enum MailError {
    /// The IMAP or SMTP transport could not be established.
    #[error("Connection failed: {0}")]
    Connect(String),

    /// The mail server rejected the supplied credentials.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// A mailbox protocol operation (select/search/fetch) failed.
    #[error("Mailbox error: {0}")]
    Mailbox(String),

    /// The outgoing message could not be assembled — bad configured
    /// address, empty envelope, or a message-format failure.
    #[error("Compose error: {0}")]
    Compose(String),

    /// SMTP submission failed after the message was built.
    #[error("Send failed: {0}")]
    Send(String),
}

pub type Result<T> = std::result::Result<T, MailError>;
