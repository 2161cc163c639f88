//! Mailbox search, threading decision, and SMTP dispatch for the
//! weekly report.

pub mod compose;
pub mod error;
pub mod headers;
pub mod locator;
pub mod send;
pub mod thread;

pub use compose::{compose_report, ComposedReport};
pub use error::MailError;
pub use locator::{ConversationContext, ConversationLocator};
pub use send::ReportDispatcher;
