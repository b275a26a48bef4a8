//! Transactional email.
//!
//! - `mailer`: delivery backends (SMTP, log, job queue)
//! - `templates`: welcome and password reset messages
//! - `notifier`: fire-and-log wrapper used by services

mod mailer;
mod notifier;
pub mod templates;

pub use mailer::{build_mailer, Email, LogMailer, Mailer, QueueMailer, SmtpMailer};
pub use notifier::Notifier;

#[cfg(any(test, feature = "test-utils"))]
pub use mailer::MockMailer;
