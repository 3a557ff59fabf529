//! Email adapters for settlement notification.

mod resend_mailer;

pub use resend_mailer::{NoopNotifier, ResendMailer};
