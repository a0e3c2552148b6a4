//! Outbound notification payloads.

use super::EmailAddress;
use serde::{Deserialize, Serialize};

/// A rendered message addressed to a single recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    to: EmailAddress,
    subject: String,
    body: String,
}

impl Notification {
    /// Creates a notification.
    #[must_use]
    pub fn new(to: EmailAddress, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to,
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// Returns the recipient address.
    #[must_use]
    pub const fn to(&self) -> &EmailAddress {
        &self.to
    }

    /// Returns the subject line.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the plain-text body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }
}
