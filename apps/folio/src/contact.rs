//! Contact form validation. Submissions are acknowledged, never stored.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

pub const CONTACT_THANKS_MESSAGE: &str =
    "Thank you for your message! I'll get back to you soon.";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContactError {
    #[error("Please fill in all fields.")]
    MissingFields,

    #[error("Please enter a valid email address.")]
    InvalidEmail,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactSubmission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

impl ContactSubmission {
    pub fn validate(&self) -> Result<(), ContactError> {
        if [&self.name, &self.email, &self.message]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err(ContactError::MissingFields);
        }
        if !EMAIL_RE.is_match(self.email.trim()) {
            return Err(ContactError::InvalidEmail);
        }
        Ok(())
    }
}
