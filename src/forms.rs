//! Payloads for the feedback and alert-subscription forms.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(u8),

    #[error("select at least one sensor")]
    NoSensors,

    #[error("sensor {0} selected more than once")]
    DuplicateSensor(String),
}

/// Body of `POST /feedback`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
    pub rating: u8,
}

impl FeedbackSubmission {
    pub fn validate(&self) -> Result<(), FormError> {
        require("name", &self.name)?;
        validate_email(&self.email)?;
        require("message", &self.message)?;
        if !(1..=5).contains(&self.rating) {
            return Err(FormError::RatingOutOfRange(self.rating));
        }
        Ok(())
    }
}

/// Star rating caption; empty for anything outside 1..=5.
pub fn rating_text(rating: u8) -> &'static str {
    match rating {
        1 => "Poor",
        2 => "Fair",
        3 => "Good",
        4 => "Very Good",
        5 => "Excellent",
        _ => "",
    }
}

/// Body of `POST /alerts/users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertSubscription {
    pub name: String,
    pub email: String,
    /// Sensor ids to receive alerts for.
    pub sensors: Vec<String>,
}

impl AlertSubscription {
    pub fn validate(&self) -> Result<(), FormError> {
        require("name", &self.name)?;
        validate_email(&self.email)?;
        if self.sensors.is_empty() {
            return Err(FormError::NoSensors);
        }
        for (i, sensor) in self.sensors.iter().enumerate() {
            if self.sensors[..i].contains(sensor) {
                return Err(FormError::DuplicateSensor(sensor.clone()));
            }
        }
        Ok(())
    }
}

fn require(field: &'static str, value: &str) -> Result<(), FormError> {
    if value.trim().is_empty() {
        Err(FormError::Missing(field))
    } else {
        Ok(())
    }
}

/// Shape check only: `local@domain.tld` with no whitespace.
fn validate_email(email: &str) -> Result<(), FormError> {
    let invalid = || FormError::InvalidEmail(email.to_string());

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        _ => Err(invalid()),
    }
}
