//! # Application Records
//!
//! One record per submitted job application form.
//!
//! ## Schema
//! - id (**uuid v4**), generated on creation
//! - email (**string**), basic `local@domain.tld` shape
//! - firstName, lastName (**string**), trimmed, at most 100 chars
//! - country (**string**)
//! - searchFilters (**string map**), stored verbatim
//! - createdAt (**UTC timestamp**), never mutated
//!
//! Records are write-once. Nothing in the backend updates or deletes them.
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MAX_NAME_CHARS: usize = 100;
pub const MAX_EMAIL_CHARS: usize = 254;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

pub type SearchFilters = BTreeMap<String, String>;

/// Validated form input that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewApplication {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub country: String,
    pub search_filters: SearchFilters,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub country: String,
    pub search_filters: SearchFilters,
    pub created_at: DateTime<Utc>,
}

impl ApplicationRecord {
    pub fn new(application: NewApplication) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: application.email,
            first_name: application.first_name,
            last_name: application.last_name,
            country: application.country,
            search_filters: application.search_filters,
            created_at: Utc::now(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Schema check every store runs before writing a record.
    ///
    /// Returns the first violation as a user-facing message.
    pub fn validate(&self) -> Result<(), String> {
        if self.email.chars().count() > MAX_EMAIL_CHARS || !EMAIL_PATTERN.is_match(&self.email) {
            return Err("Please provide a valid email address".to_string());
        }

        for (field, value) in [("firstName", &self.first_name), ("lastName", &self.last_name)] {
            if value.chars().count() > MAX_NAME_CHARS {
                return Err(format!(
                    "{field} cannot be longer than {MAX_NAME_CHARS} characters"
                ));
            }

            // Names end up in mail headers, where line breaks are not representable.
            if value.chars().any(char::is_control) {
                return Err(format!("{field} cannot contain control characters"));
            }
        }

        Ok(())
    }
}
