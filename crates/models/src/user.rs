use chrono::{DateTime, SubsecRound, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;

pub const MSG_REQUIRED: &str = "Name and email are required";
pub const MSG_INVALID_EMAIL: &str = "Invalid email format";

// local@domain.tld, no whitespace, exactly one '@'
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// A stored user record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "iso_millis::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Current time at millisecond precision, matching what the data file can hold.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// `YYYY-MM-DDTHH:MM:SS.mmmZ`, the format JavaScript's `toISOString` writes.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(D::Error::custom)
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(ts: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
            match ts {
                Some(ts) => super::serialize(ts, s),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<String>::deserialize(d)?
                .map(|raw| {
                    DateTime::parse_from_rfc3339(&raw)
                        .map(|ts| ts.with_timezone(&Utc))
                        .map_err(D::Error::custom)
                })
                .transpose()
        }
    }
}

/// Request body for create and update. Every field is optional at the wire
/// level so that missing values are reported as validation failures.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Input that passed validation; strings are trimmed and the email lower-cased.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidUserInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl UserInput {
    pub fn new(name: &str, email: &str) -> Self {
        Self { name: Some(name.into()), email: Some(email.into()), ..Default::default() }
    }

    /// Required fields first, then the email pattern.
    pub fn validate(&self) -> Result<ValidUserInput, ModelError> {
        let name = trimmed(self.name.as_deref());
        let email = trimmed(self.email.as_deref());
        if name.is_empty() || email.is_empty() {
            return Err(ModelError::Validation(MSG_REQUIRED.into()));
        }
        validate_email(&email)?;
        Ok(ValidUserInput {
            name,
            email: normalize_email(&email),
            phone: trimmed(self.phone.as_deref()),
            address: trimmed(self.address.as_deref()),
        })
    }
}

fn trimmed(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    if EMAIL_RE.is_match(email.trim()) {
        Ok(())
    } else {
        Err(ModelError::Validation(MSG_INVALID_EMAIL.into()))
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl User {
    /// Build a fresh record with a new id.
    pub fn create(input: ValidUserInput, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            email: input.email,
            phone: input.phone,
            address: input.address,
            created_at: now,
            updated_at: None,
        }
    }

    /// Replace every mutable field; `id` and `created_at` are untouched.
    pub fn apply(&mut self, input: ValidUserInput, now: DateTime<Utc>) {
        self.name = input.name;
        self.email = input.email;
        self.phone = input.phone;
        self.address = input.address;
        self.updated_at = Some(now);
    }

    pub fn has_email(&self, email: &str) -> bool {
        self.email.to_lowercase() == normalize_email(email)
    }

    /// `needle` must already be lower-cased.
    pub fn matches_search(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.email.to_lowercase().contains(needle)
    }
}
