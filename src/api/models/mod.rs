//! API request and response data models.
//!
//! This module contains the data structures used for HTTP request deserialization
//! and response serialization. These models define the public API contract.
//!
//! # Design Principles
//!
//! - **Separation of Concerns**: API models are distinct from database models,
//!   allowing independent evolution of API and storage representations
//! - **Validation**: Models use serde for deserialization and validation
//! - **OpenAPI**: All models are annotated with `utoipa` for automatic API docs
//!
//! # Model Categories
//!
//! - [`users`]: User profiles, roles, and creation/update requests
//! - [`branches`]: Branch master records
//! - [`masters`]: Master-data categories, descriptors, and items
//! - [`applications`]: Service application records
//! - [`registrations`]: Vehicle registration records and allotment
//! - [`fancy_numbers`]: Fancy-number bookings and auction results
//! - [`cash_register`]: Cash-register entries and reconciliation results
//! - [`activity_logs`]: Audit trail entries
//! - [`dashboard`]: Role-dependent portal statistics
//! - [`auth`]: Login and password management payloads

pub mod activity_logs;
pub mod applications;
pub mod auth;
pub mod branches;
pub mod cash_register;
pub mod dashboard;
pub mod fancy_numbers;
pub mod masters;
pub mod pagination;
pub mod registrations;
pub mod users;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

/// Deserialize a money field leniently: accepts a JSON number or string,
/// treating blank, missing, or unparsable input as zero.
pub fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => Decimal::from_str(&n.to_string()).unwrap_or_default(),
        Some(serde_json::Value::String(s)) => Decimal::from_str(s.trim()).unwrap_or_default(),
        _ => Decimal::ZERO,
    })
}

/// Deserialize an optional date field: missing, null, or blank input becomes
/// `None`; anything else must parse as an ISO `YYYY-MM-DD` date.
pub fn lenient_date<'de, D>(deserializer: D) -> Result<Option<chrono::NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => chrono::NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Fees {
        #[serde(default, deserialize_with = "lenient_decimal")]
        amount: Decimal,
    }

    #[test]
    fn test_lenient_decimal_accepts_numbers_and_strings() {
        let fees: Fees = serde_json::from_str(r#"{"amount": 150.50}"#).unwrap();
        assert_eq!(fees.amount, Decimal::new(15050, 2));

        let fees: Fees = serde_json::from_str(r#"{"amount": "99.99"}"#).unwrap();
        assert_eq!(fees.amount, Decimal::new(9999, 2));
    }

    #[test]
    fn test_lenient_decimal_defaults_to_zero() {
        for raw in [r#"{}"#, r#"{"amount": ""}"#, r#"{"amount": "abc"}"#, r#"{"amount": null}"#] {
            let fees: Fees = serde_json::from_str(raw).unwrap();
            assert_eq!(fees.amount, Decimal::ZERO, "input: {raw}");
        }
    }

    #[derive(Deserialize)]
    struct Dated {
        #[serde(default, deserialize_with = "lenient_date")]
        expiry: Option<chrono::NaiveDate>,
    }

    #[test]
    fn test_lenient_date() {
        let d: Dated = serde_json::from_str(r#"{"expiry": "2026-03-31"}"#).unwrap();
        assert_eq!(d.expiry, chrono::NaiveDate::from_ymd_opt(2026, 3, 31));

        for raw in [r#"{}"#, r#"{"expiry": ""}"#, r#"{"expiry": null}"#, r#"{"expiry": "  "}"#] {
            let d: Dated = serde_json::from_str(raw).unwrap();
            assert_eq!(d.expiry, None, "input: {raw}");
        }

        assert!(serde_json::from_str::<Dated>(r#"{"expiry": "31/03/2026"}"#).is_err());
    }
}
