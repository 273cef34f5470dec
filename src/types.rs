//! Common type definitions shared across the crate.
//!
//! This module defines:
//! - Type aliases for entity IDs (UserId, BranchId, etc.)
//! - The [`Operation`] enum used by audit events and error reporting
//!
//! # ID Types
//!
//! All entity IDs are UUIDs wrapped in type aliases for better type safety:
//!
//! - [`UserId`]: User account identifier
//! - [`BranchId`]: Branch identifier
//! - [`MasterItemId`]: Master-data item identifier
//! - [`ApplicationId`]: Service application identifier
//! - [`RegistrationId`]: Vehicle registration identifier
//! - [`FancyNumberId`]: Fancy-number booking identifier
//! - [`CashEntryId`]: Cash-register entry identifier
//!
//! # Utility Functions
//!
//! - [`abbrev_uuid`]: Abbreviate UUIDs to first 8 chars for logging

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// Type aliases for IDs
pub type UserId = Uuid;
pub type BranchId = Uuid;
pub type MasterItemId = Uuid;
pub type ApplicationId = Uuid;
pub type RegistrationId = Uuid;
pub type FancyNumberId = Uuid;
pub type CashEntryId = Uuid;
pub type ActivityLogId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}

/// Mutating operations recorded in audit events and named in errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbrev_uuid() {
        let uuid = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(abbrev_uuid(&uuid), "550e8400");
    }

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::Create.to_string(), "create");
        assert_eq!(Operation::Delete.to_string(), "delete");
    }
}
