//! Master-data categories, descriptors, and item models.
//!
//! The seven reference categories are a closed set. Each category carries a
//! static [`CategoryDescriptor`] naming its label and field schema; payload
//! validation and the client's form/row rendering both consume the same
//! descriptor instead of switching on category names ad hoc.

use std::collections::BTreeMap;

use crate::db::models::masters::MasterItemDBResponse;
use crate::errors::{Error, Result};
use crate::types::MasterItemId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The seven master-data categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "master_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MasterCategory {
    RtoServices,
    Agents,
    VehicleClass,
    MvdOffices,
    ApplicationStatus,
    BankAccounts,
    PaymentModes,
}

impl MasterCategory {
    pub const ALL: [MasterCategory; 7] = [
        MasterCategory::RtoServices,
        MasterCategory::Agents,
        MasterCategory::VehicleClass,
        MasterCategory::MvdOffices,
        MasterCategory::ApplicationStatus,
        MasterCategory::BankAccounts,
        MasterCategory::PaymentModes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MasterCategory::RtoServices => "rto_services",
            MasterCategory::Agents => "agents",
            MasterCategory::VehicleClass => "vehicle_class",
            MasterCategory::MvdOffices => "mvd_offices",
            MasterCategory::ApplicationStatus => "application_status",
            MasterCategory::BankAccounts => "bank_accounts",
            MasterCategory::PaymentModes => "payment_modes",
        }
    }

    /// Field schema for items in this category, beyond the shared `code` field.
    pub fn descriptor(&self) -> &'static CategoryDescriptor {
        const RTO_SERVICES: CategoryDescriptor = CategoryDescriptor {
            label: "RTO Services",
            fields: &[FieldSpec::required("service", "Service"), FieldSpec::optional("description", "Description")],
        };
        const AGENTS: CategoryDescriptor = CategoryDescriptor {
            label: "Agents",
            fields: &[
                FieldSpec::required("name", "Name"),
                FieldSpec::optional("contact", "Contact"),
                FieldSpec::optional("address", "Address"),
            ],
        };
        const VEHICLE_CLASS: CategoryDescriptor = CategoryDescriptor {
            label: "Vehicle Class",
            fields: &[FieldSpec::required("class", "Class"), FieldSpec::optional("description", "Description")],
        };
        const MVD_OFFICES: CategoryDescriptor = CategoryDescriptor {
            label: "MVD Offices",
            fields: &[FieldSpec::required("office", "Office"), FieldSpec::optional("address", "Address")],
        };
        const APPLICATION_STATUS: CategoryDescriptor = CategoryDescriptor {
            label: "Application Status",
            fields: &[FieldSpec::required("status", "Status")],
        };
        const BANK_ACCOUNTS: CategoryDescriptor = CategoryDescriptor {
            label: "Bank Accounts",
            fields: &[
                FieldSpec::required("bank", "Bank"),
                FieldSpec::optional("branch", "Branch"),
                FieldSpec::optional("account_number", "Account Number"),
            ],
        };
        const PAYMENT_MODES: CategoryDescriptor = CategoryDescriptor {
            label: "Payment Modes",
            fields: &[FieldSpec::required("method", "Method"), FieldSpec::optional("description", "Description")],
        };

        match self {
            MasterCategory::RtoServices => &RTO_SERVICES,
            MasterCategory::Agents => &AGENTS,
            MasterCategory::VehicleClass => &VEHICLE_CLASS,
            MasterCategory::MvdOffices => &MVD_OFFICES,
            MasterCategory::ApplicationStatus => &APPLICATION_STATUS,
            MasterCategory::BankAccounts => &BANK_ACCOUNTS,
            MasterCategory::PaymentModes => &PAYMENT_MODES,
        }
    }
}

/// Static schema for one master category.
#[derive(Debug)]
pub struct CategoryDescriptor {
    pub label: &'static str,
    pub fields: &'static [FieldSpec],
}

impl CategoryDescriptor {
    /// Validate an item's field map against this schema.
    ///
    /// Unknown fields are rejected; required fields must be present and
    /// non-blank.
    pub fn validate(&self, fields: &BTreeMap<String, String>) -> Result<()> {
        for name in fields.keys() {
            if !self.fields.iter().any(|spec| spec.name == name) {
                return Err(Error::BadRequest {
                    message: format!("Unknown field '{name}' for {}", self.label),
                });
            }
        }

        for spec in self.fields {
            if spec.required && fields.get(spec.name).is_none_or(|v| v.trim().is_empty()) {
                return Err(Error::BadRequest {
                    message: format!("Field '{}' is required for {}", spec.name, self.label),
                });
            }
        }

        Ok(())
    }
}

/// A single field in a category's schema.
#[derive(Debug, Serialize, ToSchema)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub required: bool,
}

impl FieldSpec {
    const fn required(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            required: true,
        }
    }

    const fn optional(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            required: false,
        }
    }
}

/// Descriptor response for one category (schema served to the form renderer).
#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryDescriptorResponse {
    pub category: MasterCategory,
    pub label: &'static str,
    pub fields: &'static [FieldSpec],
}

// Master item request/response models
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MasterItemCreate {
    pub code: String,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct MasterItemUpdate {
    pub code: Option<String>,
    pub fields: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MasterItemResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: MasterItemId,
    pub category: MasterCategory,
    pub code: String,
    pub fields: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

impl From<MasterItemDBResponse> for MasterItemResponse {
    fn from(db: MasterItemDBResponse) -> Self {
        Self {
            id: db.id,
            category: db.category,
            code: db.code,
            fields: db.fields,
            created_at: db.created_at,
        }
    }
}
