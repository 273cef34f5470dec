//! Database models for master-data items.

use std::collections::BTreeMap;

use crate::api::models::masters::{MasterCategory, MasterItemCreate, MasterItemUpdate};
use crate::types::MasterItemId;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct MasterItemCreateDBRequest {
    pub category: MasterCategory,
    pub code: String,
    pub fields: BTreeMap<String, String>,
}

impl MasterItemCreateDBRequest {
    pub fn from_api(category: MasterCategory, api: MasterItemCreate) -> Self {
        Self {
            category,
            code: api.code,
            fields: api.fields,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MasterItemUpdateDBRequest {
    pub code: Option<String>,
    pub fields: Option<BTreeMap<String, String>>,
}

impl From<MasterItemUpdate> for MasterItemUpdateDBRequest {
    fn from(update: MasterItemUpdate) -> Self {
        Self {
            code: update.code,
            fields: update.fields,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MasterItemDBResponse {
    pub id: MasterItemId,
    pub category: MasterCategory,
    pub code: String,
    pub fields: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}
