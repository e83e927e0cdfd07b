//! Cat document model and DTOs.
//!
//! The wire format is camelCase (`stringsArray`) while columns stay
//! snake_case; serde handles the rename, sqlx maps columns by field name.

use chassis_core::types::{DocId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A cat row from the `cats` table.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Cat {
    pub id: DocId,
    pub index: String,
    pub string: Option<String>,
    pub number: Option<f64>,
    pub strings_array: Option<Vec<String>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for creating a cat.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCat {
    #[validate(length(min = 1, max = 128))]
    pub index: String,
    pub string: Option<String>,
    pub number: Option<f64>,
    pub strings_array: Option<Vec<String>>,
}

/// Request body for a partial cat update. Omitted fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCat {
    #[validate(length(min = 1, max = 128))]
    pub index: Option<String>,
    pub string: Option<String>,
    pub number: Option<f64>,
    pub strings_array: Option<Vec<String>>,
}
