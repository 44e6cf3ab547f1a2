//! On-disk record shapes. Field names match the files written by earlier
//! EventFlow releases: camelCase, except the snake_case listing texts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEntity {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub password_hash: String,
    /// Absent in old records means "on".
    #[serde(default = "default_true")]
    pub notify: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierEntity {
    pub id: String,
    #[serde(default)]
    pub owner_user_id: Option<String>,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, rename = "price_display")]
    pub price_display: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub max_guests: u32,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default, rename = "description_short")]
    pub description_short: String,
    #[serde(default, rename = "description_long")]
    pub description_long: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub approved: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageEntity {
    pub id: String,
    pub supplier_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub approved: bool,
    #[serde(default)]
    pub featured: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanEntity {
    pub id: String,
    pub user_id: String,
    pub supplier_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteEntity {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadEntity {
    pub id: String,
    pub supplier_id: String,
    #[serde(default)]
    pub supplier_name: String,
    pub customer_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEntity {
    pub id: String,
    pub thread_id: String,
    pub from_user_id: String,
    pub from_role: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEntity {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub meta: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
