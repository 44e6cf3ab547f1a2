//! Transport-agnostic marketplace models. Storage entities and REST DTOs
//! map to and from these types.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Supplier,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Supplier => "supplier",
            Role::Customer => "customer",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "admin" => Some(Role::Admin),
            "supplier" => Some(Role::Supplier),
            "customer" => Some(Role::Customer),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity carried by a verified session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub password_hash: String,
    pub notify: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn as_caller(&self) -> Caller {
        Caller {
            user_id: self.id.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Supplier {
    pub id: String,
    /// `None` for seeded or admin-created listings.
    pub owner_user_id: Option<String>,
    pub name: String,
    pub category: String,
    pub location: String,
    pub price_display: String,
    pub website: String,
    pub license: String,
    pub amenities: Vec<String>,
    pub max_guests: u32,
    pub photos: Vec<String>,
    pub description_short: String,
    pub description_long: String,
    /// Contact address, copied from the owner at creation.
    pub email: String,
    pub approved: bool,
}

impl Supplier {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_user_id.as_deref() == Some(user_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub id: String,
    pub supplier_id: String,
    pub title: String,
    pub description: String,
    pub price: String,
    pub image: String,
    pub approved: bool,
    pub featured: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanEntry {
    pub id: String,
    pub user_id: String,
    pub supplier_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: String,
    pub user_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Thread {
    pub id: String,
    pub supplier_id: String,
    /// Listing name at the time the thread was opened.
    pub supplier_name: String,
    pub customer_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: String,
    pub thread_id: String,
    pub from_user_id: String,
    pub from_role: Role,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackedEvent {
    pub id: String,
    pub kind: String,
    pub meta: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

// --- inputs ---

#[derive(Debug, Clone, Default)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

/// Listing fields as submitted. `photos` and `amenities` are already split.
#[derive(Debug, Clone, Default)]
pub struct SupplierDraft {
    pub name: String,
    pub category: String,
    pub location: String,
    pub price_display: String,
    pub website: String,
    pub license: String,
    pub amenities: Vec<String>,
    pub max_guests: u32,
    pub photos: Vec<String>,
    pub description_short: String,
    pub description_long: String,
}

/// Partial listing update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct SupplierPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub price_display: Option<String>,
    pub website: Option<String>,
    pub license: Option<String>,
    pub description_short: Option<String>,
    pub description_long: Option<String>,
    pub amenities: Option<Vec<String>>,
    pub max_guests: Option<u32>,
    /// An empty list keeps the stored photos.
    pub photos: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct PackageDraft {
    pub supplier_id: String,
    pub title: String,
    pub description: String,
    pub price: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PackagePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SupplierFilter {
    pub category: Option<String>,
    pub q: Option<String>,
    pub price: Option<String>,
}

// --- read models ---

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSupplier {
    pub supplier: Supplier,
    pub health: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThreadSummary {
    pub thread: Thread,
    pub last: Option<Message>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanProgress {
    pub score: u8,
    pub covered: Vec<String>,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MetricsCounts {
    pub users_total: usize,
    /// role name → count, only roles that occur.
    pub users_by_role: std::collections::BTreeMap<String, usize>,
    pub suppliers_total: usize,
    pub packages_total: usize,
    pub plans_total: usize,
    pub messages_total: usize,
    pub threads_total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyActivity {
    /// `YYYY-MM-DD`, oldest first.
    pub days: Vec<String>,
    pub pageviews: Vec<usize>,
    pub signups: Vec<usize>,
    pub messages: Vec<usize>,
}
