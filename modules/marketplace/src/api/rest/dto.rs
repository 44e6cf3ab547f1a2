//! REST request/response shapes. Field names follow the public JSON API.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::contract::model::{
    DailyActivity, Message, MetricsCounts, NewAccount, Package, PackageDraft, PackagePatch,
    PlanProgress, ScoredSupplier, Supplier, SupplierDraft, SupplierFilter, SupplierPatch, Thread,
    ThreadSummary, User,
};

// --- lenient input helpers ---

/// A list, or text the client still has to split.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum TextOrList {
    List(Vec<String>),
    Text(String),
}

impl TextOrList {
    /// Photos: one per list item or per line.
    pub fn into_lines(self) -> Vec<String> {
        match self {
            TextOrList::List(items) => items,
            TextOrList::Text(text) => text.lines().map(str::to_string).collect(),
        }
    }

    /// Amenities: comma-separated, list items included.
    pub fn into_comma_items(self) -> Vec<String> {
        let joined = match self {
            TextOrList::List(items) => items.join(","),
            TextOrList::Text(text) => text,
        };
        joined.split(',').map(str::to_string).collect()
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    /// Leading integer of the value; unparsable or negative input yields 0.
    pub fn to_count(&self) -> u32 {
        match self {
            NumberOrText::Number(n) if n.is_finite() && *n > 0.0 => n.trunc().min(u32::MAX as f64) as u32,
            NumberOrText::Number(_) => 0,
            NumberOrText::Text(text) => {
                let digits: String = text
                    .trim_start()
                    .trim_start_matches('+')
                    .chars()
                    .take_while(char::is_ascii_digit)
                    .collect();
                digits.parse().unwrap_or(if digits.is_empty() { 0 } else { u32::MAX })
            }
        }
    }
}

/// JavaScript-style truthiness for loosely typed flags.
pub fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

// --- auth ---

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RegisterReq {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// `supplier` or `customer`; anything else registers a customer.
    pub role: Option<String>,
}

impl From<RegisterReq> for NewAccount {
    fn from(req: RegisterReq) -> Self {
        Self {
            name: req.name.unwrap_or_default(),
            email: req.email.unwrap_or_default(),
            password: req.password.unwrap_or_default(),
            role: req.role,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LoginReq {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify: Option<bool>,
}

impl UserDto {
    pub fn with_notify(user: User) -> Self {
        let notify = Some(user.notify);
        Self {
            notify,
            ..Self::from(user)
        }
    }
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role.as_str().to_string(),
            notify: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub ok: bool,
    pub user: UserDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MeResponse {
    pub user: Option<UserDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

// --- suppliers ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplierDto {
    pub id: String,
    pub owner_user_id: Option<String>,
    pub name: String,
    pub category: String,
    pub location: String,
    #[serde(rename = "price_display")]
    pub price_display: String,
    pub website: String,
    pub license: String,
    pub amenities: Vec<String>,
    pub max_guests: u32,
    pub photos: Vec<String>,
    #[serde(rename = "description_short")]
    pub description_short: String,
    #[serde(rename = "description_long")]
    pub description_long: String,
    pub email: String,
    pub approved: bool,
}

impl From<Supplier> for SupplierDto {
    fn from(s: Supplier) -> Self {
        Self {
            id: s.id,
            owner_user_id: s.owner_user_id,
            name: s.name,
            category: s.category,
            location: s.location,
            price_display: s.price_display,
            website: s.website,
            license: s.license,
            amenities: s.amenities,
            max_guests: s.max_guests,
            photos: s.photos,
            description_short: s.description_short,
            description_long: s.description_long,
            email: s.email,
            approved: s.approved,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SupplierListDto {
    pub items: Vec<SupplierDto>,
}

impl From<Vec<Supplier>> for SupplierListDto {
    fn from(items: Vec<Supplier>) -> Self {
        Self {
            items: items.into_iter().map(SupplierDto::from).collect(),
        }
    }
}

/// Own listing with its 0–100 listing health score.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScoredSupplierDto {
    #[serde(flatten)]
    pub supplier: SupplierDto,
    pub health: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScoredSupplierListDto {
    pub items: Vec<ScoredSupplierDto>,
}

impl From<Vec<ScoredSupplier>> for ScoredSupplierListDto {
    fn from(items: Vec<ScoredSupplier>) -> Self {
        Self {
            items: items
                .into_iter()
                .map(|s| ScoredSupplierDto {
                    supplier: s.supplier.into(),
                    health: s.health,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SupplierEnvelope {
    pub ok: bool,
    pub supplier: SupplierDto,
}

impl From<Supplier> for SupplierEnvelope {
    fn from(s: Supplier) -> Self {
        Self {
            ok: true,
            supplier: s.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupplierQuery {
    pub category: Option<String>,
    pub q: Option<String>,
    pub price: Option<String>,
}

impl From<SupplierQuery> for SupplierFilter {
    fn from(q: SupplierQuery) -> Self {
        Self {
            category: q.category,
            q: q.q,
            price: q.price,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateSupplierReq {
    pub name: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub price_display: Option<String>,
    pub website: Option<String>,
    pub license: Option<String>,
    /// List or comma-separated text.
    pub amenities: Option<TextOrList>,
    #[serde(rename = "maxGuests")]
    pub max_guests: Option<NumberOrText>,
    /// List or newline-separated text.
    pub photos: Option<TextOrList>,
    pub description_short: Option<String>,
    pub description_long: Option<String>,
}

impl From<CreateSupplierReq> for SupplierDraft {
    fn from(req: CreateSupplierReq) -> Self {
        Self {
            name: req.name.unwrap_or_default(),
            category: req.category.unwrap_or_default(),
            location: req.location.unwrap_or_default(),
            price_display: req.price_display.unwrap_or_default(),
            website: req.website.unwrap_or_default(),
            license: req.license.unwrap_or_default(),
            amenities: req
                .amenities
                .map(TextOrList::into_comma_items)
                .unwrap_or_default(),
            max_guests: req.max_guests.map(|n| n.to_count()).unwrap_or(0),
            photos: req.photos.map(TextOrList::into_lines).unwrap_or_default(),
            description_short: req.description_short.unwrap_or_default(),
            description_long: req.description_long.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateSupplierReq {
    pub name: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub price_display: Option<String>,
    pub website: Option<String>,
    pub license: Option<String>,
    pub amenities: Option<TextOrList>,
    #[serde(rename = "maxGuests")]
    pub max_guests: Option<NumberOrText>,
    /// An empty list keeps the current photos.
    pub photos: Option<TextOrList>,
    pub description_short: Option<String>,
    pub description_long: Option<String>,
}

impl From<UpdateSupplierReq> for SupplierPatch {
    fn from(req: UpdateSupplierReq) -> Self {
        Self {
            name: req.name,
            category: req.category,
            location: req.location,
            price_display: req.price_display,
            website: req.website,
            license: req.license,
            description_short: req.description_short,
            description_long: req.description_long,
            amenities: req.amenities.map(TextOrList::into_comma_items),
            max_guests: req.max_guests.map(|n| n.to_count()),
            photos: req.photos.map(TextOrList::into_lines),
        }
    }
}

// --- packages ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PackageDto {
    pub id: String,
    pub supplier_id: String,
    pub title: String,
    pub description: String,
    pub price: String,
    pub image: String,
    pub approved: bool,
    pub featured: bool,
}

impl From<Package> for PackageDto {
    fn from(p: Package) -> Self {
        Self {
            id: p.id,
            supplier_id: p.supplier_id,
            title: p.title,
            description: p.description,
            price: p.price,
            image: p.image,
            approved: p.approved,
            featured: p.featured,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PackageListDto {
    pub items: Vec<PackageDto>,
}

impl From<Vec<Package>> for PackageListDto {
    fn from(items: Vec<Package>) -> Self {
        Self {
            items: items.into_iter().map(PackageDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PackageEnvelope {
    pub ok: bool,
    pub package: PackageDto,
}

impl From<Package> for PackageEnvelope {
    fn from(p: Package) -> Self {
        Self {
            ok: true,
            package: p.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePackageReq {
    pub supplier_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub image: Option<String>,
}

impl From<CreatePackageReq> for PackageDraft {
    fn from(req: CreatePackageReq) -> Self {
        Self {
            supplier_id: req.supplier_id.unwrap_or_default(),
            title: req.title.unwrap_or_default(),
            description: req.description.unwrap_or_default(),
            price: req.price.unwrap_or_default(),
            image: req.image,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdatePackageReq {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub image: Option<String>,
}

impl From<UpdatePackageReq> for PackagePatch {
    fn from(req: UpdatePackageReq) -> Self {
        Self {
            title: req.title,
            description: req.description,
            price: req.price,
            image: req.image,
        }
    }
}

// --- threads ---

/// Body naming a supplier (thread start, plan add).
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplierRefReq {
    pub supplier_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThreadDto {
    pub id: String,
    pub supplier_id: String,
    pub supplier_name: String,
    pub customer_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Thread> for ThreadDto {
    fn from(t: Thread) -> Self {
        Self {
            id: t.id,
            supplier_id: t.supplier_id,
            supplier_name: t.supplier_name,
            customer_id: t.customer_id,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ThreadEnvelope {
    pub ok: bool,
    pub thread: ThreadDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: String,
    pub thread_id: String,
    pub from_user_id: String,
    pub from_role: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageDto {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            thread_id: m.thread_id,
            from_user_id: m.from_user_id,
            from_role: m.from_role.as_str().to_string(),
            text: m.text,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageListDto {
    pub items: Vec<MessageDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageEnvelope {
    pub ok: bool,
    pub message: MessageDto,
}

/// Thread with its newest message (`null` when empty).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ThreadSummaryDto {
    #[serde(flatten)]
    pub thread: ThreadDto,
    pub last: Option<MessageDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ThreadListDto {
    pub items: Vec<ThreadSummaryDto>,
}

impl From<Vec<ThreadSummary>> for ThreadListDto {
    fn from(items: Vec<ThreadSummary>) -> Self {
        Self {
            items: items
                .into_iter()
                .map(|s| ThreadSummaryDto {
                    thread: s.thread.into(),
                    last: s.last.map(MessageDto::from),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PostMessageReq {
    pub text: Option<String>,
}

// --- plan, notes, settings ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlanProgressDto {
    /// 0–100, 25 per covered category.
    pub score: u8,
    pub covered: Vec<String>,
    pub missing: Vec<String>,
}

impl From<PlanProgress> for PlanProgressDto {
    fn from(p: PlanProgress) -> Self {
        Self {
            score: p.score,
            covered: p.covered,
            missing: p.missing,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct NotesDto {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SettingsDto {
    pub notify: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SettingsSavedDto {
    pub ok: bool,
    pub notify: bool,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SettingsReq {
    #[schema(value_type = Option<bool>)]
    pub notify: Option<Value>,
}

// --- admin ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricsCountsDto {
    pub users_total: usize,
    pub users_by_role: BTreeMap<String, usize>,
    pub suppliers_total: usize,
    pub packages_total: usize,
    pub plans_total: usize,
    pub messages_total: usize,
    pub threads_total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MetricsDto {
    pub counts: MetricsCountsDto,
}

impl From<MetricsCounts> for MetricsDto {
    fn from(c: MetricsCounts) -> Self {
        Self {
            counts: MetricsCountsDto {
                users_total: c.users_total,
                users_by_role: c.users_by_role,
                suppliers_total: c.suppliers_total,
                packages_total: c.packages_total,
                plans_total: c.plans_total,
                messages_total: c.messages_total,
                threads_total: c.threads_total,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TimeseriesDto {
    pub days: Vec<String>,
    pub pageviews: Vec<usize>,
    pub signups: Vec<usize>,
    pub messages: Vec<usize>,
}

impl From<DailyActivity> for TimeseriesDto {
    fn from(a: DailyActivity) -> Self {
        Self {
            days: a.days,
            pageviews: a.pageviews,
            signups: a.signups,
            messages: a.messages,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ApproveReq {
    #[schema(value_type = Option<bool>)]
    pub approved: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct FeatureReq {
    #[schema(value_type = Option<bool>)]
    pub featured: Option<Value>,
}

// --- site ---

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct TrackReq {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub meta: Option<Value>,
}
