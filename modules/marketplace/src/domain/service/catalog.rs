//! Public catalogue, supplier self-service and admin moderation.

use tracing::{debug, info, instrument};

use super::{new_id, non_blank, truncate_chars, Service};
use crate::contract::model::{
    Caller, Package, PackageDraft, PackagePatch, Role, ScoredSupplier, Supplier, SupplierDraft,
    SupplierFilter, SupplierPatch,
};
use crate::domain::error::DomainError;
use crate::domain::scoring;

const PHOTO_PLACEHOLDER_BASE: &str = "https://source.unsplash.com/featured/800x600/?event,";
pub const PACKAGE_IMAGE_PLACEHOLDER: &str =
    "https://source.unsplash.com/featured/800x600/?package,event";

/// Public pages listed in the sitemap ahead of the supplier pages.
const SITEMAP_PAGES: [&str; 5] = [
    "/",
    "/suppliers.html",
    "/start.html",
    "/plan.html",
    "/auth.html",
];

struct Limits;

impl Limits {
    const NAME: usize = 120;
    const LOCATION: usize = 120;
    const PRICE_DISPLAY: usize = 60;
    const WEBSITE: usize = 200;
    const LICENSE: usize = 120;
    const DESCRIPTION_SHORT: usize = 220;
    const DESCRIPTION_LONG: usize = 2000;
    const PACKAGE_TITLE: usize = 120;
    const PACKAGE_DESCRIPTION: usize = 1500;
    const PACKAGE_PRICE: usize = 60;
}

impl Service {
    // --- public ---

    pub async fn list_suppliers(&self, filter: &SupplierFilter) -> Result<Vec<Supplier>, DomainError> {
        let q = non_blank(filter.q.as_deref()).map(str::to_lowercase);
        let category = filter.category.as_deref().filter(|c| !c.is_empty());
        let price = filter.price.as_deref().filter(|p| !p.is_empty());

        let items: Vec<Supplier> = self
            .repos
            .suppliers
            .list()
            .await?
            .into_iter()
            .filter(|s| s.approved)
            .filter(|s| category.map_or(true, |c| s.category == c))
            .filter(|s| price.map_or(true, |p| s.price_display.contains(p)))
            .filter(|s| {
                q.as_deref().map_or(true, |q| {
                    [&s.name, &s.description_short, &s.location]
                        .iter()
                        .any(|field| field.to_lowercase().contains(q))
                })
            })
            .collect();
        debug!(count = items.len(), "listed suppliers");
        Ok(items)
    }

    pub async fn get_supplier(&self, id: &str) -> Result<Supplier, DomainError> {
        self.approved_supplier(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Not found"))
    }

    pub async fn supplier_packages(&self, supplier_id: &str) -> Result<Vec<Package>, DomainError> {
        let supplier = self
            .approved_supplier(supplier_id)
            .await?
            .ok_or_else(DomainError::supplier_not_found)?;
        Ok(self
            .repos
            .packages
            .list()
            .await?
            .into_iter()
            .filter(|p| p.supplier_id == supplier.id && p.approved)
            .collect())
    }

    /// Approved packages, featured ones first, capped at `featured_limit`.
    pub async fn featured_packages(&self) -> Result<Vec<Package>, DomainError> {
        let mut items: Vec<Package> = self
            .repos
            .packages
            .list()
            .await?
            .into_iter()
            .filter(|p| p.approved)
            .collect();
        // Stable: storage order is kept within each group.
        items.sort_by_key(|p| !p.featured);
        items.truncate(self.config.featured_limit);
        Ok(items)
    }

    pub async fn search_packages(&self, q: &str) -> Result<Vec<Package>, DomainError> {
        let q = q.to_lowercase();
        Ok(self
            .repos
            .packages
            .list()
            .await?
            .into_iter()
            .filter(|p| {
                p.approved
                    && (p.title.to_lowercase().contains(&q)
                        || p.description.to_lowercase().contains(&q))
            })
            .collect())
    }

    pub async fn sitemap_xml(&self) -> Result<String, DomainError> {
        let base = self.config.public_base_url.trim_end_matches('/');
        let suppliers = self.repos.suppliers.list().await?;

        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#,
        );
        let pages = SITEMAP_PAGES.iter().map(|page| format!("{base}{page}"));
        let listings = suppliers
            .iter()
            .filter(|s| s.approved)
            .map(|s| format!("{base}/supplier.html?id={}", s.id));
        for loc in pages.chain(listings) {
            xml.push_str("<url><loc>");
            xml.push_str(&xml_escape(&loc));
            xml.push_str("</loc></url>");
        }
        xml.push_str("</urlset>");
        Ok(xml)
    }

    // --- supplier self-service ---

    pub async fn my_suppliers(&self, caller: &Caller) -> Result<Vec<ScoredSupplier>, DomainError> {
        Self::require_role(caller, Role::Supplier)?;
        Ok(self
            .owned_suppliers(&caller.user_id)
            .await?
            .into_iter()
            .map(|supplier| ScoredSupplier {
                health: scoring::listing_health(&supplier),
                supplier,
            })
            .collect())
    }

    #[instrument(name = "marketplace.service.create_supplier", skip(self, caller, draft), fields(user_id = %caller.user_id))]
    pub async fn create_supplier(
        &self,
        caller: &Caller,
        draft: SupplierDraft,
    ) -> Result<Supplier, DomainError> {
        Self::require_role(caller, Role::Supplier)?;
        if draft.name.trim().is_empty() || draft.category.trim().is_empty() {
            return Err(DomainError::missing_fields());
        }

        let contact = self
            .repos
            .users
            .find_by_id(&caller.user_id)
            .await?
            .map(|u| u.email)
            .unwrap_or_default();
        let photos = clean_list(draft.photos);
        let photos = if photos.is_empty() {
            vec![placeholder_photo(&draft.category)]
        } else {
            photos
        };

        let supplier = Supplier {
            id: new_id("sup"),
            owner_user_id: Some(caller.user_id.clone()),
            name: truncate_chars(&draft.name, Limits::NAME),
            category: draft.category,
            location: truncate_chars(&draft.location, Limits::LOCATION),
            price_display: truncate_chars(&draft.price_display, Limits::PRICE_DISPLAY),
            website: truncate_chars(&draft.website, Limits::WEBSITE),
            license: truncate_chars(&draft.license, Limits::LICENSE),
            amenities: clean_list(draft.amenities),
            max_guests: draft.max_guests,
            photos,
            description_short: truncate_chars(&draft.description_short, Limits::DESCRIPTION_SHORT),
            description_long: truncate_chars(&draft.description_long, Limits::DESCRIPTION_LONG),
            email: contact,
            approved: false,
        };
        self.repos.suppliers.insert(supplier.clone()).await?;
        info!(supplier_id = %supplier.id, "created supplier listing");
        Ok(supplier)
    }

    /// Apply `patch` to one of the caller's listings and send it back for review.
    #[instrument(name = "marketplace.service.update_supplier", skip(self, caller, patch), fields(user_id = %caller.user_id))]
    pub async fn update_supplier(
        &self,
        caller: &Caller,
        id: &str,
        patch: SupplierPatch,
    ) -> Result<Supplier, DomainError> {
        Self::require_role(caller, Role::Supplier)?;
        let mut supplier = self
            .repos
            .suppliers
            .find_by_id(id)
            .await?
            .filter(|s| s.is_owned_by(&caller.user_id))
            .ok_or_else(|| DomainError::not_found("Not found"))?;

        let text_fields = [
            (&mut supplier.name, patch.name, Limits::NAME),
            (&mut supplier.category, patch.category, usize::MAX),
            (&mut supplier.location, patch.location, Limits::LOCATION),
            (&mut supplier.price_display, patch.price_display, Limits::PRICE_DISPLAY),
            (&mut supplier.website, patch.website, Limits::WEBSITE),
            (&mut supplier.license, patch.license, Limits::LICENSE),
            (
                &mut supplier.description_short,
                patch.description_short,
                Limits::DESCRIPTION_SHORT,
            ),
            (
                &mut supplier.description_long,
                patch.description_long,
                Limits::DESCRIPTION_LONG,
            ),
        ];
        for (field, value, max) in text_fields {
            if let Some(value) = value {
                *field = truncate_chars(&value, max);
            }
        }
        if let Some(amenities) = patch.amenities {
            supplier.amenities = clean_list(amenities);
        }
        if let Some(max_guests) = patch.max_guests {
            supplier.max_guests = max_guests;
        }
        if let Some(photos) = patch.photos.map(clean_list).filter(|p| !p.is_empty()) {
            supplier.photos = photos;
        }
        supplier.approved = false;

        if !self.repos.suppliers.update(supplier.clone()).await? {
            return Err(DomainError::not_found("Not found"));
        }
        info!(supplier_id = %supplier.id, "updated supplier listing");
        Ok(supplier)
    }

    pub async fn my_packages(&self, caller: &Caller) -> Result<Vec<Package>, DomainError> {
        Self::require_role(caller, Role::Supplier)?;
        let mine: Vec<String> = self
            .owned_suppliers(&caller.user_id)
            .await?
            .into_iter()
            .map(|s| s.id)
            .collect();
        Ok(self
            .repos
            .packages
            .list()
            .await?
            .into_iter()
            .filter(|p| mine.contains(&p.supplier_id))
            .collect())
    }

    #[instrument(name = "marketplace.service.create_package", skip(self, caller, draft), fields(user_id = %caller.user_id, supplier_id = %draft.supplier_id))]
    pub async fn create_package(
        &self,
        caller: &Caller,
        draft: PackageDraft,
    ) -> Result<Package, DomainError> {
        Self::require_role(caller, Role::Supplier)?;
        if draft.supplier_id.trim().is_empty() || draft.title.trim().is_empty() {
            return Err(DomainError::missing_fields());
        }
        let owned = self
            .repos
            .suppliers
            .find_by_id(&draft.supplier_id)
            .await?
            .is_some_and(|s| s.is_owned_by(&caller.user_id));
        if !owned {
            return Err(DomainError::forbidden());
        }

        let package = Package {
            id: new_id("pkg"),
            supplier_id: draft.supplier_id,
            title: truncate_chars(&draft.title, Limits::PACKAGE_TITLE),
            description: truncate_chars(&draft.description, Limits::PACKAGE_DESCRIPTION),
            price: truncate_chars(&draft.price, Limits::PACKAGE_PRICE),
            image: non_blank(draft.image.as_deref())
                .unwrap_or(PACKAGE_IMAGE_PLACEHOLDER)
                .to_string(),
            approved: false,
            featured: false,
        };
        self.repos.packages.insert(package.clone()).await?;
        info!(package_id = %package.id, "created package");
        Ok(package)
    }

    #[instrument(name = "marketplace.service.update_package", skip(self, caller, patch), fields(user_id = %caller.user_id))]
    pub async fn update_package(
        &self,
        caller: &Caller,
        id: &str,
        patch: PackagePatch,
    ) -> Result<Package, DomainError> {
        Self::require_role(caller, Role::Supplier)?;
        let not_found = || DomainError::not_found("Not found");
        let mut package = self
            .repos
            .packages
            .find_by_id(id)
            .await?
            .ok_or_else(not_found)?;
        let owned = self
            .repos
            .suppliers
            .find_by_id(&package.supplier_id)
            .await?
            .is_some_and(|s| s.is_owned_by(&caller.user_id));
        if !owned {
            return Err(not_found());
        }

        if let Some(title) = non_blank(patch.title.as_deref()) {
            package.title = truncate_chars(title, Limits::PACKAGE_TITLE);
        }
        if let Some(description) = patch.description {
            package.description = truncate_chars(&description, Limits::PACKAGE_DESCRIPTION);
        }
        if let Some(price) = patch.price {
            package.price = truncate_chars(&price, Limits::PACKAGE_PRICE);
        }
        if let Some(image) = non_blank(patch.image.as_deref()) {
            package.image = image.to_string();
        }
        package.approved = false;

        if !self.repos.packages.update(package.clone()).await? {
            return Err(not_found());
        }
        info!(package_id = %package.id, "updated package");
        Ok(package)
    }

    // --- admin ---

    pub async fn all_suppliers(&self, caller: &Caller) -> Result<Vec<Supplier>, DomainError> {
        Self::require_role(caller, Role::Admin)?;
        Ok(self.repos.suppliers.list().await?)
    }

    pub async fn all_packages(&self, caller: &Caller) -> Result<Vec<Package>, DomainError> {
        Self::require_role(caller, Role::Admin)?;
        Ok(self.repos.packages.list().await?)
    }

    #[instrument(name = "marketplace.service.approve_supplier", skip(self, caller))]
    pub async fn set_supplier_approved(
        &self,
        caller: &Caller,
        id: &str,
        approved: bool,
    ) -> Result<Supplier, DomainError> {
        Self::require_role(caller, Role::Admin)?;
        let mut supplier = self
            .repos
            .suppliers
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Not found"))?;
        supplier.approved = approved;
        if !self.repos.suppliers.update(supplier.clone()).await? {
            return Err(DomainError::not_found("Not found"));
        }
        info!(approved, "moderated supplier");
        Ok(supplier)
    }

    #[instrument(name = "marketplace.service.approve_package", skip(self, caller))]
    pub async fn set_package_approved(
        &self,
        caller: &Caller,
        id: &str,
        approved: bool,
    ) -> Result<Package, DomainError> {
        self.moderate_package(caller, id, |p| p.approved = approved)
            .await
            .inspect(|_| info!(approved, "moderated package"))
    }

    #[instrument(name = "marketplace.service.feature_package", skip(self, caller))]
    pub async fn set_package_featured(
        &self,
        caller: &Caller,
        id: &str,
        featured: bool,
    ) -> Result<Package, DomainError> {
        self.moderate_package(caller, id, |p| p.featured = featured)
            .await
            .inspect(|_| info!(featured, "changed featured flag"))
    }

    // --- helpers ---

    async fn moderate_package(
        &self,
        caller: &Caller,
        id: &str,
        apply: impl FnOnce(&mut Package),
    ) -> Result<Package, DomainError> {
        Self::require_role(caller, Role::Admin)?;
        let mut package = self
            .repos
            .packages
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Not found"))?;
        apply(&mut package);
        if !self.repos.packages.update(package.clone()).await? {
            return Err(DomainError::not_found("Not found"));
        }
        Ok(package)
    }

    pub(crate) async fn approved_supplier(&self, id: &str) -> Result<Option<Supplier>, DomainError> {
        Ok(self
            .repos
            .suppliers
            .find_by_id(id)
            .await?
            .filter(|s| s.approved))
    }

    pub(crate) async fn owned_suppliers(&self, user_id: &str) -> Result<Vec<Supplier>, DomainError> {
        Ok(self
            .repos
            .suppliers
            .list()
            .await?
            .into_iter()
            .filter(|s| s.is_owned_by(user_id))
            .collect())
    }
}

/// Trim entries and drop the empty ones.
fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn placeholder_photo(category: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(category.as_bytes()).collect();
    // form encoding writes spaces as '+', path-style links expect %20
    format!("{PHOTO_PLACEHOLDER_BASE}{}", encoded.replace('+', "%20"))
}

fn xml_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
