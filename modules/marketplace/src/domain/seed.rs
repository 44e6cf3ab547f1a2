//! Demo accounts and listings for an empty datastore.

use chrono::Utc;
use tracing::{info, warn};

use crate::contract::model::{Package, Role, Supplier, User};
use crate::domain::error::DomainError;
use crate::domain::service::accounts::hash_off_thread;
use crate::domain::service::{new_id, Repositories};

struct DemoAccount {
    name: &'static str,
    email: &'static str,
    password: &'static str,
    role: Role,
}

const DEMO_ACCOUNTS: [DemoAccount; 3] = [
    DemoAccount {
        name: "Admin",
        email: "admin@eventflow.local",
        password: "Admin123!",
        role: Role::Admin,
    },
    DemoAccount {
        name: "Supplier Demo",
        email: "supplier@eventflow.local",
        password: "Supplier123!",
        role: Role::Supplier,
    },
    DemoAccount {
        name: "Customer Demo",
        email: "customer@eventflow.local",
        password: "Customer123!",
        role: Role::Customer,
    },
];

/// Fill each empty collection (users, suppliers, packages) with demo records.
/// Collections that already hold data are left alone.
pub async fn seed_demo_data(repos: &Repositories) -> Result<(), DomainError> {
    if repos.users.list().await?.is_empty() {
        for account in &DEMO_ACCOUNTS {
            let user = User {
                id: new_id("usr"),
                name: account.name.to_string(),
                email: account.email.to_string(),
                role: account.role,
                password_hash: hash_off_thread(account.password.to_string()).await?,
                notify: true,
                created_at: Utc::now(),
            };
            repos.users.insert_if_email_free(user).await?;
        }
        info!(count = DEMO_ACCOUNTS.len(), "seeded demo accounts");
    }

    if repos.suppliers.list().await?.is_empty() {
        let listings = demo_suppliers();
        let count = listings.len();
        for supplier in listings {
            repos.suppliers.insert(supplier).await?;
        }
        info!(count, "seeded demo suppliers");
    }

    if repos.packages.list().await?.is_empty() {
        let suppliers = repos.suppliers.list().await?;
        if suppliers.len() < 3 {
            warn!(
                suppliers = suppliers.len(),
                "not enough suppliers to attach demo packages"
            );
            return Ok(());
        }
        let packages = demo_packages(&suppliers[0].id, &suppliers[1].id, &suppliers[2].id);
        let count = packages.len();
        for package in packages {
            repos.packages.insert(package).await?;
        }
        info!(count, "seeded demo packages");
    }
    Ok(())
}

struct DemoListing {
    name: &'static str,
    category: &'static str,
    location: &'static str,
    price_display: &'static str,
    amenities: &'static [&'static str],
    max_guests: u32,
    photo_query: &'static str,
    description_short: &'static str,
    description_long: &'static str,
    email: &'static str,
}

const DEMO_LISTINGS: [DemoListing; 3] = [
    DemoListing {
        name: "The Willow Barn Venue",
        category: "Venues",
        location: "Monmouthshire, South Wales",
        price_display: "From £1,500",
        amenities: &["Parking", "Garden"],
        max_guests: 120,
        photo_query: "wedding,barn",
        description_short: "Rustic countryside venue.",
        description_long: "Converted barn with indoor/outdoor spaces.",
        email: "willowbarn@example.com",
    },
    DemoListing {
        name: "Green Oak Catering",
        category: "Catering",
        location: "Cardiff & South Wales",
        price_display: "££",
        amenities: &["Vegan options", "Serving staff"],
        max_guests: 500,
        photo_query: "catering,food",
        description_short: "Seasonal menus with local produce.",
        description_long: "Buffets and formal dining. Vegan options.",
        email: "greenoakcatering@example.com",
    },
    DemoListing {
        name: "Snapshot Photography",
        category: "Photography",
        location: "Bristol & South West",
        price_display: "From £800",
        amenities: &["Online gallery"],
        max_guests: 0,
        photo_query: "wedding,photography",
        description_short: "Relaxed documentary style.",
        description_long: "Full-day or hourly packages.",
        email: "snapshotphoto@example.com",
    },
];

fn demo_suppliers() -> Vec<Supplier> {
    DEMO_LISTINGS
        .iter()
        .map(|listing| Supplier {
            id: new_id("sup"),
            owner_user_id: None,
            name: listing.name.to_string(),
            category: listing.category.to_string(),
            location: listing.location.to_string(),
            price_display: listing.price_display.to_string(),
            website: String::new(),
            license: String::new(),
            amenities: listing.amenities.iter().map(|a| a.to_string()).collect(),
            max_guests: listing.max_guests,
            photos: vec![format!(
                "https://source.unsplash.com/featured/800x600/?{}",
                listing.photo_query
            )],
            description_short: listing.description_short.to_string(),
            description_long: listing.description_long.to_string(),
            email: listing.email.to_string(),
            approved: true,
        })
        .collect()
}

fn demo_packages(venue: &str, catering: &str, photography: &str) -> Vec<Package> {
    let package = |supplier_id: &str,
                   title: &str,
                   price: &str,
                   description: &str,
                   image_query: &str,
                   featured: bool| Package {
        id: new_id("pkg"),
        supplier_id: supplier_id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        price: price.to_string(),
        image: format!("https://source.unsplash.com/featured/800x600/?{image_query}"),
        approved: true,
        featured,
    };

    vec![
        package(
            venue,
            "Barn Exclusive",
            "£3,500",
            "Full-day venue hire, ceremony & reception areas.",
            "rustic,venue",
            true,
        ),
        package(
            catering,
            "Seasonal Feast",
            "£45 pp",
            "Three-course seasonal menu with staff & setup.",
            "banquet,catering",
            false,
        ),
        package(
            photography,
            "Full Day Capture",
            "£1,200",
            "Prep through first dance, private gallery.",
            "camera,photography",
            false,
        ),
    ]
}
