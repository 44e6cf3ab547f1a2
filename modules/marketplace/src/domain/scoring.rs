//! Listing health and plan progress scores.

use std::collections::HashSet;

use crate::contract::model::{PlanProgress, Supplier};

/// Categories a complete plan covers, 25 points each.
pub const PLAN_CATEGORIES: [&str; 4] = ["Venues", "Catering", "Photography", "Entertainment"];

const HEALTH_STEP: u8 = 20;
const DESCRIPTION_MIN_CHARS: usize = 120;

/// 0–100 in steps of 20.
pub fn listing_health(supplier: &Supplier) -> u8 {
    let description = if supplier.description_long.is_empty() {
        &supplier.description_short
    } else {
        &supplier.description_long
    };

    let met = [
        !supplier.photos.is_empty(),
        supplier.photos.len() >= 3,
        description.trim().chars().count() >= DESCRIPTION_MIN_CHARS,
        !supplier.amenities.is_empty(),
        supplier.max_guests > 0,
    ]
    .into_iter()
    .filter(|ok| *ok)
    .count() as u8;
    met * HEALTH_STEP
}

pub fn plan_progress(planned: &[Supplier]) -> PlanProgress {
    let present: HashSet<&str> = planned.iter().map(|s| s.category.as_str()).collect();
    let (covered, missing): (Vec<&str>, Vec<&str>) = PLAN_CATEGORIES
        .into_iter()
        .partition(|category| present.contains(category));

    PlanProgress {
        score: (covered.len() * 100 / PLAN_CATEGORIES.len()) as u8,
        covered: covered.into_iter().map(str::to_string).collect(),
        missing: missing.into_iter().map(str::to_string).collect(),
    }
}
