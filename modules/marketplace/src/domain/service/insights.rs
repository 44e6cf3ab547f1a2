//! Admin metrics and anonymous page tracking.

use std::collections::BTreeMap;

use chrono::{DateTime, Days, NaiveDate, Utc};
use tracing::{debug, instrument};

use super::{new_id, non_blank, Service};
use crate::contract::model::{Caller, DailyActivity, MetricsCounts, Role, TrackedEvent};
use crate::domain::error::DomainError;

/// Days covered by the activity timeseries, today included.
pub const TIMESERIES_DAYS: u64 = 14;

const PAGEVIEW: &str = "pageview";

impl Service {
    pub async fn metrics(&self, caller: &Caller) -> Result<MetricsCounts, DomainError> {
        Self::require_role(caller, Role::Admin)?;
        let users = self.repos.users.list().await?;
        let mut users_by_role = BTreeMap::new();
        for user in &users {
            *users_by_role.entry(user.role.as_str().to_string()).or_insert(0) += 1;
        }

        Ok(MetricsCounts {
            users_total: users.len(),
            users_by_role,
            suppliers_total: self.repos.suppliers.list().await?.len(),
            packages_total: self.repos.packages.list().await?.len(),
            plans_total: self.repos.plans.count().await?,
            messages_total: self.repos.messages.list().await?.len(),
            threads_total: self.repos.threads.list().await?.len(),
        })
    }

    pub async fn metrics_timeseries(&self, caller: &Caller) -> Result<DailyActivity, DomainError> {
        Self::require_role(caller, Role::Admin)?;
        let days = last_days(Utc::now().date_naive(), TIMESERIES_DAYS);

        let pageviews = self
            .repos
            .events
            .list()
            .await?
            .into_iter()
            .filter(|e| e.kind == PAGEVIEW)
            .map(|e| e.created_at);
        let signups = self
            .repos
            .users
            .list()
            .await?
            .into_iter()
            .map(|u| u.created_at);
        let messages = self
            .repos
            .messages
            .list()
            .await?
            .into_iter()
            .map(|m| m.created_at);

        Ok(DailyActivity {
            pageviews: bucket_by_day(&days, pageviews),
            signups: bucket_by_day(&days, signups),
            messages: bucket_by_day(&days, messages),
            days: days.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect(),
        })
    }

    #[instrument(name = "marketplace.service.track_event", skip(self, meta))]
    pub async fn track_event(
        &self,
        kind: Option<&str>,
        meta: serde_json::Value,
    ) -> Result<(), DomainError> {
        let kind = non_blank(kind).ok_or_else(|| DomainError::validation("Missing type"))?;
        let event = TrackedEvent {
            id: new_id("evt"),
            kind: kind.to_string(),
            meta,
            created_at: Utc::now(),
        };
        self.repos.events.insert(event).await?;
        debug!("tracked event");
        Ok(())
    }
}

/// `count` consecutive days ending at `today`, oldest first.
fn last_days(today: NaiveDate, count: u64) -> Vec<NaiveDate> {
    (0..count)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .collect()
}

fn bucket_by_day(days: &[NaiveDate], stamps: impl Iterator<Item = DateTime<Utc>>) -> Vec<usize> {
    let mut counts = vec![0; days.len()];
    let Some(first) = days.first() else {
        return counts;
    };
    for stamp in stamps {
        let offset = (stamp.date_naive() - *first).num_days();
        if let Some(slot) = usize::try_from(offset).ok().and_then(|i| counts.get_mut(i)) {
            *slot += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn last_days_are_oldest_first_and_end_today() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        let days = last_days(today, 3);
        assert_eq!(
            days,
            vec![
                NaiveDate::from_ymd_opt(2025, 2, 28).unwrap(),
                NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                today,
            ]
        );
    }

    #[test]
    fn stamps_outside_the_window_are_ignored() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        let days = last_days(today, 2);
        let stamps = vec![
            Utc.with_ymd_and_hms(2025, 3, 1, 23, 59, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 2, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 2, 12, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 2, 1, 12, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 1).unwrap(),
        ];
        assert_eq!(bucket_by_day(&days, stamps.into_iter()), vec![1, 2]);
    }
}
