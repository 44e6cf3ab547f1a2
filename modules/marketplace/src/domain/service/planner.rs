use chrono::Utc;
use tracing::{debug, info, instrument};

use super::{new_id, non_blank, Service};
use crate::contract::model::{Caller, PlanEntry, PlanProgress, Supplier};
use crate::domain::error::DomainError;
use crate::domain::scoring;

impl Service {
    /// Approved suppliers in the caller's plan, in the order they were added.
    pub async fn get_plan(&self, caller: &Caller) -> Result<Vec<Supplier>, DomainError> {
        Self::require_customer(caller)?;
        let entries = self.repos.plans.list_for_user(&caller.user_id).await?;
        let approved: Vec<Supplier> = self
            .repos
            .suppliers
            .list()
            .await?
            .into_iter()
            .filter(|s| s.approved)
            .collect();
        Ok(entries
            .iter()
            .filter_map(|e| approved.iter().find(|s| s.id == e.supplier_id).cloned())
            .collect())
    }

    #[instrument(name = "marketplace.service.add_to_plan", skip(self, caller), fields(user_id = %caller.user_id))]
    pub async fn add_to_plan(
        &self,
        caller: &Caller,
        supplier_id: Option<&str>,
    ) -> Result<(), DomainError> {
        Self::require_customer(caller)?;
        let supplier_id =
            non_blank(supplier_id).ok_or_else(|| DomainError::validation("Missing supplierId"))?;
        if self.approved_supplier(supplier_id).await?.is_none() {
            return Err(DomainError::supplier_not_found());
        }

        let inserted = self
            .repos
            .plans
            .insert_if_absent(PlanEntry {
                id: new_id("pln"),
                user_id: caller.user_id.clone(),
                supplier_id: supplier_id.to_string(),
                created_at: Utc::now(),
            })
            .await?;
        if inserted {
            info!("added supplier to plan");
        } else {
            debug!("supplier already in plan");
        }
        Ok(())
    }

    #[instrument(name = "marketplace.service.remove_from_plan", skip(self, caller), fields(user_id = %caller.user_id))]
    pub async fn remove_from_plan(&self, caller: &Caller, supplier_id: &str) -> Result<(), DomainError> {
        Self::require_customer(caller)?;
        let removed = self.repos.plans.remove(&caller.user_id, supplier_id).await?;
        debug!(removed, "removed supplier from plan");
        Ok(())
    }

    pub async fn plan_progress(&self, caller: &Caller) -> Result<PlanProgress, DomainError> {
        let planned = self.get_plan(caller).await?;
        Ok(scoring::plan_progress(&planned))
    }

    pub async fn get_notes(&self, caller: &Caller) -> Result<String, DomainError> {
        Self::require_customer(caller)?;
        Ok(self
            .repos
            .notes
            .find_for_user(&caller.user_id)
            .await?
            .map(|n| n.text)
            .unwrap_or_default())
    }

    #[instrument(name = "marketplace.service.save_notes", skip(self, caller, text), fields(user_id = %caller.user_id))]
    pub async fn save_notes(&self, caller: &Caller, text: String) -> Result<(), DomainError> {
        Self::require_customer(caller)?;
        let note = self
            .repos
            .notes
            .upsert(&caller.user_id, text, Utc::now())
            .await?;
        debug!(note_id = %note.id, chars = note.text.chars().count(), "saved notes");
        Ok(())
    }
}
