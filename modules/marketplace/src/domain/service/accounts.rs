use chrono::Utc;
use tracing::{debug, info, instrument};
use validator::ValidateEmail;

use super::{new_id, truncate_chars, Service};
use crate::auth::password;
use crate::contract::model::{Caller, NewAccount, Role, User};
use crate::domain::error::DomainError;

const NAME_MAX_CHARS: usize = 80;

impl Service {
    #[instrument(name = "marketplace.service.register", skip(self, account), fields(email = %account.email))]
    pub async fn register(&self, account: NewAccount) -> Result<User, DomainError> {
        let name = account.name.trim();
        let email = account.email.trim().to_lowercase();
        if name.is_empty() || email.is_empty() || account.password.is_empty() {
            return Err(DomainError::missing_fields());
        }
        if !email.validate_email() {
            return Err(DomainError::validation("Invalid email"));
        }
        if !password::is_strong(&account.password) {
            return Err(DomainError::validation("Weak password"));
        }

        // Self-registration never grants admin.
        let role = match account.role.as_deref().and_then(Role::parse) {
            Some(Role::Supplier) => Role::Supplier,
            _ => Role::Customer,
        };

        let user = User {
            id: new_id("usr"),
            name: truncate_chars(name, NAME_MAX_CHARS),
            email,
            role,
            password_hash: hash_off_thread(account.password).await?,
            notify: true,
            created_at: Utc::now(),
        };

        if !self.repos.users.insert_if_email_free(user.clone()).await? {
            return Err(DomainError::EmailTaken);
        }
        info!(user_id = %user.id, role = %user.role, "registered account");
        Ok(user)
    }

    #[instrument(name = "marketplace.service.login", skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, DomainError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(DomainError::missing_fields());
        }
        let Some(user) = self.repos.users.find_by_email(email).await? else {
            debug!("login for unknown email");
            return Err(DomainError::InvalidCredentials);
        };

        let hash = user.password_hash.clone();
        let candidate = password.to_string();
        let verified =
            tokio::task::spawn_blocking(move || password::verify_password(&candidate, &hash))
                .await
                .map_err(|e| DomainError::internal(format!("password check task failed: {e}")))?;
        if !verified {
            debug!(user_id = %user.id, "login with wrong password");
            return Err(DomainError::InvalidCredentials);
        }
        info!(user_id = %user.id, "signed in");
        Ok(user)
    }

    /// The stored account behind a session, if it still exists.
    pub async fn current_user(&self, caller: &Caller) -> Result<Option<User>, DomainError> {
        Ok(self.repos.users.find_by_id(&caller.user_id).await?)
    }

    pub async fn get_settings(&self, caller: &Caller) -> Result<bool, DomainError> {
        self.current_user(caller)
            .await?
            .map(|u| u.notify)
            .ok_or_else(|| DomainError::not_found("Not found"))
    }

    #[instrument(name = "marketplace.service.save_settings", skip(self, caller), fields(user_id = %caller.user_id))]
    pub async fn save_settings(&self, caller: &Caller, notify: bool) -> Result<bool, DomainError> {
        let user = self
            .repos
            .users
            .set_notify(&caller.user_id, notify)
            .await?
            .ok_or_else(|| DomainError::not_found("Not found"))?;
        info!(notify = user.notify, "updated notification settings");
        Ok(user.notify)
    }
}

/// Argon2 is CPU-bound; keep it off the async workers.
pub(crate) async fn hash_off_thread(password: String) -> Result<String, DomainError> {
    tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| DomainError::internal(format!("password hash task failed: {e}")))?
        .map_err(|e| DomainError::internal(format!("password hashing failed: {e}")))
}
