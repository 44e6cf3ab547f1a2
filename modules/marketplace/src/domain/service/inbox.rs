//! Customer ↔ supplier conversations.

use chrono::Utc;
use tracing::{debug, info, instrument};

use super::{new_id, non_blank, truncate_chars, Service};
use crate::contract::model::{Caller, Message, Role, Thread, ThreadSummary};
use crate::domain::error::DomainError;
use crate::domain::ports::OutgoingMail;

/// Characters of a message quoted in its notification.
const NOTIFY_EXCERPT_CHARS: usize = 500;

impl Service {
    /// Open (or reuse) the caller's thread with an approved supplier.
    #[instrument(name = "marketplace.service.start_thread", skip(self, caller), fields(user_id = %caller.user_id))]
    pub async fn start_thread(
        &self,
        caller: &Caller,
        supplier_id: Option<&str>,
    ) -> Result<Thread, DomainError> {
        let supplier_id =
            non_blank(supplier_id).ok_or_else(|| DomainError::validation("Missing supplierId"))?;
        let supplier = self
            .approved_supplier(supplier_id)
            .await?
            .ok_or_else(DomainError::supplier_not_found)?;

        let now = Utc::now();
        let thread = self
            .repos
            .threads
            .find_or_insert(Thread {
                id: new_id("thd"),
                supplier_id: supplier.id.clone(),
                supplier_name: supplier.name.clone(),
                customer_id: caller.user_id.clone(),
                created_at: now,
                updated_at: now,
            })
            .await?;
        info!(thread_id = %thread.id, "thread ready");

        if !supplier.email.is_empty() && self.sender_wants_notifications(caller).await {
            self.notify_best_effort(OutgoingMail {
                to: supplier.email.clone(),
                subject: "New enquiry on EventFlow".to_string(),
                text: format!("A customer started a conversation about {}.", supplier.name),
            })
            .await;
        }
        Ok(thread)
    }

    /// Threads visible to the caller, each with its newest message.
    pub async fn my_threads(&self, caller: &Caller) -> Result<Vec<ThreadSummary>, DomainError> {
        let threads = self.repos.threads.list().await?;
        let visible: Vec<Thread> = match caller.role {
            Role::Admin => threads,
            Role::Customer => threads
                .into_iter()
                .filter(|t| t.customer_id == caller.user_id)
                .collect(),
            Role::Supplier => {
                let mine: Vec<String> = self
                    .owned_suppliers(&caller.user_id)
                    .await?
                    .into_iter()
                    .map(|s| s.id)
                    .collect();
                threads
                    .into_iter()
                    .filter(|t| mine.contains(&t.supplier_id))
                    .collect()
            }
        };

        let messages = self.repos.messages.list().await?;
        let items: Vec<ThreadSummary> = visible
            .into_iter()
            .map(|thread| {
                let last = messages
                    .iter()
                    .filter(|m| m.thread_id == thread.id)
                    .fold(None::<&Message>, |newest, m| match newest {
                        Some(n) if n.created_at > m.created_at => Some(n),
                        _ => Some(m),
                    })
                    .cloned();
                ThreadSummary { thread, last }
            })
            .collect();
        debug!(count = items.len(), "listed threads");
        Ok(items)
    }

    pub async fn thread_messages(
        &self,
        caller: &Caller,
        thread_id: &str,
    ) -> Result<Vec<Message>, DomainError> {
        let thread = self.participant_thread(caller, thread_id).await?;
        let mut items: Vec<Message> = self
            .repos
            .messages
            .list()
            .await?
            .into_iter()
            .filter(|m| m.thread_id == thread.id)
            .collect();
        items.sort_by_key(|m| m.created_at);
        Ok(items)
    }

    #[instrument(name = "marketplace.service.post_message", skip(self, caller, text), fields(user_id = %caller.user_id))]
    pub async fn post_message(
        &self,
        caller: &Caller,
        thread_id: &str,
        text: Option<&str>,
    ) -> Result<Message, DomainError> {
        let text = text
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| DomainError::validation("Missing text"))?;
        let thread = self.participant_thread(caller, thread_id).await?;

        let message = Message {
            id: new_id("msg"),
            thread_id: thread.id.clone(),
            from_user_id: caller.user_id.clone(),
            from_role: caller.role,
            text: truncate_chars(text, self.config.message_max_chars),
            created_at: Utc::now(),
        };
        self.repos.messages.insert(message.clone()).await?;
        self.repos
            .threads
            .touch(&thread.id, message.created_at)
            .await?;
        info!(message_id = %message.id, thread_id = %thread.id, "posted message");

        let recipient = match self.message_recipient(caller, &thread).await {
            Ok(recipient) => recipient,
            Err(e) => {
                debug!(error = %format!("{e:#}"), "recipient lookup failed; skipping notification");
                None
            }
        };
        if let Some(to) = recipient.filter(|e| !e.is_empty()) {
            if self.sender_wants_notifications(caller).await {
                self.notify_best_effort(OutgoingMail {
                    to,
                    subject: "New message on EventFlow".to_string(),
                    text: format!(
                        "You have a new message in a conversation.\n\n{}",
                        truncate_chars(&message.text, NOTIFY_EXCERPT_CHARS)
                    ),
                })
                .await;
            }
        }
        Ok(message)
    }

    /// The thread, if the caller is an admin, its customer or the owner of its supplier.
    async fn participant_thread(
        &self,
        caller: &Caller,
        thread_id: &str,
    ) -> Result<Thread, DomainError> {
        let thread = self
            .repos
            .threads
            .find_by_id(thread_id)
            .await?
            .ok_or_else(DomainError::thread_not_found)?;
        if caller.role == Role::Admin || thread.customer_id == caller.user_id {
            return Ok(thread);
        }
        let owns_supplier = self
            .repos
            .suppliers
            .find_by_id(&thread.supplier_id)
            .await?
            .is_some_and(|s| s.is_owned_by(&caller.user_id));
        if owns_supplier {
            Ok(thread)
        } else {
            Err(DomainError::forbidden())
        }
    }

    /// Contact address of the other party.
    async fn message_recipient(
        &self,
        caller: &Caller,
        thread: &Thread,
    ) -> anyhow::Result<Option<String>> {
        Ok(if caller.role == Role::Customer {
            self.repos
                .suppliers
                .find_by_id(&thread.supplier_id)
                .await?
                .map(|s| s.email)
        } else {
            self.repos
                .users
                .find_by_id(&thread.customer_id)
                .await?
                .map(|u| u.email)
        })
    }

    /// Lookup failures count as "no".
    async fn sender_wants_notifications(&self, caller: &Caller) -> bool {
        match self.repos.users.find_by_id(&caller.user_id).await {
            Ok(user) => user.is_some_and(|u| u.notify),
            Err(e) => {
                debug!(error = %format!("{e:#}"), "sender lookup failed; skipping notification");
                false
            }
        }
    }
}
