use async_trait::async_trait;

/// A notification addressed to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// Output port for best-effort notifications. Callers log and drop failures.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> anyhow::Result<()>;
}
