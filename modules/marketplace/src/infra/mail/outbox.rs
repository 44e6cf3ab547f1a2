//! Writes each notification as an `.eml` file instead of delivering it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use tokio::io::AsyncWriteExt;

use crate::domain::ports::{Notifier, OutgoingMail};

pub struct OutboxNotifier {
    /// `None` disables recording.
    dir: Option<PathBuf>,
    from: String,
}

impl OutboxNotifier {
    pub fn new(dir: PathBuf, from: impl Into<String>) -> Self {
        Self {
            dir: Some(dir),
            from: from.into(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            dir: None,
            from: String::new(),
        }
    }

    fn render(&self, mail: &OutgoingMail) -> String {
        format!(
            "To: {}\nFrom: {}\nSubject: {}\n\n{}\n",
            mail.to, self.from, mail.subject, mail.text
        )
    }
}

#[async_trait]
impl Notifier for OutboxNotifier {
    async fn send(&self, mail: OutgoingMail) -> Result<()> {
        let Some(dir) = &self.dir else {
            tracing::debug!(to = %mail.to, subject = %mail.subject, "outbox disabled; dropping notification");
            return Ok(());
        };
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("failed to create outbox {}", dir.display()))?;

        let stamp = Utc::now().timestamp_millis();
        let body = self.render(&mail);
        // Same-millisecond notifications get a numeric suffix.
        for attempt in 0u32.. {
            let name = match attempt {
                0 => format!("email-{stamp}.eml"),
                n => format!("email-{stamp}-{n}.eml"),
            };
            let path = dir.join(name);
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    file.write_all(body.as_bytes())
                        .await
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    file.flush().await?;
                    tracing::debug!(path = %path.display(), to = %mail.to, "recorded notification");
                    return Ok(());
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(e).with_context(|| format!("failed to create {}", path.display()))
                }
            }
        }
        anyhow::bail!("no free outbox file name for {stamp}")
    }
}
