use thiserror::Error;

/// Domain-specific errors. Messages are user-facing, except `Storage`
/// and `Internal` which are logged and replaced by a generic detail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{message}")]
    Validation { message: String },

    #[error("Email already registered")]
    EmailTaken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("{message}")]
    Forbidden { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn missing_fields() -> Self {
        Self::validation("Missing fields")
    }

    pub fn forbidden() -> Self {
        Self::Forbidden {
            message: "Forbidden".to_string(),
        }
    }

    pub fn customers_only() -> Self {
        Self::Forbidden {
            message: "Customers only".to_string(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn supplier_not_found() -> Self {
        Self::not_found("Supplier not found")
    }

    pub fn thread_not_found() -> Self {
        Self::not_found("Thread not found")
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Repository failures are infra errors; keep the whole context chain.
impl From<anyhow::Error> for DomainError {
    fn from(e: anyhow::Error) -> Self {
        Self::storage(format!("{e:#}"))
    }
}
