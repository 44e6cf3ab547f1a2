use modkit::ProblemResponse;

use crate::domain::error::DomainError;
use crate::errors::ErrorCode;

/// Map a domain error to an RFC 9457 problem for `instance` (the request path).
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    let problem = match e {
        DomainError::Validation { message } => ErrorCode::Validation.to_problem(message.as_str()),
        DomainError::EmailTaken => ErrorCode::EmailTaken.to_problem(e.to_string()),
        DomainError::InvalidCredentials => ErrorCode::InvalidCredentials.to_problem(e.to_string()),
        DomainError::Unauthenticated => ErrorCode::Unauthenticated.to_problem(e.to_string()),
        DomainError::Forbidden { message } => ErrorCode::Forbidden.to_problem(message.as_str()),
        DomainError::NotFound { message } => ErrorCode::NotFound.to_problem(message.as_str()),
        DomainError::Storage { .. } | DomainError::Internal { .. } => {
            // Log the cause, never expose it.
            tracing::error!(error = %e, instance, "request failed");
            ErrorCode::Internal.to_problem("An internal error occurred")
        }
    };
    ProblemResponse(problem.with_instance(instance))
}
