//! Error catalog: one stable problem type per failure class.

use modkit::{ErrDef, Problem, ProblemResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Validation,
    Unauthenticated,
    InvalidCredentials,
    Forbidden,
    NotFound,
    EmailTaken,
    Internal,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 7] = [
        ErrorCode::Validation,
        ErrorCode::Unauthenticated,
        ErrorCode::InvalidCredentials,
        ErrorCode::Forbidden,
        ErrorCode::NotFound,
        ErrorCode::EmailTaken,
        ErrorCode::Internal,
    ];

    pub const fn def(self) -> ErrDef {
        match self {
            ErrorCode::Validation => ErrDef {
                status: 400,
                title: "Validation Failed",
                code: "MARKETPLACE_VALIDATION",
                type_url: "https://errors.eventflow.local/MARKETPLACE_VALIDATION",
            },
            ErrorCode::Unauthenticated => ErrDef {
                status: 401,
                title: "Unauthenticated",
                code: "MARKETPLACE_UNAUTHENTICATED",
                type_url: "https://errors.eventflow.local/MARKETPLACE_UNAUTHENTICATED",
            },
            ErrorCode::InvalidCredentials => ErrDef {
                status: 401,
                title: "Invalid Credentials",
                code: "MARKETPLACE_INVALID_CREDENTIALS",
                type_url: "https://errors.eventflow.local/MARKETPLACE_INVALID_CREDENTIALS",
            },
            ErrorCode::Forbidden => ErrDef {
                status: 403,
                title: "Forbidden",
                code: "MARKETPLACE_FORBIDDEN",
                type_url: "https://errors.eventflow.local/MARKETPLACE_FORBIDDEN",
            },
            ErrorCode::NotFound => ErrDef {
                status: 404,
                title: "Not Found",
                code: "MARKETPLACE_NOT_FOUND",
                type_url: "https://errors.eventflow.local/MARKETPLACE_NOT_FOUND",
            },
            ErrorCode::EmailTaken => ErrDef {
                status: 409,
                title: "Email Already Registered",
                code: "MARKETPLACE_EMAIL_TAKEN",
                type_url: "https://errors.eventflow.local/MARKETPLACE_EMAIL_TAKEN",
            },
            ErrorCode::Internal => ErrDef {
                status: 500,
                title: "Internal Server Error",
                code: "MARKETPLACE_INTERNAL",
                type_url: "https://errors.eventflow.local/MARKETPLACE_INTERNAL",
            },
        }
    }

    pub const fn status(self) -> u16 {
        self.def().status
    }

    pub fn to_problem(self, detail: impl Into<String>) -> Problem {
        self.def().to_problem(detail)
    }

    pub fn to_response(self, detail: impl Into<String>) -> ProblemResponse {
        self.def().to_response(detail)
    }
}
