use serde::{Deserialize, Serialize};

use crate::contract::model::{Caller, Role};

/// JWT payload of a session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub id: String,
    pub email: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// `None` when the role is not one we issue.
    pub fn caller(&self) -> Option<Caller> {
        Some(Caller {
            user_id: self.id.clone(),
            email: self.email.clone(),
            role: Role::parse(&self.role)?,
        })
    }
}
