use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SalesUser {
    pub id: String,
    pub name: String,
    pub is_active: bool,
}

/// Public projection used by the owner drop-down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SalesUserOption {
    pub id: String,
    pub name: String,
}

impl From<SalesUser> for SalesUserOption {
    fn from(user: SalesUser) -> Self {
        Self {
            id: user.id,
            name: user.name,
        }
    }
}

/// The authenticated sales user performing a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub sales_user_id: String,
}

impl Actor {
    pub fn new(sales_user_id: impl Into<String>) -> Self {
        Self {
            sales_user_id: sales_user_id.into(),
        }
    }
}
