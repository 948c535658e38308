use std::sync::Arc;

use crate::database::store::JobSeekerStore;
use crate::error::Result;
use crate::models::sales_user::SalesUserOption;

#[derive(Clone)]
pub struct SalesUserService {
    store: Arc<dyn JobSeekerStore>,
}

impl SalesUserService {
    pub fn new(store: Arc<dyn JobSeekerStore>) -> Self {
        Self { store }
    }

    /// Active sales users, ordered by name.
    pub async fn list_active(&self) -> Result<Vec<SalesUserOption>> {
        self.store.list_active_sales_users().await
    }
}
