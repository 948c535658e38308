//! Storage seams for the job seeker workflow.
//!
//! Reads go straight through [`JobSeekerStore`]. Writes that must land
//! together go through a [`UnitOfWork`] obtained from [`JobSeekerStore::begin`]:
//! nothing it does is visible to other readers until [`UnitOfWork::commit`]
//! succeeds, and dropping it without committing discards every write.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::history::{HistoryOrder, JobSeekerHistory, NewHistoryEntry};
use crate::models::job_seeker::{
    JobSeeker, JobSeekerChanges, JobSeekerDetail, JobSeekerSearch, NewJobSeeker,
};
use crate::models::sales_user::SalesUserOption;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobSeekerStore: Send + Sync {
    /// Point lookup by primary key, regardless of owner.
    async fn find_job_seeker(&self, id: &str) -> Result<Option<JobSeeker>>;

    /// Lookup restricted to records owned by `sales_user_id`.
    async fn find_owned_job_seeker(
        &self,
        id: &str,
        sales_user_id: &str,
    ) -> Result<Option<JobSeekerDetail>>;

    async fn search_job_seekers(&self, search: &JobSeekerSearch) -> Result<Vec<JobSeekerDetail>>;

    async fn insert_job_seeker(&self, job_seeker: NewJobSeeker) -> Result<JobSeeker>;

    async fn list_history(
        &self,
        job_seeker_id: &str,
        order: HistoryOrder,
    ) -> Result<Vec<JobSeekerHistory>>;

    async fn list_active_sales_users(&self) -> Result<Vec<SalesUserOption>>;

    /// Opens an atomic unit of work.
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>>;
}

#[async_trait]
pub trait UnitOfWork: Send {
    /// Re-reads a job seeker and holds it against concurrent writers until
    /// the unit of work ends.
    async fn lock_job_seeker(&mut self, id: &str) -> Result<Option<JobSeeker>>;

    async fn sales_user_name(&mut self, sales_user_id: &str) -> Result<Option<String>>;

    async fn update_job_seeker(&mut self, id: &str, changes: &JobSeekerChanges)
        -> Result<JobSeeker>;

    async fn append_history(&mut self, entry: NewHistoryEntry) -> Result<JobSeekerHistory>;

    async fn commit(self: Box<Self>) -> Result<()>;

    async fn rollback(self: Box<Self>) -> Result<()>;
}
