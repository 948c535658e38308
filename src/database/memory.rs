//! In-process [`JobSeekerStore`] with the same atomicity as the Postgres one.
//!
//! A unit of work holds the store lock for its whole lifetime, which
//! serialises writers the way a row lock would, and stages its writes until
//! commit. With the `testing` feature, failure switches let tests break the
//! history insert mid-way.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::store::{JobSeekerStore, UnitOfWork};
use crate::error::{Error, Result};
use crate::models::history::{HistoryOrder, JobSeekerHistory, NewHistoryEntry};
use crate::models::job_seeker::{
    JobSeeker, JobSeekerChanges, JobSeekerDetail, JobSeekerSearch, NewJobSeeker, SortKey,
    SortOrder, Status,
};
use crate::models::sales_user::{SalesUser, SalesUserOption};
use crate::utils::time::now;

#[derive(Debug, Default)]
struct MemoryState {
    sales_users: BTreeMap<String, SalesUser>,
    job_seekers: BTreeMap<String, JobSeeker>,
    histories: Vec<JobSeekerHistory>,
}

impl MemoryState {
    fn detail(&self, job_seeker: &JobSeeker) -> JobSeekerDetail {
        JobSeekerDetail {
            job_seeker: job_seeker.clone(),
            sales_user_name: self
                .sales_users
                .get(&job_seeker.sales_user_id)
                .map(|u| u.name.clone())
                .unwrap_or_default(),
        }
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    fail_history_inserts: Arc<AtomicBool>,
    units_begun: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_sales_user(&self, id: &str, name: &str, is_active: bool) {
        let mut state = self.state.lock().await;
        state.sales_users.insert(
            id.to_string(),
            SalesUser {
                id: id.to_string(),
                name: name.to_string(),
                is_active,
            },
        );
    }

    /// Seeds a record as-is, bypassing the `NEW` status of regular inserts.
    pub async fn put_job_seeker(&self, job_seeker: JobSeeker) {
        let mut state = self.state.lock().await;
        state
            .job_seekers
            .insert(job_seeker.id.clone(), job_seeker);
    }

    pub async fn history_count(&self, job_seeker_id: &str) -> usize {
        let state = self.state.lock().await;
        state
            .histories
            .iter()
            .filter(|h| h.job_seeker_id == job_seeker_id)
            .count()
    }

    #[cfg(any(test, feature = "testing"))]
    pub fn fail_history_inserts(&self, fail: bool) {
        self.fail_history_inserts.store(fail, Ordering::SeqCst);
    }

    /// Number of units of work opened so far.
    #[cfg(any(test, feature = "testing"))]
    pub fn units_begun(&self) -> usize {
        self.units_begun.load(Ordering::SeqCst)
    }
}

fn matches_query(detail: &JobSeekerDetail, needle: &str) -> bool {
    let js = &detail.job_seeker;
    [
        js.name.as_str(),
        js.email.as_str(),
        js.phone.as_str(),
        detail.sales_user_name.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

#[async_trait]
impl JobSeekerStore for MemoryStore {
    async fn find_job_seeker(&self, id: &str) -> Result<Option<JobSeeker>> {
        let state = self.state.lock().await;
        Ok(state.job_seekers.get(id).cloned())
    }

    async fn find_owned_job_seeker(
        &self,
        id: &str,
        sales_user_id: &str,
    ) -> Result<Option<JobSeekerDetail>> {
        let state = self.state.lock().await;
        Ok(state
            .job_seekers
            .get(id)
            .filter(|js| js.sales_user_id == sales_user_id)
            .map(|js| state.detail(js)))
    }

    async fn search_job_seekers(&self, search: &JobSeekerSearch) -> Result<Vec<JobSeekerDetail>> {
        let state = self.state.lock().await;
        let needle = search.q.as_ref().map(|q| q.to_lowercase());

        let mut rows: Vec<JobSeekerDetail> = state
            .job_seekers
            .values()
            .filter(|js| js.sales_user_id == search.sales_user_id)
            .map(|js| state.detail(js))
            .filter(|detail| needle.as_deref().map_or(true, |n| matches_query(detail, n)))
            .collect();

        rows.sort_by(|a, b| {
            let (a, b) = (&a.job_seeker, &b.job_seeker);
            let primary = match search.sort_key {
                SortKey::UpdatedAt => a.updated_at.cmp(&b.updated_at),
                SortKey::Id => a.id.cmp(&b.id),
                SortKey::Name => a.name.cmp(&b.name),
            };
            let primary = match search.sort_order {
                SortOrder::Asc => primary,
                SortOrder::Desc => primary.reverse(),
            };
            primary.then_with(|| a.id.cmp(&b.id))
        });
        rows.truncate(usize::try_from(search.limit).unwrap_or(0));
        Ok(rows)
    }

    async fn insert_job_seeker(&self, new: NewJobSeeker) -> Result<JobSeeker> {
        let mut state = self.state.lock().await;
        if !state.sales_users.contains_key(&new.sales_user_id) {
            return Err(Error::storage(format!(
                "foreign key violation: unknown sales user {}",
                new.sales_user_id
            )));
        }
        if state.job_seekers.contains_key(&new.id) {
            return Err(Error::storage(format!(
                "unique violation: job seeker {} exists",
                new.id
            )));
        }

        let timestamp = now();
        let job_seeker = JobSeeker {
            id: new.id,
            name: new.name,
            age: new.age,
            email: new.email,
            phone: new.phone,
            desired_job_type: new.desired_job_type,
            desired_location: new.desired_location,
            sales_user_id: new.sales_user_id,
            status: Status::New,
            memo: new.memo,
            created_at: timestamp,
            updated_at: timestamp,
        };
        state
            .job_seekers
            .insert(job_seeker.id.clone(), job_seeker.clone());
        Ok(job_seeker)
    }

    async fn list_history(
        &self,
        job_seeker_id: &str,
        order: HistoryOrder,
    ) -> Result<Vec<JobSeekerHistory>> {
        let state = self.state.lock().await;
        let mut items: Vec<JobSeekerHistory> = state
            .histories
            .iter()
            .filter(|h| h.job_seeker_id == job_seeker_id)
            .cloned()
            .collect();
        // stable: ties keep insertion order
        items.sort_by_key(|h| h.created_at);
        if order == HistoryOrder::CreatedAtDesc {
            items.reverse();
        }
        Ok(items)
    }

    async fn list_active_sales_users(&self) -> Result<Vec<SalesUserOption>> {
        let state = self.state.lock().await;
        let mut users: Vec<SalesUserOption> = state
            .sales_users
            .values()
            .filter(|u| u.is_active)
            .cloned()
            .map(SalesUserOption::from)
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }

    async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
        self.units_begun.fetch_add(1, Ordering::SeqCst);
        let state = self.state.clone().lock_owned().await;
        Ok(Box::new(MemoryUnitOfWork {
            state,
            staged_job_seekers: BTreeMap::new(),
            staged_histories: Vec::new(),
            fail_history_inserts: self.fail_history_inserts.load(Ordering::SeqCst),
        }))
    }
}

pub struct MemoryUnitOfWork {
    state: OwnedMutexGuard<MemoryState>,
    staged_job_seekers: BTreeMap<String, JobSeeker>,
    staged_histories: Vec<JobSeekerHistory>,
    fail_history_inserts: bool,
}

impl MemoryUnitOfWork {
    fn current(&self, id: &str) -> Option<&JobSeeker> {
        self.staged_job_seekers
            .get(id)
            .or_else(|| self.state.job_seekers.get(id))
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn lock_job_seeker(&mut self, id: &str) -> Result<Option<JobSeeker>> {
        Ok(self.current(id).cloned())
    }

    async fn sales_user_name(&mut self, sales_user_id: &str) -> Result<Option<String>> {
        Ok(self
            .state
            .sales_users
            .get(sales_user_id)
            .map(|u| u.name.clone()))
    }

    async fn update_job_seeker(
        &mut self,
        id: &str,
        changes: &JobSeekerChanges,
    ) -> Result<JobSeeker> {
        if !self.state.sales_users.contains_key(&changes.sales_user_id) {
            return Err(Error::storage(format!(
                "foreign key violation: unknown sales user {}",
                changes.sales_user_id
            )));
        }
        let current = self
            .current(id)
            .cloned()
            .ok_or_else(|| Error::storage(format!("job seeker {} vanished", id)))?;

        let updated = JobSeeker {
            name: changes.name.clone(),
            age: changes.age,
            email: changes.email.clone(),
            phone: changes.phone.clone(),
            desired_job_type: changes.desired_job_type.clone(),
            desired_location: changes.desired_location.clone(),
            sales_user_id: changes.sales_user_id.clone(),
            status: changes.status,
            memo: changes.memo.clone(),
            updated_at: now(),
            ..current
        };
        self.staged_job_seekers
            .insert(updated.id.clone(), updated.clone());
        Ok(updated)
    }

    async fn append_history(&mut self, entry: NewHistoryEntry) -> Result<JobSeekerHistory> {
        if self.fail_history_inserts {
            return Err(Error::storage("history insert rejected"));
        }
        if self.current(&entry.job_seeker_id).is_none() {
            return Err(Error::storage(format!(
                "foreign key violation: unknown job seeker {}",
                entry.job_seeker_id
            )));
        }

        let history = JobSeekerHistory {
            id: entry.id,
            job_seeker_id: entry.job_seeker_id,
            status: entry.status,
            memo: entry.memo,
            sales_user_id: entry.sales_user_id,
            sales_user_name: entry.sales_user_name,
            created_at: now(),
        };
        self.staged_histories.push(history.clone());
        Ok(history)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let MemoryUnitOfWork {
            mut state,
            staged_job_seekers,
            staged_histories,
            ..
        } = *self;
        state.job_seekers.extend(staged_job_seekers);
        state.histories.extend(staged_histories);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}
