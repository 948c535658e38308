use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::database::store::{JobSeekerStore, UnitOfWork};
use crate::dto::job_seeker_dto::{
    CreateJobSeekerPayload, JobSeekerListQuery, UpdateJobSeekerPayload,
};
use crate::error::{Error, Result};
use crate::models::history::{HistoryOrder, JobSeekerHistory, NewHistoryEntry};
use crate::models::job_seeker::{
    JobSeeker, JobSeekerChanges, JobSeekerDetail, JobSeekerSearch, NewJobSeeker,
};
use crate::models::sales_user::Actor;
use crate::services::transition_policy::is_allowed_transition;
use crate::utils::validation::non_blank;

pub const LIST_LIMIT: i64 = 200;

/// What an edit will write, decided before anything touches storage.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdatePlan {
    pub changes: JobSeekerChanges,
    pub status_changed: bool,
    pub owner_changed: bool,
    pub memo_changed: bool,
}

impl UpdatePlan {
    /// Resolves the payload against the stored record.
    ///
    /// Status and owner keep their stored values when omitted. The memo does
    /// not: an omitted or null memo clears it.
    pub fn build(current: &JobSeeker, payload: &UpdateJobSeekerPayload) -> Result<Self> {
        let next_status = payload.status.unwrap_or(current.status);
        if !is_allowed_transition(current.status, next_status) {
            return Err(Error::IllegalTransition {
                from: current.status,
                to: next_status,
            });
        }

        let next_sales_user_id = payload
            .sales_user_id
            .clone()
            .unwrap_or_else(|| current.sales_user_id.clone());
        let next_memo = payload.memo.clone();

        Ok(Self {
            status_changed: next_status != current.status,
            owner_changed: next_sales_user_id != current.sales_user_id,
            memo_changed: next_memo != current.memo,
            changes: JobSeekerChanges {
                name: payload.name.clone(),
                age: payload.age,
                email: payload.email.clone(),
                phone: payload.phone.clone(),
                desired_job_type: payload.desired_job_type.clone(),
                desired_location: payload.desired_location.clone(),
                sales_user_id: next_sales_user_id,
                status: next_status,
                memo: next_memo,
            },
        })
    }

    pub fn audit_worthy(&self) -> bool {
        self.status_changed || self.owner_changed || self.memo_changed
    }
}

#[derive(Clone)]
pub struct JobSeekerService {
    store: Arc<dyn JobSeekerStore>,
}

impl JobSeekerService {
    pub fn new(store: Arc<dyn JobSeekerStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        actor: &Actor,
        payload: CreateJobSeekerPayload,
    ) -> Result<JobSeeker> {
        let job_seeker = self
            .store
            .insert_job_seeker(NewJobSeeker {
                id: Uuid::new_v4().to_string(),
                name: payload.name,
                age: payload.age,
                email: payload.email,
                phone: payload.phone,
                desired_job_type: payload.desired_job_type,
                desired_location: payload.desired_location,
                sales_user_id: actor.sales_user_id.clone(),
                memo: non_blank(payload.memo),
            })
            .await?;
        info!(job_seeker_id = %job_seeker.id, actor = %actor.sales_user_id, "job seeker created");
        Ok(job_seeker)
    }

    pub async fn get(&self, actor: &Actor, id: &str) -> Result<JobSeekerDetail> {
        self.store
            .find_owned_job_seeker(id, &actor.sales_user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Job seeker {} not found", id)))
    }

    pub async fn list(
        &self,
        actor: &Actor,
        query: JobSeekerListQuery,
    ) -> Result<Vec<JobSeekerDetail>> {
        let search = JobSeekerSearch {
            sales_user_id: actor.sales_user_id.clone(),
            q: non_blank(query.q),
            sort_key: query.sort_key.unwrap_or_default(),
            sort_order: query.sort_order.unwrap_or_default(),
            limit: LIST_LIMIT,
        };
        self.store.search_job_seekers(&search).await
    }

    pub async fn history(
        &self,
        actor: &Actor,
        id: &str,
        order: HistoryOrder,
    ) -> Result<Vec<JobSeekerHistory>> {
        // ownership gate; history must not be readable by id alone
        self.get(actor, id).await?;
        self.store.list_history(id, order).await
    }

    /// Applies an edit and, when status, owner or memo changed, appends one
    /// history entry in the same unit of work.
    #[instrument(skip(self, actor, payload), fields(actor = %actor.sales_user_id))]
    pub async fn update(
        &self,
        actor: &Actor,
        id: &str,
        payload: UpdateJobSeekerPayload,
    ) -> Result<JobSeeker> {
        let current = self
            .store
            .find_job_seeker(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Job seeker {} not found", id)))?;

        if let Err(err) = UpdatePlan::build(&current, &payload) {
            warn!(job_seeker_id = %id, error = %err, "update rejected");
            return Err(err);
        }

        let mut uow = self.store.begin().await.map_err(Error::storage)?;
        let outcome = apply_update(uow.as_mut(), id, &payload).await;
        match outcome {
            Ok((job_seeker, plan)) => {
                uow.commit().await.map_err(Error::storage)?;
                info!(
                    job_seeker_id = %id,
                    from = %current.status,
                    to = %job_seeker.status,
                    audited = plan.audit_worthy(),
                    "job seeker updated"
                );
                Ok(job_seeker)
            }
            Err(err) => {
                if let Err(rollback_err) = uow.rollback().await {
                    warn!(job_seeker_id = %id, error = %rollback_err, "rollback failed");
                }
                if !err.is_client_error() {
                    tracing::error!(job_seeker_id = %id, error = %err, "update rolled back");
                }
                Err(err)
            }
        }
    }
}

/// Runs inside the unit of work. Policy errors come back unchanged, every
/// storage error becomes [`Error::Storage`].
async fn apply_update(
    uow: &mut dyn UnitOfWork,
    id: &str,
    payload: &UpdateJobSeekerPayload,
) -> Result<(JobSeeker, UpdatePlan)> {
    // the pre-check ran on an unlocked read; decide again on the locked row
    let current = uow
        .lock_job_seeker(id)
        .await
        .map_err(Error::storage)?
        .ok_or_else(|| Error::NotFound(format!("Job seeker {} not found", id)))?;
    let plan = UpdatePlan::build(&current, payload)?;

    let updated = uow
        .update_job_seeker(id, &plan.changes)
        .await
        .map_err(Error::storage)?;

    if plan.audit_worthy() {
        let sales_user_name = uow
            .sales_user_name(&updated.sales_user_id)
            .await
            .map_err(Error::storage)?
            .unwrap_or_default();
        uow.append_history(NewHistoryEntry {
            id: Uuid::new_v4().to_string(),
            job_seeker_id: updated.id.clone(),
            status: updated.status,
            memo: updated.memo.clone(),
            sales_user_id: updated.sales_user_id.clone(),
            sales_user_name,
        })
        .await
        .map_err(Error::storage)?;
    }

    Ok((updated, plan))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::store::MockJobSeekerStore;
    use crate::models::job_seeker::Status;
    use chrono::Utc;

    fn stored() -> JobSeeker {
        JobSeeker {
            id: "js-1".into(),
            name: "山田太郎".into(),
            age: Some(30),
            email: "taro@example.com".into(),
            phone: "090-1234-5678".into(),
            desired_job_type: "フロントエンドエンジニア".into(),
            desired_location: "東京".into(),
            sales_user_id: "sales-1".into(),
            status: Status::New,
            memo: Some("メモ".into()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn payload() -> UpdateJobSeekerPayload {
        UpdateJobSeekerPayload {
            name: "山田 太郎".into(),
            age: Some(30),
            email: "taro@example.com".into(),
            phone: "090-1234-5678".into(),
            desired_job_type: "フロントエンドエンジニア".into(),
            desired_location: "東京".into(),
            sales_user_id: None,
            status: Some(Status::New),
            memo: Some("メモ".into()),
        }
    }

    #[test]
    fn unrelated_field_change_is_not_audited() {
        let plan = UpdatePlan::build(&stored(), &payload()).unwrap();
        assert!(!plan.audit_worthy());
        assert_eq!(plan.changes.name, "山田 太郎");
        assert_eq!(plan.changes.sales_user_id, "sales-1");
    }

    #[test]
    fn omitted_status_and_owner_keep_stored_values() {
        let mut p = payload();
        p.status = None;
        let plan = UpdatePlan::build(&stored(), &p).unwrap();
        assert_eq!(plan.changes.status, Status::New);
        assert_eq!(plan.changes.sales_user_id, "sales-1");
        assert!(!plan.status_changed);
        assert!(!plan.owner_changed);
    }

    #[test]
    fn omitted_memo_clears_it() {
        let mut p = payload();
        p.memo = None;
        let plan = UpdatePlan::build(&stored(), &p).unwrap();
        assert_eq!(plan.changes.memo, None);
        assert!(plan.memo_changed);
        assert!(plan.audit_worthy());
    }

    #[test]
    fn missing_memo_on_both_sides_is_unchanged() {
        let mut current = stored();
        current.memo = None;
        let mut p = payload();
        p.memo = None;
        let plan = UpdatePlan::build(&current, &p).unwrap();
        assert!(!plan.memo_changed);
    }

    #[test]
    fn owner_reassignment_is_audited_but_not_gated() {
        let mut current = stored();
        current.status = Status::Closed;
        let mut p = payload();
        p.status = None;
        p.sales_user_id = Some("sales-2".into());
        let plan = UpdatePlan::build(&current, &p).unwrap();
        assert!(plan.owner_changed);
        assert!(!plan.status_changed);
        assert!(plan.audit_worthy());
    }

    #[test]
    fn skip_ahead_is_rejected_by_plan() {
        let mut p = payload();
        p.status = Some(Status::Offered);
        let err = UpdatePlan::build(&stored(), &p).unwrap_err();
        assert!(matches!(
            err,
            Error::IllegalTransition {
                from: Status::New,
                to: Status::Offered
            }
        ));
    }

    #[tokio::test]
    async fn unknown_id_never_opens_a_unit_of_work() {
        let mut store = MockJobSeekerStore::new();
        store
            .expect_find_job_seeker()
            .times(1)
            .returning(|_| Ok(None));
        store.expect_begin().never();

        let service = JobSeekerService::new(Arc::new(store));
        let err = service
            .update(&Actor::new("sales-1"), "missing", payload())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn illegal_transition_never_opens_a_unit_of_work() {
        let mut store = MockJobSeekerStore::new();
        store
            .expect_find_job_seeker()
            .returning(|_| Ok(Some(stored())));
        store.expect_begin().never();

        let mut p = payload();
        p.status = Some(Status::Proposing);
        let service = JobSeekerService::new(Arc::new(store));
        let err = service
            .update(&Actor::new("sales-1"), "js-1", p)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::IllegalTransition { .. }));
    }

    #[tokio::test]
    async fn failing_begin_is_a_storage_error() {
        let mut store = MockJobSeekerStore::new();
        store
            .expect_find_job_seeker()
            .returning(|_| Ok(Some(stored())));
        store
            .expect_begin()
            .times(1)
            .returning(|| Err(Error::Database(sqlx::Error::PoolTimedOut)));

        let service = JobSeekerService::new(Arc::new(store));
        let err = service
            .update(&Actor::new("sales-1"), "js-1", payload())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
        assert!(!err.is_client_error());
    }
}
