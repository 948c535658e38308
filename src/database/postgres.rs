use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Transaction};

use super::store::{JobSeekerStore, UnitOfWork};
use crate::error::Result;
use crate::models::history::{
    HistoryOrder, JobSeekerHistory, JobSeekerHistoryRow, NewHistoryEntry,
};
use crate::models::job_seeker::{
    JobSeeker, JobSeekerChanges, JobSeekerDetail, JobSeekerRow, JobSeekerSearch, NewJobSeeker,
    Status,
};
use crate::models::sales_user::SalesUserOption;

const JOB_SEEKER_COLUMNS: &str = "id, name, age, email, phone, desired_job_type, \
     desired_location, sales_user_id, status, memo, created_at, updated_at";

const DETAIL_SELECT: &str = "SELECT js.id, js.name, js.age, js.email, js.phone, \
     js.desired_job_type, js.desired_location, js.sales_user_id, js.status, js.memo, \
     js.created_at, js.updated_at, su.name AS sales_user_name \
     FROM job_seekers js \
     JOIN sales_users su ON su.id = js.sales_user_id";

const HISTORY_COLUMNS: &str =
    "id, job_seeker_id, status, memo, sales_user_id, sales_user_name, created_at";

#[derive(Debug, FromRow)]
struct JobSeekerDetailRow {
    #[sqlx(flatten)]
    job_seeker: JobSeekerRow,
    sales_user_name: String,
}

impl TryFrom<JobSeekerDetailRow> for JobSeekerDetail {
    type Error = crate::error::Error;

    fn try_from(row: JobSeekerDetailRow) -> Result<Self> {
        Ok(Self {
            job_seeker: row.job_seeker.try_into()?,
            sales_user_name: row.sales_user_name,
        })
    }
}

/// Escapes `LIKE` metacharacters so the search term matches literally.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[derive(Clone)]
pub struct PgJobSeekerStore {
    pool: PgPool,
}

impl PgJobSeekerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobSeekerStore for PgJobSeekerStore {
    async fn find_job_seeker(&self, id: &str) -> Result<Option<JobSeeker>> {
        let row = sqlx::query_as::<_, JobSeekerRow>(&format!(
            "SELECT {} FROM job_seekers WHERE id = $1",
            JOB_SEEKER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(JobSeeker::try_from).transpose()?)
    }

    async fn find_owned_job_seeker(
        &self,
        id: &str,
        sales_user_id: &str,
    ) -> Result<Option<JobSeekerDetail>> {
        let row = sqlx::query_as::<_, JobSeekerDetailRow>(&format!(
            "{} WHERE js.id = $1 AND js.sales_user_id = $2",
            DETAIL_SELECT
        ))
        .bind(id)
        .bind(sales_user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(JobSeekerDetail::try_from).transpose()
    }

    async fn search_job_seekers(&self, search: &JobSeekerSearch) -> Result<Vec<JobSeekerDetail>> {
        let mut qb = QueryBuilder::<Postgres>::new(DETAIL_SELECT);
        qb.push(" WHERE js.sales_user_id = ");
        qb.push_bind(search.sales_user_id.clone());

        if let Some(q) = search.q.as_deref() {
            let pattern = like_pattern(q);
            qb.push(" AND (js.name ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR js.email ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR js.phone ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR su.name ILIKE ");
            qb.push_bind(pattern);
            qb.push(")");
        }

        qb.push(format!(
            " ORDER BY {} {}, js.id ASC LIMIT ",
            search.sort_key.column(),
            search.sort_order.keyword()
        ));
        qb.push_bind(search.limit);

        let rows: Vec<JobSeekerDetailRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(JobSeekerDetail::try_from).collect()
    }

    async fn insert_job_seeker(&self, job_seeker: NewJobSeeker) -> Result<JobSeeker> {
        let row = sqlx::query_as::<_, JobSeekerRow>(&format!(
            r#"
            INSERT INTO job_seekers (
                id, name, age, email, phone, desired_job_type, desired_location,
                sales_user_id, status, memo
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            JOB_SEEKER_COLUMNS
        ))
        .bind(&job_seeker.id)
        .bind(&job_seeker.name)
        .bind(job_seeker.age)
        .bind(&job_seeker.email)
        .bind(&job_seeker.phone)
        .bind(&job_seeker.desired_job_type)
        .bind(&job_seeker.desired_location)
        .bind(&job_seeker.sales_user_id)
        .bind(Status::New.as_str())
        .bind(&job_seeker.memo)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_into()?)
    }

    async fn list_history(
        &self,
        job_seeker_id: &str,
        order: HistoryOrder,
    ) -> Result<Vec<JobSeekerHistory>> {
        let direction = match order {
            HistoryOrder::CreatedAtDesc => "DESC",
            HistoryOrder::CreatedAtAsc => "ASC",
        };
        let rows = sqlx::query_as::<_, JobSeekerHistoryRow>(&format!(
            "SELECT {} FROM job_seeker_histories WHERE job_seeker_id = $1 \
             ORDER BY created_at {dir}, seq {dir}",
            HISTORY_COLUMNS,
            dir = direction
        ))
        .bind(job_seeker_id)
        .fetch_all(&self.pool)
        .await?;

        let mut items: Vec<JobSeekerHistory> = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(row.try_into()?);
        }
        Ok(items)
    }

    async fn list_active_sales_users(&self) -> Result<Vec<SalesUserOption>> {
        let users = sqlx::query_as::<_, SalesUserOption>(
            "SELECT id, name FROM sales_users WHERE is_active ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

/// A Postgres transaction. sqlx rolls it back when dropped uncommitted.
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn lock_job_seeker(&mut self, id: &str) -> Result<Option<JobSeeker>> {
        let row = sqlx::query_as::<_, JobSeekerRow>(&format!(
            "SELECT {} FROM job_seekers WHERE id = $1 FOR UPDATE",
            JOB_SEEKER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row.map(JobSeeker::try_from).transpose()?)
    }

    async fn sales_user_name(&mut self, sales_user_id: &str) -> Result<Option<String>> {
        let name = sqlx::query_scalar::<_, String>("SELECT name FROM sales_users WHERE id = $1")
            .bind(sales_user_id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(name)
    }

    async fn update_job_seeker(
        &mut self,
        id: &str,
        changes: &JobSeekerChanges,
    ) -> Result<JobSeeker> {
        let row = sqlx::query_as::<_, JobSeekerRow>(&format!(
            r#"
            UPDATE job_seekers
            SET name = $2,
                age = $3,
                email = $4,
                phone = $5,
                desired_job_type = $6,
                desired_location = $7,
                sales_user_id = $8,
                status = $9,
                memo = $10,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            JOB_SEEKER_COLUMNS
        ))
        .bind(id)
        .bind(&changes.name)
        .bind(changes.age)
        .bind(&changes.email)
        .bind(&changes.phone)
        .bind(&changes.desired_job_type)
        .bind(&changes.desired_location)
        .bind(&changes.sales_user_id)
        .bind(changes.status.as_str())
        .bind(&changes.memo)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(row.try_into()?)
    }

    async fn append_history(&mut self, entry: NewHistoryEntry) -> Result<JobSeekerHistory> {
        let row = sqlx::query_as::<_, JobSeekerHistoryRow>(&format!(
            r#"
            INSERT INTO job_seeker_histories (
                id, job_seeker_id, status, memo, sales_user_id, sales_user_name
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            HISTORY_COLUMNS
        ))
        .bind(&entry.id)
        .bind(&entry.job_seeker_id)
        .bind(entry.status.as_str())
        .bind(&entry.memo)
        .bind(&entry.sales_user_id)
        .bind(&entry.sales_user_name)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(row.try_into()?)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
