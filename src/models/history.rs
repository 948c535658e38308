use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::job_seeker::{Status, UnknownStatus};

/// Append-only record of a status, owner or memo change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSeekerHistory {
    pub id: String,
    pub job_seeker_id: String,
    pub status: Status,
    pub memo: Option<String>,
    pub sales_user_id: String,
    pub sales_user_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct JobSeekerHistoryRow {
    pub id: String,
    pub job_seeker_id: String,
    pub status: String,
    pub memo: Option<String>,
    pub sales_user_id: String,
    pub sales_user_name: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<JobSeekerHistoryRow> for JobSeekerHistory {
    type Error = UnknownStatus;

    fn try_from(row: JobSeekerHistoryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            status: row.status.parse()?,
            id: row.id,
            job_seeker_id: row.job_seeker_id,
            memo: row.memo,
            sales_user_id: row.sales_user_id,
            sales_user_name: row.sales_user_name,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewHistoryEntry {
    pub id: String,
    pub job_seeker_id: String,
    pub status: Status,
    pub memo: Option<String>,
    pub sales_user_id: String,
    pub sales_user_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryOrder {
    #[default]
    CreatedAtDesc,
    CreatedAtAsc,
}
