use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lifecycle of a job seeker. Declaration order is the pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    New,
    Interviewed,
    Proposing,
    Offered,
    Closed,
}

impl Status {
    pub const ORDER: [Status; 5] = [
        Status::New,
        Status::Interviewed,
        Status::Proposing,
        Status::Offered,
        Status::Closed,
    ];

    /// Position of the status in the pipeline, starting at 0 for `NEW`.
    pub fn index(self) -> usize {
        match self {
            Status::New => 0,
            Status::Interviewed => 1,
            Status::Proposing => 2,
            Status::Offered => 3,
            Status::Closed => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::New => "NEW",
            Status::Interviewed => "INTERVIEWED",
            Status::Proposing => "PROPOSING",
            Status::Offered => "OFFERED",
            Status::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown job seeker status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for Status {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ORDER
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSeeker {
    pub id: String,
    pub name: String,
    pub age: Option<i32>,
    pub email: String,
    pub phone: String,
    pub desired_job_type: String,
    pub desired_location: String,
    pub sales_user_id: String,
    pub status: Status,
    pub memo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw `job_seekers` row; `status` is stored as text.
#[derive(Debug, Clone, FromRow)]
pub struct JobSeekerRow {
    pub id: String,
    pub name: String,
    pub age: Option<i32>,
    pub email: String,
    pub phone: String,
    pub desired_job_type: String,
    pub desired_location: String,
    pub sales_user_id: String,
    pub status: String,
    pub memo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<JobSeekerRow> for JobSeeker {
    type Error = UnknownStatus;

    fn try_from(row: JobSeekerRow) -> Result<Self, Self::Error> {
        Ok(Self {
            status: row.status.parse()?,
            id: row.id,
            name: row.name,
            age: row.age,
            email: row.email,
            phone: row.phone,
            desired_job_type: row.desired_job_type,
            desired_location: row.desired_location,
            sales_user_id: row.sales_user_id,
            memo: row.memo,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// A job seeker together with the display name of its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSeekerDetail {
    #[serde(flatten)]
    pub job_seeker: JobSeeker,
    pub sales_user_name: String,
}

/// Field values written by the update workflow. Every editable column is
/// overwritten, not only the ones that changed.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSeekerChanges {
    pub name: String,
    pub age: Option<i32>,
    pub email: String,
    pub phone: String,
    pub desired_job_type: String,
    pub desired_location: String,
    pub sales_user_id: String,
    pub status: Status,
    pub memo: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewJobSeeker {
    pub id: String,
    pub name: String,
    pub age: Option<i32>,
    pub email: String,
    pub phone: String,
    pub desired_job_type: String,
    pub desired_location: String,
    pub sales_user_id: String,
    pub memo: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    UpdatedAt,
    Id,
    Name,
}

impl SortKey {
    pub fn column(self) -> &'static str {
        match self {
            SortKey::UpdatedAt => "js.updated_at",
            SortKey::Id => "js.id",
            SortKey::Name => "js.name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Owner-scoped search over job seekers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSeekerSearch {
    pub sales_user_id: String,
    pub q: Option<String>,
    pub sort_key: SortKey,
    pub sort_order: SortOrder,
    pub limit: i64,
}
