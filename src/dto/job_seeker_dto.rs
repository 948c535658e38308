use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::history::{HistoryOrder, JobSeekerHistory};
use crate::models::job_seeker::{JobSeeker, JobSeekerDetail, SortKey, SortOrder, Status};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateJobSeekerPayload {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(range(min = 0, max = 120))]
    pub age: Option<i32>,
    #[validate(email, length(min = 1, max = 255))]
    pub email: String,
    #[validate(
        length(min = 1, max = 20),
        custom(function = "crate::utils::validation::validate_phone")
    )]
    pub phone: String,
    #[validate(length(min = 1, max = 100))]
    pub desired_job_type: String,
    #[validate(length(min = 1, max = 100))]
    pub desired_location: String,
    #[validate(length(max = 2000))]
    pub memo: Option<String>,
}

/// Edit form payload. `sales_user_id` and `status` fall back to the stored
/// values when omitted; an omitted or null `memo` clears the memo.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateJobSeekerPayload {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(range(min = 0, max = 120))]
    pub age: Option<i32>,
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(
        length(max = 20),
        custom(function = "crate::utils::validation::validate_phone")
    )]
    pub phone: String,
    #[validate(length(min = 1, max = 100))]
    pub desired_job_type: String,
    #[validate(length(min = 1, max = 100))]
    pub desired_location: String,
    #[validate(length(min = 1, max = 50))]
    pub sales_user_id: Option<String>,
    pub status: Option<Status>,
    #[validate(length(max = 2000))]
    pub memo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
#[serde(default)]
pub struct JobSeekerListQuery {
    #[validate(length(max = 255))]
    pub q: Option<String>,
    pub sort_key: Option<SortKey>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HistoryQuery {
    pub sort: Option<HistoryOrder>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSeekerResponse {
    pub job_seeker: JobSeeker,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSeekerListResponse {
    pub job_seekers: Vec<JobSeekerDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryListResponse {
    pub items: Vec<JobSeekerHistory>,
}
