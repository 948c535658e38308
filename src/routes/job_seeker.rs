use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::job_seeker_dto::{
        CreateJobSeekerPayload, HistoryListResponse, HistoryQuery, JobSeekerListQuery,
        JobSeekerListResponse, JobSeekerResponse, UpdateJobSeekerPayload,
    },
    error::{Error, Result},
    models::sales_user::Actor,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/jobseekers",
    params(
        ("q" = Option<String>, Query, description = "Matches name, email, phone or owner name"),
        ("sort_key" = Option<String>, Query, description = "updated_at | id | name"),
        ("sort_order" = Option<String>, Query, description = "asc | desc")
    ),
    responses(
        (status = 200, description = "Job seekers owned by the caller", body = Json<JobSeekerListResponse>),
        (status = 400, description = "Invalid query"),
        (status = 401, description = "Missing or invalid token")
    )
)]
#[axum::debug_handler]
pub async fn list_job_seekers(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    query: std::result::Result<Query<JobSeekerListQuery>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(query) = query?;
    query
        .validate()
        .map_err(|e| Error::BadRequest(e.to_string()))?;
    let job_seekers = state.job_seeker_service.list(&actor, query).await?;
    Ok(Json(JobSeekerListResponse { job_seekers }))
}

#[utoipa::path(
    post,
    path = "/api/jobseekers",
    request_body = CreateJobSeekerPayload,
    responses(
        (status = 201, description = "Job seeker created", body = Json<JobSeekerResponse>),
        (status = 422, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_job_seeker(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    payload: std::result::Result<Json<CreateJobSeekerPayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    payload.validate()?;
    let job_seeker = state.job_seeker_service.create(&actor, payload).await?;
    Ok((StatusCode::CREATED, Json(JobSeekerResponse { job_seeker })))
}

#[utoipa::path(
    get,
    path = "/api/jobseekers/{id}",
    params(
        ("id" = String, Path, description = "Job seeker ID")
    ),
    responses(
        (status = 200, description = "Job seeker found", body = Json<JobSeekerDetail>),
        (status = 404, description = "Job seeker not found or owned by someone else")
    )
)]
#[axum::debug_handler]
pub async fn get_job_seeker(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let detail = state.job_seeker_service.get(&actor, &id).await?;
    Ok(Json(detail))
}

#[utoipa::path(
    patch,
    path = "/api/jobseekers/{id}",
    params(
        ("id" = String, Path, description = "Job seeker ID")
    ),
    request_body = UpdateJobSeekerPayload,
    responses(
        (status = 200, description = "Job seeker updated", body = Json<JobSeekerResponse>),
        (status = 400, description = "Illegal status transition"),
        (status = 404, description = "Job seeker not found"),
        (status = 422, description = "Invalid payload"),
        (status = 500, description = "Update rolled back")
    )
)]
#[axum::debug_handler]
pub async fn update_job_seeker(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<UpdateJobSeekerPayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    payload.validate()?;
    let job_seeker = state
        .job_seeker_service
        .update(&actor, &id, payload)
        .await?;
    Ok(Json(JobSeekerResponse { job_seeker }))
}

#[utoipa::path(
    get,
    path = "/api/jobseekers/{id}/history",
    params(
        ("id" = String, Path, description = "Job seeker ID"),
        ("sort" = Option<String>, Query, description = "created_at_desc (default) | created_at_asc")
    ),
    responses(
        (status = 200, description = "History entries", body = Json<HistoryListResponse>),
        (status = 404, description = "Job seeker not found or owned by someone else")
    )
)]
#[axum::debug_handler]
pub async fn list_job_seeker_history(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    query: std::result::Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(query) = query?;
    let items = state
        .job_seeker_service
        .history(&actor, &id, query.sort.unwrap_or_default())
        .await?;
    Ok(Json(HistoryListResponse { items }))
}
