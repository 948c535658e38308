pub mod health;
pub mod job_seeker;
pub mod sales_user;

use axum::{middleware::from_fn_with_state, routing::get, Router};

use crate::middleware::{
    auth::require_sales_user,
    rate_limit::{rps_middleware, RateLimiter},
};
use crate::AppState;

/// Health probe plus the authenticated, rate-limited job seeker API.
pub fn app_router(state: AppState, api_rps: u32) -> Router {
    let api = Router::new()
        .route(
            "/api/jobseekers",
            get(job_seeker::list_job_seekers).post(job_seeker::create_job_seeker),
        )
        .route(
            "/api/jobseekers/:id",
            get(job_seeker::get_job_seeker).patch(job_seeker::update_job_seeker),
        )
        .route(
            "/api/jobseekers/:id/history",
            get(job_seeker::list_job_seeker_history),
        )
        .route("/api/sales-users", get(sales_user::list_sales_users))
        .layer(from_fn_with_state(state.clone(), require_sales_user))
        .layer(from_fn_with_state(RateLimiter::new(api_rps), rps_middleware));

    Router::new()
        .route("/health", get(health::health))
        .merge(api)
        .with_state(state)
}
