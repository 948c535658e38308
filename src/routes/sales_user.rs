use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::{error::Result, AppState};

#[utoipa::path(
    get,
    path = "/api/sales-users",
    responses(
        (status = 200, description = "Active sales users ordered by name")
    )
)]
#[axum::debug_handler]
pub async fn list_sales_users(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let sales_users = state.sales_user_service.list_active().await?;
    Ok(Json(json!({ "sales_users": sales_users })))
}
