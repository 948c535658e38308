use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use sales_crm_backend::{
    config::{get_config, init_config},
    database::{pool::create_pool, postgres::PgJobSeekerStore},
    middleware::cors::api_cors,
    routes, telemetry, AppState,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config()?;
    telemetry::init_tracing(config.log_format)?;

    let pool = create_pool(config).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let store = Arc::new(PgJobSeekerStore::new(pool));
    let app_state = AppState::new(store, &config.jwt_secret);

    let app = routes::app_router(app_state, config.api_rps)
        .layer(api_cors())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
