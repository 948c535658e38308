pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod telemetry;
pub mod utils;

use std::sync::Arc;

use crate::database::store::JobSeekerStore;
use crate::services::{
    job_seeker_service::JobSeekerService, sales_user_service::SalesUserService,
};

#[derive(Clone)]
pub struct AppState {
    pub job_seeker_service: JobSeekerService,
    pub sales_user_service: SalesUserService,
    pub jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(store: Arc<dyn JobSeekerStore>, jwt_secret: &str) -> Self {
        let job_seeker_service = JobSeekerService::new(store.clone());
        let sales_user_service = SalesUserService::new(store);

        Self {
            job_seeker_service,
            sales_user_service,
            jwt_secret: Arc::from(jwt_secret),
        }
    }
}
