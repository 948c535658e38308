pub mod history;
pub mod job_seeker;
pub mod sales_user;
