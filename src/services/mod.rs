pub mod job_seeker_service;
pub mod sales_user_service;
pub mod transition_policy;
