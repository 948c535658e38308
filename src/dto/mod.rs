pub mod job_seeker_dto;
