pub mod application;
pub mod audit_log;
pub mod company;
pub mod cv;
pub mod job;
pub mod saved_search;
pub mod user;
