pub mod courses;
pub mod schedule;
pub mod status;
