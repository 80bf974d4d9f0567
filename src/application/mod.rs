//! Application services layer.

pub mod catalog;
pub mod error;
pub mod jobs;
pub mod projection;
pub mod report;
pub mod repos;
pub mod seed;
