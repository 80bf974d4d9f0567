//! Infrastructure adapters and runtime bootstrap.

pub mod db;
pub mod error;
pub mod http;
pub mod reports;
pub mod spreadsheet;
pub mod telemetry;
