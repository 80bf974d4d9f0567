//! Menu catalog service: cached CRUD over a menu → submenu → dish hierarchy
//! with background spreadsheet export.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
