//! Internship certificate service: spreadsheet import for admins, public lookup
//! and PDF download for everyone else.

pub mod auth;
pub mod config;
pub mod cors;
pub mod error;
pub mod import;
pub mod services;
pub mod spreadsheet;
pub mod state;
pub mod store;
