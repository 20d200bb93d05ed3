pub mod auth;
pub mod cases;
pub mod config;
pub mod dashboard;
pub mod predict;
pub mod profile;
pub mod suggestions;
