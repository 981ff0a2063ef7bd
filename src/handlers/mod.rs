pub mod auth;
pub mod dashboard;
pub mod translate;
pub mod user;
