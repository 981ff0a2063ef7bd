pub mod building;
pub mod error;
pub mod position;
pub mod user;
