use async_trait::async_trait;
use thiserror::Error;

use crate::models::building::{Building, NewBuilding};
use crate::models::user::{NewUser, UserRecord};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("a record with this {0} already exists")]
    Conflict(&'static str),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<UserRecord>, StoreError>;

    async fn create_user(&self, user: NewUser) -> Result<UserRecord, StoreError>;

    async fn count_users(&self) -> Result<i64, StoreError>;
}

#[async_trait]
pub trait BuildingStore: Send + Sync {
    /// All buildings, ordered by id ascending.
    async fn list_buildings(&self) -> Result<Vec<Building>, StoreError>;

    async fn create_building(&self, building: NewBuilding) -> Result<Building, StoreError>;

    async fn count_buildings(&self) -> Result<i64, StoreError>;
}
