use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::config::Config;
use crate::models::building::{Building, NewBuilding};
use crate::models::user::{NewUser, UserRecord};
use crate::store::{BuildingStore, StoreError, UserStore};

const USER_COLUMNS: &str = "id, email, name, image, hashed_password, created_at";
const BUILDING_COLUMNS: &str = "id, name, name_ar, name_fr, building_type, description, \
     description_ar, description_fr, latitude, longitude, created_at";

/// Postgres-backed persistence for users and buildings.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Builds a lazily connecting pool, so the service comes up even while the
    /// database is down.
    pub fn connect_lazy(config: &Config) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect_lazy(&config.database_url)?;
        info!("Database pool configured ({} max connections)", config.db_max_connections);
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn map_unique_violation(field: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |e| {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return StoreError::Conflict(field);
            }
        }
        StoreError::Database(e)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<UserRecord>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let sql = format!(
            "INSERT INTO users (email, name, hashed_password) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, UserRecord>(&sql)
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.hashed_password)
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique_violation("email"))
    }

    async fn count_users(&self) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl BuildingStore for PgStore {
    async fn list_buildings(&self) -> Result<Vec<Building>, StoreError> {
        let sql = format!("SELECT {} FROM buildings ORDER BY id ASC", BUILDING_COLUMNS);
        let buildings = sqlx::query_as::<_, Building>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(buildings)
    }

    async fn create_building(&self, building: NewBuilding) -> Result<Building, StoreError> {
        let sql = format!(
            "INSERT INTO buildings (name, name_ar, name_fr, building_type, description, \
             description_ar, description_fr, latitude, longitude) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
            BUILDING_COLUMNS
        );
        let created = sqlx::query_as::<_, Building>(&sql)
            .bind(&building.name)
            .bind(&building.name_ar)
            .bind(&building.name_fr)
            .bind(&building.building_type)
            .bind(&building.description)
            .bind(&building.description_ar)
            .bind(&building.description_fr)
            .bind(building.latitude)
            .bind(building.longitude)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn count_buildings(&self) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM buildings")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
