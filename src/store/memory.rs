//! In-memory stores for router tests.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use crate::models::building::{Building, NewBuilding};
use crate::models::user::{NewUser, UserRecord};
use crate::store::{BuildingStore, StoreError, UserStore};

#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<i32, UserRecord>,
    buildings: DashMap<i32, Building>,
    next_id: AtomicI32,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail as if the database were down.
    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    fn next_id(&self) -> i32 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        self.check()?;
        Ok(self
            .users
            .iter()
            .find(|entry| entry.email == email)
            .map(|entry| entry.value().clone()))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<UserRecord>, StoreError> {
        self.check()?;
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn create_user(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        self.check()?;
        if self.users.iter().any(|entry| entry.email == user.email) {
            return Err(StoreError::Conflict("email"));
        }
        let record = UserRecord {
            id: self.next_id(),
            email: user.email,
            name: user.name,
            image: None,
            hashed_password: Some(user.hashed_password),
            created_at: Utc::now(),
        };
        self.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn count_users(&self) -> Result<i64, StoreError> {
        self.check()?;
        Ok(self.users.len() as i64)
    }
}

#[async_trait]
impl BuildingStore for MemoryStore {
    async fn list_buildings(&self) -> Result<Vec<Building>, StoreError> {
        self.check()?;
        let mut buildings: Vec<Building> =
            self.buildings.iter().map(|entry| entry.value().clone()).collect();
        buildings.sort_by_key(|b| b.id);
        Ok(buildings)
    }

    async fn create_building(&self, building: NewBuilding) -> Result<Building, StoreError> {
        self.check()?;
        let created = Building {
            id: self.next_id(),
            name: building.name,
            name_ar: building.name_ar,
            name_fr: building.name_fr,
            building_type: building.building_type,
            description: building.description,
            description_ar: building.description_ar,
            description_fr: building.description_fr,
            latitude: building.latitude,
            longitude: building.longitude,
            created_at: Utc::now(),
        };
        self.buildings.insert(created.id, created.clone());
        Ok(created)
    }

    async fn count_buildings(&self) -> Result<i64, StoreError> {
        self.check()?;
        Ok(self.buildings.len() as i64)
    }
}
