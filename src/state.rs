use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRef;

use crate::config::Config;
use crate::geo::{DistanceProvider, FallbackDistance, Haversine, PostGisDistance};
use crate::jwt_auth::JwtConfig;
use crate::rate_limit::RateLimiter;
use crate::store::{BuildingStore, PgStore, StoreError, UserStore};
use crate::translate::{LibreTranslate, TranslateError, Translator};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub buildings: Arc<dyn BuildingStore>,
    pub distance: Arc<dyn DistanceProvider>,
    pub translator: Arc<dyn Translator>,
    pub jwt: Arc<JwtConfig>,
    pub limiter: Arc<RateLimiter>,
    pub bcrypt_cost: u32,
    pub translate_retry_backoff: Duration,
}

#[derive(thiserror::Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Translate(#[from] TranslateError),
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self, StartupError> {
        let store = Arc::new(PgStore::connect_lazy(config)?);
        let distance = FallbackDistance::new(
            PostGisDistance::new(store.pool().clone(), config.geo_query_timeout),
            Haversine,
        );

        Ok(Self {
            users: store.clone(),
            buildings: store,
            distance: Arc::new(distance),
            translator: Arc::new(LibreTranslate::new(&config.translate_url)?),
            jwt: Arc::new(JwtConfig::from_config(config)),
            limiter: Arc::new(RateLimiter::per_minute(config.rate_limit_per_minute)),
            bcrypt_cost: config.bcrypt_cost,
            translate_retry_backoff: config.translate_retry_backoff,
        })
    }
}

impl FromRef<AppState> for Arc<JwtConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

impl FromRef<AppState> for Arc<RateLimiter> {
    fn from_ref(state: &AppState) -> Self {
        state.limiter.clone()
    }
}
