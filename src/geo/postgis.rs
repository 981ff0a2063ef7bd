use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::geo::distance::{DistanceError, DistanceProvider};
use crate::models::position::GeoPoint;

const DISTANCE_QUERY: &str = "\
SELECT ST_Distance(
    ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography,
    ST_SetSRID(ST_MakePoint($3, $4), 4326)::geography
) AS distance";

/// Geodesic distance computed by PostGIS on the WGS84 spheroid.
pub struct PostGisDistance {
    pool: PgPool,
    timeout: Duration,
}

impl PostGisDistance {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait]
impl DistanceProvider for PostGisDistance {
    fn name(&self) -> &'static str {
        "postgis"
    }

    async fn distance_km(&self, start: GeoPoint, end: GeoPoint) -> Result<f64, DistanceError> {
        // ST_MakePoint takes (x, y), i.e. longitude first
        let query = sqlx::query_scalar::<_, f64>(DISTANCE_QUERY)
            .bind(start.lng)
            .bind(start.lat)
            .bind(end.lng)
            .bind(end.lat)
            .fetch_one(&self.pool);

        let meters = tokio::time::timeout(self.timeout, query)
            .await
            .map_err(|_| DistanceError::Timeout(self.timeout.as_millis()))??;

        meters_to_km(meters)
    }
}

fn meters_to_km(meters: f64) -> Result<f64, DistanceError> {
    if !meters.is_finite() || meters < 0.0 {
        return Err(DistanceError::InvalidResult(meters));
    }
    Ok(meters / 1000.0)
}
