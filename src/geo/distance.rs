use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::position::GeoPoint;

/// Mean earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Error, Debug)]
pub enum DistanceError {
    #[error("geospatial query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("geospatial query timed out after {0} ms")]
    Timeout(u128),

    #[error("geospatial store returned an invalid distance: {0}")]
    InvalidResult(f64),
}

/// Anything able to compute the great-circle distance between two points.
#[async_trait]
pub trait DistanceProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn distance_km(&self, start: GeoPoint, end: GeoPoint) -> Result<f64, DistanceError>;
}

/// Closed-form spherical approximation. Never fails for finite input.
#[derive(Debug, Clone, Copy, Default)]
pub struct Haversine;

impl Haversine {
    pub fn compute(start: GeoPoint, end: GeoPoint) -> f64 {
        let d_lat = (end.lat - start.lat).to_radians();
        let d_lng = (end.lng - start.lng).to_radians();

        let a = (d_lat / 2.0).sin().powi(2)
            + start.lat.to_radians().cos() * end.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
        // rounding can push `a` a hair past 1 for antipodal points
        let a = a.clamp(0.0, 1.0);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }
}

#[async_trait]
impl DistanceProvider for Haversine {
    fn name(&self) -> &'static str {
        "haversine"
    }

    async fn distance_km(&self, start: GeoPoint, end: GeoPoint) -> Result<f64, DistanceError> {
        Ok(Self::compute(start, end))
    }
}

/// Tries `primary` once and absorbs any failure by answering from `fallback`.
pub struct FallbackDistance<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> FallbackDistance<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl<P, F> DistanceProvider for FallbackDistance<P, F>
where
    P: DistanceProvider,
    F: DistanceProvider,
{
    fn name(&self) -> &'static str {
        self.primary.name()
    }

    async fn distance_km(&self, start: GeoPoint, end: GeoPoint) -> Result<f64, DistanceError> {
        match self.primary.distance_km(start, end).await {
            Ok(km) => {
                debug!("distance from {}: {} km", self.primary.name(), km);
                Ok(km)
            }
            Err(e) => {
                warn!("Falling back to {} distance: {}", self.fallback.name(), e);
                self.fallback.distance_km(start, end).await
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const CAIRO: GeoPoint = GeoPoint { lat: 30.0444, lng: 31.2357 };
    const SINAI: GeoPoint = GeoPoint { lat: 29.9158, lng: 34.7299 };

    /// Provider that always fails and counts how often it was asked.
    #[derive(Default, Clone)]
    pub(crate) struct Unavailable {
        pub calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl DistanceProvider for Unavailable {
        fn name(&self) -> &'static str {
            "unavailable"
        }

        async fn distance_km(&self, _: GeoPoint, _: GeoPoint) -> Result<f64, DistanceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(DistanceError::Query(sqlx::Error::PoolTimedOut))
        }
    }

    pub(crate) struct Fixed(pub f64);

    #[async_trait]
    impl DistanceProvider for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn distance_km(&self, _: GeoPoint, _: GeoPoint) -> Result<f64, DistanceError> {
            Ok(self.0)
        }
    }

    #[test]
    fn identical_points_are_zero_apart() {
        assert_eq!(Haversine::compute(CAIRO, CAIRO), 0.0);
        assert_eq!(Haversine::compute(GeoPoint::new(-90.0, 0.0), GeoPoint::new(-90.0, 0.0)), 0.0);
    }

    #[test]
    fn haversine_is_symmetric() {
        let there = Haversine::compute(CAIRO, SINAI);
        let back = Haversine::compute(SINAI, CAIRO);
        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn cairo_to_sinai_fixture() {
        // straight from the formula: 336.84 km
        let km = Haversine::compute(CAIRO, SINAI);
        assert!((km - 336.84).abs() < 0.01, "got {} km", km);
    }

    #[test]
    fn antipodal_points_are_half_the_circumference() {
        let km = Haversine::compute(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 180.0));
        assert!((km - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[tokio::test]
    async fn primary_result_is_used_when_available() {
        let provider = FallbackDistance::new(Fixed(12.5), Haversine);
        assert_eq!(provider.distance_km(CAIRO, SINAI).await.unwrap(), 12.5);
    }

    #[tokio::test]
    async fn failing_primary_matches_fallback_exactly() {
        let primary = Unavailable::default();
        let calls = primary.calls.clone();
        let provider = FallbackDistance::new(primary, Haversine);

        let km = provider.distance_km(CAIRO, SINAI).await.unwrap();

        assert_eq!(km, Haversine::compute(CAIRO, SINAI));
        // one attempt, no retry
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failing_primary_still_gives_zero_for_identical_points() {
        let provider = FallbackDistance::new(Unavailable::default(), Haversine);
        assert_eq!(provider.distance_km(SINAI, SINAI).await.unwrap(), 0.0);
    }
}
