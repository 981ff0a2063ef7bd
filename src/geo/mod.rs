//! Distance and travel-time estimation between two map points.
//!
//! Distances come from a [`DistanceProvider`]; the service wires PostGIS as the
//! primary provider with [`Haversine`] as the fallback, so a database outage only
//! costs a little accuracy. Travel time is derived from the distance, the travel
//! mode and an optional driving speed.

pub mod distance;
pub mod postgis;
pub mod travel_time;

pub use distance::{DistanceProvider, FallbackDistance, Haversine};
pub use postgis::PostGisDistance;
pub use travel_time::{estimate_time, TravelMode};
