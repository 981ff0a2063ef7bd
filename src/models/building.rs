use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::position::GeoPoint;

/// A point of interest as stored and served to the map.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Building {
    pub id: i32,
    pub name: String,
    pub name_ar: String,
    pub name_fr: String,
    pub building_type: String,
    pub description: String,
    pub description_ar: String,
    pub description_fr: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /dashboard/add`. Coordinates arrive either as numbers or as
/// numeric strings from form inputs.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBuilding {
    pub name: String,
    #[serde(default)]
    pub name_ar: String,
    #[serde(default)]
    pub name_fr: String,
    #[serde(default)]
    pub building_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub description_ar: String,
    #[serde(default)]
    pub description_fr: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub latitude: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub longitude: f64,
}

impl NewBuilding {
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    pub fn needs_translation(&self) -> bool {
        self.name_ar.trim().is_empty()
            || self.name_fr.trim().is_empty()
            || (!self.description.trim().is_empty()
                && (self.description_ar.trim().is_empty() || self.description_fr.trim().is_empty()))
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid coordinate: {:?}", s))),
    }
}

#[derive(Debug, Serialize)]
pub struct BuildingList {
    pub buildings: Vec<Building>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct DashboardStats {
    pub users: i64,
    pub buildings: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_accept_numeric_strings() {
        let body = r#"{"name": "Pyramid", "latitude": "29.9792", "longitude": 31.1342}"#;
        let building: NewBuilding = serde_json::from_str(body).unwrap();
        assert_eq!(building.latitude, 29.9792);
        assert_eq!(building.longitude, 31.1342);
        assert!(building.name_ar.is_empty());
    }

    #[test]
    fn non_numeric_coordinates_are_rejected() {
        let body = r#"{"name": "Pyramid", "latitude": "north", "longitude": 31.1}"#;
        assert!(serde_json::from_str::<NewBuilding>(body).is_err());
    }

    #[test]
    fn translation_needed_only_when_fields_are_blank() {
        let mut building: NewBuilding =
            serde_json::from_str(r#"{"name": "Tower", "latitude": 1, "longitude": 2}"#).unwrap();
        assert!(building.needs_translation());

        building.name_ar = "برج".into();
        building.name_fr = "Tour".into();
        assert!(!building.needs_translation());

        building.description = "Tall".into();
        assert!(building.needs_translation());
    }
}
