//! Renderable entities.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Ping;

/// Identifier shared by an entity and its track.
pub type EntityId = u64;

/// A renderable tracked object.
///
/// The position fields mirror the newest ping of the entity's track. The
/// `created_at`/`updated_at` timestamps are provenance metadata owned by the
/// source; extrapolation never changes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    /// Classification tags as reported by the source (e.g. `Air`, `Sea`).
    #[serde(default)]
    pub types: Vec<String>,
    /// Free-form source properties (`Name`, `Coalition`, `Pilot`, `Group`, ...).
    #[serde(default)]
    pub properties: HashMap<String, serde_json::Value>,
    pub longitude: f64,
    pub latitude: f64,
    pub altitude: f64,
    #[serde(default)]
    pub heading: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity {
    /// Create an entity at the given position with no tags or properties.
    pub fn new(id: EntityId, latitude: f64, longitude: f64, altitude: f64, at: DateTime<Utc>) -> Self {
        Self {
            id,
            types: Vec::new(),
            properties: HashMap::new(),
            longitude,
            latitude,
            altitude,
            heading: 0.0,
            created_at: at,
            updated_at: at,
        }
    }

    /// Copy of this entity moved to `ping`'s position and altitude.
    ///
    /// Exactly longitude, latitude and altitude are overridden. Heading is
    /// left untouched and both provenance timestamps are carried over.
    pub fn with_position(&self, ping: &Ping) -> Self {
        Self {
            longitude: ping.longitude(),
            latitude: ping.latitude(),
            altitude: ping.altitude,
            created_at: self.created_at,
            updated_at: self.updated_at,
            ..self.clone()
        }
    }

    /// Add a classification tag.
    pub fn with_type(mut self, tag: impl Into<String>) -> Self {
        self.types.push(tag.into());
        self
    }

    /// Set a string property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties
            .insert(key.into(), serde_json::Value::String(value.into()));
        self
    }

    pub fn has_type(&self, tag: &str) -> bool {
        self.types.iter().any(|t| t == tag)
    }

    fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(|v| v.as_str())
    }

    pub fn name(&self) -> Option<&str> {
        self.property_str("Name")
    }

    pub fn coalition(&self) -> Option<&str> {
        self.property_str("Coalition")
    }

    pub fn pilot(&self) -> Option<&str> {
        self.property_str("Pilot")
    }

    pub fn group(&self) -> Option<&str> {
        self.property_str("Group")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_entity() -> Entity {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut entity = Entity::new(7, 10.0, 19.0, 900.0, created)
            .with_type("Air")
            .with_type("FixedWing")
            .with_property("Name", "F-16C_50")
            .with_property("Coalition", "Enemies")
            .with_property("Pilot", "Viper 1-1");
        entity.heading = 90.0;
        entity.updated_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 5, 0).unwrap();
        entity
    }

    #[test]
    fn test_with_position_overrides_only_position_fields() {
        let entity = sample_entity();
        let ping = Ping::new(10.5, 20.5, 1500.0, 180.0, 5_000.0);

        let moved = entity.with_position(&ping);

        assert_eq!(moved.latitude, 10.5);
        assert_eq!(moved.longitude, 20.5);
        assert_eq!(moved.altitude, 1500.0);
        assert_eq!(moved.heading, 90.0, "heading is not taken from the ping");
        assert_eq!(moved.created_at, entity.created_at);
        assert_eq!(moved.updated_at, entity.updated_at);
        assert_eq!(moved.types, entity.types);
        assert_eq!(moved.properties, entity.properties);
        assert_eq!(moved.id, entity.id);
    }

    #[test]
    fn test_property_accessors() {
        let entity = sample_entity();
        assert_eq!(entity.name(), Some("F-16C_50"));
        assert_eq!(entity.coalition(), Some("Enemies"));
        assert_eq!(entity.pilot(), Some("Viper 1-1"));
        assert_eq!(entity.group(), None);
        assert!(entity.has_type("Air"));
        assert!(!entity.has_type("Sea"));
    }

    #[test]
    fn test_non_string_property_is_none() {
        let mut entity = sample_entity();
        entity
            .properties
            .insert("Group".to_string(), serde_json::json!(42));
        assert_eq!(entity.group(), None);
    }

    #[test]
    fn test_deserialize_minimal() {
        let json = r#"{
            "id": 3,
            "longitude": 1.0,
            "latitude": 2.0,
            "altitude": 3.0,
            "created_at": "2024-05-01T12:00:00Z",
            "updated_at": "2024-05-01T12:00:00Z"
        }"#;
        let entity: Entity = serde_json::from_str(json).unwrap();
        assert_eq!(entity.id, 3);
        assert!(entity.types.is_empty());
        assert_eq!(entity.heading, 0.0);
    }
}
