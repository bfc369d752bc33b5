//! Common types for the shared crate

use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp type (Unix milliseconds)
pub type Timestamp = i64;

/// Role supplied by the external auth collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Customer,
    Restaurant,
    Rider,
    Support,
    Admin,
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActorRole::Customer => "customer",
            ActorRole::Restaurant => "restaurant",
            ActorRole::Rider => "rider",
            ActorRole::Support => "support",
            ActorRole::Admin => "admin",
        };
        f.write_str(s)
    }
}

/// Caller identity attached to every write
///
/// The core does not authenticate this; it records it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub role: ActorRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: ActorRole) -> Self {
        Self {
            id: id.into(),
            role,
            name: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn customer(id: impl Into<String>) -> Self {
        Self::new(id, ActorRole::Customer)
    }

    pub fn restaurant(id: impl Into<String>) -> Self {
        Self::new(id, ActorRole::Restaurant)
    }

    pub fn rider(id: impl Into<String>) -> Self {
        Self::new(id, ActorRole::Rider)
    }
}

/// Geographic point (WGS84 degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Approximate distance in km (equirectangular, 111 km per degree)
    pub fn approx_distance_km(&self, other: &GeoPoint) -> f64 {
        const KM_PER_DEGREE: f64 = 111.0;
        let d_lat = (other.lat - self.lat) * KM_PER_DEGREE;
        let d_lng =
            (other.lng - self.lng) * KM_PER_DEGREE * (other.lat.to_radians()).cos();
        (d_lat * d_lat + d_lng * d_lng).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_role_serialize() {
        let actor = Actor::rider("r-1").named("Sompong K.");
        let json = serde_json::to_value(&actor).unwrap();
        assert_eq!(json["role"], "rider");
        assert_eq!(json["name"], "Sompong K.");
    }

    #[test]
    fn test_distance_zero_and_north() {
        let a = GeoPoint { lat: 13.7563, lng: 100.5018 };
        assert_eq!(a.approx_distance_km(&a), 0.0);
        let b = GeoPoint { lat: 13.7663, lng: 100.5018 };
        assert!((a.approx_distance_km(&b) - 1.11).abs() < 1e-6);
    }
}
