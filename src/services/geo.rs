use crate::config::Config;

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Circular allowed region around the office coordinate. When disabled,
/// every coordinate passes.
#[derive(Debug, Clone)]
pub struct GeoFence {
    enabled: bool,
    office_lat: f64,
    office_lng: f64,
    radius_meters: f64,
}

/// Verdict plus the measured distance for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoCheck {
    pub valid: bool,
    pub distance_meters: Option<f64>,
}

impl GeoFence {
    pub fn new(enabled: bool, office_lat: f64, office_lng: f64, radius_meters: f64) -> Self {
        Self {
            enabled,
            office_lat,
            office_lng,
            radius_meters,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.geo_enabled,
            config.geo_office_lat,
            config.geo_office_lng,
            config.geo_radius_meters,
        )
    }

    pub fn radius_meters(&self) -> f64 {
        self.radius_meters
    }

    pub fn validate(&self, lat: f64, lng: f64) -> GeoCheck {
        if !self.enabled {
            return GeoCheck {
                valid: true,
                distance_meters: None,
            };
        }

        let distance = haversine_distance(lat, lng, self.office_lat, self.office_lng);

        if distance > self.radius_meters {
            log::warn!(
                "Location validation failed - out of range: lat={} lng={} distance={:.0}m radius={:.0}m",
                lat,
                lng,
                distance,
                self.radius_meters
            );
            return GeoCheck {
                valid: false,
                distance_meters: Some(distance),
            };
        }

        GeoCheck {
            valid: true,
            distance_meters: Some(distance),
        }
    }
}

/// Great-circle distance between two coordinates, in meters.
fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}
