use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Yogyakarta city center, used as the fall-back position when a seed entry
/// carries no usable coordinates.
pub const DEFAULT_CENTER: LatLng = LatLng {
    lat: -7.797,
    lng: 110.370,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Render as the store's comma-joined `"lat,lng"` encoding.
    #[must_use]
    pub fn to_wire(self) -> String {
        format!("{},{}", self.lat, self.lng)
    }
}

/// Great-circle distance in kilometers between two points given in degrees,
/// using the haversine formula over a spherical Earth of radius 6371 km.
///
/// Inputs are assumed finite; validation happens upstream in the normalizer.
#[must_use]
pub fn haversine_km(a: LatLng, b: LatLng) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Parse the store's `"lat,lng"` string encoding.
///
/// Returns `None` unless the input splits into exactly two finite numbers.
#[must_use]
pub fn parse_wire(raw: &str) -> Option<LatLng> {
    let mut parts = raw.trim().split(',');
    let lat = parts.next()?.trim().parse::<f64>().ok()?;
    let lng = parts.next()?.trim().parse::<f64>().ok()?;
    if parts.next().is_some() || !lat.is_finite() || !lng.is_finite() {
        return None;
    }
    Some(LatLng { lat, lng })
}

/// Tolerant coordinate read covering every shape observed in stored records:
/// a `"lat,lng"` string, a two-element array, or a `{latitude, longitude}`
/// object. Anything else resolves to `None`.
#[must_use]
pub fn parse_value(raw: &Value) -> Option<LatLng> {
    match raw {
        Value::String(s) => parse_wire(s),
        Value::Array(items) if items.len() >= 2 => {
            let lat = items[0].as_f64()?;
            let lng = items[1].as_f64()?;
            Some(LatLng { lat, lng })
        }
        Value::Object(map) => {
            let lat = map.get("latitude")?.as_f64()?;
            let lng = map.get("longitude")?.as_f64()?;
            Some(LatLng { lat, lng })
        }
        _ => None,
    }
}
