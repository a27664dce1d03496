use geo_types::Point;
use serde::{Deserialize, Serialize};

use crate::route_geo::lat_lng;

/// Latitude/longitude as the places API and our clients spell it
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<LatLng> for Point<f64> {
    fn from(value: LatLng) -> Self {
        lat_lng(value.lat, value.lng)
    }
}

impl From<Point<f64>> for LatLng {
    fn from(value: Point<f64>) -> Self {
        LatLng {
            lat: value.y(),
            lng: value.x(),
        }
    }
}
