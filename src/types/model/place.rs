use geo_types::Point;
use serde::Serialize;

use crate::types::dto::geom::LatLng;

/// A venue as reported by the places provider. Anything may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub location: Option<Point<f64>>,
    pub rating: Option<f64>,
    pub rating_count: Option<u64>,
    /// Provider categories, in the order the provider listed them
    pub categories: Vec<String>,
}

/// A deduplicated venue ready for display
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PlaceResult {
    pub id: String,
    pub name: String,
    pub address: String,
    pub location: LatLng,
    pub rating: Option<f64>,
    pub rating_count: Option<u64>,
    pub display_categories: Vec<String>,
    pub external_map_url: String,
}
