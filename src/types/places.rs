use serde::{Deserialize, Serialize};

use super::dto::geom::LatLng;
use super::model::place::PlaceRecord;

/// Body of a Places API nearby search
#[derive(Serialize, Deserialize, Debug)]
pub struct NearbySearchResponse {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub results: Vec<NearbyPlace>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct NearbyPlace {
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub vicinity: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub geometry: Option<PlaceGeometry>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_ratings_total: Option<u64>,
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct PlaceGeometry {
    pub location: LatLng,
}

impl NearbySearchResponse {
    /// ZERO_RESULTS is a successful empty search, every other non OK status is a failure
    pub fn is_ok(&self) -> bool {
        matches!(self.status.as_str(), "OK" | "ZERO_RESULTS")
    }
}

impl From<NearbyPlace> for PlaceRecord {
    fn from(place: NearbyPlace) -> Self {
        PlaceRecord {
            id: place.place_id,
            name: place.name,
            address: place.vicinity.or(place.formatted_address),
            location: place.geometry.map(|g| g.location.into()),
            rating: place.rating,
            rating_count: place.user_ratings_total,
            categories: place.types,
        }
    }
}
