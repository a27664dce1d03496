use color_eyre::eyre::Result;
use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};

use crate::planner::SearchOutcome;
use crate::refine::{deserialize_list, Refinement, SortOrder};
use crate::route_geo::lat_lng;
use crate::types::feature::search_feature_collection;
use crate::types::model::place::PlaceResult;

/// Query string or json body of a search
#[derive(Deserialize, Debug, Clone)]
pub struct SearchParams {
    pub origin: String,
    pub destination: String,
    #[serde(default)]
    pub min_rating: Option<f64>,
    /// A list, or one comma separated string in a query string
    #[serde(default, alias = "category", deserialize_with = "deserialize_list")]
    pub categories: Vec<String>,
    #[serde(default)]
    pub sort: Option<SortOrder>,
    /// Where the user is, for sorting by distance
    #[serde(default)]
    pub user_lat: Option<f64>,
    #[serde(default)]
    pub user_lng: Option<f64>,
}

impl SearchParams {
    pub fn refinement(&self) -> Refinement {
        Refinement {
            min_rating: self.min_rating,
            categories: self.categories.clone(),
            sort: self.sort.unwrap_or_default(),
            user_location: match (self.user_lat, self.user_lng) {
                (Some(lat), Some(lng)) => Some(lat_lng(lat, lng)),
                _ => None,
            },
        }
    }
}

#[derive(Serialize, Debug)]
pub struct RouteSummary {
    pub distance_km: f64,
    pub sample_count: usize,
    pub failed_samples: usize,
}

#[derive(Serialize, Debug)]
pub struct SearchResponse {
    pub results: Vec<PlaceResult>,
    /// Categories across every place found, ignoring the refinement, for building filters
    pub available_categories: Vec<String>,
    /// Set whenever results is empty
    pub message: Option<String>,
    pub route: Option<RouteSummary>,
    pub geo_json: Option<FeatureCollection>,
}

impl SearchResponse {
    pub fn from_outcome(outcome: SearchOutcome, refinement: &Refinement) -> Result<Self> {
        let search = match outcome {
            SearchOutcome::Found(search) => search,
            SearchOutcome::Empty(reason) => {
                return Ok(SearchResponse {
                    results: vec![],
                    available_categories: vec![],
                    message: Some(reason.to_string()),
                    route: None,
                    geo_json: None,
                })
            }
        };
        let results = refinement.apply(&search.aggregate.results);
        let message = results
            .is_empty()
            .then(|| String::from("No food stops along this route match the selected filters."));
        Ok(SearchResponse {
            geo_json: Some(search_feature_collection(
                &search.route,
                &search.samples,
                &results,
            )?),
            route: Some(RouteSummary {
                distance_km: search.distance_km(),
                sample_count: search.samples.len(),
                failed_samples: search.failed_samples,
            }),
            available_categories: search.aggregate.available_categories,
            message,
            results,
        })
    }
}
