use color_eyre::eyre::Result;
use google_maps::GoogleMapsClient;
use tracing::info;

use crate::categories::AllowedCategories;
use crate::config::{Config, QueryMode};
use crate::places::{GooglePlaces, SearchCriteria};
use crate::planner::{FoodStopPlanner, PlannerOptions};
use crate::route::GoogleDirections;

pub type GooglePlanner = FoodStopPlanner<GoogleDirections, GooglePlaces>;

/// Everything the handlers share, built once from the config
pub struct AppState {
    pub planner: GooglePlanner,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self> {
        let allowed =
            AllowedCategories::load_or_default(&config.categories_file, &config.category_tag);
        let criteria = match config.query_mode {
            QueryMode::Keyword => SearchCriteria::keyword_for(&allowed, &config.place_type),
            QueryMode::Type => SearchCriteria::Type(config.place_type.clone()),
        };
        info!(?criteria, "Place search criteria");

        // Directions and Places share one client so both honour the request timeout
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        let mut google_maps_client = GoogleMapsClient::new(&config.google_api_key);
        google_maps_client.with_reqwest_client(http.clone());

        let planner = FoodStopPlanner::new(
            GoogleDirections::new(google_maps_client),
            GooglePlaces::new(
                http,
                config.google_api_key.clone(),
                config.max_retries,
                config.debug_dir.clone(),
            ),
            allowed,
            PlannerOptions {
                sampler: config.sampler,
                sampling: config.sampling,
                radius_m: config.search_radius_m,
                criteria,
                concurrency: config.query_concurrency,
            },
        );
        Ok(AppState { planner })
    }
}
