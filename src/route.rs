use std::future::Future;

use color_eyre::eyre::{eyre, Result};
use geo_types::{LineString, Point};
use google_maps::{prelude::*, GoogleMapsClient};
use num_traits::ToPrimitive;
use tracing::{instrument, warn};

use crate::route_geo::lat_lng;

/// Precision of Google encoded polylines
const POLYLINE_PRECISION: u32 = 5;

/// The parts of a directions result the planner needs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteResponse {
    /// Encoded polyline for the whole route
    pub overview_polyline: String,
    /// End location of every step of every leg, in travel order
    pub step_ends: Vec<Point<f64>>,
}

pub trait RouteSource {
    /// Fetch the first driving route between two free text locations
    fn fetch_route(
        &self,
        origin: &str,
        destination: &str,
    ) -> impl Future<Output = Result<RouteResponse>> + Send;
}

pub struct GoogleDirections {
    client: GoogleMapsClient,
}

impl GoogleDirections {
    pub fn new(client: GoogleMapsClient) -> Self {
        Self { client }
    }
}

impl RouteSource for GoogleDirections {
    #[instrument(skip(self))]
    async fn fetch_route(&self, origin: &str, destination: &str) -> Result<RouteResponse> {
        let directions = self
            .client
            .directions(
                Location::Address(origin.to_string()),
                Location::Address(destination.to_string()),
            )
            .execute()
            .await?;
        let route = directions
            .routes
            .first()
            .ok_or(eyre!("No route between {} and {}", origin, destination))?;
        let step_ends = route
            .legs
            .iter()
            .flat_map(|leg| leg.steps.iter())
            .filter_map(|step| {
                let lat = step.end_location.lat.to_f64()?;
                let lng = step.end_location.lng.to_f64()?;
                Some(lat_lng(lat, lng))
            })
            .collect();
        Ok(RouteResponse {
            overview_polyline: route.overview_polyline.points.clone(),
            step_ends,
        })
    }
}

/// Decode an encoded polyline into route points.
/// An empty or malformed polyline gives an empty path.
pub fn decode_path(encoded: &str) -> LineString<f64> {
    if encoded.is_empty() {
        return LineString::new(vec![]);
    }
    match polyline::decode_polyline(encoded, POLYLINE_PRECISION) {
        Ok(line) => line,
        Err(err) => {
            warn!("Couldn't decode route polyline: {}", err);
            LineString::new(vec![])
        }
    }
}
