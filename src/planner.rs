use std::fmt;

use futures::stream::{self, StreamExt};
use geo_types::{LineString, Point};
use tracing::{debug, info, instrument, warn};

use crate::aggregate::{aggregate, Aggregate};
use crate::categories::AllowedCategories;
use crate::config::SamplingStrategy;
use crate::places::{PlaceSearch, SearchCriteria, DEFAULT_SEARCH_RADIUS_M};
use crate::route::{decode_path, RouteSource};
use crate::route_geo::Distance;
use crate::sampler::{sample_route, SamplePoint, SamplerOptions};
use crate::types::model::place::PlaceRecord;

#[derive(Debug, Clone)]
pub struct PlannerOptions {
    pub sampler: SamplerOptions,
    pub sampling: SamplingStrategy,
    pub radius_m: u32,
    pub criteria: SearchCriteria,
    /// Place searches allowed in flight at once
    pub concurrency: usize,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            sampler: SamplerOptions::default(),
            sampling: SamplingStrategy::Polyline,
            radius_m: DEFAULT_SEARCH_RADIUS_M,
            criteria: SearchCriteria::Type(String::from("restaurant")),
            concurrency: 4,
        }
    }
}

/// Why a search came back with nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// The directions request failed or found no route
    RouteUnavailable,
    /// A route exists but there were no points to search around
    PathDecodeEmpty,
    /// Searches ran but no place passed the filters
    NoPlaces,
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            EmptyReason::RouteUnavailable => {
                "No route could be found between these two addresses."
            }
            EmptyReason::PathDecodeEmpty => "The route has no points to search along.",
            EmptyReason::NoPlaces => "No food stops were found along this route.",
        };
        f.write_str(message)
    }
}

/// A route and the places found along it
#[derive(Debug, Clone)]
pub struct RouteSearch {
    pub route: LineString<f64>,
    pub samples: Vec<SamplePoint>,
    /// Samples whose place search failed and contributed nothing
    pub failed_samples: usize,
    pub aggregate: Aggregate,
}

impl RouteSearch {
    pub fn distance_km(&self) -> f64 {
        self.route.distance_km()
    }
}

#[derive(Debug, Clone)]
pub enum SearchOutcome {
    Found(RouteSearch),
    Empty(EmptyReason),
}

/// Fetches a route, samples it and gathers the food places near each sample
pub struct FoodStopPlanner<R, P> {
    routes: R,
    places: P,
    allowed: AllowedCategories,
    options: PlannerOptions,
}

impl<R, P> FoodStopPlanner<R, P>
where
    R: RouteSource,
    P: PlaceSearch,
{
    pub fn new(routes: R, places: P, allowed: AllowedCategories, options: PlannerOptions) -> Self {
        Self {
            routes,
            places,
            allowed,
            options,
        }
    }

    pub fn allowed_categories(&self) -> &AllowedCategories {
        &self.allowed
    }

    #[instrument(skip(self))]
    pub async fn plan(&self, origin: &str, destination: &str) -> SearchOutcome {
        let route = match self.routes.fetch_route(origin, destination).await {
            Ok(route) => route,
            Err(err) => {
                warn!("Route unavailable: {:#}", err);
                return SearchOutcome::Empty(EmptyReason::RouteUnavailable);
            }
        };

        let path = decode_path(&route.overview_polyline);
        let samples: Vec<SamplePoint> = match self.options.sampling {
            SamplingStrategy::Polyline => {
                let points: Vec<Point<f64>> = path.points().collect();
                sample_route(&points, self.options.sampler).collect()
            }
            SamplingStrategy::Steps => route
                .step_ends
                .iter()
                .enumerate()
                .map(|(index, point)| SamplePoint {
                    index,
                    point: *point,
                })
                .collect(),
        };
        if samples.is_empty() {
            warn!("Route has no points to sample");
            return SearchOutcome::Empty(EmptyReason::PathDecodeEmpty);
        }
        info!(
            path_points = path.0.len(),
            samples = samples.len(),
            "Searching for places along route"
        );

        // buffered keeps sample order, so the first sighting of a place is deterministic
        let batches: Vec<Option<Vec<PlaceRecord>>> = stream::iter(samples.clone())
            .map(|sample| self.search_sample(sample))
            .buffered(self.options.concurrency.max(1))
            .collect()
            .await;
        let failed_samples = batches.iter().filter(|batch| batch.is_none()).count();
        let aggregate = aggregate(batches.into_iter().flatten(), &self.allowed);
        info!(
            places = aggregate.results.len(),
            failed_samples, "Finished route search"
        );

        if aggregate.results.is_empty() {
            return SearchOutcome::Empty(EmptyReason::NoPlaces);
        }
        SearchOutcome::Found(RouteSearch {
            route: path,
            samples,
            failed_samples,
            aggregate,
        })
    }

    /// Places around one sample, or None when the search failed
    async fn search_sample(&self, sample: SamplePoint) -> Option<Vec<PlaceRecord>> {
        match self
            .places
            .search_nearby(sample.point, self.options.radius_m, &self.options.criteria)
            .await
        {
            Ok(records) => {
                debug!(index = sample.index, count = records.len(), "Sample searched");
                Some(records)
            }
            Err(err) => {
                warn!(index = sample.index, "Place search failed: {:#}", err);
                None
            }
        }
    }
}
