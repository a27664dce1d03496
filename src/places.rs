use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use color_eyre::eyre::{eyre, Report, Result};
use geo_types::Point;
use reqwest::StatusCode;
use tracing::{debug, instrument, warn};

use crate::categories::{keyword_expression, AllowedCategories};
use crate::types::{model::place::PlaceRecord, places::NearbySearchResponse};

const NEARBY_SEARCH_URL: &str = "https://maps.googleapis.com/maps/api/place/nearbysearch/json";

pub const DEFAULT_SEARCH_RADIUS_M: u32 = 5000;

/// What to ask the places provider for around each sample
#[derive(Debug, Clone, PartialEq)]
pub enum SearchCriteria {
    /// A single provider place type, e.g. `restaurant`
    Type(String),
    /// Free text, e.g. `bakery OR cafe OR "fast food"`
    Keyword(String),
}

impl SearchCriteria {
    /// Keyword search over every allowed category, falling back to `fallback_type`
    /// when there is nothing to build a keyword from
    pub fn keyword_for(allowed: &AllowedCategories, fallback_type: &str) -> Self {
        if allowed.is_empty() {
            SearchCriteria::Type(fallback_type.to_string())
        } else {
            SearchCriteria::Keyword(keyword_expression(allowed))
        }
    }

    fn query_param(&self) -> (&'static str, &str) {
        match self {
            SearchCriteria::Type(place_type) => ("type", place_type.as_str()),
            SearchCriteria::Keyword(keyword) => ("keyword", keyword.as_str()),
        }
    }
}

pub trait PlaceSearch {
    /// Places within `radius_m` metres of `point`
    fn search_nearby(
        &self,
        point: Point<f64>,
        radius_m: u32,
        criteria: &SearchCriteria,
    ) -> impl Future<Output = Result<Vec<PlaceRecord>>> + Send;
}

/// Places API nearby search over plain http
pub struct GooglePlaces {
    http: reqwest::Client,
    api_key: String,
    max_retries: u32,
    debug_dir: Option<PathBuf>,
}

impl GooglePlaces {
    pub fn new(
        http: reqwest::Client,
        api_key: String,
        max_retries: u32,
        debug_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            http,
            api_key,
            max_retries,
            debug_dir,
        }
    }

    async fn nearby_search(
        &self,
        point: Point<f64>,
        radius_m: u32,
        criteria: &SearchCriteria,
    ) -> Result<NearbySearchResponse, SearchFailure> {
        let (criteria_key, criteria_value) = criteria.query_param();
        let body = self
            .http
            .get(NEARBY_SEARCH_URL)
            .query(&[
                ("location", format!("{},{}", point.y(), point.x()).as_str()),
                ("radius", radius_m.to_string().as_str()),
                (criteria_key, criteria_value),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        if let Some(dir) = &self.debug_dir {
            dump_response(dir, point, &body).await;
        }
        let response: NearbySearchResponse =
            serde_json::from_str(&body).map_err(SearchFailure::permanent)?;
        if !response.is_ok() {
            return Err(SearchFailure {
                retryable: should_retry_status(&response.status),
                report: eyre!(
                    "Places search failed with status {}: {}",
                    response.status,
                    response.error_message.as_deref().unwrap_or("no message")
                ),
            });
        }
        Ok(response)
    }
}

impl PlaceSearch for GooglePlaces {
    #[instrument(skip(self, criteria), fields(lat = point.y(), lng = point.x()))]
    async fn search_nearby(
        &self,
        point: Point<f64>,
        radius_m: u32,
        criteria: &SearchCriteria,
    ) -> Result<Vec<PlaceRecord>> {
        let mut attempt = 0;
        loop {
            match self.nearby_search(point, radius_m, criteria).await {
                Ok(response) => {
                    debug!(count = response.results.len(), "Places found");
                    return Ok(response.results.into_iter().map(Into::into).collect());
                }
                Err(failure) if failure.retryable && attempt < self.max_retries => {
                    let delay = retry_delay(attempt);
                    warn!(
                        "Places search failed, retrying in {:?}: {:#}",
                        delay, failure.report
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(failure) => return Err(failure.report),
            }
        }
    }
}

/// A failed nearby search and whether trying again could help
struct SearchFailure {
    retryable: bool,
    report: Report,
}

impl SearchFailure {
    fn permanent(err: impl Into<Report>) -> Self {
        Self {
            retryable: false,
            report: err.into(),
        }
    }
}

impl From<reqwest::Error> for SearchFailure {
    fn from(err: reqwest::Error) -> Self {
        Self {
            retryable: err.is_connect()
                || err.is_timeout()
                || err.status().is_some_and(should_retry_http),
            report: err.into(),
        }
    }
}

/// Rate limiting and server side trouble, anything else fails the same way again
fn should_retry_http(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Places API body statuses worth another attempt
fn should_retry_status(status: &str) -> bool {
    matches!(status, "OVER_QUERY_LIMIT" | "UNKNOWN_ERROR")
}

/// Exponential backoff starting at 250ms
fn retry_delay(attempt: u32) -> Duration {
    Duration::from_millis(250 * 2u64.pow(attempt.min(6)))
}

async fn dump_response(dir: &Path, point: Point<f64>, body: &str) {
    let path = dir.join(format!("places_{:.5}_{:.5}.json", point.y(), point.x()));
    let pretty = serde_json::from_str::<serde_json::Value>(body)
        .and_then(|value| serde_json::to_string_pretty(&value))
        .unwrap_or_else(|_| body.to_string());
    if let Err(err) = tokio::fs::create_dir_all(dir).await {
        warn!("Couldn't create debug dir {}: {}", dir.display(), err);
        return;
    }
    if let Err(err) = tokio::fs::write(&path, pretty).await {
        warn!("Couldn't write debug dump {}: {}", path.display(), err);
    }
}
