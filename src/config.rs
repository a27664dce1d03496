use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use color_eyre::eyre::{eyre, Result, WrapErr};

use crate::places::DEFAULT_SEARCH_RADIUS_M;
use crate::sampler::{SamplerOptions, DEFAULT_SAMPLING_INTERVAL_KM};

const PREFIX: &str = "FOODSTOPS_";

/// How places are queried around each sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// One keyword search covering every allowed category
    Keyword,
    /// A search for a single place type
    Type,
}

impl FromStr for QueryMode {
    type Err = color_eyre::eyre::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "keyword" => Ok(QueryMode::Keyword),
            "type" => Ok(QueryMode::Type),
            other => Err(eyre!("Unknown query mode '{}', expected keyword or type", other)),
        }
    }
}

/// Which route points become samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingStrategy {
    /// Points of the overview polyline, spaced by the sampling interval
    Polyline,
    /// The end of every direction step
    Steps,
}

impl FromStr for SamplingStrategy {
    type Err = color_eyre::eyre::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "polyline" => Ok(SamplingStrategy::Polyline),
            "steps" => Ok(SamplingStrategy::Steps),
            other => Err(eyre!(
                "Unknown sampling strategy '{}', expected polyline or steps",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub google_api_key: String,
    pub bind_addr: SocketAddr,
    pub categories_file: PathBuf,
    pub category_tag: String,
    pub sampler: SamplerOptions,
    pub sampling: SamplingStrategy,
    pub search_radius_m: u32,
    pub query_mode: QueryMode,
    pub place_type: String,
    pub query_concurrency: usize,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub debug_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any variable source, keys include the FOODSTOPS_ prefix
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };
        let google_api_key = vars
            .get("GOOGLE_API_KEY")
            .ok_or(eyre!("{}GOOGLE_API_KEY is not set", PREFIX))?;

        let interval_km: f64 = vars.parse_or(
            "SAMPLING_INTERVAL_KM",
            &DEFAULT_SAMPLING_INTERVAL_KM.to_string(),
        )?;
        if interval_km.is_nan() || interval_km <= 0.0 {
            return Err(eyre!("{}SAMPLING_INTERVAL_KM must be positive", PREFIX));
        }
        let query_concurrency: usize = vars.parse_or("QUERY_CONCURRENCY", "4")?;
        if query_concurrency == 0 {
            return Err(eyre!("{}QUERY_CONCURRENCY must be at least 1", PREFIX));
        }

        Ok(Config {
            google_api_key,
            bind_addr: vars.parse_or("BIND_ADDR", "0.0.0.0:3000")?,
            categories_file: PathBuf::from(vars.get_or("CATEGORIES_FILE", "categories.json")),
            category_tag: vars.get_or("CATEGORY_TAG", "food"),
            sampler: SamplerOptions {
                interval_km,
                include_endpoint: vars.parse_or("INCLUDE_ENDPOINT", "false")?,
            },
            sampling: vars.parse_or("SAMPLING", "polyline")?,
            search_radius_m: vars
                .parse_or("SEARCH_RADIUS_M", &DEFAULT_SEARCH_RADIUS_M.to_string())?,
            query_mode: vars.parse_or("QUERY_MODE", "keyword")?,
            place_type: vars.get_or("PLACE_TYPE", "restaurant"),
            query_concurrency,
            request_timeout: Duration::from_secs(vars.parse_or("REQUEST_TIMEOUT_SECS", "10")?),
            max_retries: vars.parse_or("MAX_RETRIES", "2")?,
            debug_dir: vars.get("DEBUG_DIR").map(PathBuf::from),
        })
    }
}

struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Empty values count as unset
    fn get(&self, name: &str) -> Option<String> {
        (self.lookup)(&format!("{}{}", PREFIX, name)).filter(|v| !v.is_empty())
    }

    fn get_or(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or_else(|| default.to_string())
    }

    fn parse_or<T>(&self, name: &str, default: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Into<color_eyre::eyre::Error>,
    {
        let value = self.get_or(name, default);
        value
            .parse::<T>()
            .map_err(Into::<color_eyre::eyre::Error>::into)
            .wrap_err_with(|| format!("Invalid value '{}' for {}{}", value, PREFIX, name))
    }
}
