use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use crate::categories::{display_categories, AllowedCategories};
use crate::types::model::place::{PlaceRecord, PlaceResult};

const MAP_SEARCH_URL: &str = "https://www.google.com/maps/search/";

/// Everything found along one route
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregate {
    /// Places in the order they were first seen
    pub results: Vec<PlaceResult>,
    /// Every display category used by a result, sorted
    pub available_categories: Vec<String>,
}

/// Merges place batches from successive route samples, keeping the first
/// acceptable record for each place id.
pub struct Aggregator<'a> {
    allowed: &'a AllowedCategories,
    seen: HashSet<String>,
    results: Vec<PlaceResult>,
    categories: BTreeSet<String>,
}

impl<'a> Aggregator<'a> {
    pub fn new(allowed: &'a AllowedCategories) -> Self {
        Self {
            allowed,
            seen: HashSet::new(),
            results: Vec::new(),
            categories: BTreeSet::new(),
        }
    }

    pub fn push_batch<I>(&mut self, batch: I)
    where
        I: IntoIterator<Item = PlaceRecord>,
    {
        for record in batch {
            self.push(record);
        }
    }

    /// Returns whether the record was kept
    pub fn push(&mut self, record: PlaceRecord) -> bool {
        let id = match record.id.as_deref() {
            Some(id) if !id.is_empty() => id,
            _ => return false,
        };
        if self.seen.contains(id) || !self.allowed.admits(&record.categories) {
            return false;
        }
        let (Some(name), Some(address), Some(location)) =
            (&record.name, &record.address, record.location)
        else {
            debug!(id, "Skipping incomplete place");
            return false;
        };

        let display_categories = display_categories(&record.categories);
        self.categories.extend(display_categories.iter().cloned());
        self.seen.insert(id.to_string());
        self.results.push(PlaceResult {
            id: id.to_string(),
            name: name.clone(),
            address: address.clone(),
            location: location.into(),
            rating: record.rating,
            rating_count: record.rating_count,
            display_categories,
            external_map_url: external_map_url(name, address),
        });
        true
    }

    pub fn finish(self) -> Aggregate {
        Aggregate {
            results: self.results,
            available_categories: self.categories.into_iter().collect(),
        }
    }
}

/// Aggregate batches in the order given
pub fn aggregate<B>(batches: B, allowed: &AllowedCategories) -> Aggregate
where
    B: IntoIterator,
    B::Item: IntoIterator<Item = PlaceRecord>,
{
    let mut aggregator = Aggregator::new(allowed);
    for batch in batches {
        aggregator.push_batch(batch);
    }
    aggregator.finish()
}

/// Link that opens a search for the place in Google Maps
pub fn external_map_url(name: &str, address: &str) -> String {
    let query: String =
        url::form_urlencoded::byte_serialize(format!("{}, {}", name, address).as_bytes()).collect();
    format!("{}?api=1&query={}", MAP_SEARCH_URL, query)
}
