use std::cmp::Reverse;

use geo_types::Point;
use serde::{Deserialize, Deserializer};

use crate::route_geo::distance_km;
use crate::types::model::place::PlaceResult;

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// The order places were found along the route
    #[default]
    Route,
    /// Best rated first
    Rating,
    /// Most reviewed first
    Reviews,
    Name,
    /// Closest to the user first, route order when the user location is unknown
    Distance,
}

/// Narrowing and ordering applied to a finished search before it's returned
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Refinement {
    /// Unrated places always pass
    pub min_rating: Option<f64>,
    /// Display categories a place needs at least one of. Empty keeps everything.
    pub categories: Vec<String>,
    pub sort: SortOrder,
    pub user_location: Option<Point<f64>>,
}

impl Refinement {
    pub fn apply(&self, results: &[PlaceResult]) -> Vec<PlaceResult> {
        let mut refined: Vec<PlaceResult> = results
            .iter()
            .filter(|place| match (self.min_rating, place.rating) {
                (Some(min), Some(rating)) => rating >= min,
                _ => true,
            })
            .filter(|place| {
                self.categories.is_empty()
                    || place.display_categories.iter().any(|label| {
                        self.categories
                            .iter()
                            .any(|wanted| label.eq_ignore_ascii_case(wanted))
                    })
            })
            .cloned()
            .collect();
        // Stable sorts, ties stay in route order
        match (self.sort, self.user_location) {
            (SortOrder::Route, _) | (SortOrder::Distance, None) => {}
            (SortOrder::Rating, _) => refined.sort_by(|a, b| {
                b.rating
                    .unwrap_or(-1.0)
                    .total_cmp(&a.rating.unwrap_or(-1.0))
            }),
            (SortOrder::Reviews, _) => {
                refined.sort_by_key(|place| Reverse(place.rating_count.unwrap_or(0)))
            }
            (SortOrder::Name, _) => refined.sort_by_cached_key(|place| place.name.to_lowercase()),
            (SortOrder::Distance, Some(user)) => refined.sort_by(|a, b| {
                distance_km(&user, &a.location.into())
                    .total_cmp(&distance_km(&user, &b.location.into()))
            }),
        }
        refined
    }
}

/// Accepts a json list or a comma separated string, so `?categories=Cafe,Bakery` works too
pub fn deserialize_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<String>),
        Joined(String),
    }

    let values = match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(values) => values,
        OneOrMany::Joined(joined) => joined.split(',').map(String::from).collect(),
    };
    Ok(values
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route_geo::lat_lng;

    fn place(
        id: &str,
        rating: Option<f64>,
        reviews: Option<u64>,
        categories: &[&str],
    ) -> PlaceResult {
        PlaceResult {
            id: id.into(),
            name: format!("{} diner", id),
            address: "Route Nationale 7".into(),
            location: lat_lng(44.0, 4.8).into(),
            rating,
            rating_count: reviews,
            display_categories: categories.iter().map(|c| c.to_string()).collect(),
            external_map_url: String::new(),
        }
    }

    fn ids(places: &[PlaceResult]) -> Vec<String> {
        places.iter().map(|p| p.id.clone()).collect()
    }

    fn sample() -> Vec<PlaceResult> {
        vec![
            place("c", Some(3.9), Some(40), &["Cafe"]),
            place("a", None, None, &["Bakery"]),
            place("b", Some(4.7), Some(12), &["Cafe", "Bakery"]),
        ]
    }

    fn sorted_by(sort: SortOrder) -> Vec<String> {
        let refinement = Refinement {
            sort,
            ..Default::default()
        };
        ids(&refinement.apply(&sample()))
    }

    #[test]
    fn default_keeps_route_order() {
        assert_eq!(ids(&Refinement::default().apply(&sample())), vec!["c", "a", "b"]);
    }

    #[test]
    fn min_rating_keeps_unrated() {
        let refinement = Refinement {
            min_rating: Some(4.0),
            ..Default::default()
        };
        assert_eq!(ids(&refinement.apply(&sample())), vec!["a", "b"]);

        let unrated = [place("u", None, None, &["Cafe"])];
        assert_eq!(refinement.apply(&unrated).len(), 1);
    }

    #[test]
    fn category_matches_display_label() {
        let refinement = Refinement {
            categories: vec!["bakery".into()],
            ..Default::default()
        };
        assert_eq!(ids(&refinement.apply(&sample())), vec!["a", "b"]);
    }

    #[test]
    fn several_categories_match_any() {
        let places = [
            place("bar", None, None, &["Bar"]),
            place("cafe", None, None, &["Cafe"]),
            place("bakery", None, None, &["Bakery"]),
        ];
        let refinement = Refinement {
            categories: vec!["Cafe".into(), "Bakery".into()],
            ..Default::default()
        };
        assert_eq!(ids(&refinement.apply(&places)), vec!["cafe", "bakery"]);
    }

    #[test]
    fn sorts() {
        assert_eq!(sorted_by(SortOrder::Rating), vec!["b", "c", "a"]);
        assert_eq!(sorted_by(SortOrder::Reviews), vec!["c", "b", "a"]);
        assert_eq!(sorted_by(SortOrder::Name), vec!["a", "b", "c"]);
    }

    #[test]
    fn distance_sort_orders_by_closeness_to_user() {
        let mut far = place("far", None, None, &[]);
        far.location = lat_lng(45.0, 4.8).into();
        let mut near = place("near", None, None, &[]);
        near.location = lat_lng(44.1, 4.8).into();
        let mut middle = place("middle", None, None, &[]);
        middle.location = lat_lng(44.5, 4.8).into();
        let places = [far, near, middle];

        let refinement = Refinement {
            sort: SortOrder::Distance,
            user_location: Some(lat_lng(44.0, 4.8)),
            ..Default::default()
        };
        assert_eq!(ids(&refinement.apply(&places)), vec!["near", "middle", "far"]);

        let without_location = Refinement {
            sort: SortOrder::Distance,
            ..Default::default()
        };
        assert_eq!(
            ids(&without_location.apply(&places)),
            vec!["far", "near", "middle"]
        );
    }

    #[test]
    fn list_from_string_or_array() {
        #[derive(Deserialize)]
        struct Params {
            #[serde(deserialize_with = "deserialize_list")]
            categories: Vec<String>,
        }

        let joined: Params = serde_json::from_str(r#"{"categories": "Cafe, Bakery,"}"#).unwrap();
        assert_eq!(joined.categories, vec!["Cafe", "Bakery"]);
        let list: Params = serde_json::from_str(r#"{"categories": ["Cafe", " "]}"#).unwrap();
        assert_eq!(list.categories, vec!["Cafe"]);
    }
}
