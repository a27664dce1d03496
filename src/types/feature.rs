use color_eyre::eyre;
use color_eyre::eyre::eyre;
use geo_types::{LineString, Point};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject};
use serde::Serialize;

use crate::route_geo::{BoundingBox, Distance};
use crate::sampler::SamplePoint;
use crate::types::model::place::PlaceResult;

/// Properties that are attached to a geojson feature
#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureProperties {
    Route { distance_km: f64 },
    Sample { index: usize },
    Place {
        name: String,
        rating: Option<f64>,
        external_map_url: String,
    },
}

/// For converting FeatureProperties to geojson properties
impl TryInto<JsonObject> for FeatureProperties {
    type Error = eyre::Error;

    fn try_into(self) -> Result<JsonObject, Self::Error> {
        let value = serde_json::to_value(self)?;
        let properties = value
            .as_object()
            .ok_or(eyre!("Couldn't create object for properties"))?;
        Ok(properties.to_owned())
    }
}

fn feature_point(
    id: String,
    point: &Point<f64>,
    properties: FeatureProperties,
) -> eyre::Result<Feature> {
    Ok(Feature {
        id: Some(geojson::feature::Id::String(id)),
        geometry: Some(Geometry::new(point.into())),
        properties: Some(properties.try_into()?),
        ..Default::default()
    })
}

/// The route line, the sampled points and every place found, for drawing on a map
pub fn search_feature_collection(
    route: &LineString<f64>,
    samples: &[SamplePoint],
    places: &[PlaceResult],
) -> eyre::Result<FeatureCollection> {
    let bounding_box = route.bounding_box();
    let mut features = Vec::with_capacity(1 + samples.len() + places.len());
    features.push(Feature {
        bbox: bounding_box.to_owned(),
        id: Some(geojson::feature::Id::String(String::from("route"))),
        geometry: Some(Geometry {
            bbox: bounding_box.to_owned(),
            value: route.into(),
            foreign_members: None,
        }),
        properties: Some(
            FeatureProperties::Route {
                distance_km: route.distance_km(),
            }
            .try_into()?,
        ),
        ..Default::default()
    });
    for sample in samples {
        features.push(feature_point(
            format!("sample-{}", sample.index),
            &sample.point,
            FeatureProperties::Sample {
                index: sample.index,
            },
        )?);
    }
    for place in places {
        features.push(feature_point(
            place.id.clone(),
            &place.location.into(),
            FeatureProperties::Place {
                name: place.name.clone(),
                rating: place.rating,
                external_map_url: place.external_map_url.clone(),
            },
        )?);
    }
    Ok(FeatureCollection {
        bbox: bounding_box,
        features,
        foreign_members: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route_geo::lat_lng;

    #[test]
    fn collection_has_route_samples_and_places() {
        let route: LineString<f64> = vec![(5.0, 45.0), (5.1, 45.1)].into();
        let samples = [SamplePoint {
            index: 0,
            point: lat_lng(45.0, 5.0),
        }];
        let places = [PlaceResult {
            id: "p1".into(),
            name: "Chez Paul".into(),
            address: "1 rue Haute".into(),
            location: lat_lng(45.05, 5.05).into(),
            rating: Some(4.2),
            rating_count: Some(10),
            display_categories: vec!["Cafe".into()],
            external_map_url: "https://example.test".into(),
        }];

        let collection = search_feature_collection(&route, &samples, &places).unwrap();
        assert_eq!(collection.features.len(), 3);
        assert_eq!(collection.bbox, Some(vec![5.0, 45.0, 5.1, 45.1]));

        let route_props = collection.features[0].properties.as_ref().unwrap();
        assert_eq!(route_props["kind"], "route");
        assert!(route_props["distance_km"].as_f64().unwrap() > 0.0);

        let place = &collection.features[2];
        assert_eq!(
            place.id,
            Some(geojson::feature::Id::String("p1".into()))
        );
        assert_eq!(place.properties.as_ref().unwrap()["name"], "Chez Paul");
    }
}
