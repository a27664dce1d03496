use geo::BoundingRect;
use geo_types::{CoordNum, LineString, Point};

/// Mean earth radius used for haversine distances, in km
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Build a point from latitude/longitude. geo types store longitude as x.
pub fn lat_lng(lat: f64, lng: f64) -> Point<f64> {
    Point::new(lng, lat)
}

/// Great circle distance between two points in km, using the haversine formula.
pub fn distance_km(a: &Point<f64>, b: &Point<f64>) -> f64 {
    let lat1 = a.y().to_radians();
    let lat2 = b.y().to_radians();
    let d_lat = (b.y() - a.y()).to_radians();
    let d_lng = (b.x() - a.x()).to_radians();
    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    // Rounding can push h just outside [0, 1] for antipodal or identical points
    let h = h.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Total length of a geometry in km, following its points in order
pub trait Distance {
    fn distance_km(&self) -> f64;
}

impl Distance for [Point<f64>] {
    fn distance_km(&self) -> f64 {
        self.windows(2).map(|p| distance_km(&p[0], &p[1])).sum()
    }
}

impl Distance for LineString<f64> {
    fn distance_km(&self) -> f64 {
        self.points()
            .collect::<Vec<Point<f64>>>()
            .as_slice()
            .distance_km()
    }
}

//Get the bounding box for a geometry as a vector
pub trait BoundingBox<N> {
    fn bounding_box(&self) -> Option<Vec<N>>;
}

impl<T, N> BoundingBox<N> for T
where
    T: BoundingRect<N>,
    N: CoordNum,
{
    fn bounding_box(&self) -> Option<Vec<N>> {
        self.bounding_rect()
            .into()
            .map(|r| vec![r.min().x, r.min().y, r.max().x, r.max().y])
    }
}
