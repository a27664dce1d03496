use geo_types::Point;

use crate::route_geo::distance_km;

pub const DEFAULT_SAMPLING_INTERVAL_KM: f64 = 15.0;

/// A route point selected for a nearby search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    /// Position of the point in the route path
    pub index: usize,
    pub point: Point<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerOptions {
    pub interval_km: f64,
    /// Also sample the last point of the path when the trailing segment is
    /// shorter than the interval
    pub include_endpoint: bool,
}

impl Default for SamplerOptions {
    fn default() -> Self {
        Self {
            interval_km: DEFAULT_SAMPLING_INTERVAL_KM,
            include_endpoint: false,
        }
    }
}

/// Walks a route once, front to back, yielding the first point and then every
/// point at which the distance travelled since the previous sample reaches the
/// interval.
pub struct RouteSampler<'a> {
    path: &'a [Point<f64>],
    options: SamplerOptions,
    next: usize,
    last_sampled: Option<usize>,
}

impl<'a> RouteSampler<'a> {
    pub fn new(path: &'a [Point<f64>], options: SamplerOptions) -> Self {
        Self {
            path,
            options,
            next: 0,
            last_sampled: None,
        }
    }

    fn sample(&mut self, index: usize) -> SamplePoint {
        self.last_sampled = Some(index);
        SamplePoint {
            index,
            point: self.path[index],
        }
    }
}

impl Iterator for RouteSampler<'_> {
    type Item = SamplePoint;

    fn next(&mut self) -> Option<SamplePoint> {
        if self.next == 0 {
            self.next = 1;
            return (!self.path.is_empty()).then(|| self.sample(0));
        }
        let mut travelled = 0.0;
        while self.next < self.path.len() {
            let index = self.next;
            self.next += 1;
            travelled += distance_km(&self.path[index - 1], &self.path[index]);
            if travelled >= self.options.interval_km {
                return Some(self.sample(index));
            }
        }
        let last = self.path.len().checked_sub(1)?;
        if self.options.include_endpoint && self.last_sampled.is_some_and(|i| i < last) {
            return Some(self.sample(last));
        }
        None
    }
}

/// Sample a path with the given options
pub fn sample_route(path: &[Point<f64>], options: SamplerOptions) -> RouteSampler<'_> {
    RouteSampler::new(path, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route_geo::{lat_lng, EARTH_RADIUS_KM};

    /// Points along the equator spaced `step_km` apart
    fn equator(count: usize, step_km: f64) -> Vec<Point<f64>> {
        let step_deg = (step_km / EARTH_RADIUS_KM).to_degrees();
        (0..count)
            .map(|i| lat_lng(0.0, i as f64 * step_deg))
            .collect()
    }

    fn indices(path: &[Point<f64>], options: SamplerOptions) -> Vec<usize> {
        sample_route(path, options).map(|s| s.index).collect()
    }

    #[test]
    fn empty_path_has_no_samples() {
        assert_eq!(sample_route(&[], SamplerOptions::default()).count(), 0);
        let with_endpoint = SamplerOptions {
            include_endpoint: true,
            ..Default::default()
        };
        assert_eq!(sample_route(&[], with_endpoint).count(), 0);
    }

    #[test]
    fn single_point_is_sampled_once() {
        let path = [lat_lng(43.3, 5.4)];
        for include_endpoint in [false, true] {
            let options = SamplerOptions {
                include_endpoint,
                ..Default::default()
            };
            let samples: Vec<_> = sample_route(&path, options).collect();
            assert_eq!(
                samples,
                vec![SamplePoint {
                    index: 0,
                    point: path[0]
                }]
            );
        }
    }

    #[test]
    fn first_point_is_always_sampled() {
        let path = equator(4, 1.0);
        let first = sample_route(&path, SamplerOptions::default()).next();
        assert_eq!(first.map(|s| s.point), Some(path[0]));
    }

    #[test]
    fn samples_every_third_point_at_five_km_spacing() {
        // 5 km steps may land a hair under 15 km after three steps, so nudge the spacing up
        let path = equator(10, 5.0 + 1e-9);
        assert_eq!(indices(&path, SamplerOptions::default()), vec![0, 3, 6, 9]);
    }

    #[test]
    fn consecutive_samples_are_at_least_an_interval_apart() {
        let path = equator(40, 3.7);
        let options = SamplerOptions::default();
        let samples: Vec<_> = sample_route(&path, options).collect();
        assert!(samples.len() > 1);
        for pair in samples.windows(2) {
            assert!(pair[0].index < pair[1].index);
            let travelled: f64 = path[pair[0].index..=pair[1].index]
                .windows(2)
                .map(|p| distance_km(&p[0], &p[1]))
                .sum();
            assert!(travelled >= options.interval_km);
        }
    }

    #[test]
    fn trailing_segment_is_not_sampled_by_default() {
        let path = equator(5, 5.0 + 1e-9);
        assert_eq!(indices(&path, SamplerOptions::default()), vec![0, 3]);
    }

    #[test]
    fn trailing_segment_sampled_with_endpoint_option() {
        let path = equator(5, 5.0 + 1e-9);
        let options = SamplerOptions {
            include_endpoint: true,
            ..Default::default()
        };
        assert_eq!(indices(&path, options), vec![0, 3, 4]);
    }

    #[test]
    fn endpoint_is_not_sampled_twice() {
        let path = equator(4, 5.0 + 1e-9);
        let options = SamplerOptions {
            include_endpoint: true,
            ..Default::default()
        };
        assert_eq!(indices(&path, options), vec![0, 3]);
    }

    #[test]
    fn large_jump_samples_immediately() {
        let path = vec![lat_lng(0.0, 0.0), lat_lng(1.0, 0.0), lat_lng(1.0, 0.01)];
        assert_eq!(indices(&path, SamplerOptions::default()), vec![0, 1]);
    }
}
