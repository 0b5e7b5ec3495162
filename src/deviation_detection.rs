//! Route deviation detection.
//!
//! The controller evaluates the configured [RouteDeviationTracking] on every
//! location update and reports the result on the trip state. Acting on a
//! deviation (recalculating, prompting the user) is the host's decision.

use geo::{Coord, LineString, Point};
use std::fmt;
use std::sync::Arc;

use crate::algorithms::snap_to_linestring;
use crate::models::{Route, RouteStep, UserLocation};

/// How the controller decides whether the user has left the route.
#[derive(Clone)]
pub enum RouteDeviationTracking {
    /// Never report a deviation.
    None,
    /// Off-route when the perpendicular distance to the remaining route
    /// exceeds a fixed threshold.
    StaticThreshold {
        /// The minimum required horizontal accuracy of the user location.
        /// Worse fixes never trigger a deviation.
        minimum_horizontal_accuracy: u16,
        /// Maximum acceptable distance from the route line, in meters.
        max_acceptable_deviation: f64,
    },
    /// Host-provided detector.
    Custom {
        detector: Arc<dyn RouteDeviationDetector>,
    },
}

impl fmt::Debug for RouteDeviationTracking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::StaticThreshold {
                minimum_horizontal_accuracy,
                max_acceptable_deviation,
            } => f
                .debug_struct("StaticThreshold")
                .field("minimum_horizontal_accuracy", minimum_horizontal_accuracy)
                .field("max_acceptable_deviation", max_acceptable_deviation)
                .finish(),
            Self::Custom { .. } => write!(f, "Custom"),
        }
    }
}

impl RouteDeviationTracking {
    pub(crate) fn check_route_deviation(
        &self,
        location: UserLocation,
        route: &Route,
        remaining_steps: &[RouteStep],
    ) -> RouteDeviation {
        match self {
            Self::None => RouteDeviation::NoDeviation,
            Self::StaticThreshold {
                minimum_horizontal_accuracy,
                max_acceptable_deviation,
            } => {
                if location.horizontal_accuracy > f64::from(*minimum_horizontal_accuracy) {
                    return RouteDeviation::NoDeviation;
                }

                let line = remaining_route_linestring(remaining_steps);
                match snap_to_linestring(Point::from(location), &line) {
                    Some(snap) if snap.perpendicular_distance > *max_acceptable_deviation => {
                        RouteDeviation::OffRoute {
                            deviation_from_route_line: snap.perpendicular_distance,
                        }
                    }
                    _ => RouteDeviation::NoDeviation,
                }
            }
            Self::Custom { detector } => {
                detector.check_route_deviation(location, route, remaining_steps)
            }
        }
    }
}

/// The status of the user with respect to the route.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum RouteDeviation {
    /// The user is on the route.
    NoDeviation,
    /// The user is off the route by the given number of meters.
    OffRoute { deviation_from_route_line: f64 },
}

/// A host-implemented deviation check, for policies beyond a fixed threshold
/// (speed-dependent corridors, dead reckoning, etc.).
pub trait RouteDeviationDetector: Send + Sync {
    /// Determines whether the user is off the route represented by the
    /// remaining steps.
    fn check_route_deviation(
        &self,
        location: UserLocation,
        route: &Route,
        remaining_steps: &[RouteStep],
    ) -> RouteDeviation;
}

/// The not-yet-traveled portion of the route as one linestring, with the
/// endpoints shared between adjacent steps deduplicated.
fn remaining_route_linestring(remaining_steps: &[RouteStep]) -> LineString {
    let mut coords: Vec<Coord> = Vec::new();
    for step in remaining_steps {
        for coordinate in &step.geometry {
            let coord: Coord = (*coordinate).into();
            if coords.last() != Some(&coord) {
                coords.push(coord);
            }
        }
    }
    LineString::new(coords)
}
