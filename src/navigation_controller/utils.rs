use geo::{LineString, Point};

use super::models::StepAdvanceMode;
use crate::algorithms::{remaining_line_distance, snap_to_linestring};
use crate::models::{RouteStep, UserLocation, Waypoint, WaypointKind};

/// Arc length from the user's projection on the step to the step's end,
/// in meters. `None` when the linestring is degenerate.
pub(super) fn distance_to_end_of_step(
    current_position: Point,
    current_step_linestring: &LineString,
) -> Option<f64> {
    snap_to_linestring(current_position, current_step_linestring).map(|snap| {
        remaining_line_distance(
            current_step_linestring,
            snap.segment_index,
            snap.fraction_along,
        )
    })
}

/// Determines whether navigation should advance to the next step.
///
/// This does not mutate anything; the caller applies the advance.
pub(super) fn should_advance_to_next_step(
    current_step_linestring: &LineString,
    next_route_step: Option<&RouteStep>,
    user_location: &UserLocation,
    step_advance_mode: StepAdvanceMode,
) -> bool {
    let current_position = Point::from(*user_location);

    match step_advance_mode {
        StepAdvanceMode::Manual => false,
        StepAdvanceMode::DistanceToEndOfStep {
            distance,
            minimum_horizontal_accuracy,
        } => {
            if user_location.horizontal_accuracy > f64::from(minimum_horizontal_accuracy) {
                return false;
            }

            distance_to_end_of_step(current_position, current_step_linestring)
                .map_or(false, |remaining| remaining <= f64::from(distance))
        }
        StepAdvanceMode::RelativeLineStringDistance {
            minimum_horizontal_accuracy,
            automatic_advance_distance,
        } => {
            if user_location.horizontal_accuracy > f64::from(minimum_horizontal_accuracy) {
                return false;
            }

            // Short-circuit: always advance within this distance of the step's end.
            if let Some(advance_distance) = automatic_advance_distance {
                if distance_to_end_of_step(current_position, current_step_linestring)
                    .map_or(false, |remaining| remaining <= f64::from(advance_distance))
                {
                    return true;
                }
            }

            let Some(next_step) = next_route_step else {
                return false;
            };
            let next_step_linestring = next_step.get_linestring();
            let distance_to_current =
                snap_to_linestring(current_position, current_step_linestring);
            let distance_to_next = snap_to_linestring(current_position, &next_step_linestring);

            matches!(
                (distance_to_current, distance_to_next),
                (Some(current), Some(next)) if next.perpendicular_distance < current.perpendicular_distance
            )
        }
    }
}

/// Drops the head of `remaining_steps`, clearing any break waypoint at its
/// end. Both the step advance policy and a forced advance funnel through
/// here.
pub(super) fn pop_completed_step(
    remaining_steps: &mut Vec<RouteStep>,
    remaining_waypoints: &mut Vec<Waypoint>,
) {
    if let Some(step) = remaining_steps.first() {
        drop_visited_waypoint(step, remaining_waypoints);
        remaining_steps.remove(0);
    }
}

/// Removes the waypoint sitting at the end of a just-completed step.
///
/// Break waypoints always coincide with a step boundary in provider
/// responses, so an exact coordinate match is sufficient; via waypoints are
/// pass-through constraints and stay in the list until a break clears them.
fn drop_visited_waypoint(step: &RouteStep, remaining_waypoints: &mut Vec<Waypoint>) {
    let Some(end) = step.geometry.last() else {
        return;
    };

    if let Some(position) = remaining_waypoints
        .iter()
        .position(|waypoint| waypoint.kind == WaypointKind::Break && waypoint.coordinate == *end)
    {
        remaining_waypoints.remove(position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeographicCoordinate;
    use rstest::rstest;
    use std::time::SystemTime;

    fn location(lng: f64, lat: f64, horizontal_accuracy: f64) -> UserLocation {
        UserLocation {
            coordinates: GeographicCoordinate { lng, lat },
            horizontal_accuracy,
            course_over_ground: None,
            timestamp: SystemTime::now(),
        }
    }

    fn step(coordinates: &[(f64, f64)]) -> RouteStep {
        RouteStep {
            geometry: coordinates
                .iter()
                .map(|(lng, lat)| GeographicCoordinate {
                    lng: *lng,
                    lat: *lat,
                })
                .collect(),
            distance: 100.0,
            road_name: None,
            instruction: "Continue".to_string(),
            visual_instructions: vec![],
            spoken_instructions: vec![],
        }
    }

    #[rstest]
    // Within the advance distance with a good fix.
    #[case(0.00093, 5.0, true)]
    // Too far from the end of the step.
    #[case(0.0005, 5.0, false)]
    // Close enough, but the fix is worse than the accuracy floor.
    #[case(0.00093, 50.0, false)]
    fn distance_to_end_of_step_advance(
        #[case] lng: f64,
        #[case] horizontal_accuracy: f64,
        #[case] expected: bool,
    ) {
        let current = step(&[(0.0, 0.0), (0.001, 0.0)]);
        let advanced = should_advance_to_next_step(
            &current.get_linestring(),
            None,
            &location(lng, 0.0, horizontal_accuracy),
            StepAdvanceMode::DistanceToEndOfStep {
                distance: 10,
                minimum_horizontal_accuracy: 16,
            },
        );

        assert_eq!(advanced, expected);
    }

    #[test]
    fn manual_mode_never_advances() {
        let current = step(&[(0.0, 0.0), (0.001, 0.0)]);
        let at_the_end = location(0.001, 0.0, 1.0);

        assert!(!should_advance_to_next_step(
            &current.get_linestring(),
            None,
            &at_the_end,
            StepAdvanceMode::Manual,
        ));
    }

    #[test]
    fn relative_distance_advances_when_the_next_step_is_closer() {
        let current = step(&[(0.0, 0.0), (0.001, 0.0)]);
        let next = step(&[(0.001, 0.0), (0.001, 0.001)]);
        // North of the corner: much closer to the next (northbound) leg.
        let near_next_leg = location(0.001, 0.0005, 5.0);

        assert!(should_advance_to_next_step(
            &current.get_linestring(),
            Some(&next),
            &near_next_leg,
            StepAdvanceMode::RelativeLineStringDistance {
                minimum_horizontal_accuracy: 16,
                automatic_advance_distance: None,
            },
        ));

        // Mid-way along the current leg, nothing should fire.
        let mid_leg = location(0.0005, 0.0, 5.0);
        assert!(!should_advance_to_next_step(
            &current.get_linestring(),
            Some(&next),
            &mid_leg,
            StepAdvanceMode::RelativeLineStringDistance {
                minimum_horizontal_accuracy: 16,
                automatic_advance_distance: None,
            },
        ));
    }

    #[test]
    fn relative_distance_with_automatic_advance() {
        let current = step(&[(0.0, 0.0), (0.001, 0.0)]);
        // No next step, but within the automatic advance distance (~7.8m left).
        let near_end = location(0.00093, 0.0, 5.0);

        assert!(should_advance_to_next_step(
            &current.get_linestring(),
            None,
            &near_end,
            StepAdvanceMode::RelativeLineStringDistance {
                minimum_horizontal_accuracy: 16,
                automatic_advance_distance: Some(10),
            },
        ));
    }

    #[test]
    fn pop_completed_step_consumes_the_head() {
        let mut steps = vec![
            step(&[(0.0, 0.0), (0.001, 0.0)]),
            step(&[(0.001, 0.0), (0.002, 0.0)]),
        ];
        let mut waypoints = vec![Waypoint {
            coordinate: GeographicCoordinate {
                lng: 0.001,
                lat: 0.0,
            },
            kind: WaypointKind::Break,
        }];

        pop_completed_step(&mut steps, &mut waypoints);
        assert_eq!(steps.len(), 1);
        assert!(waypoints.is_empty());

        pop_completed_step(&mut steps, &mut waypoints);
        assert!(steps.is_empty());

        // Popping with nothing left is harmless.
        pop_completed_step(&mut steps, &mut waypoints);
        assert!(steps.is_empty());
    }

    #[test]
    fn visited_break_waypoints_are_dropped() {
        let completed = step(&[(0.0, 0.0), (0.001, 0.0)]);
        let mut remaining = vec![
            Waypoint {
                coordinate: GeographicCoordinate {
                    lng: 0.001,
                    lat: 0.0,
                },
                kind: WaypointKind::Break,
            },
            Waypoint {
                coordinate: GeographicCoordinate {
                    lng: 0.002,
                    lat: 0.0,
                },
                kind: WaypointKind::Break,
            },
        ];

        drop_visited_waypoint(&completed, &mut remaining);

        assert_eq!(remaining.len(), 1);
        assert_eq!(
            remaining[0].coordinate,
            GeographicCoordinate {
                lng: 0.002,
                lat: 0.0
            }
        );
    }

    #[test]
    fn via_waypoints_survive_step_advances() {
        let completed = step(&[(0.0, 0.0), (0.001, 0.0)]);
        let mut remaining = vec![Waypoint {
            coordinate: GeographicCoordinate {
                lng: 0.001,
                lat: 0.0,
            },
            kind: WaypointKind::Via,
        }];

        drop_visited_waypoint(&completed, &mut remaining);

        assert_eq!(remaining.len(), 1);
    }
}
