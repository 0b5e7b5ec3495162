pub mod models;
mod utils;

use geo::Point;
use log::debug;

use crate::algorithms::{remaining_line_distance, snap_to_linestring};
use crate::models::{Route, RouteStep, UserLocation, Waypoint};
use models::{NavigationControllerConfig, TripState};
use utils::{pop_completed_step, should_advance_to_next_step};

/// Errors reported by the navigation controller.
#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    /// The location handed to [NavigationController::initial_state] was
    /// ill-formed (negative horizontal accuracy).
    #[error("The user location is unusable: horizontal accuracy is negative.")]
    NoUserLocation,
}

/// Manages the navigation lifecycle of a single trip.
///
/// This controller comes into being when one (or more) routes have already
/// been calculated and a route has been selected from the alternatives (if
/// applicable). It ends when the user either 1) expresses their intent to
/// cancel the navigation, or 2) they successfully visit all waypoints.
///
/// In the grand scheme of the architecture, this is a mid-level construct. It
/// wraps some lower level constructs like the route adapter, but a higher
/// level wrapper handles things like feeding in user location updates, route
/// recalculation behavior, etc.
///
/// Every operation is a pure, synchronous function over a [TripState] value:
/// the controller holds no clock, no randomness, and no interior mutability,
/// so the same state and location always produce the same result. The host
/// serializes calls for a given trip; distinct controllers may share an
/// immutable [Route] freely across threads.
pub struct NavigationController {
    route: Route,
    config: NavigationControllerConfig,
}

impl NavigationController {
    /// Creates a new trip navigation controller for a route.
    ///
    /// Infallible for any route upholding the [Route] invariants.
    pub fn new(route: Route, config: NavigationControllerConfig) -> Self {
        Self { route, config }
    }

    /// Produces the state of a trip that is just starting: every step and
    /// waypoint remains, and the user is snapped to the first step.
    pub fn initial_state(&self, location: UserLocation) -> Result<TripState, NavigationError> {
        if location.horizontal_accuracy < 0.0 {
            return Err(NavigationError::NoUserLocation);
        }

        Ok(self.build_trip_state(
            location,
            location,
            self.route.steps.clone(),
            self.route.waypoints.clone(),
        ))
    }

    /// Advances navigation to the next step, regardless of the step advance
    /// policy.
    ///
    /// Depending on the advancement strategy, this may be automatic.
    /// For other cases, it is desirable to advance to the next step manually
    /// (ex: walking in an urban tunnel). We leave this decision to the app
    /// developer.
    pub fn advance_to_next_step(&self, state: TripState) -> TripState {
        match state {
            TripState::Navigating {
                snapped_user_location,
                mut remaining_steps,
                mut remaining_waypoints,
                ..
            } => {
                if remaining_steps.len() <= 1 {
                    debug!("advanced past the last step; trip complete");
                    return TripState::Complete;
                }
                pop_completed_step(&mut remaining_steps, &mut remaining_waypoints);

                // Reproject the last fix onto the new step.
                self.build_trip_state(
                    snapped_user_location,
                    snapped_user_location,
                    remaining_steps,
                    remaining_waypoints,
                )
            }
            // It's tempting to throw an error here, since the caller should
            // know better, but a mistake like this is technically harmless.
            TripState::Complete => TripState::Complete,
        }
    }

    /// Updates the trip state with a new location fix.
    ///
    /// The step advance policy is applied repeatedly until it no longer
    /// fires (each pass drops one step, so the loop is bounded by the number
    /// of remaining steps), then deviation and the active instructions are
    /// recomputed against the resulting step. A [TripState::Complete] input
    /// is returned unchanged.
    pub fn update_user_location(&self, state: TripState, location: UserLocation) -> TripState {
        match state {
            TripState::Navigating {
                snapped_user_location,
                mut remaining_steps,
                mut remaining_waypoints,
                ..
            } => {
                loop {
                    let Some(current_step) = remaining_steps.first() else {
                        return TripState::Complete;
                    };
                    let current_step_linestring = current_step.get_linestring();

                    if !should_advance_to_next_step(
                        &current_step_linestring,
                        remaining_steps.get(1),
                        &location,
                        self.config.step_advance,
                    ) {
                        break;
                    }

                    debug!(
                        "advancing past a step; {} remaining",
                        remaining_steps.len() - 1
                    );
                    pop_completed_step(&mut remaining_steps, &mut remaining_waypoints);
                    if remaining_steps.is_empty() {
                        return TripState::Complete;
                    }
                }

                self.build_trip_state(
                    location,
                    snapped_user_location,
                    remaining_steps,
                    remaining_waypoints,
                )
            }
            TripState::Complete => TripState::Complete,
        }
    }

    /// Assembles a [TripState::Navigating] for the current head of
    /// `remaining_steps`: snapping, remaining distance, deviation, and
    /// instruction selection.
    ///
    /// `last_snapped_location` is the fallback if the location cannot be
    /// projected onto the step, so a degenerate fix still yields a
    /// well-formed state.
    fn build_trip_state(
        &self,
        location: UserLocation,
        last_snapped_location: UserLocation,
        remaining_steps: Vec<RouteStep>,
        remaining_waypoints: Vec<Waypoint>,
    ) -> TripState {
        let Some(current_step) = remaining_steps.first().cloned() else {
            return TripState::Complete;
        };
        let current_step_linestring = current_step.get_linestring();

        let (snapped_user_location, distance_to_next_maneuver) =
            match snap_to_linestring(Point::from(location), &current_step_linestring) {
                Some(snap) => (
                    UserLocation {
                        coordinates: snap.snapped.into(),
                        ..location
                    },
                    remaining_line_distance(
                        &current_step_linestring,
                        snap.segment_index,
                        snap.fraction_along,
                    ),
                ),
                None => (last_snapped_location, current_step.distance),
            };

        let deviation = self.config.route_deviation_tracking.check_route_deviation(
            location,
            &self.route,
            &remaining_steps,
        );

        let visual_instruction = current_step
            .get_active_visual_instruction(distance_to_next_maneuver)
            .cloned();
        let spoken_instruction = current_step
            .get_active_spoken_instruction(distance_to_next_maneuver)
            .cloned();

        TripState::Navigating {
            snapped_user_location,
            remaining_steps,
            remaining_waypoints,
            distance_to_next_maneuver,
            deviation,
            visual_instruction,
            spoken_instruction,
        }
    }
}
