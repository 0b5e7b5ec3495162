use crate::deviation_detection::{RouteDeviation, RouteDeviationTracking};
use crate::{RouteStep, SpokenInstruction, UserLocation, VisualInstruction, Waypoint};

/// The state of the trip as of the most recent location update.
///
/// This is a plain value: each controller operation consumes the previous
/// state and returns a new one, and the host derives all side effects
/// (speaking instructions, redrawing the map, recalculating) by inspecting
/// the result.
#[derive(Clone, Debug, PartialEq)]
pub enum TripState {
    Navigating {
        /// The user's location as projected onto the current step.
        snapped_user_location: UserLocation,
        /// The ordered list of steps that remain in the trip.
        /// The step at the front of the list is always the current step.
        /// We currently assume that you cannot move backward to a previous step.
        remaining_steps: Vec<RouteStep>,
        /// The ordered list of waypoints remaining to visit on this trip. Intermediate waypoints on
        /// the route to the final destination are discarded as they are visited.
        remaining_waypoints: Vec<Waypoint>,
        /// The distance remaining till the end of the current step (taking the line geometry
        /// into account), measured in meters.
        distance_to_next_maneuver: f64,
        /// Whether the user is off the route, and by how far.
        deviation: RouteDeviation,
        /// The visual instruction to display right now, if the step has any.
        visual_instruction: Option<VisualInstruction>,
        /// The spoken instruction active right now, if the step has any.
        /// Hosts should deduplicate by `utterance_id` before handing it to a
        /// TTS engine.
        spoken_instruction: Option<SpokenInstruction>,
    },
    Complete,
}

#[derive(Debug, Copy, Clone)]
pub enum StepAdvanceMode {
    /// Never advances to the next step automatically
    Manual,
    /// Automatically advances when the user's location is close enough to the end of the step
    DistanceToEndOfStep {
        /// Distance to the last waypoint in the step, measured in meters, at which to advance.
        distance: u16,
        /// The minimum required horizontal accuracy of the user location.
        /// Values larger than this cannot trigger a step advance.
        minimum_horizontal_accuracy: u16,
    },
    /// Automatically advances when the user's distance to the *next* step's linestring  is less
    /// than the distance to the current step's linestring.
    RelativeLineStringDistance {
        /// The minimum required horizontal accuracy of the user location.
        /// Values larger than this cannot trigger a step advance.
        minimum_horizontal_accuracy: u16,
        /// At this (optional) distance, navigation should advance to the next step regardless
        /// of which LineString appears closer.
        automatic_advance_distance: Option<u16>,
    },
}

#[derive(Debug, Clone)]
pub struct NavigationControllerConfig {
    pub step_advance: StepAdvanceMode,
    pub route_deviation_tracking: RouteDeviationTracking,
}
