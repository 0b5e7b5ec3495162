//! The core of a turn-by-turn navigation engine.
//!
//! Given a calculated [Route] and a stream of [UserLocation] fixes, the
//! [navigation_controller::NavigationController] produces, at every tick,
//! the user's position snapped to the route, the distance to the next
//! maneuver, the visual and spoken instructions active right now, whether
//! the user has deviated from the route, and whether the trip is complete.
//!
//! The crate is deliberately platform-independent and side-effect-free:
//! fetching routes, acquiring locations, speaking instructions, and drawing
//! maps all belong to the host. [routing_adapters] describes the requests a
//! host should make and parses the responses it gets back; everything else
//! operates on plain values.
//!
//! ```
//! use wayfarer::navigation_controller::models::{
//!     NavigationControllerConfig, StepAdvanceMode, TripState,
//! };
//! use wayfarer::navigation_controller::NavigationController;
//! use wayfarer::deviation_detection::RouteDeviationTracking;
//! use wayfarer::routing_adapters::{osrm::OsrmResponseParser, RouteResponseParser};
//! # fn demo(response: Vec<u8>, location: wayfarer::UserLocation) -> Option<()> {
//! let route = OsrmResponseParser::new(6).parse_response(response).ok()?.pop()?;
//! let controller = NavigationController::new(
//!     route,
//!     NavigationControllerConfig {
//!         step_advance: StepAdvanceMode::RelativeLineStringDistance {
//!             minimum_horizontal_accuracy: 25,
//!             automatic_advance_distance: Some(10),
//!         },
//!         route_deviation_tracking: RouteDeviationTracking::StaticThreshold {
//!             minimum_horizontal_accuracy: 25,
//!             max_acceptable_deviation: 20.0,
//!         },
//!     },
//! );
//! let mut state = controller.initial_state(location).ok()?;
//! // On every location update:
//! state = controller.update_user_location(state, location);
//! match &state {
//!     TripState::Navigating { .. } => { /* speak/draw, dedup spoken by utterance_id */ }
//!     TripState::Complete => { /* arrival UI */ }
//! }
//! # Some(())
//! # }
//! ```

pub mod algorithms;
pub mod deviation_detection;
pub mod models;
pub mod navigation_controller;
pub mod routing_adapters;

pub use models::{
    BoundingBox, CourseOverGround, GeographicCoordinate, ManeuverModifier, ManeuverType,
    ModelError, Route, RouteStep, SpokenInstruction, UserLocation, VisualInstruction,
    VisualInstructionContent, Waypoint, WaypointKind,
};
pub use routing_adapters::{RoutingRequestGenerationError, RoutingResponseParseError};
