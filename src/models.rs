use geo::{Coord, LineString, Point};
use serde::Deserialize;
use std::time::SystemTime;
use uuid::Uuid;

/// Errors reported while constructing model values.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Route invariant violated: {detail}.")]
    RouteInvariantViolation { detail: String },
}

#[derive(Clone, Copy, PartialEq, PartialOrd, Debug)]
pub struct GeographicCoordinate {
    pub lng: f64,
    pub lat: f64,
}

impl GeographicCoordinate {
    fn is_in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

impl From<Coord> for GeographicCoordinate {
    fn from(value: Coord) -> Self {
        Self {
            lng: value.x,
            lat: value.y,
        }
    }
}

impl From<GeographicCoordinate> for Coord {
    fn from(value: GeographicCoordinate) -> Self {
        Self {
            x: value.lng,
            y: value.lat,
        }
    }
}

impl From<GeographicCoordinate> for Point {
    fn from(value: GeographicCoordinate) -> Self {
        Self(value.into())
    }
}

/// A geographic bounding box; `sw` and `ne` are the corners.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct BoundingBox {
    pub sw: GeographicCoordinate,
    pub ne: GeographicCoordinate,
}

impl BoundingBox {
    /// The smallest box containing every coordinate in the slice.
    /// `None` when the slice is empty.
    pub fn encompassing(coordinates: &[GeographicCoordinate]) -> Option<Self> {
        let first = coordinates.first()?;
        let mut sw = *first;
        let mut ne = *first;

        for coordinate in &coordinates[1..] {
            sw.lat = sw.lat.min(coordinate.lat);
            sw.lng = sw.lng.min(coordinate.lng);
            ne.lat = ne.lat.max(coordinate.lat);
            ne.lng = ne.lng.max(coordinate.lng);
        }

        Some(Self { sw, ne })
    }
}

/// The direction in which the user/device is observed to be traveling.
#[derive(Clone, Copy, PartialEq, PartialOrd, Debug)]
pub struct CourseOverGround {
    /// The direction in which the user's device is traveling, measured in clockwise degrees from
    /// true north (N = 0, E = 90, S = 180, W = 270).
    pub degrees: u16,
    /// The accuracy of the course value, measured in degrees.
    pub accuracy: u16,
}

impl CourseOverGround {
    pub fn new(degrees: u16, accuracy: u16) -> Self {
        Self { degrees, accuracy }
    }
}

/// The location of the user that is navigating.
///
/// In addition to coordinates, this includes estimated accuracy and course information,
/// which can influence navigation logic and UI.
///
/// A `horizontal_accuracy` of zero is taken at face value (a perfect fix).
/// Platforms that use zero as an "accuracy unknown" sentinel should translate
/// the value before constructing a [UserLocation].
#[derive(Clone, Copy, PartialEq, PartialOrd, Debug)]
pub struct UserLocation {
    pub coordinates: GeographicCoordinate,
    /// The estimated accuracy of the coordinate (in meters)
    pub horizontal_accuracy: f64,
    pub course_over_ground: Option<CourseOverGround>,
    pub timestamp: SystemTime,
}

impl From<UserLocation> for Point {
    fn from(val: UserLocation) -> Point {
        Point::new(val.coordinates.lng, val.coordinates.lat)
    }
}

/// The role a waypoint plays on the route.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WaypointKind {
    /// A stopping point; routes are split into legs at breaks.
    Break,
    /// A constraint the route passes through without stopping.
    Via,
}

/// A point the route must visit, as distinct from the *geometry* the route travels along.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Waypoint {
    pub coordinate: GeographicCoordinate,
    pub kind: WaypointKind,
}

/// Information describing the series of steps needed to travel between two or more points.
#[derive(Clone, PartialEq, Debug)]
pub struct Route {
    pub geometry: Vec<GeographicCoordinate>,
    pub bbox: BoundingBox,
    /// The total route distance, in meters.
    pub distance: f64,
    /// The ordered list of waypoints to visit, including the starting point.
    /// A waypoint represents a start/end point for a route leg.
    pub waypoints: Vec<Waypoint>,
    pub steps: Vec<RouteStep>,
}

impl Route {
    /// Constructs a route, enforcing its geometric invariants: coordinates in
    /// range, at least one step of two or more points each, steps chained
    /// end-to-start, and step geometries concatenating (shared endpoints
    /// dropped) to the route geometry. The bounding box is derived from the
    /// geometry.
    ///
    /// The bundled response parsers construct routes directly from provider
    /// output; this constructor is for hosts assembling routes by hand.
    pub fn new(
        geometry: Vec<GeographicCoordinate>,
        distance: f64,
        waypoints: Vec<Waypoint>,
        steps: Vec<RouteStep>,
    ) -> Result<Self, ModelError> {
        let invariant = |detail: String| ModelError::RouteInvariantViolation { detail };

        if !(distance.is_finite() && distance >= 0.0) {
            return Err(invariant(format!("distance {distance} is not a non-negative number")));
        }
        if let Some(coordinate) = geometry.iter().find(|coordinate| !coordinate.is_in_range()) {
            return Err(invariant(format!("coordinate {coordinate:?} is out of range")));
        }
        if steps.is_empty() {
            return Err(invariant("route has no steps".to_string()));
        }

        let mut concatenated: Vec<GeographicCoordinate> = Vec::with_capacity(geometry.len());
        for (index, step) in steps.iter().enumerate() {
            if step.geometry.len() < 2 {
                return Err(invariant(format!("step {index} has fewer than 2 coordinates")));
            }
            if let Some(previous_end) = concatenated.last() {
                if step.geometry[0] != *previous_end {
                    return Err(invariant(format!(
                        "step {index} does not start where the previous step ends"
                    )));
                }
            }
            for instruction in &step.visual_instructions {
                if !(instruction.trigger_distance_before_maneuver > 0.0) {
                    return Err(invariant(format!(
                        "step {index} has a visual instruction with a non-positive trigger distance"
                    )));
                }
            }
            for instruction in &step.spoken_instructions {
                if !(instruction.trigger_distance_before_maneuver > 0.0) {
                    return Err(invariant(format!(
                        "step {index} has a spoken instruction with a non-positive trigger distance"
                    )));
                }
            }

            let skip = usize::from(index > 0);
            concatenated.extend(step.geometry.iter().skip(skip).copied());
        }

        if concatenated != geometry {
            return Err(invariant(
                "step geometries do not concatenate to the route geometry".to_string(),
            ));
        }

        // Derived corners are ordered by construction (sw.lat <= ne.lat).
        let bbox = BoundingBox::encompassing(&geometry)
            .ok_or_else(|| invariant("route geometry is empty".to_string()))?;

        Ok(Self {
            geometry,
            bbox,
            distance,
            waypoints,
            steps,
        })
    }
}

/// A maneuver (such as a turn or merge) followed by travel of a certain distance until reaching
/// the next step.
#[derive(Clone, PartialEq, Debug)]
pub struct RouteStep {
    pub geometry: Vec<GeographicCoordinate>,
    /// The distance, in meters, to travel along the route after the maneuver to reach the next step.
    pub distance: f64,
    pub road_name: Option<String>,
    pub instruction: String,
    pub visual_instructions: Vec<VisualInstruction>,
    pub spoken_instructions: Vec<SpokenInstruction>,
}

impl RouteStep {
    // TODO: Memoize or something later; would also let us drop extra conversions
    pub(crate) fn get_linestring(&self) -> LineString {
        LineString::from_iter(self.geometry.iter().map(|coord| Coord {
            x: coord.lng,
            y: coord.lat,
        }))
    }

    /// The visual instruction that should be displayed with the given
    /// distance left on the step.
    pub fn get_active_visual_instruction(
        &self,
        distance_to_end_of_step: f64,
    ) -> Option<&VisualInstruction> {
        active_instruction_index(
            self.visual_instructions
                .iter()
                .map(|instruction| instruction.trigger_distance_before_maneuver),
            distance_to_end_of_step,
        )
        .map(|index| &self.visual_instructions[index])
    }

    /// The spoken instruction that should be uttered with the given distance
    /// left on the step. Repeat triggers of the same instruction share an
    /// `utterance_id`, so the host can deliver each utterance at most once.
    pub fn get_active_spoken_instruction(
        &self,
        distance_to_end_of_step: f64,
    ) -> Option<&SpokenInstruction> {
        active_instruction_index(
            self.spoken_instructions
                .iter()
                .map(|instruction| instruction.trigger_distance_before_maneuver),
            distance_to_end_of_step,
        )
        .map(|index| &self.spoken_instructions[index])
    }
}

/// Picks the instruction whose trigger distance is the tightest fit for the
/// remaining distance: the smallest trigger covering it, or the farthest
/// trigger when none do yet. Ties go to the earliest instruction in the list.
fn active_instruction_index<I: Iterator<Item = f64>>(
    triggers: I,
    distance_to_end_of_step: f64,
) -> Option<usize> {
    let mut tightest: Option<(usize, f64)> = None;
    let mut farthest: Option<(usize, f64)> = None;

    for (index, trigger) in triggers.enumerate() {
        if trigger >= distance_to_end_of_step
            && tightest.map_or(true, |(_, best)| trigger < best)
        {
            tightest = Some((index, trigger));
        }
        if farthest.map_or(true, |(_, best)| trigger > best) {
            farthest = Some((index, trigger));
        }
    }

    tightest.or(farthest).map(|(index, _)| index)
}

#[derive(Clone, PartialEq, Debug)]
pub struct SpokenInstruction {
    /// Plain-text instruction which can be synthesized with a TTS engine.
    pub text: String,
    /// Speech Synthesis Markup Language, which should be preferred by clients capable of understanding it.
    pub ssml: Option<String>,
    /// How far (in meters) from the upcoming maneuver the instruction should start being spoken
    pub trigger_distance_before_maneuver: f64,
    /// A unique identifier for the logical utterance, stable across repeated
    /// triggers of the same instruction.
    pub utterance_id: Uuid,
}

/// Indicates the type of maneuver to perform.
///
/// Frequently used in conjunction with [ManeuverModifier].
#[derive(Deserialize, Debug, Copy, Clone, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ManeuverType {
    Turn,
    #[serde(rename = "new name")]
    NewName,
    Depart,
    Arrive,
    Merge,
    #[serde(rename = "on ramp")]
    OnRamp,
    #[serde(rename = "off ramp")]
    OffRamp,
    Fork,
    #[serde(rename = "end of road")]
    EndOfRoad,
    Continue,
    Roundabout,
    Rotary,
    #[serde(rename = "roundabout turn")]
    RoundaboutTurn,
    Notification,
    #[serde(rename = "exit roundabout")]
    ExitRoundabout,
    #[serde(rename = "exit rotary")]
    ExitRotary,
}

/// Specifies additional information about a [ManeuverType]
#[derive(Deserialize, Debug, Copy, Clone, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ManeuverModifier {
    UTurn,
    #[serde(rename = "sharp right")]
    SharpRight,
    Right,
    #[serde(rename = "slight right")]
    SlightRight,
    Straight,
    #[serde(rename = "slight left")]
    SlightLeft,
    Left,
    #[serde(rename = "sharp left")]
    SharpLeft,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VisualInstructionContent {
    pub text: String,
    pub maneuver_type: Option<ManeuverType>,
    pub maneuver_modifier: Option<ManeuverModifier>,
    pub roundabout_exit_degrees: Option<u16>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisualInstruction {
    pub primary_content: VisualInstructionContent,
    pub secondary_content: Option<VisualInstructionContent>,
    /// How far (in meters) from the upcoming maneuver the instruction should start being displayed
    pub trigger_distance_before_maneuver: f64,
}
