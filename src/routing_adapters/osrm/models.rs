//! Serde models for the OSRM-compatible response format.
//!
//! Only the fields the parser consumes are modeled; everything else in the
//! response (annotations, intersections, weights) is ignored.

use serde::Deserialize;

use crate::models::{ManeuverModifier, ManeuverType};

#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    pub code: String,
    pub routes: Vec<Route>,
    #[serde(default)]
    pub waypoints: Vec<Waypoint>,
}

#[derive(Debug, Deserialize)]
pub struct Waypoint {
    pub location: Coordinate,
}

/// A `[longitude, latitude]` pair, the coordinate order of the wire format.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Coordinate([f64; 2]);

impl Coordinate {
    pub fn longitude(&self) -> f64 {
        self.0[0]
    }

    pub fn latitude(&self) -> f64 {
        self.0[1]
    }
}

#[derive(Debug, Deserialize)]
pub struct Route {
    /// The total route distance, in meters.
    pub distance: f64,
    pub geometry: Geometry,
    pub legs: Vec<RouteLeg>,
}

/// Step/route geometry, either an encoded polyline (standard OSRM and
/// Valhalla in OSRM mode) or a GeoJSON LineString (OSRM `geometries=geojson`).
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum Geometry {
    Polyline(String),
    GeoJsonLineString { coordinates: Vec<[f64; 2]> },
}

#[derive(Debug, Deserialize)]
pub struct RouteLeg {
    #[serde(default)]
    pub steps: Vec<RouteStep>,
}

#[derive(Debug, Deserialize)]
pub struct RouteStep {
    /// The distance of the step, in meters.
    pub distance: f64,
    pub geometry: Geometry,
    #[serde(default)]
    pub name: Option<String>,
    pub maneuver: StepManeuver,
    /// Valhalla/Mapbox extension.
    #[serde(rename = "voiceInstructions", default)]
    pub voice_instructions: Vec<VoiceInstruction>,
    /// Valhalla/Mapbox extension.
    #[serde(rename = "bannerInstructions", default)]
    pub banner_instructions: Vec<BannerInstruction>,
}

#[derive(Debug, Deserialize)]
pub struct StepManeuver {
    #[serde(rename = "type")]
    pub maneuver_type: String,
    #[serde(default)]
    pub modifier: Option<String>,
    /// Human-readable instruction text. Valhalla always includes this;
    /// stock OSRM leaves it to the client.
    #[serde(default)]
    pub instruction: Option<String>,
}

impl StepManeuver {
    pub fn get_instruction(&self) -> String {
        self.instruction
            .clone()
            .unwrap_or_else(|| self.synthesize_instruction())
    }

    // Last-resort text for backends that expect client-side localization.
    fn synthesize_instruction(&self) -> String {
        match &self.modifier {
            Some(modifier) => format!("{} {modifier}", self.maneuver_type),
            None => self.maneuver_type.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct VoiceInstruction {
    pub announcement: String,
    #[serde(rename = "ssmlAnnouncement", default)]
    pub ssml_announcement: Option<String>,
    /// How far from the end of the step the instruction becomes active, in meters.
    #[serde(rename = "distanceAlongGeometry")]
    pub distance_along_geometry: f64,
}

#[derive(Debug, Deserialize)]
pub struct BannerInstruction {
    /// How far from the end of the step the banner becomes active, in meters.
    #[serde(rename = "distanceAlongGeometry")]
    pub distance_along_geometry: f64,
    pub primary: BannerContent,
    #[serde(default)]
    pub secondary: Option<BannerContent>,
}

#[derive(Debug, Deserialize)]
pub struct BannerContent {
    pub text: String,
    #[serde(rename = "type", default)]
    pub maneuver_type: Option<ManeuverType>,
    #[serde(default)]
    pub modifier: Option<ManeuverModifier>,
    /// The exit angle for roundabout maneuvers, clockwise from entry.
    #[serde(rename = "degrees", default)]
    pub roundabout_exit_degrees: Option<u16>,
}
