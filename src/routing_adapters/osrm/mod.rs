pub(crate) mod models;

use polyline::decode_polyline;
use uuid::Uuid;

use super::{RouteResponseParser, RoutingResponseParseError};
use crate::models::{
    BoundingBox, GeographicCoordinate, Route, RouteStep, SpokenInstruction, VisualInstruction,
    VisualInstructionContent, Waypoint, WaypointKind,
};
use models::RouteResponse;

/// A response parser for OSRM-compatible routing backends.
///
/// The parser is NOT limited to only the standard OSRM format; many Valhalla/Mapbox tags are also
/// parsed and are included in the final route.
#[derive(Debug)]
pub struct OsrmResponseParser {
    polyline_precision: u32,
}

impl OsrmResponseParser {
    pub fn new(polyline_precision: u32) -> Self {
        Self { polyline_precision }
    }
}

impl RouteResponseParser for OsrmResponseParser {
    fn parse_response(&self, response: Vec<u8>) -> Result<Vec<Route>, RoutingResponseParseError> {
        let res: RouteResponse = serde_json::from_slice(&response)?;
        if res.code != "Ok" {
            return Err(RoutingResponseParseError::ParseError {
                error: format!("Routing backend returned code {}", res.code),
            });
        }

        let waypoints: Vec<_> = res
            .waypoints
            .iter()
            .map(|waypoint| Waypoint {
                coordinate: GeographicCoordinate {
                    lat: waypoint.location.latitude(),
                    lng: waypoint.location.longitude(),
                },
                // Responses don't tag waypoint kinds; a waypoint surviving
                // into the response marks a leg boundary, which is a break.
                kind: WaypointKind::Break,
            })
            .collect();

        res.routes
            .iter()
            .map(|route| Route::from_osrm(route, &waypoints, self.polyline_precision))
            .collect()
    }
}

fn decode_geometry(
    geometry: &models::Geometry,
    polyline_precision: u32,
) -> Result<Vec<GeographicCoordinate>, RoutingResponseParseError> {
    match geometry {
        models::Geometry::Polyline(polyline) => decode_polyline(polyline, polyline_precision)
            .map(|linestring| {
                linestring
                    .coords()
                    .map(|coord| GeographicCoordinate::from(*coord))
                    .collect()
            })
            .map_err(|error| RoutingResponseParseError::ParseError {
                error: error.to_string(),
            }),
        models::Geometry::GeoJsonLineString { coordinates } => Ok(coordinates
            .iter()
            .map(|pair| GeographicCoordinate {
                lng: pair[0],
                lat: pair[1],
            })
            .collect()),
    }
}

impl Route {
    fn from_osrm(
        route: &models::Route,
        waypoints: &[Waypoint],
        polyline_precision: u32,
    ) -> Result<Self, RoutingResponseParseError> {
        let geometry = decode_geometry(&route.geometry, polyline_precision)?;
        let bbox = BoundingBox::encompassing(&geometry).ok_or_else(|| {
            RoutingResponseParseError::ParseError {
                error: "No coordinates in geometry".to_string(),
            }
        })?;

        let mut steps = vec![];
        for leg in &route.legs {
            for step in &leg.steps {
                steps.push(RouteStep::from_osrm(step, polyline_precision)?);
            }
        }

        Ok(Route {
            geometry,
            bbox,
            distance: route.distance,
            waypoints: waypoints.to_vec(),
            steps,
        })
    }
}

impl RouteStep {
    fn from_osrm(
        value: &models::RouteStep,
        polyline_precision: u32,
    ) -> Result<Self, RoutingResponseParseError> {
        let geometry = decode_geometry(&value.geometry, polyline_precision)?;
        if geometry.is_empty() {
            return Err(RoutingResponseParseError::ParseError {
                error: "No coordinates in step geometry".to_string(),
            });
        }

        let visual_instructions = value
            .banner_instructions
            .iter()
            .map(|banner| VisualInstruction {
                primary_content: VisualInstructionContent::from_osrm(&banner.primary),
                secondary_content: banner
                    .secondary
                    .as_ref()
                    .map(VisualInstructionContent::from_osrm),
                trigger_distance_before_maneuver: banner.distance_along_geometry,
            })
            .collect();

        let spoken_instructions = value
            .voice_instructions
            .iter()
            .map(|instruction| SpokenInstruction {
                text: instruction.announcement.clone(),
                ssml: instruction.ssml_announcement.clone(),
                trigger_distance_before_maneuver: instruction.distance_along_geometry,
                // Assigned once here; repeat triggers of the same utterance
                // keep this id, which is what makes host-side dedup work.
                utterance_id: Uuid::new_v4(),
            })
            .collect();

        Ok(RouteStep {
            geometry,
            distance: value.distance,
            road_name: value.name.clone().filter(|name| !name.is_empty()),
            instruction: value.maneuver.get_instruction(),
            visual_instructions,
            spoken_instructions,
        })
    }
}

impl VisualInstructionContent {
    fn from_osrm(content: &models::BannerContent) -> Self {
        Self {
            text: content.text.clone(),
            maneuver_type: content.maneuver_type,
            maneuver_modifier: content.modifier,
            roundabout_exit_degrees: content.roundabout_exit_degrees,
        }
    }
}
