use std::collections::HashMap;

use serde_json::{json, Value};

use super::{RouteRequest, RouteRequestGenerator, RoutingRequestGenerationError};
use crate::models::{UserLocation, Waypoint, WaypointKind};

/// A request generator for Valhalla backends operating in the
/// OSRM-compatible response mode.
///
/// The body asks for voice and banner instructions, so responses parsed by
/// [super::osrm::OsrmResponseParser] carry everything the navigation
/// controller needs.
#[derive(Clone, Debug)]
pub struct ValhallaHttpRequestGenerator {
    /// The full URL of the Valhalla endpoint (ex: https://valhalla1.openstreetmap.de/route).
    endpoint_url: String,
    /// The costing model (ex: "auto", "bicycle", "pedestrian").
    profile: String,
}

impl ValhallaHttpRequestGenerator {
    pub fn new(endpoint_url: String, profile: String) -> Self {
        Self {
            endpoint_url,
            profile,
        }
    }
}

impl RouteRequestGenerator for ValhallaHttpRequestGenerator {
    fn generate_request(
        &self,
        user_location: UserLocation,
        waypoints: Vec<Waypoint>,
    ) -> Result<RouteRequest, RoutingRequestGenerationError> {
        if waypoints.is_empty() {
            return Err(RoutingRequestGenerationError::NotEnoughWaypoints);
        }

        let start = json!({
            "lat": user_location.coordinates.lat,
            "lon": user_location.coordinates.lng,
            "type": "break",
        });
        let locations: Vec<Value> = std::iter::once(start)
            .chain(waypoints.iter().map(|waypoint| {
                json!({
                    "lat": waypoint.coordinate.lat,
                    "lon": waypoint.coordinate.lng,
                    "type": match waypoint.kind {
                        WaypointKind::Break => "break",
                        WaypointKind::Via => "via",
                    },
                })
            }))
            .collect();

        let body = serde_json::to_vec(&json!({
            "format": "osrm",
            "costing": self.profile,
            "locations": locations,
            "banner_instructions": true,
            "voice_instructions": true,
            "units": "kilometers",
        }))?;

        Ok(RouteRequest::HttpPost {
            url: self.endpoint_url.clone(),
            headers: HashMap::from([("Content-Type".to_string(), "application/json".to_string())]),
            body,
        })
    }
}
