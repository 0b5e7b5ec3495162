//! Route adapters bridge the core to a routing backend.
//!
//! The core never performs I/O: a [RouteRequestGenerator] describes the
//! request the host should send, and a [RouteResponseParser] turns the raw
//! response bytes into [Route] values. Backends that don't fit the
//! request/response mold (an on-device router, say) implement
//! [RouteProvider] instead.

pub mod osrm;
pub mod valhalla;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::models::{Route, UserLocation, Waypoint};
use crate::routing_adapters::{osrm::OsrmResponseParser, valhalla::ValhallaHttpRequestGenerator};

/// A request the host should execute on the adapter's behalf.
#[derive(Clone, Debug, PartialEq)]
pub enum RouteRequest {
    HttpPost {
        url: String,
        headers: HashMap<String, String>,
        body: Vec<u8>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum RoutingRequestGenerationError {
    #[error("Too few waypoints were provided to compute a route.")]
    NotEnoughWaypoints,
    #[error("Failed to generate the request body: {error}.")]
    JsonError { error: String },
}

impl From<serde_json::Error> for RoutingRequestGenerationError {
    fn from(value: serde_json::Error) -> Self {
        Self::JsonError {
            error: value.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RoutingResponseParseError {
    // TODO: Unable to find route and other common errors
    #[error("Failed to parse the routing response: {error}.")]
    ParseError { error: String },
}

impl From<serde_json::Error> for RoutingResponseParseError {
    fn from(value: serde_json::Error) -> Self {
        Self::ParseError {
            error: value.to_string(),
        }
    }
}

/// A generator of requests to a routing backend.
pub trait RouteRequestGenerator: Send + Sync {
    /// Generates a request that, when executed by the host, fetches routes
    /// from the user's location through the given waypoints.
    fn generate_request(
        &self,
        user_location: UserLocation,
        waypoints: Vec<Waypoint>,
    ) -> Result<RouteRequest, RoutingRequestGenerationError>;
}

/// A parser of raw routing backend responses.
pub trait RouteResponseParser: Send + Sync {
    /// Parses a raw response from a routing backend into a list of routes.
    fn parse_response(&self, response: Vec<u8>) -> Result<Vec<Route>, RoutingResponseParseError>;
}

/// Any failure along the route-fetching path, for implementations that
/// handle the whole exchange themselves.
#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    #[error(transparent)]
    RequestGeneration(#[from] RoutingRequestGenerationError),
    #[error(transparent)]
    ResponseParse(#[from] RoutingResponseParseError),
    #[error("Route provider failed: {error}.")]
    Provider { error: String },
}

/// A host-implemented route source for backends that aren't modeled as an
/// HTTP request/response exchange (an on-device router, a platform SDK).
#[async_trait]
pub trait RouteProvider: Send + Sync {
    async fn get_routes(
        &self,
        user_location: UserLocation,
        waypoints: Vec<Waypoint>,
    ) -> Result<Vec<Route>, RoutingError>;
}

/// A request generator paired with the parser for its backend's responses.
pub struct RouteAdapter {
    request_generator: Arc<dyn RouteRequestGenerator>,
    response_parser: Arc<dyn RouteResponseParser>,
}

impl RouteAdapter {
    pub fn new(
        request_generator: Arc<dyn RouteRequestGenerator>,
        response_parser: Arc<dyn RouteResponseParser>,
    ) -> Self {
        Self {
            request_generator,
            response_parser,
        }
    }

    /// An adapter for a Valhalla backend speaking the OSRM-compatible
    /// response format (polyline6 geometries).
    pub fn new_valhalla_http(endpoint_url: String, profile: String) -> Self {
        Self::new(
            Arc::new(ValhallaHttpRequestGenerator::new(endpoint_url, profile)),
            Arc::new(OsrmResponseParser::new(6)),
        )
    }

    pub fn generate_request(
        &self,
        user_location: UserLocation,
        waypoints: Vec<Waypoint>,
    ) -> Result<RouteRequest, RoutingRequestGenerationError> {
        self.request_generator
            .generate_request(user_location, waypoints)
    }

    pub fn parse_response(
        &self,
        response: Vec<u8>,
    ) -> Result<Vec<Route>, RoutingResponseParseError> {
        self.response_parser.parse_response(response)
    }
}
