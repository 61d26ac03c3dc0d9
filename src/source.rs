use std::collections::BTreeMap;

use log::{info, warn};
use serde::Deserialize;

use crate::data::*;
use crate::distance::DistanceModel;
use crate::error::Result;
use crate::graph::Timing;
use crate::registry::RouteRegistry;
use crate::responder::QueryResponder;

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct StopDef {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Neighbour stop name to road distance in meters.
    #[serde(default)]
    pub road_distances: BTreeMap<String, u32>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RouteDef {
    pub name: String,
    pub stops: Vec<String>,
    pub is_roundtrip: bool,
}

/// Timing as given by the input: minutes and kilometers per hour.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct RoutingSettings {
    pub bus_wait_time: f64,
    pub bus_velocity: f64,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            bus_wait_time: 6.0,
            bus_velocity: 40.0,
        }
    }
}

impl RoutingSettings {
    pub fn timing(&self) -> Timing {
        Timing {
            wait_time: self.bus_wait_time,
            velocity: self.bus_velocity * 1000.0 / 60.0,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum StatRequest {
    Stop {
        #[serde(default)]
        id: u64,
        name: String,
    },
    Bus {
        #[serde(default)]
        id: u64,
        name: String,
    },
    Route {
        #[serde(default)]
        id: u64,
        from: String,
        to: String,
    },
}

impl StatRequest {
    pub fn id(&self) -> u64 {
        match self {
            StatRequest::Stop { id, .. }
            | StatRequest::Bus { id, .. }
            | StatRequest::Route { id, .. } => *id,
        }
    }
}

/// Anything that can enumerate stop definitions, route definitions, routing
/// settings and the stat requests to answer.
pub trait NetworkSource {
    fn stop_defs(&self) -> &[StopDef];
    fn route_defs(&self) -> &[RouteDef];
    fn routing_settings(&self) -> RoutingSettings;
    fn stat_requests(&self) -> &[StatRequest];
}

/// Builds the finalized engine: stops first, then distances, then routes, so
/// definitions may refer to each other in any order.
pub fn load<S: NetworkSource + ?Sized>(source: &S) -> Result<QueryResponder> {
    let mut stops = DistanceModel::new();
    for stop in source.stop_defs() {
        stops.add_stop(
            stop.name.as_str(),
            Coordinates::new(stop.latitude, stop.longitude),
        );
    }

    for stop in source.stop_defs() {
        let from = stops.resolve(&stop.name)?;
        for (neighbour, &meters) in &stop.road_distances {
            match stops.stop_id(neighbour) {
                Some(to) => stops.record_distance(from, to, meters),
                None => warn!(
                    "Ignoring distance from {:?} to undefined stop {:?}",
                    stop.name, neighbour
                ),
            }
        }
    }

    let mut registry = RouteRegistry::new();
    for route in source.route_defs() {
        registry.add_route(
            &stops,
            route.name.as_str(),
            Topology::from_roundtrip(route.is_roundtrip),
            &route.stops,
        )?;
    }

    info!(
        "Loaded {} stops and {} routes",
        stops.stop_count(),
        registry.routes().len()
    );

    QueryResponder::new(stops, registry, source.routing_settings().timing())
}
