use log::debug;
use serde::Serialize;

use crate::error::{NetworkError, Result};
use crate::responder::{Leg, QueryResponder, StopRoutes};
use crate::router::ShortestPath;
use crate::source::{self, NetworkSource, StatRequest};

pub const NOT_FOUND: &str = "not found";
pub const UNKNOWN_STOP: &str = "unknown stop";

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum Item {
    Wait {
        stop_name: String,
        time: f64,
    },
    Bus {
        bus: String,
        span_count: usize,
        time: f64,
    },
}

impl From<Leg> for Item {
    fn from(leg: Leg) -> Self {
        match leg {
            Leg::Wait { stop, minutes } => Item::Wait {
                stop_name: stop,
                time: minutes,
            },
            Leg::Ride {
                route,
                span,
                minutes,
            } => Item::Bus {
                bus: route,
                span_count: span,
                time: minutes,
            },
        }
    }
}

/// Answer to one stat request, shaped like the output document entries.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Response {
    Stop {
        request_id: u64,
        buses: Vec<String>,
    },
    Bus {
        request_id: u64,
        route_length: u64,
        curvature: f64,
        stop_count: usize,
        unique_stop_count: usize,
    },
    Route {
        request_id: u64,
        total_time: f64,
        items: Vec<Item>,
    },
    Error {
        request_id: u64,
        error_message: String,
    },
}

impl Response {
    fn error(request_id: u64, message: &str) -> Self {
        Response::Error {
            request_id,
            error_message: message.to_owned(),
        }
    }

    pub fn request_id(&self) -> u64 {
        match self {
            Response::Stop { request_id, .. }
            | Response::Bus { request_id, .. }
            | Response::Route { request_id, .. }
            | Response::Error { request_id, .. } => *request_id,
        }
    }
}

impl<R: ShortestPath> QueryResponder<R> {
    pub fn answer(&self, request: &StatRequest) -> Result<Response> {
        debug!("Answering {:?}", request);
        let request_id = request.id();

        let response = match request {
            StatRequest::Stop { name, .. } => match self.stop_query(name)? {
                StopRoutes::NotFound => Response::error(request_id, NOT_FOUND),
                StopRoutes::NoRoutes => Response::Stop {
                    request_id,
                    buses: Vec::new(),
                },
                StopRoutes::Routes(buses) => Response::Stop { request_id, buses },
            },
            StatRequest::Bus { name, .. } => match self.route_query(name)? {
                Some(stats) => Response::Bus {
                    request_id,
                    route_length: stats.route_length,
                    curvature: stats.curvature,
                    stop_count: stats.stop_count,
                    unique_stop_count: stats.unique_stop_count,
                },
                None => Response::error(request_id, NOT_FOUND),
            },
            StatRequest::Route { from, to, .. } => match self.itinerary_query(from, to) {
                Ok(Some(itinerary)) => Response::Route {
                    request_id,
                    total_time: itinerary.total_time,
                    items: itinerary.legs.into_iter().map(Item::from).collect(),
                },
                Ok(None) => Response::error(request_id, NOT_FOUND),
                Err(NetworkError::UnknownStop { .. }) => Response::error(request_id, UNKNOWN_STOP),
                Err(err) => return Err(err),
            },
        };

        Ok(response)
    }
}

/// Loads the network from `source` and answers its stat requests in order.
pub fn answer_all<S: NetworkSource + ?Sized>(source: &S) -> Result<Vec<Response>> {
    let responder = source::load(source)?;

    source
        .stat_requests()
        .iter()
        .map(|request| responder.answer(request))
        .collect()
}
