use itertools::Itertools;
use log::debug;

use crate::data::*;
use crate::distance::DistanceModel;
use crate::error::Result;
use crate::graph::{NetworkGraph, Timing, TransitionKind};
use crate::registry::RouteRegistry;
use crate::router::{AStarRouter, ShortestPath};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopRoutes {
    NotFound,
    NoRoutes,
    /// Route names, sorted.
    Routes(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Leg {
    Wait {
        stop: String,
        minutes: f64,
    },
    Ride {
        route: String,
        span: usize,
        minutes: f64,
    },
}

impl Leg {
    pub fn minutes(&self) -> f64 {
        match self {
            Leg::Wait { minutes, .. } | Leg::Ride { minutes, .. } => *minutes,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
    pub total_time: f64,
    pub legs: Vec<Leg>,
}

/// The finalized network answering stop, route and itinerary queries.
#[derive(Debug)]
pub struct QueryResponder<R = AStarRouter> {
    stops: DistanceModel,
    registry: RouteRegistry,
    graph: NetworkGraph,
    router: R,
}

impl QueryResponder<AStarRouter> {
    /// Finalizes the registry if needed and builds the graph.
    pub fn new(stops: DistanceModel, registry: RouteRegistry, timing: Timing) -> Result<Self> {
        Self::with_router(stops, registry, timing, AStarRouter)
    }
}

impl<R: ShortestPath> QueryResponder<R> {
    pub fn with_router(
        stops: DistanceModel,
        mut registry: RouteRegistry,
        timing: Timing,
        router: R,
    ) -> Result<Self> {
        if !registry.is_finalized() {
            registry.finalize(&stops)?;
        }
        let graph = NetworkGraph::build(&registry, &stops, timing)?;

        Ok(Self {
            stops,
            registry,
            graph,
            router,
        })
    }

    pub fn stops(&self) -> &DistanceModel {
        &self.stops
    }

    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    pub fn graph(&self) -> &NetworkGraph {
        &self.graph
    }

    pub fn stop_query(&self, name: &str) -> Result<StopRoutes> {
        let Some(stop) = self.stops.stop_id(name) else {
            return Ok(StopRoutes::NotFound);
        };

        let routes = self.registry.routes_serving(stop)?;
        if routes.is_empty() {
            return Ok(StopRoutes::NoRoutes);
        }

        Ok(StopRoutes::Routes(
            routes
                .iter()
                .map(|&route| self.registry.route(route).name.clone())
                .collect(),
        ))
    }

    pub fn route_query(&self, name: &str) -> Result<Option<RouteStats>> {
        Ok(self.registry.route_stats(name)?.cloned())
    }

    /// `Ok(None)` when both stops exist but no sequence of rides connects them.
    pub fn itinerary_query(&self, from: &str, to: &str) -> Result<Option<Itinerary>> {
        let source = self.graph.arrival_vertex(self.stops.resolve(from)?);
        let target = self.graph.arrival_vertex(self.stops.resolve(to)?);

        let Some(path) = self.router.shortest_path(&self.graph, source, target) else {
            debug!("No itinerary from {:?} to {:?}", from, to);
            return Ok(None);
        };

        let legs = path
            .edges
            .iter()
            .filter_map(|&edge| self.graph.transition(edge))
            .filter_map(|transition| match transition.kind {
                TransitionKind::Wait { stop } => Some(Leg::Wait {
                    stop: self.stops.stop(stop).name.clone(),
                    minutes: transition.minutes,
                }),
                TransitionKind::Ride { route, span, .. } => Some(Leg::Ride {
                    route: self.registry.route(route).name.clone(),
                    span,
                    minutes: transition.minutes,
                }),
                TransitionKind::Alight { .. } => None,
            })
            .coalesce(|previous, next| match (previous, next) {
                (
                    Leg::Ride {
                        route,
                        span,
                        minutes,
                    },
                    Leg::Ride {
                        route: next_route,
                        span: next_span,
                        minutes: next_minutes,
                    },
                ) if route == next_route => Ok(Leg::Ride {
                    route,
                    span: span + next_span,
                    minutes: minutes + next_minutes,
                }),
                (previous, next) => Err((previous, next)),
            })
            .collect_vec();

        debug!(
            "Itinerary from {:?} to {:?}: {} legs, {} minutes",
            from,
            to,
            legs.len(),
            path.weight
        );

        Ok(Some(Itinerary {
            total_time: path.weight,
            legs,
        }))
    }
}
