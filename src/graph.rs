use itertools::Itertools;
use log::info;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};

use crate::data::*;
use crate::distance::DistanceModel;
use crate::error::{NetworkError, Result};
use crate::registry::RouteRegistry;

/// Travel time model: a fixed wait at every boarding plus distance over speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    /// Minutes spent waiting for any bus.
    pub wait_time: f64,
    /// Meters per minute.
    pub velocity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vertex {
    /// Standing at a stop, not on any bus.
    Arrival(StopId),
    /// On `route`, having just reached the stop at `position` of its traversal.
    Boarding {
        route: RouteId,
        position: usize,
        stop: StopId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    Wait {
        stop: StopId,
    },
    Ride {
        route: RouteId,
        from: StopId,
        to: StopId,
        span: usize,
    },
    Alight {
        stop: StopId,
    },
}

impl Timing {
    /// Weights must stay non-negative for the shortest path search to terminate.
    pub fn validate(&self) -> Result<()> {
        let valid = self.wait_time.is_finite()
            && self.wait_time >= 0.0
            && self.velocity.is_finite()
            && self.velocity > 0.0;

        if valid {
            Ok(())
        } else {
            Err(NetworkError::InvalidTiming {
                wait_time: self.wait_time,
                velocity: self.velocity,
            })
        }
    }
}

/// Edge payload: what the step means and how many minutes it takes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub kind: TransitionKind,
    pub minutes: f64,
}

/// Directed graph of wait, ride and alight steps.
///
/// Arrival vertices come first, one per stop in name order, followed by one
/// boarding vertex per position of every route traversal, routes in
/// registration order. Ids are therefore stable across builds over the same
/// input.
#[derive(Debug)]
pub struct NetworkGraph {
    graph: DiGraph<Vertex, Transition>,
    arrivals: Vec<NodeIndex>,
}

impl NetworkGraph {
    pub fn build(registry: &RouteRegistry, stops: &DistanceModel, timing: Timing) -> Result<Self> {
        if !registry.is_finalized() {
            return Err(NetworkError::NotFinalized);
        }
        timing.validate()?;

        let boardings: usize = registry.routes().iter().map(Route::traversal_len).sum();
        let mut graph = DiGraph::with_capacity(stops.stop_count() + boardings, 3 * boardings);

        let mut arrivals = vec![NodeIndex::end(); stops.stop_count()];
        for stop in stops.stops().iter().sorted_by(|a, b| a.name.cmp(&b.name)) {
            arrivals[stop.id.0] = graph.add_node(Vertex::Arrival(stop.id));
        }

        for route in registry.routes() {
            let mut previous: Option<(NodeIndex, StopId)> = None;

            for (position, stop) in route.traversal().enumerate() {
                let boarding = graph.add_node(Vertex::Boarding {
                    route: route.id,
                    position,
                    stop,
                });

                graph.add_edge(
                    arrivals[stop.0],
                    boarding,
                    Transition {
                        kind: TransitionKind::Wait { stop },
                        minutes: timing.wait_time,
                    },
                );
                graph.add_edge(
                    boarding,
                    arrivals[stop.0],
                    Transition {
                        kind: TransitionKind::Alight { stop },
                        minutes: 0.0,
                    },
                );

                if let Some((from_vertex, from)) = previous {
                    let meters = route.segment_lengths()[position - 1];
                    graph.add_edge(
                        from_vertex,
                        boarding,
                        Transition {
                            kind: TransitionKind::Ride {
                                route: route.id,
                                from,
                                to: stop,
                                span: 1,
                            },
                            minutes: f64::from(meters) / timing.velocity,
                        },
                    );
                }
                previous = Some((boarding, stop));
            }
        }

        info!(
            "Built network graph with {} vertices and {} edges ({} min wait, {} m/min)",
            graph.node_count(),
            graph.edge_count(),
            timing.wait_time,
            timing.velocity
        );

        Ok(Self { graph, arrivals })
    }

    pub fn graph(&self) -> &DiGraph<Vertex, Transition> {
        &self.graph
    }

    pub fn arrival_vertex(&self, stop: StopId) -> NodeIndex {
        self.arrivals[stop.0]
    }

    pub fn transition(&self, edge: EdgeIndex) -> Option<&Transition> {
        self.graph.edge_weight(edge)
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMING: Timing = Timing {
        wait_time: 5.0,
        velocity: 1000.0,
    };

    fn network() -> (DistanceModel, RouteRegistry) {
        let mut stops = DistanceModel::new();
        // Registered out of name order on purpose
        let y = stops.add_stop("Y", Coordinates::new(0.0, 1.0));
        let x = stops.add_stop("X", Coordinates::new(0.0, 0.0));
        let z = stops.add_stop("Z", Coordinates::new(1.0, 1.0));
        stops.record_distance(x, y, 1000);
        stops.record_distance(y, z, 2500);

        let mut registry = RouteRegistry::new();
        registry
            .add_route(&stops, "R", Topology::OutAndBack, &["X", "Y", "Z"])
            .unwrap();
        registry
            .add_route(&stops, "L", Topology::Circular, &["Y", "Z", "Y"])
            .unwrap();
        registry.finalize(&stops).unwrap();
        (stops, registry)
    }

    #[test]
    fn test_arrival_vertices_in_name_order() {
        let (stops, registry) = network();
        let graph = NetworkGraph::build(&registry, &stops, TIMING).unwrap();

        let x = stops.stop_id("X").unwrap();
        let y = stops.stop_id("Y").unwrap();
        let z = stops.stop_id("Z").unwrap();
        assert_eq!(graph.arrival_vertex(x).index(), 0);
        assert_eq!(graph.arrival_vertex(y).index(), 1);
        assert_eq!(graph.arrival_vertex(z).index(), 2);
    }

    #[test]
    fn test_sizes_are_linear_in_stop_visits() {
        let (stops, registry) = network();
        let graph = NetworkGraph::build(&registry, &stops, TIMING).unwrap();

        // R visits 5 stops, L visits 3
        let visits = 5 + 3;
        assert_eq!(graph.vertex_count(), 3 + visits);
        assert_eq!(graph.edge_count(), 3 * visits - 2);
    }

    #[test]
    fn test_edge_weights() {
        let (stops, registry) = network();
        let graph = NetworkGraph::build(&registry, &stops, TIMING).unwrap();

        let rides: Vec<_> = graph
            .graph()
            .edge_weights()
            .filter(|t| matches!(t.kind, TransitionKind::Ride { .. }))
            .map(|t| t.minutes)
            .collect();
        assert_eq!(rides, vec![1.0, 2.5, 2.5, 1.0, 2.5, 2.5]);

        assert!(graph
            .graph()
            .edge_weights()
            .filter(|t| matches!(t.kind, TransitionKind::Wait { .. }))
            .all(|t| t.minutes == 5.0));
        assert!(graph
            .graph()
            .edge_weights()
            .filter(|t| matches!(t.kind, TransitionKind::Alight { .. }))
            .all(|t| t.minutes == 0.0));
    }

    #[test]
    fn test_build_is_deterministic() {
        let (stops, registry) = network();
        let first = NetworkGraph::build(&registry, &stops, TIMING).unwrap();
        let second = NetworkGraph::build(&registry, &stops, TIMING).unwrap();

        let tags = |graph: &NetworkGraph| -> Vec<Transition> {
            graph.graph().edge_weights().copied().collect()
        };
        assert_eq!(tags(&first), tags(&second));
        assert_eq!(
            first.graph().node_weights().collect::<Vec<_>>(),
            second.graph().node_weights().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_rejects_invalid_timing() {
        let (stops, registry) = network();

        for (wait_time, velocity) in [
            (-5.0, 1000.0),
            (5.0, 0.0),
            (f64::NAN, 1000.0),
            (5.0, f64::INFINITY),
        ] {
            let timing = Timing {
                wait_time,
                velocity,
            };
            assert!(matches!(
                NetworkGraph::build(&registry, &stops, timing),
                Err(NetworkError::InvalidTiming { .. })
            ));
        }

        let idle = Timing {
            wait_time: 0.0,
            velocity: 1000.0,
        };
        assert!(NetworkGraph::build(&registry, &stops, idle).is_ok());
    }

    #[test]
    fn test_build_needs_finalized_registry() {
        let stops = DistanceModel::new();
        let registry = RouteRegistry::new();

        assert_eq!(
            NetworkGraph::build(&registry, &stops, TIMING).unwrap_err(),
            NetworkError::NotFinalized
        );
    }
}
