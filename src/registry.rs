use std::collections::HashMap;
use std::sync::OnceLock;

use itertools::Itertools;
use log::{debug, info, warn};

use crate::data::*;
use crate::distance::DistanceModel;
use crate::error::{NetworkError, Result};

/// Bus routes in registration order.
///
/// Routes are mutable until [`RouteRegistry::finalize`] computes their derived
/// distances; afterwards the registry is read-only and the only state filled in
/// lazily is the per-stop table of serving routes.
#[derive(Debug, Default)]
pub struct RouteRegistry {
    routes: Vec<Route>,
    by_name: HashMap<String, RouteId>,

    // One cell per stop, sized on finalize and never invalidated.
    serving: Vec<OnceLock<Vec<RouteId>>>,
    finalized: bool,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_route<S: AsRef<str>>(
        &mut self,
        stops: &DistanceModel,
        name: impl Into<String>,
        topology: Topology,
        stop_names: &[S],
    ) -> Result<RouteId> {
        if self.finalized {
            return Err(NetworkError::AlreadyFinalized);
        }

        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(NetworkError::DuplicateRoute { route: name });
        }
        if stop_names.len() < 2 {
            return Err(NetworkError::InvalidRoute {
                route: name,
                count: stop_names.len(),
            });
        }

        let stop_ids = stop_names
            .iter()
            .map(|stop| stops.resolve(stop.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let id = RouteId(self.routes.len());
        self.by_name.insert(name.clone(), id);
        self.routes.push(Route::new(id, name, topology, stop_ids));
        Ok(id)
    }

    /// Computes the derived distances of every route. Either every route is
    /// updated or, on error, none is.
    pub fn finalize(&mut self, distances: &DistanceModel) -> Result<()> {
        if self.finalized {
            return Err(NetworkError::AlreadyFinalized);
        }

        let derived = self
            .routes
            .iter()
            .map(|route| Self::derive(route, distances))
            .collect::<Result<Vec<_>>>()?;

        for (route, (segment_lengths, stats)) in self.routes.iter_mut().zip(derived) {
            if !stats.curvature.is_finite() {
                warn!(
                    "Route {:?} has no straight-line length, its curvature is undefined",
                    route.name
                );
            } else if stats.curvature < 1.0 {
                warn!(
                    "Route {:?} is shorter on the road ({} m) than in a straight line ({:.1} m)",
                    route.name, stats.route_length, stats.geographic_length
                );
            }
            route.segment_lengths = segment_lengths;
            route.stats = Some(stats);
        }

        self.serving = (0..distances.stop_count())
            .map(|_| OnceLock::new())
            .collect();
        self.finalized = true;

        info!("Finalized {} routes", self.routes.len());
        Ok(())
    }

    fn derive(route: &Route, distances: &DistanceModel) -> Result<(Vec<u32>, RouteStats)> {
        let mut segment_lengths = Vec::with_capacity(route.traversal_len() - 1);
        let mut geographic_length = 0.0;

        for (from, to) in route.traversal().tuple_windows() {
            segment_lengths.push(distances.real_distance(from, to)?);
            geographic_length += distances.geographic_distance(from, to);
        }

        let route_length: u64 = segment_lengths.iter().map(|&m| u64::from(m)).sum();
        let stats = RouteStats {
            stop_count: route.traversal_len(),
            unique_stop_count: route.stops.iter().unique().count(),
            route_length,
            geographic_length,
            curvature: route_length as f64 / geographic_length,
        };

        debug!("Route {:?}: {:?}", route.name, stats);
        Ok((segment_lengths, stats))
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn route(&self, id: RouteId) -> &Route {
        &self.routes[id.0]
    }

    pub fn route_id(&self, name: &str) -> Option<RouteId> {
        self.by_name.get(name).copied()
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// `Ok(None)` when no route carries that name.
    pub fn route_stats(&self, name: &str) -> Result<Option<&RouteStats>> {
        if !self.finalized {
            return Err(NetworkError::NotFinalized);
        }

        Ok(self.route_id(name).and_then(|id| self.route(id).stats()))
    }

    /// Routes whose forward stop list contains `stop`, sorted by name.
    pub fn routes_serving(&self, stop: StopId) -> Result<&[RouteId]> {
        let cell = self.serving.get(stop.0).ok_or(NetworkError::NotFinalized)?;

        Ok(cell
            .get_or_init(|| {
                self.routes
                    .iter()
                    .filter(|route| route.serves(stop))
                    .sorted_by(|a, b| a.name.cmp(&b.name))
                    .map(|route| route.id)
                    .collect()
            })
            .as_slice())
    }
}
