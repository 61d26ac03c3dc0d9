/// Mean earth radius used for great-circle distances, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(pub usize);

/// Latitude and longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Haversine distance to `other` in meters.
    pub fn great_circle_distance(&self, other: &Coordinates) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = lat2 - lat1;
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub id: StopId,
    pub name: String,
    pub location: Coordinates,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    /// The last stop of the list repeats the first one.
    Circular,
    /// The bus returns along the forward stops in reverse order.
    OutAndBack,
}

impl Topology {
    pub fn from_roundtrip(is_roundtrip: bool) -> Self {
        if is_roundtrip {
            Topology::Circular
        } else {
            Topology::OutAndBack
        }
    }
}

/// Aggregates derived once the registry is finalized.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteStats {
    pub stop_count: usize,
    pub unique_stop_count: usize,
    pub route_length: u64,
    pub geographic_length: f64,
    pub curvature: f64,
}

#[derive(Debug, Clone)]
pub struct Route {
    pub id: RouteId,
    pub name: String,
    pub topology: Topology,
    pub stops: Vec<StopId>,

    pub(crate) segment_lengths: Vec<u32>,
    pub(crate) stats: Option<RouteStats>,
}

impl Route {
    pub(crate) fn new(id: RouteId, name: String, topology: Topology, stops: Vec<StopId>) -> Self {
        Self {
            id,
            name,
            topology,
            stops,
            segment_lengths: Vec::new(),
            stats: None,
        }
    }

    /// Stops in the order the bus visits them, return leg included.
    pub fn traversal(&self) -> impl Iterator<Item = StopId> + '_ {
        let return_leg: &[StopId] = match self.topology {
            Topology::Circular => &[],
            Topology::OutAndBack => &self.stops[..self.stops.len().saturating_sub(1)],
        };

        self.stops.iter().chain(return_leg.iter().rev()).copied()
    }

    pub fn traversal_len(&self) -> usize {
        match self.topology {
            Topology::Circular => self.stops.len(),
            Topology::OutAndBack => 2 * self.stops.len() - 1,
        }
    }

    pub fn serves(&self, stop: StopId) -> bool {
        self.stops.contains(&stop)
    }

    /// Road distance of each consecutive traversal pair. Empty until finalized.
    pub fn segment_lengths(&self) -> &[u32] {
        &self.segment_lengths
    }

    pub fn stats(&self) -> Option<&RouteStats> {
        self.stats.as_ref()
    }
}
