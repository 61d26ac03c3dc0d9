use std::collections::HashMap;

use crate::data::*;
use crate::error::{NetworkError, Result};

/// Stop arena together with the road and straight-line distances between stops.
#[derive(Debug, Default)]
pub struct DistanceModel {
    stops: Vec<Stop>,
    by_name: HashMap<String, StopId>,
    road: HashMap<(StopId, StopId), u32>,
}

impl DistanceModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a stop, or moves it if the name is already known.
    pub fn add_stop(&mut self, name: impl Into<String>, location: Coordinates) -> StopId {
        let name = name.into();
        if let Some(&id) = self.by_name.get(&name) {
            self.stops[id.0].location = location;
            return id;
        }

        let id = StopId(self.stops.len());
        self.by_name.insert(name.clone(), id);
        self.stops.push(Stop { id, name, location });
        id
    }

    pub fn stop_id(&self, name: &str) -> Option<StopId> {
        self.by_name.get(name).copied()
    }

    pub fn resolve(&self, name: &str) -> Result<StopId> {
        self.stop_id(name).ok_or_else(|| NetworkError::UnknownStop {
            stop: name.to_owned(),
        })
    }

    pub fn stop(&self, id: StopId) -> &Stop {
        &self.stops[id.0]
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    /// Stores `from -> to`. Only explicit entries are kept; the reverse
    /// direction is resolved on lookup.
    pub fn record_distance(&mut self, from: StopId, to: StopId, meters: u32) {
        self.road.insert((from, to), meters);
    }

    pub fn real_distance(&self, from: StopId, to: StopId) -> Result<u32> {
        self.road
            .get(&(from, to))
            .or_else(|| self.road.get(&(to, from)))
            .copied()
            .ok_or_else(|| NetworkError::MissingDistance {
                from: self.stop(from).name.clone(),
                to: self.stop(to).name.clone(),
            })
    }

    pub fn geographic_distance(&self, from: StopId, to: StopId) -> f64 {
        self.stop(from)
            .location
            .great_circle_distance(&self.stop(to).location)
    }
}
