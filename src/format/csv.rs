//! A directory of CSV tables.
//!
//! | file              | columns                                  |
//! |-------------------|------------------------------------------|
//! | `stops.txt`       | `stop_name,latitude,longitude`           |
//! | `distances.txt`   | `from_stop,to_stop,meters`               |
//! | `routes.txt`      | `route_name,is_roundtrip`                |
//! | `route_stops.txt` | `route_name,stop_name,stop_sequence`     |
//! | `requests.txt`    | `id,type,name,from,to` (optional)        |

use std::collections::HashMap;
use std::path::Path;

use itertools::Itertools;
use log::{info, warn};
use serde::Deserialize;

use crate::error::InputError;
use crate::source::{NetworkSource, RouteDef, RoutingSettings, StatRequest, StopDef};

#[derive(Deserialize, Debug)]
pub struct StopRecord {
    pub stop_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Deserialize, Debug)]
pub struct DistanceRecord {
    pub from_stop: String,
    pub to_stop: String,
    pub meters: u32,
}

#[derive(Deserialize, Debug)]
pub struct RouteRecord {
    pub route_name: String,
    pub is_roundtrip: bool,
}

#[derive(Deserialize, Debug)]
pub struct RouteStopRecord {
    pub route_name: String,
    pub stop_name: String,
    pub stop_sequence: u32,
}

#[derive(Deserialize, Debug)]
pub struct RequestRecord {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug)]
pub struct CsvTables {
    pub stops: Vec<StopRecord>,
    pub distances: Vec<DistanceRecord>,
    pub routes: Vec<RouteRecord>,
    pub route_stops: Vec<RouteStopRecord>,
    pub requests: Vec<RequestRecord>,
}

fn deserialize_into<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, InputError> {
    Ok(::csv::Reader::from_path(path)?
        .deserialize()
        .collect::<Result<Vec<T>, _>>()?)
}

impl CsvTables {
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, InputError> {
        let dir = dir.as_ref();

        info!("Reading CSV tables from {}", dir.display());
        let requests_path = dir.join("requests.txt");
        let requests = if requests_path.exists() {
            deserialize_into(&requests_path)?
        } else {
            Vec::new()
        };

        Ok(Self {
            stops: deserialize_into(&dir.join("stops.txt"))?,
            distances: deserialize_into(&dir.join("distances.txt"))?,
            routes: deserialize_into(&dir.join("routes.txt"))?,
            route_stops: deserialize_into(&dir.join("route_stops.txt"))?,
            requests,
        })
    }
}

/// Tables joined into definitions the engine can load.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvInput {
    pub stops: Vec<StopDef>,
    pub routes: Vec<RouteDef>,
    pub settings: RoutingSettings,
    pub requests: Vec<StatRequest>,
}

impl CsvInput {
    pub fn from_dir(dir: impl AsRef<Path>, settings: RoutingSettings) -> Result<Self, InputError> {
        Self::from_tables(CsvTables::from_dir(dir)?, settings)
    }

    pub fn from_tables(tables: CsvTables, settings: RoutingSettings) -> Result<Self, InputError> {
        let mut distances: HashMap<String, Vec<(String, u32)>> = tables
            .distances
            .into_iter()
            .map(|record| (record.from_stop, (record.to_stop, record.meters)))
            .into_group_map();

        let stops = tables
            .stops
            .into_iter()
            .map(|record| StopDef {
                road_distances: distances
                    .remove(&record.stop_name)
                    .unwrap_or_default()
                    .into_iter()
                    .collect(),
                name: record.stop_name,
                latitude: record.latitude,
                longitude: record.longitude,
            })
            .collect_vec();

        for from in distances.keys() {
            warn!("Ignoring distances from undefined stop {:?}", from);
        }

        let mut route_stops = tables
            .route_stops
            .into_iter()
            .map(|record| (record.route_name.clone(), record))
            .into_group_map();

        let routes = tables
            .routes
            .into_iter()
            .map(|record| RouteDef {
                stops: route_stops
                    .remove(&record.route_name)
                    .unwrap_or_default()
                    .into_iter()
                    .sorted_by_key(|stop| stop.stop_sequence)
                    .map(|stop| stop.stop_name)
                    .collect(),
                name: record.route_name,
                is_roundtrip: record.is_roundtrip,
            })
            .collect_vec();

        let requests = tables
            .requests
            .into_iter()
            .enumerate()
            .map(|(index, record)| request_from_record(index + 2, record))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            stops,
            routes,
            settings,
            requests,
        })
    }
}

/// `line` is the position in `requests.txt`, header included.
fn request_from_record(line: usize, record: RequestRecord) -> Result<StatRequest, InputError> {
    let missing = |column: &str| InputError::Parse {
        line,
        message: format!(
            "requests.txt: {} request needs a {column:?} value",
            record.kind
        ),
    };

    match record.kind.as_str() {
        "Stop" => Ok(StatRequest::Stop {
            id: record.id,
            name: record.name.clone().ok_or_else(|| missing("name"))?,
        }),
        "Bus" => Ok(StatRequest::Bus {
            id: record.id,
            name: record.name.clone().ok_or_else(|| missing("name"))?,
        }),
        "Route" => Ok(StatRequest::Route {
            id: record.id,
            from: record.from.clone().ok_or_else(|| missing("from"))?,
            to: record.to.clone().ok_or_else(|| missing("to"))?,
        }),
        other => Err(InputError::Parse {
            line,
            message: format!("requests.txt: unknown request type {other:?}"),
        }),
    }
}

impl NetworkSource for CsvInput {
    fn stop_defs(&self) -> &[StopDef] {
        &self.stops
    }

    fn route_defs(&self) -> &[RouteDef] {
        &self.routes
    }

    fn routing_settings(&self) -> RoutingSettings {
        self.settings
    }

    fn stat_requests(&self) -> &[StatRequest] {
        &self.requests
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> CsvTables {
        CsvTables {
            stops: vec![
                StopRecord {
                    stop_name: "A".into(),
                    latitude: 0.0,
                    longitude: 0.0,
                },
                StopRecord {
                    stop_name: "B".into(),
                    latitude: 0.0,
                    longitude: 0.01,
                },
            ],
            distances: vec![
                DistanceRecord {
                    from_stop: "A".into(),
                    to_stop: "B".into(),
                    meters: 1200,
                },
                DistanceRecord {
                    from_stop: "Ghost".into(),
                    to_stop: "A".into(),
                    meters: 5,
                },
            ],
            routes: vec![RouteRecord {
                route_name: "1".into(),
                is_roundtrip: false,
            }],
            route_stops: vec![
                RouteStopRecord {
                    route_name: "1".into(),
                    stop_name: "B".into(),
                    stop_sequence: 2,
                },
                RouteStopRecord {
                    route_name: "1".into(),
                    stop_name: "A".into(),
                    stop_sequence: 1,
                },
            ],
            requests: vec![RequestRecord {
                id: 4,
                kind: "Route".into(),
                name: None,
                from: Some("A".into()),
                to: Some("B".into()),
            }],
        }
    }

    #[test]
    fn test_join_tables() {
        let input = CsvInput::from_tables(tables(), RoutingSettings::default()).unwrap();

        assert_eq!(input.stops[0].road_distances["B"], 1200);
        assert!(input.stops[1].road_distances.is_empty());
        assert_eq!(input.routes[0].stops, vec!["A", "B"]);
        assert_eq!(
            input.requests,
            vec![StatRequest::Route {
                id: 4,
                from: "A".into(),
                to: "B".into()
            }]
        );
    }

    #[test]
    fn test_incomplete_request() {
        let mut tables = tables();
        tables.requests[0].to = None;

        let err = CsvInput::from_tables(tables, RoutingSettings::default()).unwrap_err();
        assert!(matches!(err, InputError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_read_from_dir() {
        let dir = std::env::temp_dir().join(format!("bus-router-csv-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("stops.txt"),
            "stop_name,latitude,longitude\nA,0,0\nB,0,0.01\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("distances.txt"),
            "from_stop,to_stop,meters\nA,B,1200\n",
        )
        .unwrap();
        std::fs::write(dir.join("routes.txt"), "route_name,is_roundtrip\n1,false\n").unwrap();
        std::fs::write(
            dir.join("route_stops.txt"),
            "route_name,stop_name,stop_sequence\n1,A,1\n1,B,2\n",
        )
        .unwrap();

        let input = CsvInput::from_dir(&dir, RoutingSettings::default()).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(input.stops.len(), 2);
        assert_eq!(input.routes[0].stops, vec!["A", "B"]);
        assert!(!input.routes[0].is_roundtrip);
        assert!(input.requests.is_empty());
    }
}
