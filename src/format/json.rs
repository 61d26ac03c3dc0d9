use std::io::{Read, Write};

use serde::Deserialize;

use crate::error::InputError;
use crate::response::Response;
use crate::source::{NetworkSource, RouteDef, RoutingSettings, StatRequest, StopDef};

#[derive(Deserialize, Debug)]
#[serde(tag = "type")]
enum BaseRequest {
    Stop(StopDef),
    Bus(RouteDef),
}

#[derive(Deserialize, Debug)]
struct Document {
    #[serde(default)]
    routing_settings: RoutingSettings,
    #[serde(default)]
    base_requests: Vec<BaseRequest>,
    #[serde(default)]
    stat_requests: Vec<StatRequest>,
}

/// A `{routing_settings, base_requests, stat_requests}` document.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonInput {
    pub stops: Vec<StopDef>,
    pub routes: Vec<RouteDef>,
    pub settings: RoutingSettings,
    pub requests: Vec<StatRequest>,
}

impl JsonInput {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, InputError> {
        let document: Document = serde_json::from_reader(reader)?;
        Ok(Self::from(document))
    }

    pub fn from_json(input: &str) -> Result<Self, InputError> {
        let document: Document = serde_json::from_str(input)?;
        Ok(Self::from(document))
    }
}

impl From<Document> for JsonInput {
    fn from(document: Document) -> Self {
        let mut stops = Vec::new();
        let mut routes = Vec::new();
        for request in document.base_requests {
            match request {
                BaseRequest::Stop(stop) => stops.push(stop),
                BaseRequest::Bus(route) => routes.push(route),
            }
        }

        Self {
            stops,
            routes,
            settings: document.routing_settings,
            requests: document.stat_requests,
        }
    }
}

impl NetworkSource for JsonInput {
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

/// Writes the responses as one pretty-printed JSON array.
pub fn write_responses<W: Write>(mut writer: W, responses: &[Response]) -> Result<(), InputError> {
    serde_json::to_writer_pretty(&mut writer, responses)?;
    writeln!(writer)?;
    Ok(())
}
