//! Line-oriented format.
//!
//! ```text
//! 3
//! Stop Tolstopaltsevo: 55.611087, 37.20829, 3900m to Marushkino
//! Stop Marushkino: 55.595884, 37.209755
//! Bus 750: Tolstopaltsevo - Marushkino
//! 2
//! Bus 750
//! Stop Marushkino
//! ```
//!
//! A bus whose stops are joined by ` > ` is circular, ` - ` makes it go out and
//! back. Stat lines are `Bus NAME`, `Stop NAME` or `Route FROM to TO`.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use itertools::Itertools;

use crate::error::InputError;
use crate::response::{Item, Response};
use crate::source::{NetworkSource, RouteDef, RoutingSettings, StatRequest, StopDef};

#[derive(Debug, Clone, PartialEq)]
pub struct TextInput {
    pub stops: Vec<StopDef>,
    pub routes: Vec<RouteDef>,
    pub settings: RoutingSettings,
    pub requests: Vec<StatRequest>,
}

enum BaseLine {
    Stop(StopDef),
    Bus(RouteDef),
}

fn parse_error(line: usize, message: impl Into<String>) -> InputError {
    InputError::Parse {
        line,
        message: message.into(),
    }
}

impl TextInput {
    /// The format carries no routing settings, so they are passed in.
    pub fn from_reader<R: BufRead>(
        reader: R,
        settings: RoutingSettings,
    ) -> Result<Self, InputError> {
        let mut lines = reader
            .lines()
            .enumerate()
            .map(|(index, line)| line.map(|line| (index + 1, line)));

        let mut input = Self {
            stops: Vec::new(),
            routes: Vec::new(),
            settings,
            requests: Vec::new(),
        };

        for _ in 0..read_count(&mut lines)? {
            let (number, line) = next_line(&mut lines)?;
            match parse_base_line(number, &line)? {
                BaseLine::Stop(stop) => input.stops.push(stop),
                BaseLine::Bus(route) => input.routes.push(route),
            }
        }

        for id in 0..read_count(&mut lines)? {
            let (number, line) = next_line(&mut lines)?;
            input
                .requests
                .push(parse_stat_line(number, &line, id as u64)?);
        }

        Ok(input)
    }

    pub fn parse(input: &str, settings: RoutingSettings) -> Result<Self, InputError> {
        Self::from_reader(input.as_bytes(), settings)
    }
}

impl NetworkSource for TextInput {
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

fn next_line<I>(lines: &mut I) -> Result<(usize, String), InputError>
where
    I: Iterator<Item = std::io::Result<(usize, String)>>,
{
    match lines.next() {
        Some(line) => Ok(line?),
        None => Err(parse_error(0, "unexpected end of input")),
    }
}

/// A missing count line reads as zero.
fn read_count<I>(lines: &mut I) -> Result<usize, InputError>
where
    I: Iterator<Item = std::io::Result<(usize, String)>>,
{
    for line in lines.by_ref() {
        let (number, line) = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        return line
            .parse()
            .map_err(|_| parse_error(number, format!("expected a count, got {line:?}")));
    }
    Ok(0)
}

fn parse_base_line(number: usize, line: &str) -> Result<BaseLine, InputError> {
    let (kind, rest) = line
        .trim()
        .split_once(' ')
        .ok_or_else(|| parse_error(number, "expected `Stop NAME: ...` or `Bus NAME: ...`"))?;
    let (name, body) = rest
        .split_once(": ")
        .ok_or_else(|| parse_error(number, "missing `: ` after the name"))?;
    let name = name.trim().to_owned();

    match kind {
        "Stop" => parse_stop(number, name, body).map(BaseLine::Stop),
        "Bus" => parse_bus(number, name, body).map(BaseLine::Bus),
        other => Err(parse_error(
            number,
            format!("unknown request type {other:?}"),
        )),
    }
}

fn parse_stop(number: usize, name: String, body: &str) -> Result<StopDef, InputError> {
    let mut parts = body.split(',').map(str::trim);
    let mut coordinate = |what: &str| -> Result<f64, InputError> {
        parts
            .next()
            .and_then(|part| part.parse().ok())
            .ok_or_else(|| parse_error(number, format!("invalid {what}")))
    };
    let latitude = coordinate("latitude")?;
    let longitude = coordinate("longitude")?;

    let road_distances: BTreeMap<String, u32> = parts
        .map(|part| -> Result<(String, u32), InputError> {
            let (meters, to) = part.split_once("m to ").ok_or_else(|| {
                parse_error(number, format!("expected `Dm to STOP`, got {part:?}"))
            })?;
            let meters = meters
                .parse()
                .map_err(|_| parse_error(number, format!("invalid distance {meters:?}")))?;
            Ok((to.trim().to_owned(), meters))
        })
        .collect::<Result<_, _>>()?;

    Ok(StopDef {
        name,
        latitude,
        longitude,
        road_distances,
    })
}

fn parse_bus(number: usize, name: String, body: &str) -> Result<RouteDef, InputError> {
    let is_roundtrip = body.contains(" > ");
    let separator = if is_roundtrip { '>' } else { '-' };

    let stops = body
        .split(&format!(" {separator} "))
        .map(|stop| stop.trim().to_owned())
        .collect_vec();
    if stops.iter().any(String::is_empty) {
        return Err(parse_error(number, "empty stop name"));
    }

    Ok(RouteDef {
        name,
        stops,
        is_roundtrip,
    })
}

fn parse_stat_line(number: usize, line: &str, id: u64) -> Result<StatRequest, InputError> {
    let (kind, name) = line.trim().split_once(' ').ok_or_else(|| {
        parse_error(
            number,
            "expected `Bus NAME`, `Stop NAME` or `Route FROM to TO`",
        )
    })?;
    let name = name.trim().to_owned();

    match kind {
        "Bus" => Ok(StatRequest::Bus { id, name }),
        "Stop" => Ok(StatRequest::Stop { id, name }),
        "Route" => {
            let (from, to) = name
                .split_once(" to ")
                .ok_or_else(|| parse_error(number, "expected `Route FROM to TO`"))?;
            Ok(StatRequest::Route {
                id,
                from: from.trim().to_owned(),
                to: to.trim().to_owned(),
            })
        }
        other => Err(parse_error(
            number,
            format!("unknown request type {other:?}"),
        )),
    }
}

/// Six significant digits, trailing zeros dropped. Exponents below -4 or from
/// 6 up switch to scientific notation (`1e+06`).
pub fn significant(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return value.to_string();
    }

    // Rounding to six digits first settles the exponent, e.g. 999999.7 -> 1e+06
    let scientific = format!("{value:.5e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return scientific;
    };

    if !(-4..6).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{}e{sign}{:02}", trim_fraction(mantissa), exponent.abs());
    }

    let decimals = (5 - exponent) as usize;
    trim_fraction(&format!("{value:.decimals$}"))
}

fn trim_fraction(text: &str) -> String {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_owned()
    } else {
        text.to_owned()
    }
}

fn render(request: &StatRequest, response: &Response) -> String {
    let subject = match request {
        StatRequest::Stop { name, .. } => format!("Stop {name}"),
        StatRequest::Bus { name, .. } => format!("Bus {name}"),
        StatRequest::Route { from, to, .. } => format!("Route {from} to {to}"),
    };

    let body = match response {
        Response::Stop { buses, .. } if buses.is_empty() => "no buses".to_owned(),
        Response::Stop { buses, .. } => format!("buses {}", buses.iter().join(" ")),
        Response::Bus {
            route_length,
            curvature,
            stop_count,
            unique_stop_count,
            ..
        } => format!(
            "{stop_count} stops on route, {unique_stop_count} unique stops, \
             {route_length} route length, {} curvature",
            significant(*curvature)
        ),
        Response::Route {
            total_time, items, ..
        } => {
            let legs = items.iter().map(|item| match item {
                Item::Wait { stop_name, time } => {
                    format!("wait {} at {stop_name}", significant(*time))
                }
                Item::Bus {
                    bus,
                    span_count,
                    time,
                } => format!("bus {bus} for {span_count} stops {}", significant(*time)),
            });
            format!("{} total time", significant(*total_time))
                + &legs.map(|leg| format!(", {leg}")).join("")
        }
        Response::Error { error_message, .. } => error_message.clone(),
    };

    format!("{subject}: {body}")
}

/// Writes one line per request, in request order.
pub fn write_responses<W: Write>(
    mut writer: W,
    requests: &[StatRequest],
    responses: &[Response],
) -> Result<(), InputError> {
    for (request, response) in requests.iter().zip(responses) {
        writeln!(writer, "{}", render(request, response))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: &str = "\
10
Stop Tolstopaltsevo: 55.611087, 37.20829, 3900m to Marushkino
Stop Marushkino: 55.595884, 37.209755, 9900m to Rasskazovka
Bus 256: Biryulyovo Zapadnoye > Biryusinka > Universam > Biryulyovo Tovarnaya > Biryulyovo Passazhirskaya > Biryulyovo Zapadnoye
Bus 750: Tolstopaltsevo - Marushkino - Rasskazovka
Stop Rasskazovka: 55.632761, 37.333324
Stop Biryulyovo Zapadnoye: 55.574371, 37.6517, 7500m to Rossoshanskaya ulitsa, 1800m to Biryusinka, 2400m to Universam
Stop Biryusinka: 55.581065, 37.64839, 750m to Universam
Stop Universam: 55.587655, 37.645687, 5600m to Rossoshanskaya ulitsa, 900m to Biryulyovo Tovarnaya
Stop Biryulyovo Tovarnaya: 55.592028, 37.653656, 1300m to Biryulyovo Passazhirskaya
Stop Biryulyovo Passazhirskaya: 55.580999, 37.659164, 1200m to Biryulyovo Zapadnoye
4
Bus 256
Bus 750
Bus 751
Stop Samara
";

    #[test]
    fn test_parse_base_lines() {
        let input = TextInput::parse(INPUT, RoutingSettings::default()).unwrap();

        assert_eq!(input.stops.len(), 8);
        assert_eq!(input.routes.len(), 2);

        let stop = &input.stops[3];
        assert_eq!(stop.name, "Biryulyovo Zapadnoye");
        assert_eq!(stop.latitude, 55.574371);
        assert_eq!(stop.road_distances["Rossoshanskaya ulitsa"], 7500);
        assert_eq!(stop.road_distances["Universam"], 2400);

        assert!(input.routes[0].is_roundtrip);
        assert_eq!(input.routes[0].stops.len(), 6);
        assert!(!input.routes[1].is_roundtrip);
        assert_eq!(
            input.routes[1].stops,
            vec!["Tolstopaltsevo", "Marushkino", "Rasskazovka"]
        );
    }

    #[test]
    fn test_parse_stat_lines() {
        let input = TextInput::parse(INPUT, RoutingSettings::default()).unwrap();

        assert_eq!(
            input.requests,
            vec![
                StatRequest::Bus {
                    id: 0,
                    name: "256".into()
                },
                StatRequest::Bus {
                    id: 1,
                    name: "750".into()
                },
                StatRequest::Bus {
                    id: 2,
                    name: "751".into()
                },
                StatRequest::Stop {
                    id: 3,
                    name: "Samara".into()
                },
            ]
        );
    }

    #[test]
    fn test_route_stat_line() {
        let request = parse_stat_line(1, "Route Biryusinka to Universam", 9).unwrap();

        assert_eq!(
            request,
            StatRequest::Route {
                id: 9,
                from: "Biryusinka".into(),
                to: "Universam".into()
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        let err = TextInput::parse("1\nStop Nowhere: north, 37.2\n", RoutingSettings::default())
            .unwrap_err();
        assert!(matches!(err, InputError::Parse { line: 2, .. }));

        let err = TextInput::parse("2\nStop A: 1, 2\n", RoutingSettings::default()).unwrap_err();
        assert!(matches!(err, InputError::Parse { .. }));

        let err = TextInput::parse("x\n", RoutingSettings::default()).unwrap_err();
        assert!(matches!(err, InputError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_significant() {
        assert_eq!(significant(1.361239), "1.36124");
        assert_eq!(significant(5950.0), "5950");
        assert_eq!(significant(0.5), "0.5");
        assert_eq!(significant(11.235), "11.235");
        assert_eq!(significant(0.0), "0");
        assert_eq!(significant(999999.0), "999999");
        assert_eq!(significant(1_000_000.0), "1e+06");
        assert_eq!(significant(1_234_567.0), "1.23457e+06");
        assert_eq!(significant(999_999.7), "1e+06");
        assert_eq!(significant(0.0001), "0.0001");
        assert_eq!(significant(0.00001234), "1.234e-05");
    }

    #[test]
    fn test_render() {
        let requests = [
            StatRequest::Bus {
                id: 0,
                name: "256".into(),
            },
            StatRequest::Stop {
                id: 1,
                name: "Prazhskaya".into(),
            },
            StatRequest::Stop {
                id: 2,
                name: "Biryulyovo Zapadnoye".into(),
            },
            StatRequest::Bus {
                id: 3,
                name: "751".into(),
            },
        ];
        let responses = [
            Response::Bus {
                request_id: 0,
                route_length: 5950,
                curvature: 1.361239,
                stop_count: 6,
                unique_stop_count: 5,
            },
            Response::Stop {
                request_id: 1,
                buses: vec![],
            },
            Response::Stop {
                request_id: 2,
                buses: vec!["256".into(), "828".into()],
            },
            Response::Error {
                request_id: 3,
                error_message: "not found".into(),
            },
        ];

        let mut out = Vec::new();
        write_responses(&mut out, &requests, &responses).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Bus 256: 6 stops on route, 5 unique stops, 5950 route length, 1.36124 curvature\n\
             Stop Prazhskaya: no buses\n\
             Stop Biryulyovo Zapadnoye: buses 256 828\n\
             Bus 751: not found\n"
        );
    }
}
