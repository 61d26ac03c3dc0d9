use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use bus_router::error::InputError;
use bus_router::format::{csv::CsvInput, json, json::JsonInput, text, text::TextInput};
use bus_router::response::answer_all;
use bus_router::source::{NetworkSource, RoutingSettings};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(clap::Args, Debug, Clone, Copy)]
struct SettingsArgs {
    /// Minutes spent waiting at a stop before every boarding
    #[arg(long, default_value_t = 6.0)]
    wait_time: f64,
    /// Bus speed in km/h
    #[arg(long, default_value_t = 40.0)]
    velocity: f64,
}

impl From<SettingsArgs> for RoutingSettings {
    fn from(args: SettingsArgs) -> Self {
        RoutingSettings {
            bus_wait_time: args.wait_time,
            bus_velocity: args.velocity,
        }
    }
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Read a JSON document and print JSON responses
    Json {
        /// Input file, stdin if omitted
        input: Option<PathBuf>,
    },
    /// Read the line-oriented text format and print one line per request
    Text {
        /// Input file, stdin if omitted
        input: Option<PathBuf>,
        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// Read a directory of CSV tables and print JSON responses
    Csv {
        dir: PathBuf,
        #[command(flatten)]
        settings: SettingsArgs,
    },
}

fn open(input: Option<PathBuf>) -> Result<Box<dyn Read>, InputError> {
    Ok(match input {
        Some(path) => {
            info!("Reading {}", path.display());
            Box::new(File::open(path)?)
        }
        None => Box::new(io::stdin()),
    })
}

fn write_json<S: NetworkSource>(source: &S) -> Result<(), InputError> {
    let responses = answer_all(source)?;
    json::write_responses(io::stdout().lock(), &responses)
}

fn run(cmd: Command) -> Result<(), InputError> {
    match cmd {
        Command::Json { input } => {
            write_json(&JsonInput::from_reader(BufReader::new(open(input)?))?)
        }
        Command::Text { input, settings } => {
            let source = TextInput::from_reader(BufReader::new(open(input)?), settings.into())?;
            let responses = answer_all(&source)?;
            text::write_responses(io::stdout().lock(), &source.requests, &responses)
        }
        Command::Csv { dir, settings } => write_json(&CsvInput::from_dir(dir, settings.into())?),
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(args.cmd) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
