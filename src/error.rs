use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    #[error("No such Stop {stop:?}")]
    UnknownStop { stop: String },

    #[error("Route {route:?} is registered twice")]
    DuplicateRoute { route: String },

    #[error("No road distance between {from:?} and {to:?} in either direction")]
    MissingDistance { from: String, to: String },

    #[error("Route {route:?} needs at least two stops, got {count}")]
    InvalidRoute { route: String, count: usize },

    #[error("Wait time must be at least 0 and velocity above 0, got {wait_time} min and {velocity} m/min")]
    InvalidTiming { wait_time: f64, velocity: f64 },

    #[error("The route registry has already been finalized")]
    AlreadyFinalized,

    #[error("The route registry must be finalized before derived data is read")]
    NotFinalized,
}

#[derive(Error, Debug)]
pub enum InputError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("Line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    Network(#[from] NetworkError),
}

pub type Result<T, E = NetworkError> = std::result::Result<T, E>;
