//! Adapters between external document formats and the engine.
//!
//! Each reader implements [`NetworkSource`](crate::source::NetworkSource);
//! responses are written back either as JSON or as the line-oriented text
//! report.

pub mod csv;
pub mod json;
pub mod text;
