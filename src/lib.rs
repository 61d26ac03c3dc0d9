//! Bus network statistics and fastest itineraries.
//!
//! Stops and routes are loaded from a [`source::NetworkSource`], after which
//! the network is frozen into a [`responder::QueryResponder`] that answers stop,
//! route and itinerary queries.

pub mod data;
pub mod distance;
pub mod error;
pub mod format;
pub mod graph;
pub mod registry;
pub mod responder;
pub mod response;
pub mod router;
pub mod source;
