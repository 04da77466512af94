//! # Nyla Transport
//!
//! This crate handles delivery of beacons to the collection endpoint.
//!
//! It defines the `Transport` trait for abstracting the delivery mechanism,
//! provides the `PixelTransport` (an HTTP GET for a tracking pixel) and the
//! in-memory `RecordingTransport`, and the `BeaconSet` that keeps track of
//! requests which have not settled yet.

pub mod error;
pub mod factory;
pub mod inflight;
#[cfg(feature = "pixel")]
pub mod pixel;
pub mod recording;
pub mod traits;

// Re-export key items
pub use error::TransportError;
pub use factory::create_transport;
pub use inflight::{BeaconId, BeaconSet};
#[cfg(feature = "pixel")]
pub use pixel::PixelTransport;
pub use recording::RecordingTransport;
pub use traits::Transport;
