//! # Nyla
//!
//! Privacy focused pageview beacon for the Nyla web analytics service.
//!
//! This crate re-exports [`nyla_client`]; see [`Tracker`] for the entry point.

pub use nyla_client::*;
