//! Input sources for the sensor bridge.
//!
//! Current input sources:
//! - `http`: JSON documents fetched from a sensor endpoint

pub mod http;
#[cfg(test)]
pub(crate) mod stub;

pub use http::{DocumentSource, HttpSource};
