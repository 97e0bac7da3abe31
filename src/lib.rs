//! CO sensor bridge library.
//!
//! Polls HTTP sensor endpoints for carbon monoxide and smoke readings and
//! exposes them as smart-home accessory characteristics.

pub mod accessory;
pub mod bridge;
pub mod config;
pub mod error;
pub mod host;
pub mod input;
pub mod poller;
pub mod sensors;
