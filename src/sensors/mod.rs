//! Sensor value extraction and evaluation.
//!
//! Pure helpers shared by every accessory: dotted-path lookup with float
//! coercion, and threshold comparison.

pub mod path;
pub mod threshold;

pub use path::{DottedPath, coerce_number};
pub use threshold::{Thresholds, exceeds, exceeds_opt};
