//! Host-side characteristic model.
//!
//! The smart-home host sees an accessory as a set of services, each holding
//! typed characteristics. Accessories push new values through an
//! [`UpdatePusher`] and answer reads through their get-handlers.

pub mod characteristic_store;

pub use characteristic_store::{CharacteristicStore, ReportedValue};

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use strum::Display;

/// Service types an accessory can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
pub enum ServiceKind {
    AccessoryInformation,
    CarbonMonoxideSensor,
    SmokeSensor,
}

/// Characteristics used by the sensor accessories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
pub enum Characteristic {
    Name,
    Manufacturer,
    Model,
    SerialNumber,
    CarbonMonoxideDetected,
    CarbonMonoxideLevel,
    SmokeDetected,
}

/// A characteristic value as handed to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CharacteristicValue {
    Bool(bool),
    /// NaN serializes as JSON `null`.
    Float(f64),
    Text(String),
    Null,
}

impl CharacteristicValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Equality that treats two NaN floats as the same reported value.
    pub fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Float(a), Self::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            _ => self == other,
        }
    }
}

impl From<bool> for CharacteristicValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for CharacteristicValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Option<f64>> for CharacteristicValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Null, Self::Float)
    }
}

impl fmt::Display for CharacteristicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
            Self::Null => f.write_str("null"),
        }
    }
}

/// One characteristic value produced by a poll cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub service: ServiceKind,
    pub characteristic: Characteristic,
    pub value: CharacteristicValue,
}

impl Reading {
    pub fn new(
        service: ServiceKind,
        characteristic: Characteristic,
        value: impl Into<CharacteristicValue>,
    ) -> Self {
        Self {
            service,
            characteristic,
            value: value.into(),
        }
    }
}

/// A service as reported by `services()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceDescriptor {
    pub kind: ServiceKind,
    pub display_name: String,
    pub characteristics: Vec<Characteristic>,
}

/// Callback registered by the host to receive characteristic updates.
pub type UpdatePusher = Arc<dyn Fn(&Reading) + Send + Sync>;
