use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Vehicle utilities shared by the history store and the lookup client
///
/// This module provides the vehicle type enumeration and license plate
/// normalization so that `"30a-12345"` and `" 30A-12345 "` refer to the
/// same vehicle everywhere.
/// Vehicle category a plate is registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    /// Passenger car
    #[default]
    Car,
    /// Motorcycle or scooter
    Motorcycle,
}

impl VehicleType {
    /// Stored and transmitted identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Car => "car",
            Self::Motorcycle => "motorcycle",
        }
    }

    /// Human readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Car => "Car",
            Self::Motorcycle => "Motorcycle",
        }
    }

    /// Filter to send to the lookup service for this vehicle type.
    ///
    /// The service's unfiltered query already covers cars, so only
    /// motorcycles carry an explicit filter.
    pub fn lookup_filter(&self) -> Option<VehicleType> {
        match self {
            Self::Car => None,
            Self::Motorcycle => Some(Self::Motorcycle),
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for VehicleType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "car" => Ok(Self::Car),
            "motorcycle" => Ok(Self::Motorcycle),
            _ => Err(anyhow!("Invalid vehicle type: {}", s)),
        }
    }
}

/// Normalize a license plate for comparison and storage
///
/// Surrounding whitespace is removed and letters are upper-cased.
pub fn normalize_plate(plate: &str) -> String {
    plate.trim().to_uppercase()
}
