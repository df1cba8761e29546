use serde::{Deserialize, Serialize};

/// Status text the service uses for a violation whose fine has been settled
pub const PAID_STATUS: &str = "Đã xử phạt";

/// Lookup response for one plate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationResult {
    /// Plate as echoed by the service
    #[serde(default)]
    pub license_plate: String,
    /// Vehicle type as echoed by the service, when it sends one
    #[serde(default)]
    pub vehicle_type: Option<String>,
    /// Recorded violations; absent means none
    #[serde(default)]
    pub violations: Vec<Violation>,
}

impl ViolationResult {
    /// Whether the plate has no recorded violations
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Number of violations still awaiting payment
    pub fn unpaid_count(&self) -> usize {
        self.violations.iter().filter(|v| !v.is_paid()).count()
    }
}

/// A single recorded traffic violation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// When the violation was recorded, as sent by the service
    #[serde(default)]
    pub violation_time: String,
    /// Where it happened
    #[serde(default)]
    pub violation_location: String,
    /// Described behavior
    #[serde(default)]
    pub violation_behavior: String,
    /// Issuing authority
    #[serde(default)]
    pub detection_unit: String,
    /// Offices where the violation can be resolved
    #[serde(default)]
    pub resolution_places: Vec<ResolutionPlace>,
    /// Processing status text
    #[serde(default)]
    pub status: String,
}

impl Violation {
    pub fn is_paid(&self) -> bool {
        self.status == PAID_STATUS
    }
}

/// Office where a violation can be resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionPlace {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
}
