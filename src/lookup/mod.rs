/*!
 * Remote violation lookup.
 *
 * This module contains the interface the application uses to query the
 * traffic violation service, the parsed response types, and the HTTP client
 * implementation:
 * - `client`: reqwest-based client with explicit timeouts
 * - `models`: violation result types as returned by the service
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::LookupError;
use crate::vehicle_utils::VehicleType;

pub mod client;
pub mod models;

pub use client::LookupClient;
pub use models::{ResolutionPlace, Violation, ViolationResult};

/// Common trait for violation lookup backends
///
/// The application depends on this trait rather than on the HTTP client so the
/// search flow can run against a stub in tests.
#[async_trait]
pub trait ViolationLookup: Send + Sync + Debug {
    /// Query the recorded violations for a plate
    ///
    /// # Arguments
    /// * `license_plate` - Plate to look up; normalized before sending
    /// * `vehicle_type` - Optional vehicle-type filter
    ///
    /// # Returns
    /// * `Result<ViolationResult, LookupError>` - Zero or more violations, or a typed failure
    async fn lookup_violations(
        &self,
        license_plate: &str,
        vehicle_type: Option<VehicleType>,
    ) -> Result<ViolationResult, LookupError>;

    /// Best-effort reachability probe; failures read as "not reachable"
    async fn check_liveness(&self) -> bool;
}
