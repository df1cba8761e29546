/*!
 * # platecheck - Traffic violation lookup with search history
 *
 * A Rust library for querying a remote traffic violation service by license
 * plate and keeping an on-device history of the searches made.
 *
 * ## Features
 *
 * - Look up recorded violations for a car or motorcycle plate
 * - Remember every searched plate with a search count and last-search time
 * - List, delete and clear recent searches
 * - Probe the lookup service at startup
 * - Keep a local user profile
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `database`: SQLite persistence:
 *   - `database::connection`: Connection handling and schema initialization
 *   - `database::repository`: Search history store
 *   - `database::profiles`: Local user profiles
 * - `lookup`: Remote violation lookup:
 *   - `lookup::client`: HTTP client for the violation service
 *   - `lookup::models`: Violation result types
 * - `app_controller`: Main application controller
 * - `vehicle_utils`: Vehicle types and plate normalization
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod database;
pub mod errors;
pub mod lookup;
pub mod vehicle_utils;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, SearchOutcome, StartupReport};
pub use database::{DatabaseConnection, SearchHistoryEntry, SearchHistoryRepository};
pub use errors::{AppError, LookupError, StorageError};
pub use lookup::{LookupClient, ViolationLookup, ViolationResult};
pub use vehicle_utils::{VehicleType, normalize_plate};
