use log::{debug, info, warn};
use std::sync::Arc;

use crate::app_config::Config;
use crate::database::{
    DatabaseConnection, DatabaseStats, ProfileRepository, SearchHistoryEntry,
    SearchHistoryRepository, UserRecord,
};
use crate::errors::AppError;
use crate::lookup::{LookupClient, ViolationLookup, ViolationResult};
use crate::vehicle_utils::{VehicleType, normalize_plate};

// @module: Application controller wiring the store, the history and the lookup service

/// What the boot path found
#[derive(Debug, Clone)]
pub struct StartupReport {
    /// Recent searches to display; empty when the history could not be read
    pub recent: Vec<SearchHistoryEntry>,
    /// Result of the liveness probe
    pub api_reachable: bool,
}

/// Result of a successful search
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Violations returned by the service
    pub result: ViolationResult,
    /// History entry for the searched plate after recording
    pub entry: SearchHistoryEntry,
    /// Refreshed recent-search list
    pub recent: Vec<SearchHistoryEntry>,
}

/// Main application controller
///
/// Owns the single database handle and injects it into the repositories.
pub struct Controller {
    // @field: App configuration
    config: Config,
    db: DatabaseConnection,
    history: SearchHistoryRepository,
    profiles: ProfileRepository,
    lookup: Arc<dyn ViolationLookup>,
}

impl Controller {
    /// Open the configured store and build the HTTP lookup client
    ///
    /// Fails when the configuration is invalid or the store cannot be
    /// initialized; the application cannot run without either.
    pub fn new(config: Config) -> Result<Self, AppError> {
        config
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))?;

        let db = match &config.storage.database_path {
            Some(path) => DatabaseConnection::open(path)?,
            None => DatabaseConnection::open_default()?,
        };
        let lookup: Arc<dyn ViolationLookup> = Arc::new(LookupClient::from_config(&config.api));

        Ok(Self::with_parts(config, db, lookup))
    }

    // @method: Assemble a controller from already-built parts
    pub fn with_parts(
        config: Config,
        db: DatabaseConnection,
        lookup: Arc<dyn ViolationLookup>,
    ) -> Self {
        Self {
            history: SearchHistoryRepository::new(db.clone()),
            profiles: ProfileRepository::new(db.clone()),
            config,
            db,
            lookup,
        }
    }

    /// Current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Boot path: load the recent history and probe the lookup service
    pub async fn startup(&self) -> StartupReport {
        let recent = match self.recent_history().await {
            Ok(recent) => recent,
            Err(e) => {
                warn!("Failed to load search history: {}", e);
                Vec::new()
            }
        };

        debug!("Testing lookup service connection...");
        let api_reachable = self.lookup.check_liveness().await;
        if api_reachable {
            info!("Lookup service connection test successful.");
        } else {
            warn!("Lookup service connection test failed. Check the API base URL and that the server is running.");
        }

        StartupReport {
            recent,
            api_reachable,
        }
    }

    /// Look up a plate and, on success, record it in the history
    pub async fn search(
        &self,
        license_plate: &str,
        vehicle_type: VehicleType,
    ) -> Result<SearchOutcome, AppError> {
        let license_plate = normalize_plate(license_plate);
        if license_plate.is_empty() {
            return Err(AppError::Validation(
                "Please enter a license plate".to_string(),
            ));
        }

        info!("Searching violations for {} ({})", license_plate, vehicle_type);
        let result = self
            .lookup
            .lookup_violations(&license_plate, vehicle_type.lookup_filter())
            .await?;

        let entry = self
            .history
            .record_search(&license_plate, vehicle_type)
            .await?;
        // The lookup and the record succeeded; a failed refresh only empties the list
        let recent = match self.recent_history().await {
            Ok(recent) => recent,
            Err(e) => {
                warn!("Failed to reload search history: {}", e);
                Vec::new()
            }
        };

        info!(
            "Found {} violation(s) for {}",
            result.violations.len(),
            license_plate
        );

        Ok(SearchOutcome {
            result,
            entry,
            recent,
        })
    }

    /// Recent searches, limited by the configured count
    pub async fn recent_history(&self) -> Result<Vec<SearchHistoryEntry>, AppError> {
        self.recent_history_with_limit(self.config.history.recent_limit)
            .await
    }

    /// Recent searches with an explicit limit
    pub async fn recent_history_with_limit(
        &self,
        limit: usize,
    ) -> Result<Vec<SearchHistoryEntry>, AppError> {
        Ok(self.history.list_recent(limit).await?)
    }

    /// Remove one history entry; unknown ids are ignored
    pub async fn delete_history_entry(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.history.delete_entry(id).await?)
    }

    /// Remove the whole history
    pub async fn clear_history(&self) -> Result<usize, AppError> {
        Ok(self.history.clear_all().await?)
    }

    /// Probe the lookup service
    pub async fn check_liveness(&self) -> bool {
        self.lookup.check_liveness().await
    }

    /// Create a local profile and make it current
    pub async fn create_profile(&self, name: &str, email: Option<&str>) -> Result<i64, AppError> {
        Ok(self.profiles.create_user(name, email).await?)
    }

    /// The current local profile, if any
    pub async fn current_profile(&self) -> Result<Option<UserRecord>, AppError> {
        Ok(self.profiles.current_user().await?)
    }

    /// Store statistics
    pub fn stats(&self) -> Result<DatabaseStats, AppError> {
        Ok(self.db.stats()?)
    }
}
