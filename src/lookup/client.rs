use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::{Client, StatusCode, header};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::ViolationLookup;
use super::models::ViolationResult;
use crate::app_config::ApiConfig;
use crate::errors::LookupError;
use crate::vehicle_utils::{VehicleType, normalize_plate};

/// Message the service returns from its liveness endpoint when healthy
pub const LIVENESS_MESSAGE: &str = "API is working";

/// Default wait for a violation lookup
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Default wait for the liveness probe
pub const DEFAULT_LIVENESS_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client for the traffic violation service
#[derive(Debug, Clone)]
pub struct LookupClient {
    /// Base URL of the service, without trailing slash
    base_url: String,
    /// Path of the violation search endpoint
    search_endpoint: String,
    /// Path of the liveness endpoint
    liveness_endpoint: String,
    /// Bounded wait for lookups
    lookup_timeout: Duration,
    /// Bounded wait for the liveness probe
    liveness_timeout: Duration,
    /// HTTP client for making requests
    client: Client,
}

/// Error body shape the service uses
#[derive(Debug, Deserialize)]
struct MessageBody {
    message: Option<String>,
}

impl LookupClient {
    /// Create a new client with the default timeouts
    pub fn new(
        base_url: impl Into<String>,
        search_endpoint: impl Into<String>,
        liveness_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            search_endpoint: search_endpoint.into(),
            liveness_endpoint: liveness_endpoint.into(),
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            liveness_timeout: DEFAULT_LIVENESS_TIMEOUT,
            client: Client::builder()
                .pool_idle_timeout(Duration::from_secs(90))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Create a client from the API section of the configuration
    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(
            config.base_url.clone(),
            config.search_endpoint.clone(),
            config.liveness_endpoint.clone(),
        )
        .with_timeouts(
            Duration::from_millis(config.timeout_ms),
            Duration::from_millis(config.liveness_timeout_ms),
        )
    }

    /// Override the lookup and liveness waits
    pub fn with_timeouts(mut self, lookup_timeout: Duration, liveness_timeout: Duration) -> Self {
        self.lookup_timeout = lookup_timeout;
        self.liveness_timeout = liveness_timeout;
        self
    }

    /// Base URL of the service
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the full URL for an endpoint path
    fn endpoint_url(&self, path: &str) -> Result<Url, LookupError> {
        let raw = if path.starts_with('/') || path.is_empty() {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        };

        Url::parse(&raw).map_err(|e| LookupError::InvalidEndpoint(format!("{}: {}", raw, e)))
    }

    /// Build the search URL with its query string
    pub fn search_url(
        &self,
        license_plate: &str,
        vehicle_type: Option<VehicleType>,
    ) -> Result<Url, LookupError> {
        let mut url = self.endpoint_url(&self.search_endpoint)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("licensePlate", &normalize_plate(license_plate));
            if let Some(vehicle_type) = vehicle_type {
                query.append_pair("vehicleType", vehicle_type.as_str());
            }
        }
        Ok(url)
    }

    /// Map a transport failure to its lookup failure kind
    fn classify_transport_error(&self, err: reqwest::Error, timeout: Duration) -> LookupError {
        if err.is_timeout() {
            LookupError::Timeout(timeout.as_millis() as u64)
        } else if err.is_connect() {
            LookupError::Unreachable(err.to_string())
        } else {
            LookupError::RequestFailed(err.to_string())
        }
    }

    /// Pick the most useful message out of an error response body
    fn error_message(status: StatusCode, body: &str) -> String {
        if let Ok(MessageBody { message: Some(message) }) = serde_json::from_str::<MessageBody>(body) {
            return message;
        }

        let body = body.trim();
        if !body.is_empty() {
            return body.chars().take(500).collect();
        }

        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    }

    async fn fetch_violations(
        &self,
        license_plate: &str,
        vehicle_type: Option<VehicleType>,
    ) -> Result<ViolationResult, LookupError> {
        let url = self.search_url(license_plate, vehicle_type)?;
        debug!("Lookup request URL: {}", url);

        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .timeout(self.lookup_timeout)
            .send()
            .await
            .map_err(|e| self.classify_transport_error(e, self.lookup_timeout))?;

        let status = response.status();
        debug!("Lookup response status: {}", status);

        let body = response
            .text()
            .await
            .map_err(|e| self.classify_transport_error(e, self.lookup_timeout))?;

        if !status.is_success() {
            return Err(LookupError::Http {
                status_code: status.as_u16(),
                message: Self::error_message(status, &body),
            });
        }

        serde_json::from_str::<ViolationResult>(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            LookupError::MalformedResponse(format!("{} (body starts with: {:?})", e, preview))
        })
    }

    async fn probe(&self) -> Result<bool, LookupError> {
        let url = self.endpoint_url(&self.liveness_endpoint)?;
        debug!("Testing lookup service connection to: {}", url);

        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .timeout(self.liveness_timeout)
            .send()
            .await
            .map_err(|e| self.classify_transport_error(e, self.liveness_timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Http {
                status_code: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown error").to_string(),
            });
        }

        let body: MessageBody = response
            .json()
            .await
            .map_err(|e| LookupError::MalformedResponse(e.to_string()))?;

        match body.message.as_deref() {
            Some(LIVENESS_MESSAGE) => Ok(true),
            other => {
                warn!("Unexpected liveness response message: {:?}", other);
                Ok(false)
            }
        }
    }
}

#[async_trait]
impl ViolationLookup for LookupClient {
    async fn lookup_violations(
        &self,
        license_plate: &str,
        vehicle_type: Option<VehicleType>,
    ) -> Result<ViolationResult, LookupError> {
        let result = self.fetch_violations(license_plate, vehicle_type).await;
        if let Err(e) = &result {
            error!("Violation lookup failed: {}", e);
        }
        result
    }

    async fn check_liveness(&self) -> bool {
        match self.probe().await {
            Ok(reachable) => reachable,
            Err(e) => {
                warn!("Lookup service liveness check failed: {}", e);
                false
            }
        }
    }
}
