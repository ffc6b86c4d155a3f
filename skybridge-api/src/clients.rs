//! HTTP clients for the two upstream collaborators. Both endpoints live on
//! the same MakerSuite-family base URL and authenticate with an ApiKey
//! header; any non-success status or transport failure surfaces as a soft
//! error for the caller's fallback handling.

use crate::app_config::UpstreamConfig;
use crate::transform;
use async_trait::async_trait;
use serde_json::Value;
use skybridge_core::{BookingForwarder, EmitError, FlightQuery, FlightSearchClient, SearchError};
use skybridge_shared::Booking;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct MakerSuiteClient {
    http: reqwest::Client,
    base_url: String,
    booking_endpoint: String,
    flight_search_endpoint: String,
    api_key: String,
}

impl MakerSuiteClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            booking_endpoint: config.booking_endpoint.clone(),
            flight_search_endpoint: config.flight_search_endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }

    async fn post_json(&self, endpoint: &str, payload: &Value) -> Result<reqwest::Response, reqwest::Error> {
        let url = format!("{}{}", self.base_url, endpoint);
        self.http
            .post(&url)
            .header("ApiKey", &self.api_key)
            .header("Accept", "application/json")
            .json(payload)
            .send()
            .await
    }

    /// Submit a transformed booking to the downstream CreateBooking API.
    pub async fn create_booking(&self, payload: &Value) -> Result<Value, EmitError> {
        tracing::debug!(endpoint = %self.booking_endpoint, "sending booking downstream");

        let response = self
            .post_json(&self.booking_endpoint, payload)
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    EmitError::Timeout
                } else {
                    EmitError::Transport(err.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| EmitError::Transport(err.to_string()))?;
        tracing::debug!(status = %status, %body, "downstream booking response");

        if !status.is_success() {
            return Err(EmitError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|err| EmitError::Transport(err.to_string()))
    }
}

#[async_trait]
impl FlightSearchClient for MakerSuiteClient {
    async fn search_flights(&self, query: &FlightQuery) -> Result<Value, SearchError> {
        let payload = serde_json::to_value(query.wire_payload())
            .map_err(|err| SearchError::Transport(err.to_string()))?;
        tracing::debug!(endpoint = %self.flight_search_endpoint, ?payload, "flight search request");

        let response = self
            .post_json(&self.flight_search_endpoint, &payload)
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    SearchError::Timeout
                } else {
                    SearchError::Transport(err.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| SearchError::Transport(err.to_string()))?;
        tracing::debug!(status = %status, %body, "flight search response");

        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|err| SearchError::Transport(err.to_string()))
    }
}

/// Transform-and-emit collaborator handed to the coordinator: remaps the
/// chosen base booking into the downstream wire format and posts it.
pub struct MakerSuiteForwarder {
    client: Arc<MakerSuiteClient>,
}

impl MakerSuiteForwarder {
    pub fn new(client: Arc<MakerSuiteClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BookingForwarder for MakerSuiteForwarder {
    async fn forward(
        &self,
        booking: &Booking,
        depart_flights: &[i64],
        return_flights: &[i64],
    ) -> Result<Value, EmitError> {
        let payload = transform::transform_booking(booking, depart_flights, return_flights);
        let payload = serde_json::to_value(payload)
            .map_err(|err| EmitError::Transport(err.to_string()))?;
        self.client.create_booking(&payload).await
    }
}
