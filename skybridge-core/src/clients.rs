//! Seams to the two external collaborators: the upstream flight search and
//! the downstream booking submission. Transport, retries, and payload
//! transformation live behind these traits.

use crate::search::FlightQuery;
use async_trait::async_trait;
use serde_json::Value;
use skybridge_shared::Booking;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("request timeout")]
    Timeout,

    #[error("request error: {0}")]
    Transport(String),

    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("request timeout")]
    Timeout,

    #[error("request error: {0}")]
    Transport(String),

    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Flight availability search against the upstream schedule API.
/// Implementations return the raw response body; shape handling is the
/// resolver's concern.
#[async_trait]
pub trait FlightSearchClient: Send + Sync {
    async fn search_flights(&self, query: &FlightQuery) -> Result<Value, SearchError>;
}

/// Transform-and-submit collaborator for the downstream booking system.
/// Takes the passenger-source booking plus the resolved depart/return
/// identifier lists and returns the downstream response body.
#[async_trait]
pub trait BookingForwarder: Send + Sync {
    async fn forward(
        &self,
        booking: &Booking,
        depart_flights: &[i64],
        return_flights: &[i64],
    ) -> Result<Value, EmitError>;
}
