//! Round-trip correlation: hold the first leg of an order until its
//! counterpart webhook arrives, then pair, assign directions, and emit one
//! combined booking downstream.

use crate::clients::{BookingForwarder, EmitError};
use crate::extract;
use crate::pending::PendingStore;
use crate::resolver::FlightResolver;
use chrono::{Duration, Utc};
use serde_json::Value;
use skybridge_shared::Booking;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Which leg the first-arriving webhook of a pair represents. This is an
/// external contract with the upstream sender, not something inferred from
/// booking content; it is carried as an explicit parameter so a change in
/// the sender's ordering is a one-line config change, not a silent breakage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstArrivalRole {
    /// The sender delivers the return leg first (current contract).
    Return,
    /// The sender delivers the depart leg first.
    Depart,
}

impl FirstArrivalRole {
    /// Split (first-arrival, second-arrival) identifier lists into
    /// (depart, return).
    fn assign(self, first: Vec<i64>, second: Vec<i64>) -> (Vec<i64>, Vec<i64>) {
        match self {
            FirstArrivalRole::Return => (second, first),
            FirstArrivalRole::Depart => (first, second),
        }
    }
}

#[derive(Debug)]
pub enum Outcome {
    /// First leg of a round trip stored; waiting for its counterpart.
    StoredPending { order_id: String },
    /// Single-leg booking forwarded downstream.
    Emitted { response: Value },
    /// Both legs paired, combined, and forwarded downstream.
    CombinedAndEmitted { order_id: String, response: Value },
}

#[derive(Debug, thiserror::Error)]
pub enum HandleError {
    /// Downstream submission failed. Reported to the caller, never retried
    /// here: by this point the pending entry is already evicted, so the
    /// sender must re-submit both legs from scratch.
    #[error("failed to send booking downstream: {source}")]
    EmitFailed {
        order_id: Option<String>,
        #[source]
        source: EmitError,
    },

    /// An entry the coordinator just observed is gone at combine time.
    #[error("booking storage error: {0}")]
    StorageConsistency(String),
}

pub struct Coordinator {
    store: Mutex<PendingStore>,
    resolver: FlightResolver,
    forwarder: Arc<dyn BookingForwarder>,
    pending_ttl: Duration,
    first_arrival_role: FirstArrivalRole,
}

impl Coordinator {
    pub fn new(
        resolver: FlightResolver,
        forwarder: Arc<dyn BookingForwarder>,
        pending_ttl: Duration,
        first_arrival_role: FirstArrivalRole,
    ) -> Self {
        Self {
            store: Mutex::new(PendingStore::new()),
            resolver,
            forwarder,
            pending_ttl,
            first_arrival_role,
        }
    }

    /// Handle one incoming booking webhook. Bookings carrying an order
    /// display id participate in round-trip pairing; everything else is
    /// forwarded immediately as a single leg.
    pub async fn handle_booking(&self, booking: Booking) -> Result<Outcome, HandleError> {
        match booking.order_display_id().map(str::to_string) {
            Some(order_id) => self.handle_round_trip(order_id, booking).await,
            None => self.handle_single_leg(booking).await,
        }
    }

    async fn handle_single_leg(&self, booking: Booking) -> Result<Outcome, HandleError> {
        tracing::info!("processing single trip booking");
        let depart_flights = self.resolver.resolve(&booking).await;

        match self.forwarder.forward(&booking, &depart_flights, &[]).await {
            Ok(response) => Ok(Outcome::Emitted { response }),
            Err(source) => Err(HandleError::EmitFailed {
                order_id: None,
                source,
            }),
        }
    }

    /// The whole check-pending / decide / mutate sequence runs under one
    /// lock acquisition, so two overlapping webhooks for the same order can
    /// never both take the store-and-wait branch.
    async fn handle_round_trip(
        &self,
        order_id: String,
        booking: Booking,
    ) -> Result<Outcome, HandleError> {
        tracing::info!(order_id = %order_id, "processing round trip booking");

        let mut store = self.store.lock().await;
        store.sweep(Utc::now(), self.pending_ttl);

        if !store.has(&order_id) {
            tracing::info!(order_id = %order_id, "first booking for order, storing and waiting");
            let flights = self.resolver.resolve(&booking).await;
            store.put(order_id.clone(), booking, flights);
            return Ok(Outcome::StoredPending { order_id });
        }

        tracing::info!(order_id = %order_id, "found existing booking for order, combining legs");
        let existing = store.get(&order_id).cloned().ok_or_else(|| {
            HandleError::StorageConsistency(format!(
                "pending booking for order {order_id} missing at combine time"
            ))
        })?;

        // Re-resolve the stored leg so both legs come from one resolution
        // pass; the search results it was resolved against are not
        // reproducible byte-for-byte later.
        let existing_flights = self.resolver.resolve(&existing.booking).await;
        let current_flights = self.resolver.resolve(&booking).await;

        if let (Some(first_route), Some(second_route)) =
            (existing.booking.route_name(), booking.route_name())
        {
            if extract::routes_are_complementary(first_route, second_route) == Some(false) {
                tracing::warn!(
                    order_id = %order_id,
                    first_route,
                    second_route,
                    "paired legs are not opposite-direction routes"
                );
            }
        }

        let (depart_flights, return_flights) = self
            .first_arrival_role
            .assign(existing_flights, current_flights);

        // Evict before emit: a failed submission must not leave a pair that
        // re-triggers on the sender's retry.
        store.remove(&order_id);
        drop(store);

        // Both legs carry identical passenger data; the stored one is the
        // deterministic choice of base payload.
        let base = existing.booking;

        match self
            .forwarder
            .forward(&base, &depart_flights, &return_flights)
            .await
        {
            Ok(response) => {
                tracing::info!(order_id = %order_id, "combined round trip sent downstream");
                Ok(Outcome::CombinedAndEmitted { order_id, response })
            }
            Err(source) => Err(HandleError::EmitFailed {
                order_id: Some(order_id),
                source,
            }),
        }
    }

    /// Whether a pending leg exists for the given order id.
    pub async fn has_pending(&self, order_id: &str) -> bool {
        self.store.lock().await.has(order_id)
    }
}
