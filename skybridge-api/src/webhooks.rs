use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use chrono::Utc;
use serde_json::{json, Value};
use skybridge_core::{HandleError, Outcome};
use skybridge_shared::Booking;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/integrations/fareharbor/webhooks/bookings",
        post(receive_booking_webhook),
    )
}

/// POST /integrations/fareharbor/webhooks/bookings
///
/// Receive a reservation webhook and forward the normalized booking
/// downstream. The sender only needs an acknowledgement: every outcome,
/// including processing failures, is answered 200 with a message body so
/// the upstream does not blindly re-deliver.
async fn receive_booking_webhook(State(state): State<AppState>, body: Bytes) -> Json<Value> {
    let webhook: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(error = %err, "webhook body is not valid JSON");
            return ack("Webhook received but no booking data found");
        }
    };

    let Some(booking_value) = webhook.get("booking") else {
        tracing::info!("no booking data found in webhook");
        return ack("Webhook received but no booking data found");
    };

    let booking: Booking = match serde_json::from_value(booking_value.clone()) {
        Ok(booking) => booking,
        Err(err) => {
            tracing::error!(error = %err, "could not decode booking payload");
            return ack_error("Booking received but processing failed", &err.to_string());
        }
    };

    match state.coordinator.handle_booking(booking).await {
        Ok(Outcome::StoredPending { order_id }) => ack(&format!(
            "Round trip booking received and stored for order {order_id}. Waiting for second booking."
        )),
        Ok(Outcome::CombinedAndEmitted { response, .. }) => Json(json!({
            "message": "Round trip booking processed and sent to MakerSuite successfully!",
            "timestamp": Utc::now().to_rfc3339(),
            "makersuite_response": response,
        })),
        Ok(Outcome::Emitted { response }) => Json(json!({
            "message": "Single trip booking processed and sent to MakerSuite successfully!",
            "timestamp": Utc::now().to_rfc3339(),
            "makersuite_response": response,
        })),
        Err(HandleError::EmitFailed { order_id: Some(_), source }) => ack_error(
            "Round trip booking received but failed to send to MakerSuite",
            &source.to_string(),
        ),
        Err(HandleError::EmitFailed { order_id: None, source }) => ack_error(
            "Single trip booking received but failed to send to MakerSuite",
            &source.to_string(),
        ),
        Err(err @ HandleError::StorageConsistency(_)) => {
            tracing::error!(error = %err, "round trip storage inconsistency");
            ack_error("Booking received but processing failed", &err.to_string())
        }
    }
}

fn ack(message: &str) -> Json<Value> {
    Json(json!({
        "message": message,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

fn ack_error(message: &str, error: &str) -> Json<Value> {
    Json(json!({
        "message": message,
        "timestamp": Utc::now().to_rfc3339(),
        "error": error,
    }))
}
