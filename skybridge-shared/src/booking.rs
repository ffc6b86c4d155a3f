use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outer webhook body. FareHarbor posts `{ "booking": { ... } }`; anything
/// else is acknowledged without processing.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WebhookEnvelope {
    pub booking: Option<Booking>,
}

/// Inbound reservation payload. Fields are decoded leniently: the sender's
/// schema drifts, and everything we do not recognize must not fail the hook.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Booking {
    pub pk: Option<i64>,
    pub uuid: Option<Uuid>,
    pub order: Option<OrderRef>,
    pub availability: Option<Availability>,
    pub customers: Vec<Customer>,
    pub contact: Option<Contact>,
    pub custom_field_values: Vec<CustomFieldValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OrderRef {
    pub display_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Availability {
    pub pk: Option<i64>,
    /// Departure timestamp as sent, e.g. `2025-10-28T08:00:00-0400`. The
    /// offset format is not reliable; callers normalize before parsing.
    pub start_at: Option<String>,
    pub end_at: Option<String>,
    /// Short label like `N146WM - 516` (tail number, flight number).
    pub headline: Option<String>,
    pub item: Option<AvailabilityItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AvailabilityItem {
    pub pk: Option<i64>,
    /// Route text, e.g. `Fort Lauderdale Executive (FXE) → South Andros (COX)`.
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Customer {
    pub pk: Option<i64>,
    pub custom_field_values: Vec<CustomFieldValue>,
    pub customer_type_rate: Option<CustomerTypeRate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CustomerTypeRate {
    pub customer_type: Option<CustomerType>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CustomerType {
    pub singular: Option<String>,
    pub plural: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Contact {
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CustomFieldValue {
    pub name: String,
    pub value: Option<String>,
    pub display_value: Option<String>,
}

impl Booking {
    /// Round trips arrive as two webhooks sharing an order display id.
    pub fn is_round_trip(&self) -> bool {
        self.order_display_id().is_some()
    }

    pub fn order_display_id(&self) -> Option<&str> {
        self.order.as_ref()?.display_id.as_deref()
    }

    pub fn start_at(&self) -> Option<&str> {
        self.availability.as_ref()?.start_at.as_deref()
    }

    pub fn headline(&self) -> Option<&str> {
        self.availability.as_ref()?.headline.as_deref()
    }

    pub fn route_name(&self) -> Option<&str> {
        self.availability.as_ref()?.item.as_ref()?.name.as_deref()
    }

    pub fn item_pk(&self) -> Option<i64> {
        self.availability.as_ref()?.item.as_ref()?.pk
    }

    /// Booking-level custom field by exact name.
    pub fn custom_field(&self, name: &str) -> Option<&CustomFieldValue> {
        self.custom_field_values.iter().find(|f| f.name == name)
    }

    pub fn contact_email(&self) -> &str {
        self.contact
            .as_ref()
            .and_then(|c| c.email.as_deref())
            .unwrap_or("")
    }

    pub fn contact_phone(&self) -> &str {
        self.contact
            .as_ref()
            .and_then(|c| c.phone.as_deref())
            .unwrap_or("")
    }
}

impl Customer {
    pub fn custom_field_display(&self, name: &str) -> &str {
        self.custom_field_values
            .iter()
            .find(|f| f.name == name)
            .and_then(|f| f.display_value.as_deref())
            .unwrap_or("")
    }

    pub fn type_singular(&self) -> Option<&str> {
        self.customer_type_rate
            .as_ref()?
            .customer_type
            .as_ref()?
            .singular
            .as_deref()
    }
}

impl CustomFieldValue {
    pub fn value_or_empty(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }

    pub fn display_or_empty(&self) -> &str {
        self.display_value.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_detection() {
        let booking: Booking = serde_json::from_str(
            r#"{"pk": 914502, "order": {"display_id": "BUJP"}}"#,
        )
        .expect("Failed to deserialize");
        assert!(booking.is_round_trip());
        assert_eq!(booking.order_display_id(), Some("BUJP"));
    }

    #[test]
    fn test_single_leg_has_no_order_id() {
        let booking: Booking =
            serde_json::from_str(r#"{"pk": 914502, "order": null}"#).unwrap();
        assert!(!booking.is_round_trip());

        let booking: Booking =
            serde_json::from_str(r#"{"pk": 914502, "order": {}}"#).unwrap();
        assert!(!booking.is_round_trip());
    }

    #[test]
    fn test_lenient_decoding_ignores_unknown_fields() {
        let booking: Booking = serde_json::from_str(
            r#"{
                "pk": 1,
                "voucher_number": "V-1",
                "availability": {
                    "pk": 77380742,
                    "start_at": "2025-10-28T08:00:00-0400",
                    "item": {"pk": 80038, "name": "Fort Lauderdale Executive (FXE) → South Andros (COX)"}
                }
            }"#,
        )
        .unwrap();
        assert_eq!(booking.start_at(), Some("2025-10-28T08:00:00-0400"));
        assert_eq!(booking.item_pk(), Some(80038));
    }
}
