//! Flight-search request construction and response decoding for the
//! upstream one-way flight search.

use crate::extract::origin_destination;
use crate::matcher::normalize_offset;
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use skybridge_shared::Booking;

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("booking has no route text to extract airport codes from")]
    MissingRoute,

    #[error("could not extract airport codes from item name: {0}")]
    AirportCodes(String),

    #[error("booking has no start timestamp")]
    MissingStartAt,

    #[error("could not parse date from start_at: {0}")]
    Timestamp(String),
}

/// Search parameters derived once per booking from its route text and start
/// timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightQuery {
    pub date: NaiveDate,
    pub origin: String,
    pub destination: String,
    pub adult_count: u32,
    pub infant_count: u32,
}

impl FlightQuery {
    pub fn from_booking(booking: &Booking) -> Result<Self, QueryError> {
        let route = booking.route_name().ok_or(QueryError::MissingRoute)?;
        let (origin, destination) =
            origin_destination(route).ok_or_else(|| QueryError::AirportCodes(route.to_string()))?;

        let start_at = booking.start_at().ok_or(QueryError::MissingStartAt)?;
        let date = DateTime::<FixedOffset>::parse_from_rfc3339(&normalize_offset(start_at))
            .map_err(|_| QueryError::Timestamp(start_at.to_string()))?
            .date_naive();

        let mut adult_count = 0;
        let mut infant_count = 0;
        for customer in &booking.customers {
            match customer.type_singular() {
                Some("Infant") => infant_count += 1,
                _ => adult_count += 1,
            }
        }

        Ok(Self {
            date,
            origin,
            destination,
            // The downstream payload requires at least one adult
            adult_count: adult_count.max(1),
            infant_count,
        })
    }

    pub fn wire_payload(&self) -> FlightSearchPayload {
        let date = self.date.format("%Y-%m-%d").to_string();
        FlightSearchPayload {
            depart_date_start: date.clone(),
            depart_date_end: date,
            depart_origin: self.origin.clone(),
            depart_destination: self.destination.clone(),
            adult_count: self.adult_count,
            infant_count: self.infant_count,
            is_depart_first_class: false,
        }
    }
}

/// Wire shape of the one-way search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FlightSearchPayload {
    pub depart_date_start: String,
    pub depart_date_end: String,
    pub depart_origin: String,
    pub depart_destination: String,
    pub adult_count: u32,
    pub infant_count: u32,
    pub is_depart_first_class: bool,
}

/// One flight record from the search response. Request-scoped and read-only;
/// the upstream is loose about types, so identifier and flight number accept
/// both numeric and string encodings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct FlightCandidate {
    #[serde(
        rename = "FlightIdentifier",
        alias = "Identifier",
        alias = "Id",
        deserialize_with = "lenient_i64"
    )]
    pub identifier: Option<i64>,
    #[serde(rename = "FlightDate")]
    pub flight_date: Option<String>,
    #[serde(rename = "FlightNumber", deserialize_with = "lenient_string")]
    pub flight_number: Option<String>,
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}

const WRAPPER_KEYS: [&str; 3] = ["flights", "FlightList", "data"];

/// The search response body legally arrives as a bare list or as an object
/// wrapping the list under one of a few known keys. Anything else is an
/// unrecognized shape and feeds the resolver's fallback path.
#[derive(Debug)]
pub enum FlightListShape {
    Bare(Vec<FlightCandidate>),
    Wrapped {
        key: &'static str,
        flights: Vec<FlightCandidate>,
    },
    Unrecognized,
}

impl FlightListShape {
    pub fn decode(body: &Value) -> Self {
        match body {
            Value::Array(items) => Self::Bare(decode_candidates(items)),
            Value::Object(map) => {
                for key in WRAPPER_KEYS {
                    if let Some(Value::Array(items)) = map.get(key) {
                        let flights = decode_candidates(items);
                        if !flights.is_empty() {
                            return Self::Wrapped { key, flights };
                        }
                    }
                }
                Self::Unrecognized
            }
            _ => Self::Unrecognized,
        }
    }

    pub fn into_flights(self) -> Option<Vec<FlightCandidate>> {
        match self {
            Self::Bare(flights) | Self::Wrapped { flights, .. } => Some(flights),
            Self::Unrecognized => None,
        }
    }
}

fn decode_candidates(items: &[Value]) -> Vec<FlightCandidate> {
    items
        .iter()
        .filter_map(|item| serde_json::from_value(item.clone()).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn round_trip_leg() -> Booking {
        serde_json::from_value(json!({
            "availability": {
                "start_at": "2025-10-28T10:00:00-0400",
                "item": {
                    "pk": 81645,
                    "name": "South Andros (COX) → Fort Lauderdale Executive (FXE)"
                }
            },
            "customers": [
                {"customer_type_rate": {"customer_type": {"singular": "Adult"}}}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_query_from_booking() {
        let query = FlightQuery::from_booking(&round_trip_leg()).unwrap();
        assert_eq!(query.origin, "COX");
        assert_eq!(query.destination, "FXE");
        assert_eq!(query.date.to_string(), "2025-10-28");
        assert_eq!(query.adult_count, 1);
        assert_eq!(query.infant_count, 0);
    }

    #[test]
    fn test_query_fails_without_airport_codes() {
        let booking: Booking = serde_json::from_value(json!({
            "availability": {
                "start_at": "2025-10-28T10:00:00-0400",
                "item": {"name": "Scenic tour"}
            }
        }))
        .unwrap();
        assert!(matches!(
            FlightQuery::from_booking(&booking),
            Err(QueryError::AirportCodes(_))
        ));
    }

    #[test]
    fn test_query_fails_on_bad_timestamp() {
        let booking: Booking = serde_json::from_value(json!({
            "availability": {
                "start_at": "yesterday",
                "item": {"name": "South Andros (COX) → Fort Lauderdale Executive (FXE)"}
            }
        }))
        .unwrap();
        assert!(matches!(
            FlightQuery::from_booking(&booking),
            Err(QueryError::Timestamp(_))
        ));
    }

    #[test]
    fn test_wire_payload_field_names() {
        let payload = FlightQuery::from_booking(&round_trip_leg())
            .unwrap()
            .wire_payload();
        let value = serde_json::to_value(payload).unwrap();
        assert_eq!(value["DepartDateStart"], "2025-10-28");
        assert_eq!(value["DepartDateEnd"], "2025-10-28");
        assert_eq!(value["DepartOrigin"], "COX");
        assert_eq!(value["DepartDestination"], "FXE");
        assert_eq!(value["AdultCount"], 1);
        assert_eq!(value["IsDepartFirstClass"], false);
    }

    #[test]
    fn test_decode_bare_list() {
        let body = json!([
            {"FlightIdentifier": 1001, "FlightDate": "2025-10-28T10:00:00-04:00", "FlightNumber": "517"}
        ]);
        let flights = FlightListShape::decode(&body).into_flights().unwrap();
        assert_eq!(flights.len(), 1);
        assert_eq!(flights[0].identifier, Some(1001));
        assert_eq!(flights[0].flight_number.as_deref(), Some("517"));
    }

    #[test]
    fn test_decode_wrapped_variants() {
        for key in ["flights", "FlightList", "data"] {
            let body = json!({ key: [{"Id": "2001", "FlightNumber": 516}] });
            let flights = FlightListShape::decode(&body).into_flights().unwrap();
            assert_eq!(flights[0].identifier, Some(2001), "wrapper key {key}");
            assert_eq!(flights[0].flight_number.as_deref(), Some("516"));
        }
    }

    #[test]
    fn test_decode_unrecognized_shapes() {
        assert!(FlightListShape::decode(&json!("oops"))
            .into_flights()
            .is_none());
        assert!(FlightListShape::decode(&json!({"results": []}))
            .into_flights()
            .is_none());
    }
}
