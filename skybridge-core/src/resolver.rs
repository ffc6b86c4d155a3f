//! Flight-identifier resolution. Prefers an exact match from the upstream
//! flight search; degrades through custom-field extraction down to the
//! booking's internal item id. Resolution never fails the webhook flow.

use crate::clients::FlightSearchClient;
use crate::extract;
use crate::matcher::find_matching_flight;
use crate::search::{FlightListShape, FlightQuery};
use skybridge_shared::Booking;
use std::sync::Arc;

pub struct FlightResolver {
    search: Arc<dyn FlightSearchClient>,
}

impl FlightResolver {
    pub fn new(search: Arc<dyn FlightSearchClient>) -> Self {
        Self { search }
    }

    /// Resolve the flight identifiers for one booking.
    ///
    /// Fallback chain: search-and-match, then custom-field extraction, then
    /// the availability item pk. Always returns a usable (possibly empty)
    /// list; every failure along the chain degrades instead of erroring.
    pub async fn resolve(&self, booking: &Booking) -> Vec<i64> {
        let query = match FlightQuery::from_booking(booking) {
            Ok(query) => query,
            Err(err) => {
                tracing::warn!(error = %err, "could not build flight search query, using fallback");
                return extract::fallback_flight_ids(booking);
            }
        };
        tracing::debug!(?query, "built flight search query");

        let body = match self.search.search_flights(&query).await {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(error = %err, "flight search failed, using fallback");
                return extract::fallback_flight_ids(booking);
            }
        };

        let flights = match FlightListShape::decode(&body).into_flights() {
            Some(flights) if !flights.is_empty() => flights,
            Some(_) => {
                tracing::warn!("no flights found in search response, using fallback");
                return extract::fallback_flight_ids(booking);
            }
            None => {
                tracing::warn!("unexpected flight search response shape, using fallback");
                return extract::fallback_flight_ids(booking);
            }
        };

        let (flight_date, flight_number) = extract::flight_date_and_number(booking);
        let (Some(flight_date), Some(flight_number)) = (flight_date, flight_number) else {
            tracing::warn!("could not extract flight date or number from booking, using fallback");
            return extract::fallback_flight_ids(booking);
        };

        match find_matching_flight(&flights, &flight_date, &flight_number) {
            Some(identifier) => vec![identifier],
            None => {
                tracing::warn!(
                    %flight_date,
                    %flight_number,
                    "no matching flight identifier, using fallback"
                );
                extract::fallback_flight_ids(booking)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::SearchError;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    struct StubSearch {
        responses: Mutex<Vec<Result<Value, SearchError>>>,
        queries: Mutex<Vec<FlightQuery>>,
    }

    impl StubSearch {
        fn returning(response: Result<Value, SearchError>) -> Self {
            Self {
                responses: Mutex::new(vec![response]),
                queries: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl FlightSearchClient for StubSearch {
        async fn search_flights(&self, query: &FlightQuery) -> Result<Value, SearchError> {
            self.queries.lock().unwrap().push(query.clone());
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(SearchError::Transport("exhausted".into())))
        }
    }

    fn leg_booking() -> Booking {
        serde_json::from_value(json!({
            "availability": {
                "start_at": "2025-10-28T08:00:00-0400",
                "item": {
                    "pk": 80038,
                    "name": "Fort Lauderdale Executive (FXE) → South Andros (COX)"
                }
            },
            "custom_field_values": [
                {"name": "Flight Number 516", "value": "1589997", "display_value": "516"}
            ]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_resolves_identifier_from_search_match() {
        let search = Arc::new(StubSearch::returning(Ok(json!([
            {"FlightIdentifier": 2001, "FlightDate": "2025-10-28T08:00:00-04:00", "FlightNumber": "516"},
            {"FlightIdentifier": 2002, "FlightDate": "2025-10-28T12:00:00-04:00", "FlightNumber": "516"}
        ]))));
        let resolver = FlightResolver::new(search.clone());

        assert_eq!(resolver.resolve(&leg_booking()).await, vec![2001]);

        let queries = search.queries.lock().unwrap();
        assert_eq!(queries[0].origin, "FXE");
        assert_eq!(queries[0].destination, "COX");
    }

    #[tokio::test]
    async fn test_search_failure_falls_back_to_custom_fields() {
        let search = Arc::new(StubSearch::returning(Err(SearchError::Status {
            status: 503,
            body: "unavailable".into(),
        })));
        let resolver = FlightResolver::new(search);

        // Never raises, never empty when a usable fallback value exists
        assert_eq!(resolver.resolve(&leg_booking()).await, vec![516]);
    }

    #[tokio::test]
    async fn test_no_match_falls_back_to_custom_fields() {
        let search = Arc::new(StubSearch::returning(Ok(json!([
            {"FlightIdentifier": 9, "FlightDate": "2025-10-29T08:00:00-04:00", "FlightNumber": "516"}
        ]))));
        let resolver = FlightResolver::new(search);

        assert_eq!(resolver.resolve(&leg_booking()).await, vec![516]);
    }

    #[tokio::test]
    async fn test_unrecognized_shape_falls_back() {
        let search = Arc::new(StubSearch::returning(Ok(json!({"Message": "ok"}))));
        let resolver = FlightResolver::new(search);

        assert_eq!(resolver.resolve(&leg_booking()).await, vec![516]);
    }

    #[tokio::test]
    async fn test_unparseable_route_short_circuits_without_search() {
        let search = Arc::new(StubSearch::returning(Ok(json!([]))));
        let resolver = FlightResolver::new(search.clone());

        let booking: Booking = serde_json::from_value(json!({
            "availability": {
                "start_at": "2025-10-28T08:00:00-0400",
                "item": {"pk": 80038, "name": "Scenic tour"}
            }
        }))
        .unwrap();

        // Falls through to the item pk without calling the search API
        assert_eq!(resolver.resolve(&booking).await, vec![80038]);
        assert!(search.queries.lock().unwrap().is_empty());
    }
}
