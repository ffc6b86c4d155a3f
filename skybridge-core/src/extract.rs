//! Free-text extraction from booking metadata: airport codes out of route
//! labels, flight numbers out of headlines and custom fields, and the
//! last-resort identifiers used when the search collaborator cannot help.

use regex::Regex;
use skybridge_shared::Booking;
use std::sync::LazyLock;

static AIRPORT_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([A-Z]{3})\)").expect("valid airport code pattern"));

static HEADLINE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*-\s*(\d+)$").expect("valid headline pattern"));

static TRAILING_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)$").expect("valid trailing digits pattern"));

static ANY_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid digits pattern"));

/// Pull the parenthesized 3-letter airport codes out of a route label, in
/// traversal order. `"South Andros (COX) → Fort Lauderdale Executive (FXE)"`
/// yields `("COX", "FXE")`.
pub fn origin_destination(route_name: &str) -> Option<(String, String)> {
    let mut codes = AIRPORT_CODE
        .captures_iter(route_name)
        .map(|c| c[1].to_string());
    let origin = codes.next()?;
    let destination = codes.next()?;
    Some((origin, destination))
}

/// The booking's own (date, flight number) target for matching against
/// search results. The date is the raw `start_at` string; the number is
/// preferred from the availability headline (`"N146WM - 516"` -> `"516"`),
/// then from booking-level custom fields.
pub fn flight_date_and_number(booking: &Booking) -> (Option<String>, Option<String>) {
    let date = booking.start_at().map(str::to_string);

    let number = booking
        .headline()
        .and_then(flight_number_from_headline)
        .or_else(|| flight_number_from_custom_fields(booking));

    if number.is_none() {
        tracing::warn!(
            headline = booking.headline().unwrap_or(""),
            "could not extract flight number from booking"
        );
    }

    (date, number)
}

fn flight_number_from_headline(headline: &str) -> Option<String> {
    if let Some(caps) = HEADLINE_SUFFIX.captures(headline) {
        return Some(caps[1].to_string());
    }
    TRAILING_DIGITS
        .captures(headline.trim())
        .map(|caps| caps[1].to_string())
}

/// Scan booking-level custom fields whose name mentions "Flight Number":
/// digits embedded in the field name win (`"Flight Number 516"` -> `"516"`),
/// then a purely numeric display value.
pub fn flight_number_from_custom_fields(booking: &Booking) -> Option<String> {
    for field in &booking.custom_field_values {
        if !field.name.contains("Flight Number") {
            continue;
        }
        if let Some(m) = ANY_DIGITS.find(&field.name) {
            return Some(m.as_str().to_string());
        }
        let display = field.display_or_empty().trim();
        if !display.is_empty() && display.chars().all(|c| c.is_ascii_digit()) {
            return Some(display.to_string());
        }
    }
    None
}

/// Last-resort identifiers when search-based resolution is unavailable:
/// numbers embedded in "Flight Number" custom fields (name first, then raw
/// value), falling back to the availability item's internal pk.
pub fn fallback_flight_ids(booking: &Booking) -> Vec<i64> {
    let mut flights = Vec::new();

    for field in &booking.custom_field_values {
        if !field.name.contains("Flight Number") {
            continue;
        }
        if let Some(m) = ANY_DIGITS.find(&field.name) {
            if let Ok(n) = m.as_str().parse::<i64>() {
                flights.push(n);
                continue;
            }
        }
        if let Ok(n) = field.value_or_empty().trim().parse::<i64>() {
            flights.push(n);
        }
    }

    if flights.is_empty() {
        if let Some(pk) = booking.item_pk() {
            flights.push(pk);
        }
    }

    flights
}

/// True when the two legs traverse the same pair of airports in opposite
/// directions. `None` when either route fails to parse.
pub fn routes_are_complementary(first_route: &str, second_route: &str) -> Option<bool> {
    let (a_origin, a_dest) = origin_destination(first_route)?;
    let (b_origin, b_dest) = origin_destination(second_route)?;
    Some(a_origin == b_dest && a_dest == b_origin)
}
