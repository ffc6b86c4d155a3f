//! Time-normalized matching of a booking's (date, flight number) target
//! against the candidates returned by the upstream flight search.

use crate::search::FlightCandidate;
use chrono::{DateTime, FixedOffset, NaiveDate};

/// Bring the trailing timezone offset into RFC 3339 form before parsing.
/// Upstream timestamps arrive as `-0400`, `-04:00`, or `Z` interchangeably;
/// a formatting-only difference must never produce a false negative.
pub fn normalize_offset(timestamp: &str) -> String {
    let ts = timestamp.trim();
    if let Some(stripped) = ts.strip_suffix('Z') {
        return format!("{stripped}+00:00");
    }
    if ts.len() >= 5 && ts.is_char_boundary(ts.len() - 5) {
        let tail = &ts[ts.len() - 5..];
        let sign = tail.as_bytes()[0] as char;
        if (sign == '+' || sign == '-') && tail[1..].chars().all(|c| c.is_ascii_digit()) {
            return format!("{}:{}", &ts[..ts.len() - 2], &ts[ts.len() - 2..]);
        }
    }
    ts.to_string()
}

fn parse_calendar_date(timestamp: &str) -> Option<NaiveDate> {
    DateTime::<FixedOffset>::parse_from_rfc3339(&normalize_offset(timestamp))
        .ok()
        .map(|dt| dt.date_naive())
}

/// Find the identifier of the candidate whose calendar date (in its own
/// stated offset) and flight-number string both equal the target's.
///
/// Ties are resolved by list order: the first match wins, with no secondary
/// sort. Known limitation: two same-day departures sharing a flight number
/// cannot be told apart here. Candidates without a parseable date or without
/// an identifier are skipped, never fatal.
pub fn find_matching_flight(
    candidates: &[FlightCandidate],
    target_date: &str,
    target_flight_number: &str,
) -> Option<i64> {
    let target_day = match parse_calendar_date(target_date) {
        Some(day) => day,
        None => {
            tracing::warn!(target_date, "could not parse target flight date");
            return None;
        }
    };

    for candidate in candidates {
        let Some(date_str) = candidate.flight_date.as_deref() else {
            continue;
        };
        let Some(candidate_day) = parse_calendar_date(date_str) else {
            continue;
        };

        if candidate_day == target_day
            && candidate.flight_number.as_deref() == Some(target_flight_number)
        {
            match candidate.identifier {
                Some(id) => {
                    tracing::info!(
                        flight_identifier = id,
                        flight_date = date_str,
                        flight_number = target_flight_number,
                        "found matching flight"
                    );
                    return Some(id);
                }
                // Date and number line up but the record is unusable;
                // keep scanning.
                None => {
                    tracing::warn!(
                        flight_date = date_str,
                        flight_number = target_flight_number,
                        "matching flight has no identifier field"
                    );
                }
            }
        }
    }

    tracing::warn!(
        target_date,
        flight_number = target_flight_number,
        candidate_count = candidates.len(),
        "no matching flight found"
    );
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: Option<i64>, date: &str, number: &str) -> FlightCandidate {
        FlightCandidate {
            identifier: id,
            flight_date: Some(date.to_string()),
            flight_number: Some(number.to_string()),
        }
    }

    #[test]
    fn test_normalize_offset_variants() {
        assert_eq!(
            normalize_offset("2025-10-28T08:00:00-0400"),
            "2025-10-28T08:00:00-04:00"
        );
        assert_eq!(
            normalize_offset("2025-10-28T08:00:00-04:00"),
            "2025-10-28T08:00:00-04:00"
        );
        assert_eq!(
            normalize_offset("2025-10-28T08:00:00Z"),
            "2025-10-28T08:00:00+00:00"
        );
    }

    #[test]
    fn test_offset_formatting_does_not_break_match() {
        // Compact offset on the target, colon offset on the candidate:
        // same calendar day, must match.
        let candidates = vec![candidate(Some(1001), "2025-10-28T10:00:00-04:00", "517")];
        assert_eq!(
            find_matching_flight(&candidates, "2025-10-28T10:00:00-0400", "517"),
            Some(1001)
        );
    }

    #[test]
    fn test_first_match_wins_in_list_order() {
        let candidates = vec![
            candidate(Some(2001), "2025-10-28T08:00:00-04:00", "516"),
            candidate(Some(2002), "2025-10-28T12:00:00-04:00", "516"),
        ];
        assert_eq!(
            find_matching_flight(&candidates, "2025-10-28T08:00:00-0400", "516"),
            Some(2001)
        );
    }

    #[test]
    fn test_flight_number_compared_as_string() {
        // "0516" and "516" are different flight numbers, not numerically equal.
        let candidates = vec![candidate(Some(1), "2025-10-28T08:00:00-04:00", "0516")];
        assert_eq!(
            find_matching_flight(&candidates, "2025-10-28T08:00:00-0400", "516"),
            None
        );
    }

    #[test]
    fn test_missing_identifier_is_skipped_not_fatal() {
        let candidates = vec![
            candidate(None, "2025-10-28T08:00:00-04:00", "516"),
            candidate(Some(2002), "2025-10-28T12:00:00-04:00", "516"),
        ];
        assert_eq!(
            find_matching_flight(&candidates, "2025-10-28T08:00:00-0400", "516"),
            Some(2002)
        );
    }

    #[test]
    fn test_unparseable_candidate_date_is_skipped() {
        let candidates = vec![
            candidate(Some(1), "not-a-date", "516"),
            candidate(Some(2), "2025-10-28T08:00:00-0400", "516"),
        ];
        assert_eq!(
            find_matching_flight(&candidates, "2025-10-28T08:00:00-0400", "516"),
            Some(2)
        );
    }

    #[test]
    fn test_no_match_on_different_day() {
        let candidates = vec![candidate(Some(1), "2025-10-29T08:00:00-04:00", "516")];
        assert_eq!(
            find_matching_flight(&candidates, "2025-10-28T08:00:00-0400", "516"),
            None
        );
    }

    #[test]
    fn test_unparseable_target_yields_none() {
        let candidates = vec![candidate(Some(1), "2025-10-28T08:00:00-04:00", "516")];
        assert_eq!(find_matching_flight(&candidates, "garbage", "516"), None);
    }
}
