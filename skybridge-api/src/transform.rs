//! Remap of the inbound reservation payload into the downstream
//! CreateBooking wire format. Pure field lookup and reformatting; flight
//! identity is resolved upstream of this step.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use skybridge_shared::{Booking, Customer};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateBookingPayload {
    pub depart_flights: Vec<i64>,
    pub return_flights: Vec<i64>,
    pub passengers: Vec<PassengerPayload>,
    pub is_depart_first_class: bool,
    pub is_return_first_class: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PassengerPayload {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub gender: String,
    pub email: String,
    pub phone: String,
    pub document_number: String,
    pub document_type: String,
    pub document_expiry: String,
    pub document_country: String,
    pub weight: i64,
    pub bahamas_stay: String,
    pub address_street: String,
    pub address_city: String,
    pub address_state: String,
    #[serde(rename = "AddressZIPCode")]
    pub address_zip_code: String,
}

pub fn transform_booking(
    booking: &Booking,
    depart_flights: &[i64],
    return_flights: &[i64],
) -> CreateBookingPayload {
    let passengers = booking
        .customers
        .iter()
        .map(|customer| transform_passenger(customer, booking))
        .collect();

    CreateBookingPayload {
        depart_flights: depart_flights.to_vec(),
        return_flights: return_flights.to_vec(),
        passengers,
        is_depart_first_class: false,
        is_return_first_class: false,
    }
}

fn transform_passenger(customer: &Customer, booking: &Booking) -> PassengerPayload {
    let field = |name: &str| customer.custom_field_display(name).to_string();
    let booking_field = |name: &str| {
        booking
            .custom_field(name)
            .map(|f| f.value_or_empty().to_string())
            .unwrap_or_default()
    };

    let gender_display = field("Gender");
    let weight_display = field("Passenger Weight");
    let weight = weight_display.trim().parse::<i64>().unwrap_or(0);

    PassengerPayload {
        first_name: field("First Name"),
        last_name: field("Last Name"),
        date_of_birth: convert_date_format(&field("Date of Birth")),
        gender: if gender_display.contains("Male") { "M" } else { "F" }.to_string(),
        email: booking.contact_email().to_string(),
        phone: booking.contact_phone().to_string(),
        document_number: field("Passport Number"),
        // P for Passport
        document_type: "P".to_string(),
        document_expiry: convert_date_format(&field("Passport Expiration Date")),
        document_country: country_iso3(&field("Citizenship")),
        weight,
        bahamas_stay: "BSStay".to_string(),
        address_street: booking_field("Address Street"),
        address_city: booking_field("Address City"),
        address_state: booking_field("Address State"),
        address_zip_code: booking_field("Zip Code"),
    }
}

/// MM/DD/YYYY to YYYY-MM-DD; anything unparseable passes through as-is.
fn convert_date_format(date_str: &str) -> String {
    if date_str.is_empty() {
        return String::new();
    }
    match NaiveDate::parse_from_str(date_str, "%m/%d/%Y") {
        Ok(date) => date.format("%Y-%m-%d").to_string(),
        Err(_) => date_str.to_string(),
    }
}

/// Country name to ISO 3166-1 alpha-3. Covers the nationalities seen in
/// production traffic; unknown names pass through unchanged so the
/// downstream can decide what to do with them.
fn country_iso3(country_name: &str) -> String {
    let code = match country_name {
        "United States" | "United States of America" | "USA" => "USA",
        "Bahamas" | "The Bahamas" => "BHS",
        "Canada" => "CAN",
        "United Kingdom" | "Great Britain" => "GBR",
        "Germany" => "DEU",
        "France" => "FRA",
        "Italy" => "ITA",
        "Spain" => "ESP",
        "Sweden" => "SWE",
        "Norway" => "NOR",
        "Denmark" => "DNK",
        "Netherlands" => "NLD",
        "Switzerland" => "CHE",
        "Austria" => "AUT",
        "Belgium" => "BEL",
        "Ireland" => "IRL",
        "Australia" => "AUS",
        "New Zealand" => "NZL",
        "Mexico" => "MEX",
        "Brazil" => "BRA",
        "Argentina" => "ARG",
        "Japan" => "JPN",
        "China" => "CHN",
        "India" => "IND",
        "Jamaica" => "JAM",
        "Haiti" => "HTI",
        "Dominican Republic" => "DOM",
        "Cuba" => "CUB",
        "Trinidad and Tobago" => "TTO",
        "Barbados" => "BRB",
        _ => "",
    };

    if code.is_empty() {
        if !country_name.is_empty() {
            tracing::warn!(country_name, "country not found in ISO3 table, using original name");
        }
        country_name.to_string()
    } else {
        code.to_string()
    }
}
