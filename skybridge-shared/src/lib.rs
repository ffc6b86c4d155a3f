pub mod booking;

pub use booking::{
    Availability, AvailabilityItem, Booking, Contact, CustomFieldValue, Customer, CustomerType,
    CustomerTypeRate, OrderRef, WebhookEnvelope,
};
