//! # concierge
//!
//! Small deterministic helpers for an appointment desk and its chatbot.
//!
//! Appointment arithmetic is done on `chrono` instants with an injected
//! "now" and an injected calendar zone, and reports unparseable input as an
//! error instead of producing an invalid date. The chatbot helpers are total
//! regex transformations over the user's text.
//!
//! ## Modules
//!
//! - [`appointment`] — Day offsets, timestamp serialization, calendar decomposition, partial updates, ordering
//! - [`chatbot`] — Command detection, emoji placeholder removal, phone check, domain extraction, greeting
//! - [`error`] — Error types

pub mod appointment;
pub mod chatbot;
pub mod error;

pub use appointment::{
    create_appointment, create_appointment_from_now, get_appointment_details,
    get_appointment_details_in, get_appointment_timestamp, instant_from_millis, instant_to_millis,
    is_valid, is_valid_in, parse_timestamp_in, parse_timezone, time_between, time_between_in,
    update_appointment, update_appointment_in, AppointmentDetails, AppointmentUpdate,
};
pub use chatbot::{check_phone_number, get_url, is_valid_command, nice_to_meet_you, remove_emoji};
pub use error::ConciergeError;
