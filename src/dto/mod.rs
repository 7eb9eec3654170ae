pub mod auth;
pub mod bookings;
pub mod lawyers;
pub mod legal_info;
pub mod reviews;
pub mod rules;
