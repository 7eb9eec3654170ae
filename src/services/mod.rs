pub mod auth_service;
pub mod booking_service;
pub mod credential_service;
pub mod lawyer_service;
pub mod legal_info_service;
pub mod review_service;
