use axum::{Router, routing::get};

use crate::state::AppState;

pub mod auth;
pub mod bookings;
pub mod doc;
pub mod health;
pub mod lawyers;
pub mod legal_info;
pub mod params;
pub mod reviews;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/auth", auth::router())
        .nest("/lawyers", lawyers::router())
        .nest("/bookings", bookings::router())
        .nest("/reviews", reviews::router())
        .nest("/legal-info", legal_info::router())
}
