use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
};

use crate::{
    dto::bookings::{
        BookingList, CancelBookingRequest, CreateBookingRequest, RescheduleBookingRequest,
        UpdateBookingStatusRequest,
    },
    error::AppResult,
    middleware::{
        auth::AuthUser,
        extract::Path,
        validate::ValidatedJson,
    },
    models::{Booking, BookingDetail},
    response::ApiResponse,
    services::booking_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_booking))
        .route("/my-bookings", get(my_bookings))
        .route("/lawyer/{lawyer_id}", get(lawyer_bookings))
        .route("/{id}", get(get_booking))
        .route("/{id}/status", patch(update_status))
        .route("/{id}/cancel", patch(cancel_booking))
        .route("/{id}/complete", patch(complete_booking))
        .route("/{id}/reschedule", patch(reschedule_booking))
}

#[utoipa::path(
    post,
    path = "/api/bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created", body = ApiResponse<Booking>),
        (status = 400, description = "Validation failed or slot already booked"),
        (status = 404, description = "Lawyer not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn create_booking(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateBookingRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Booking>>)> {
    let resp = booking_service::create_booking(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/bookings/my-bookings",
    responses(
        (status = 200, description = "Caller's bookings", body = ApiResponse<BookingList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn my_bookings(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<BookingList>>> {
    let resp = booking_service::my_bookings(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/bookings/lawyer/{lawyer_id}",
    params(("lawyer_id" = i64, Path, description = "Lawyer ID")),
    responses(
        (status = 200, description = "Lawyer's bookings", body = ApiResponse<BookingList>),
        (status = 403, description = "Not this lawyer")
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn lawyer_bookings(
    State(state): State<AppState>,
    user: AuthUser,
    Path(lawyer_id): Path<i64>,
) -> AppResult<Json<ApiResponse<BookingList>>> {
    let resp = booking_service::lawyer_bookings(&state, &user, lawyer_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/bookings/{id}",
    params(("id" = i64, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking", body = ApiResponse<BookingDetail>),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Booking not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn get_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<BookingDetail>>> {
    let resp = booking_service::get_booking(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/bookings/{id}/status",
    params(("id" = i64, Path, description = "Booking ID")),
    request_body = UpdateBookingStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<Booking>),
        (status = 400, description = "Illegal status transition"),
        (status = 403, description = "Not the booked lawyer")
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn update_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateBookingStatusRequest>,
) -> AppResult<Json<ApiResponse<Booking>>> {
    let resp = booking_service::update_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/bookings/{id}/cancel",
    params(("id" = i64, Path, description = "Booking ID")),
    request_body(content = CancelBookingRequest, description = "Optional cancellation reason"),
    responses(
        (status = 200, description = "Booking cancelled", body = ApiResponse<Booking>),
        (status = 400, description = "Booking already completed or cancelled"),
        (status = 403, description = "Not a participant")
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn cancel_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    payload: Option<ValidatedJson<CancelBookingRequest>>,
) -> AppResult<Json<ApiResponse<Booking>>> {
    let payload = payload.map(|ValidatedJson(p)| p).unwrap_or_default();
    let resp = booking_service::cancel_booking(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/bookings/{id}/complete",
    params(("id" = i64, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking completed", body = ApiResponse<Booking>),
        (status = 403, description = "Not the booked lawyer")
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn complete_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Booking>>> {
    let resp = booking_service::complete_booking(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/bookings/{id}/reschedule",
    params(("id" = i64, Path, description = "Booking ID")),
    request_body = RescheduleBookingRequest,
    responses(
        (status = 200, description = "Booking rescheduled", body = ApiResponse<Booking>),
        (status = 400, description = "Slot taken or booking closed")
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn reschedule_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<RescheduleBookingRequest>,
) -> AppResult<Json<ApiResponse<Booking>>> {
    let resp = booking_service::reschedule_booking(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
