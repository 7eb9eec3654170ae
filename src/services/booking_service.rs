use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::{FromRow, PgExecutor};

use crate::{
    audit,
    db::is_unique_violation,
    dto::{
        bookings::{
            BookingList, CancelBookingRequest, CreateBookingRequest, RescheduleBookingRequest,
            UpdateBookingStatusRequest,
        },
        rules::slot_start,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Booking, BookingDetail, BookingStatus},
    response::{ApiResponse, Meta},
    services::lawyer_service::fetch_lawyer,
    state::AppState,
};

const SLOT_TAKEN: &str = "This time slot is already booked";

const BOOKING_COLUMNS: &str = "b.id, b.client_id, b.lawyer_id, b.booking_date, b.time_slot, \
     b.date_time, b.case_type, b.description, b.urgency, b.status, b.consultation_fee, \
     b.cancellation_reason, b.created_at, b.updated_at";

fn booking_detail_select() -> String {
    format!(
        r#"
        SELECT {BOOKING_COLUMNS},
               c.name AS client_name, c.email AS client_email, c.phone AS client_phone,
               lu.name AS lawyer_name, lu.email AS lawyer_email, lu.phone AS lawyer_phone,
               l.specialization
        FROM bookings b
        JOIN users c ON c.id = b.client_id
        JOIN lawyers l ON l.id = b.lawyer_id
        JOIN users lu ON lu.id = l.user_id
        "#
    )
}

/// Who may act on a booking, and in which state it is.
#[derive(Debug, FromRow)]
struct BookingAccess {
    id: i64,
    client_id: i64,
    lawyer_id: i64,
    lawyer_user_id: i64,
    status: String,
}

impl BookingAccess {
    fn is_client(&self, user: &AuthUser) -> bool {
        self.client_id == user.user_id
    }

    fn is_lawyer(&self, user: &AuthUser) -> bool {
        self.lawyer_user_id == user.user_id
    }

    fn status(&self) -> AppResult<BookingStatus> {
        BookingStatus::parse(&self.status).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("unknown booking status {}", self.status))
        })
    }
}

/// True when an active (non-cancelled) booking already holds the exact
/// `(lawyer_id, date, time_slot)` tuple, ignoring `exclude_booking`.
///
/// Availability and past dates are not considered; this is purely a collision check.
pub async fn slot_is_taken<'e, E>(
    executor: E,
    lawyer_id: i64,
    date: NaiveDate,
    time_slot: &str,
    exclude_booking: Option<i64>,
) -> AppResult<bool>
where
    E: PgExecutor<'e>,
{
    let (taken,): (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM bookings
            WHERE lawyer_id = $1
              AND booking_date = $2
              AND time_slot = $3
              AND status <> 'cancelled'
              AND ($4::bigint IS NULL OR id <> $4)
        )
        "#,
    )
    .bind(lawyer_id)
    .bind(date)
    .bind(time_slot)
    .bind(exclude_booking)
    .fetch_one(executor)
    .await?;

    Ok(taken)
}

/// Date plus the start of the slot label; midnight when the label has no readable time.
pub fn compose_date_time(date: NaiveDate, time_slot: &str) -> NaiveDateTime {
    date.and_time(slot_start(time_slot).unwrap_or(NaiveTime::MIN))
}

fn slot_conflict(err: sqlx::Error) -> AppError {
    if is_unique_violation(&err) {
        AppError::Conflict(SLOT_TAKEN.into())
    } else {
        err.into()
    }
}

pub async fn create_booking(
    state: &AppState,
    user: &AuthUser,
    payload: CreateBookingRequest,
) -> AppResult<ApiResponse<Booking>> {
    let lawyer = fetch_lawyer(&state.pool, payload.lawyer_id).await?;
    let time_slot = payload.time_slot.trim().to_string();

    if slot_is_taken(&state.pool, lawyer.id, payload.date, &time_slot, None).await? {
        return Err(AppError::Conflict(SLOT_TAKEN.into()));
    }

    let date_time = payload
        .date_time
        .unwrap_or_else(|| compose_date_time(payload.date, &time_slot));
    let urgency = payload.urgency.unwrap_or_default();

    // The partial unique index settles races the check above cannot see.
    let booking: Booking = sqlx::query_as(&format!(
        r#"
        INSERT INTO bookings AS b (
            client_id, lawyer_id, booking_date, time_slot, date_time,
            case_type, description, urgency, consultation_fee
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {BOOKING_COLUMNS}
        "#
    ))
    .bind(user.user_id)
    .bind(lawyer.id)
    .bind(payload.date)
    .bind(time_slot.as_str())
    .bind(date_time)
    .bind(payload.case_type.trim())
    .bind(payload.description)
    .bind(urgency.as_str())
    .bind(lawyer.consultation_fee)
    .fetch_one(&state.pool)
    .await
    .map_err(slot_conflict)?;

    sqlx::query("UPDATE lawyers SET total_bookings = total_bookings + 1 WHERE id = $1")
        .bind(lawyer.id)
        .execute(&state.pool)
        .await?;

    tracing::info!(
        booking_id = booking.id,
        lawyer_id = lawyer.id,
        client_id = user.user_id,
        date = %booking.booking_date,
        time_slot = %booking.time_slot,
        "booking created"
    );
    audit::record(
        &state.pool,
        Some(user.user_id),
        "booking_create",
        "bookings",
        serde_json::json!({ "booking_id": booking.id, "lawyer_id": lawyer.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Booking created successfully",
        booking,
        Some(Meta::empty()),
    ))
}

pub async fn my_bookings(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<BookingList>> {
    let items = sqlx::query_as::<_, BookingDetail>(&format!(
        "{} WHERE b.client_id = $1 ORDER BY b.date_time DESC, b.id DESC",
        booking_detail_select()
    ))
    .bind(user.user_id)
    .fetch_all(&state.pool)
    .await?;

    let meta = Meta::count(items.len());
    Ok(ApiResponse::success("Bookings", BookingList { items }, Some(meta)))
}

pub async fn lawyer_bookings(
    state: &AppState,
    user: &AuthUser,
    lawyer_id: i64,
) -> AppResult<ApiResponse<BookingList>> {
    let lawyer = fetch_lawyer(&state.pool, lawyer_id).await?;
    if lawyer.user_id != user.user_id && !user.is_admin() {
        return Err(AppError::Forbidden(
            "Not authorized to view these bookings".into(),
        ));
    }

    let items = sqlx::query_as::<_, BookingDetail>(&format!(
        "{} WHERE b.lawyer_id = $1 ORDER BY b.date_time DESC, b.id DESC",
        booking_detail_select()
    ))
    .bind(lawyer_id)
    .fetch_all(&state.pool)
    .await?;

    let meta = Meta::count(items.len());
    Ok(ApiResponse::success("Bookings", BookingList { items }, Some(meta)))
}

pub async fn get_booking(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<BookingDetail>> {
    let access = fetch_access(state, id).await?;
    if !access.is_client(user) && !access.is_lawyer(user) && !user.is_admin() {
        return Err(AppError::Forbidden(
            "Not authorized to view this booking".into(),
        ));
    }

    let booking = sqlx::query_as::<_, BookingDetail>(&format!(
        "{} WHERE b.id = $1",
        booking_detail_select()
    ))
    .bind(id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::not_found("Booking"))?;

    Ok(ApiResponse::success("Booking", booking, None))
}

pub async fn update_status(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: UpdateBookingStatusRequest,
) -> AppResult<ApiResponse<Booking>> {
    let access = fetch_access(state, id).await?;
    if !access.is_lawyer(user) && !user.is_admin() {
        return Err(AppError::Forbidden(
            "Only the booked lawyer can change the status".into(),
        ));
    }

    let booking = transition(state, user, &access, payload.status, None).await?;
    Ok(ApiResponse::success(
        "Booking status updated successfully",
        booking,
        None,
    ))
}

pub async fn cancel_booking(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: CancelBookingRequest,
) -> AppResult<ApiResponse<Booking>> {
    let access = fetch_access(state, id).await?;
    if !access.is_client(user) && !access.is_lawyer(user) && !user.is_admin() {
        return Err(AppError::Forbidden(
            "Not authorized to cancel this booking".into(),
        ));
    }

    let reason = payload
        .reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());
    let booking = transition(state, user, &access, BookingStatus::Cancelled, reason).await?;
    Ok(ApiResponse::success(
        "Booking cancelled successfully",
        booking,
        None,
    ))
}

pub async fn complete_booking(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<Booking>> {
    let access = fetch_access(state, id).await?;
    if !access.is_lawyer(user) && !user.is_admin() {
        return Err(AppError::Forbidden(
            "Only the booked lawyer can complete a booking".into(),
        ));
    }

    let booking = transition(state, user, &access, BookingStatus::Completed, None).await?;
    Ok(ApiResponse::success(
        "Booking marked as completed",
        booking,
        None,
    ))
}

pub async fn reschedule_booking(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: RescheduleBookingRequest,
) -> AppResult<ApiResponse<Booking>> {
    let access = fetch_access(state, id).await?;
    if !access.is_client(user) && !access.is_lawyer(user) && !user.is_admin() {
        return Err(AppError::Forbidden(
            "Not authorized to reschedule this booking".into(),
        ));
    }
    let current = access.status()?;
    if matches!(current, BookingStatus::Completed | BookingStatus::Cancelled) {
        return Err(AppError::BadRequest(format!(
            "Cannot reschedule a {} booking",
            current.as_str()
        )));
    }

    let time_slot = payload.time_slot.trim().to_string();
    if slot_is_taken(
        &state.pool,
        access.lawyer_id,
        payload.date,
        &time_slot,
        Some(access.id),
    )
    .await?
    {
        return Err(AppError::Conflict("New time slot is already booked".into()));
    }

    let date_time = payload
        .date_time
        .unwrap_or_else(|| compose_date_time(payload.date, &time_slot));

    let booking: Booking = sqlx::query_as(&format!(
        r#"
        UPDATE bookings AS b
        SET booking_date = $2, time_slot = $3, date_time = $4, updated_at = now()
        WHERE b.id = $1
        RETURNING {BOOKING_COLUMNS}
        "#
    ))
    .bind(access.id)
    .bind(payload.date)
    .bind(time_slot.as_str())
    .bind(date_time)
    .fetch_one(&state.pool)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            AppError::Conflict("New time slot is already booked".into())
        } else {
            err.into()
        }
    })?;

    tracing::info!(booking_id = booking.id, date = %booking.booking_date, time_slot = %booking.time_slot, "booking rescheduled");
    audit::record(
        &state.pool,
        Some(user.user_id),
        "booking_reschedule",
        "bookings",
        serde_json::json!({ "booking_id": booking.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Booking rescheduled successfully",
        booking,
        None,
    ))
}

/// Move a booking to `next`, guarded by the status that was read.
async fn transition(
    state: &AppState,
    user: &AuthUser,
    access: &BookingAccess,
    next: BookingStatus,
    cancellation_reason: Option<String>,
) -> AppResult<Booking> {
    let current = access.status()?;
    if !current.can_transition_to(next) {
        return Err(AppError::BadRequest(format!(
            "Cannot change booking status from {} to {}",
            current.as_str(),
            next.as_str()
        )));
    }

    let booking: Option<Booking> = sqlx::query_as(&format!(
        r#"
        UPDATE bookings AS b
        SET status = $3,
            cancellation_reason = COALESCE($4, b.cancellation_reason),
            updated_at = now()
        WHERE b.id = $1 AND b.status = $2
        RETURNING {BOOKING_COLUMNS}
        "#
    ))
    .bind(access.id)
    .bind(current.as_str())
    .bind(next.as_str())
    .bind(cancellation_reason)
    .fetch_optional(&state.pool)
    .await
    .map_err(slot_conflict)?;

    let booking = booking.ok_or_else(|| {
        AppError::Conflict("Booking was modified by another request, please retry".into())
    })?;

    tracing::info!(
        booking_id = booking.id,
        from = current.as_str(),
        to = next.as_str(),
        "booking status changed"
    );
    audit::record(
        &state.pool,
        Some(user.user_id),
        "booking_status",
        "bookings",
        serde_json::json!({
            "booking_id": booking.id,
            "from": current.as_str(),
            "to": next.as_str(),
        }),
    )
    .await;

    Ok(booking)
}

async fn fetch_access(state: &AppState, id: i64) -> AppResult<BookingAccess> {
    sqlx::query_as::<_, BookingAccess>(
        r#"
        SELECT b.id, b.client_id, b.lawyer_id, l.user_id AS lawyer_user_id, b.status
        FROM bookings b
        JOIN lawyers l ON l.id = b.lawyer_id
        WHERE b.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::not_found("Booking"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_time_uses_slot_start() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(
            compose_date_time(date, "10:00"),
            date.and_hms_opt(10, 0, 0).unwrap()
        );
        assert_eq!(
            compose_date_time(date, "14:30-15:30"),
            date.and_hms_opt(14, 30, 0).unwrap()
        );
    }

    #[test]
    fn unreadable_slot_falls_back_to_midnight() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(
            compose_date_time(date, "afternoon"),
            date.and_hms_opt(0, 0, 0).unwrap()
        );
    }
}
