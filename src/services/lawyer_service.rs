use std::collections::BTreeMap;

use sqlx::{Postgres, QueryBuilder, types::Json};

use crate::{
    audit,
    db::{DbPool, contains_pattern, is_unique_violation},
    dto::lawyers::{
        AvailabilityResponse, CreateLawyerRequest, LawyerList, LawyerStats,
        SetAvailabilityRequest, UpdateLawyerRequest,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_any_role, ensure_role},
    models::{AvailabilitySlot, Lawyer, LawyerDetail, Role},
    response::{ApiResponse, Meta},
    routes::params::{LawyerSearchQuery, Pagination},
    state::AppState,
};

const LAWYER_COLUMNS: &str = "l.id, l.user_id, l.specialization, l.bar_council_number, \
     l.experience, l.education, l.about, l.consultation_fee, l.languages, l.location, \
     l.practice_areas, l.rating, l.total_reviews, l.total_bookings, l.created_at";

const LAWYER_FROM: &str = " FROM lawyers l JOIN users u ON u.id = l.user_id";

fn lawyer_detail_select() -> String {
    format!("SELECT {LAWYER_COLUMNS}, u.name, u.email, u.phone, u.profile_image{LAWYER_FROM}")
}

pub async fn list_lawyers(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<LawyerList>> {
    let query = LawyerSearchQuery {
        page: pagination.page,
        per_page: pagination.per_page,
        ..Default::default()
    };
    search_lawyers(state, query).await
}

pub async fn search_lawyers(
    state: &AppState,
    query: LawyerSearchQuery,
) -> AppResult<ApiResponse<LawyerList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let mut builder = QueryBuilder::<Postgres>::new(lawyer_detail_select());
    push_search_filters(&mut builder, &query);
    builder.push(" ORDER BY ");
    builder.push(query.sort_by.unwrap_or_default().as_sql());
    builder.push(" LIMIT ");
    builder.push_bind(limit);
    builder.push(" OFFSET ");
    builder.push_bind(offset);
    let items: Vec<LawyerDetail> = builder.build_query_as().fetch_all(&state.pool).await?;

    let mut count = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*){LAWYER_FROM}"));
    push_search_filters(&mut count, &query);
    let total: (i64,) = count.build_query_as().fetch_one(&state.pool).await?;

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success("Lawyers", LawyerList { items }, Some(meta)))
}

fn push_search_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &LawyerSearchQuery) {
    builder.push(" WHERE u.is_active = TRUE");
    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = contains_pattern(search.trim());
        builder.push(" AND (u.name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR l.specialization ILIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }
    if let Some(specialization) = query.specialization.as_deref().filter(|s| !s.is_empty()) {
        builder.push(" AND l.specialization = ");
        builder.push_bind(specialization.to_string());
    }
    if let Some(location) = query.location.as_deref().filter(|s| !s.trim().is_empty()) {
        builder.push(" AND l.location ILIKE ");
        builder.push_bind(contains_pattern(location.trim()));
    }
    if let Some(min_rating) = query.min_rating {
        builder.push(" AND l.rating >= ");
        builder.push_bind(min_rating);
    }
    if let Some(max_fee) = query.max_fee {
        builder.push(" AND l.consultation_fee <= ");
        builder.push_bind(max_fee);
    }
}

pub async fn get_lawyer(state: &AppState, id: i64) -> AppResult<ApiResponse<LawyerDetail>> {
    let lawyer = sqlx::query_as::<_, LawyerDetail>(&format!(
        "{} WHERE l.id = $1",
        lawyer_detail_select()
    ))
    .bind(id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::not_found("Lawyer"))?;

    Ok(ApiResponse::success("Lawyer", lawyer, None))
}

pub async fn create_lawyer_profile(
    state: &AppState,
    user: &AuthUser,
    payload: CreateLawyerRequest,
) -> AppResult<ApiResponse<Lawyer>> {
    ensure_role(user, Role::Lawyer)?;

    let exist: Option<(i64,)> = sqlx::query_as("SELECT id FROM lawyers WHERE user_id = $1")
        .bind(user.user_id)
        .fetch_optional(&state.pool)
        .await?;
    if exist.is_some() {
        return Err(AppError::Conflict("Lawyer profile already exists".into()));
    }

    let lawyer: Lawyer = sqlx::query_as(&format!(
        r#"
        INSERT INTO lawyers AS l (
            user_id, specialization, bar_council_number, experience, education,
            about, consultation_fee, languages, location, practice_areas
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING {LAWYER_COLUMNS}
        "#
    ))
    .bind(user.user_id)
    .bind(payload.specialization.trim())
    .bind(payload.bar_council_number.trim())
    .bind(payload.experience)
    .bind(payload.education)
    .bind(payload.about)
    .bind(payload.consultation_fee)
    .bind(payload.languages)
    .bind(payload.location)
    .bind(Json(payload.practice_areas))
    .fetch_one(&state.pool)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            AppError::Conflict("Lawyer profile already exists".into())
        } else {
            err.into()
        }
    })?;

    tracing::info!(lawyer_id = lawyer.id, user_id = user.user_id, "lawyer profile created");
    audit::record(
        &state.pool,
        Some(user.user_id),
        "lawyer_profile_create",
        "lawyers",
        serde_json::json!({ "lawyer_id": lawyer.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Lawyer profile created successfully",
        lawyer,
        Some(Meta::empty()),
    ))
}

pub async fn update_lawyer_profile(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: UpdateLawyerRequest,
) -> AppResult<ApiResponse<Lawyer>> {
    ensure_any_role(user, &[Role::Lawyer, Role::Admin])?;

    let existing = fetch_lawyer(&state.pool, id).await?;
    ensure_owner_or_admin(user, existing.user_id)?;

    let specialization = payload
        .specialization
        .map(|s| s.trim().to_string())
        .unwrap_or(existing.specialization);
    let bar_council_number = payload
        .bar_council_number
        .map(|s| s.trim().to_string())
        .unwrap_or(existing.bar_council_number);
    let experience = payload.experience.unwrap_or(existing.experience);
    let education = payload.education.or(existing.education);
    let about = payload.about.or(existing.about);
    let consultation_fee = payload.consultation_fee.unwrap_or(existing.consultation_fee);
    let languages = payload.languages.or(existing.languages);
    let location = payload.location.or(existing.location);
    let practice_areas = payload
        .practice_areas
        .map(Json)
        .unwrap_or(existing.practice_areas);

    let lawyer: Lawyer = sqlx::query_as(&format!(
        r#"
        UPDATE lawyers AS l
        SET specialization = $2, bar_council_number = $3, experience = $4, education = $5,
            about = $6, consultation_fee = $7, languages = $8, location = $9,
            practice_areas = $10, updated_at = now()
        WHERE l.id = $1
        RETURNING {LAWYER_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(specialization)
    .bind(bar_council_number)
    .bind(experience)
    .bind(education)
    .bind(about)
    .bind(consultation_fee)
    .bind(languages)
    .bind(location)
    .bind(practice_areas)
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Lawyer profile updated successfully",
        lawyer,
        Some(Meta::empty()),
    ))
}

/// Replace the lawyer's weekly schedule wholesale.
pub async fn set_availability(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: SetAvailabilityRequest,
) -> AppResult<ApiResponse<AvailabilityResponse>> {
    ensure_any_role(user, &[Role::Lawyer, Role::Admin])?;
    let lawyer = fetch_lawyer(&state.pool, id).await?;
    ensure_owner_or_admin(user, lawyer.user_id)?;

    let mut tx = state.pool.begin().await?;
    sqlx::query("DELETE FROM availability WHERE lawyer_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let mut inserted = 0usize;
    for (day, slots) in merge_days(&payload.availability) {
        for slot in slots {
            sqlx::query(
                "INSERT INTO availability (lawyer_id, day_of_week, time_slot) VALUES ($1, $2, $3)",
            )
            .bind(id)
            .bind(day.as_str())
            .bind(slot)
            .execute(&mut *tx)
            .await?;
            inserted += 1;
        }
    }
    tx.commit().await?;

    tracing::info!(lawyer_id = id, slots = inserted, "availability replaced");

    let availability = load_availability(&state.pool, id).await?;
    Ok(ApiResponse::success(
        "Availability updated successfully",
        availability,
        None,
    ))
}

pub async fn get_availability(
    state: &AppState,
    id: i64,
) -> AppResult<ApiResponse<AvailabilityResponse>> {
    fetch_lawyer(&state.pool, id).await?;
    let availability = load_availability(&state.pool, id).await?;
    Ok(ApiResponse::success("Availability", availability, None))
}

async fn load_availability(pool: &DbPool, lawyer_id: i64) -> AppResult<AvailabilityResponse> {
    let slots = sqlx::query_as::<_, AvailabilitySlot>(
        r#"
        SELECT day_of_week, time_slot
        FROM availability
        WHERE lawyer_id = $1 AND is_available = TRUE
        ORDER BY id
        "#,
    )
    .bind(lawyer_id)
    .fetch_all(pool)
    .await?;

    Ok(group_by_day(slots))
}

/// Fold day names case-insensitively and drop repeated slots within a day.
fn merge_days(week: &BTreeMap<String, Vec<String>>) -> BTreeMap<String, Vec<String>> {
    let mut merged: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (day, slots) in week {
        let entry = merged.entry(day.to_lowercase()).or_default();
        for slot in slots {
            let slot = slot.trim().to_string();
            if !entry.contains(&slot) {
                entry.push(slot);
            }
        }
    }
    merged
}

fn group_by_day(slots: Vec<AvailabilitySlot>) -> AvailabilityResponse {
    let mut availability: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for slot in &slots {
        availability
            .entry(slot.day_of_week.clone())
            .or_default()
            .push(slot.time_slot.clone());
    }
    AvailabilityResponse {
        availability,
        slots,
    }
}

pub async fn get_lawyer_stats(state: &AppState, id: i64) -> AppResult<ApiResponse<LawyerStats>> {
    let lawyer = fetch_lawyer(&state.pool, id).await?;

    let by_status: Vec<(String, i64)> = sqlx::query_as(
        "SELECT status, COUNT(*) FROM bookings WHERE lawyer_id = $1 GROUP BY status",
    )
    .bind(id)
    .fetch_all(&state.pool)
    .await?;

    let (total_clients,): (i64,) =
        sqlx::query_as("SELECT COUNT(DISTINCT client_id) FROM bookings WHERE lawyer_id = $1")
            .bind(id)
            .fetch_one(&state.pool)
            .await?;

    let (monthly_earnings,): (i64,) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(consultation_fee), 0)::bigint
        FROM bookings
        WHERE lawyer_id = $1
          AND status = 'completed'
          AND date_trunc('month', date_time) = date_trunc('month', now()::timestamp)
        "#,
    )
    .bind(id)
    .fetch_one(&state.pool)
    .await?;

    let mut stats = tally_statuses(&by_status);
    stats.total_clients = total_clients;
    stats.monthly_earnings = monthly_earnings;
    stats.average_rating = lawyer.rating;
    stats.total_reviews = lawyer.total_reviews;

    Ok(ApiResponse::success("Lawyer stats", stats, None))
}

fn tally_statuses(rows: &[(String, i64)]) -> LawyerStats {
    let mut stats = LawyerStats::default();
    for (status, count) in rows {
        stats.total_bookings += count;
        match status.as_str() {
            "pending" => stats.pending_bookings = *count,
            "confirmed" => stats.confirmed_bookings = *count,
            "completed" => stats.completed_bookings = *count,
            "cancelled" => stats.cancelled_bookings = *count,
            _ => {}
        }
    }
    stats
}

pub(crate) async fn fetch_lawyer(pool: &DbPool, id: i64) -> AppResult<Lawyer> {
    sqlx::query_as::<_, Lawyer>(&format!("SELECT {LAWYER_COLUMNS} FROM lawyers l WHERE l.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("Lawyer"))
}

fn ensure_owner_or_admin(user: &AuthUser, owner_id: i64) -> AppResult<()> {
    if user.user_id != owner_id && !user.is_admin() {
        return Err(AppError::Forbidden(
            "Not authorized to manage this lawyer profile".into(),
        ));
    }
    Ok(())
}
