use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::lawyers::{
        AvailabilityResponse, CreateLawyerRequest, LawyerList, LawyerStats,
        SetAvailabilityRequest, UpdateLawyerRequest,
    },
    error::AppResult,
    middleware::{
        auth::AuthUser,
        extract::{Path, Query},
        validate::ValidatedJson,
    },
    models::{Lawyer, LawyerDetail},
    response::ApiResponse,
    routes::params::{LawyerSearchQuery, Pagination},
    services::lawyer_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_lawyers).post(create_lawyer))
        .route("/search", get(search_lawyers))
        .route("/{id}", get(get_lawyer).put(update_lawyer))
        .route(
            "/{id}/availability",
            get(get_availability).post(set_availability),
        )
        .route("/{id}/stats", get(lawyer_stats))
}

#[utoipa::path(
    get,
    path = "/api/lawyers",
    params(Pagination),
    responses(
        (status = 200, description = "Active lawyers by rating", body = ApiResponse<LawyerList>)
    ),
    tag = "Lawyers"
)]
pub async fn list_lawyers(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<LawyerList>>> {
    let resp = lawyer_service::list_lawyers(&state, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/lawyers/search",
    params(LawyerSearchQuery),
    responses(
        (status = 200, description = "Filtered lawyers", body = ApiResponse<LawyerList>)
    ),
    tag = "Lawyers"
)]
pub async fn search_lawyers(
    State(state): State<AppState>,
    Query(query): Query<LawyerSearchQuery>,
) -> AppResult<Json<ApiResponse<LawyerList>>> {
    let resp = lawyer_service::search_lawyers(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/lawyers/{id}",
    params(("id" = i64, Path, description = "Lawyer ID")),
    responses(
        (status = 200, description = "Lawyer profile", body = ApiResponse<LawyerDetail>),
        (status = 404, description = "Lawyer not found")
    ),
    tag = "Lawyers"
)]
pub async fn get_lawyer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<LawyerDetail>>> {
    let resp = lawyer_service::get_lawyer(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/lawyers",
    request_body = CreateLawyerRequest,
    responses(
        (status = 201, description = "Lawyer profile created", body = ApiResponse<Lawyer>),
        (status = 400, description = "Validation failed or profile exists"),
        (status = 403, description = "Caller is not a lawyer")
    ),
    security(("bearer_auth" = [])),
    tag = "Lawyers"
)]
pub async fn create_lawyer(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateLawyerRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Lawyer>>)> {
    let resp = lawyer_service::create_lawyer_profile(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/lawyers/{id}",
    params(("id" = i64, Path, description = "Lawyer ID")),
    request_body = UpdateLawyerRequest,
    responses(
        (status = 200, description = "Lawyer profile updated", body = ApiResponse<Lawyer>),
        (status = 403, description = "Not the profile owner"),
        (status = 404, description = "Lawyer not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Lawyers"
)]
pub async fn update_lawyer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateLawyerRequest>,
) -> AppResult<Json<ApiResponse<Lawyer>>> {
    let resp = lawyer_service::update_lawyer_profile(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/lawyers/{id}/availability",
    params(("id" = i64, Path, description = "Lawyer ID")),
    responses(
        (status = 200, description = "Weekly availability", body = ApiResponse<AvailabilityResponse>),
        (status = 404, description = "Lawyer not found")
    ),
    tag = "Lawyers"
)]
pub async fn get_availability(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<AvailabilityResponse>>> {
    let resp = lawyer_service::get_availability(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/lawyers/{id}/availability",
    params(("id" = i64, Path, description = "Lawyer ID")),
    request_body = SetAvailabilityRequest,
    responses(
        (status = 200, description = "Availability replaced", body = ApiResponse<AvailabilityResponse>),
        (status = 403, description = "Not the profile owner")
    ),
    security(("bearer_auth" = [])),
    tag = "Lawyers"
)]
pub async fn set_availability(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<SetAvailabilityRequest>,
) -> AppResult<Json<ApiResponse<AvailabilityResponse>>> {
    let resp = lawyer_service::set_availability(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/lawyers/{id}/stats",
    params(("id" = i64, Path, description = "Lawyer ID")),
    responses(
        (status = 200, description = "Booking and review statistics", body = ApiResponse<LawyerStats>),
        (status = 404, description = "Lawyer not found")
    ),
    tag = "Lawyers"
)]
pub async fn lawyer_stats(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<LawyerStats>>> {
    let resp = lawyer_service::get_lawyer_stats(&state, id).await?;
    Ok(Json(resp))
}
