use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};

use crate::{
    dto::reviews::{CreateReviewRequest, LawyerReviewList, MyReviewList, UpdateReviewRequest},
    error::AppResult,
    middleware::{
        auth::AuthUser,
        extract::{Path, Query},
        validate::ValidatedJson,
    },
    models::{LawyerRating, Review},
    response::ApiResponse,
    routes::params::Pagination,
    services::review_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_review))
        .route("/my-reviews", get(my_reviews))
        .route("/lawyer/{lawyer_id}", get(lawyer_reviews))
        .route("/lawyer/{lawyer_id}/rating", get(lawyer_rating))
        .route("/{id}", put(update_review).delete(delete_review))
}

#[utoipa::path(
    post,
    path = "/api/reviews",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ApiResponse<Review>),
        (status = 400, description = "Booking not completed or already reviewed"),
        (status = 404, description = "Booking not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn create_review(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateReviewRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Review>>)> {
    let resp = review_service::create_review(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/reviews/lawyer/{lawyer_id}",
    params(
        ("lawyer_id" = i64, Path, description = "Lawyer ID"),
        Pagination
    ),
    responses(
        (status = 200, description = "Lawyer reviews, newest first", body = ApiResponse<LawyerReviewList>)
    ),
    tag = "Reviews"
)]
pub async fn lawyer_reviews(
    State(state): State<AppState>,
    Path(lawyer_id): Path<i64>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<LawyerReviewList>>> {
    let resp = review_service::lawyer_reviews(&state, lawyer_id, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/reviews/lawyer/{lawyer_id}/rating",
    params(("lawyer_id" = i64, Path, description = "Lawyer ID")),
    responses(
        (status = 200, description = "Aggregate rating", body = ApiResponse<LawyerRating>),
        (status = 404, description = "Lawyer not found")
    ),
    tag = "Reviews"
)]
pub async fn lawyer_rating(
    State(state): State<AppState>,
    Path(lawyer_id): Path<i64>,
) -> AppResult<Json<ApiResponse<LawyerRating>>> {
    let resp = review_service::lawyer_rating(&state, lawyer_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/reviews/my-reviews",
    responses(
        (status = 200, description = "Caller's reviews", body = ApiResponse<MyReviewList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn my_reviews(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<MyReviewList>>> {
    let resp = review_service::my_reviews(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/reviews/{id}",
    params(("id" = i64, Path, description = "Review ID")),
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Review updated", body = ApiResponse<Review>),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Review not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn update_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateReviewRequest>,
) -> AppResult<Json<ApiResponse<Review>>> {
    let resp = review_service::update_review(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/reviews/{id}",
    params(("id" = i64, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Review deleted"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Review not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn delete_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = review_service::delete_review(&state, &user, id).await?;
    Ok(Json(resp))
}
