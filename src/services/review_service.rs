use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    ModelTrait, QueryFilter, QuerySelect, Set, TransactionTrait, sea_query::Expr,
};

use crate::{
    audit,
    db::is_orm_unique_violation,
    dto::reviews::{CreateReviewRequest, LawyerReviewList, MyReviewList, UpdateReviewRequest},
    entity::{
        Bookings, Lawyers, Reviews,
        bookings::Column as BookingCol,
        lawyers::Column as LawyerCol,
        reviews::{ActiveModel as ReviewActive, Column as ReviewCol, Model as ReviewModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{BookingStatus, LawyerRating, Review, ReviewWithClient, ReviewWithLawyer},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::lawyer_service::fetch_lawyer,
    state::AppState,
};

const REVIEW_EXISTS: &str = "Review already exists for this booking";

const REVIEW_COLUMNS: &str = "r.id, r.booking_id, r.client_id, r.lawyer_id, r.rating, r.title, \
     r.comment, r.created_at, r.updated_at";

/// Take a row lock on the lawyer so review writes for one lawyer commit in turn.
///
/// Statements after the lock see every review committed by the previous holder.
async fn lock_lawyer<C>(conn: &C, lawyer_id: i64) -> AppResult<()>
where
    C: ConnectionTrait,
{
    Lawyers::find_by_id(lawyer_id)
        .select_only()
        .column(LawyerCol::Id)
        .lock_exclusive()
        .into_tuple::<i64>()
        .one(conn)
        .await?
        .ok_or_else(|| AppError::not_found("Lawyer"))?;
    Ok(())
}

/// Recompute a lawyer's mean rating and review count from the stored reviews.
///
/// Runs on whatever connection it is given. Callers hold the lawyer lock from
/// `lock_lawyer` in the same transaction that changed the reviews.
pub async fn recompute_lawyer_rating<C>(conn: &C, lawyer_id: i64) -> AppResult<LawyerRating>
where
    C: ConnectionTrait,
{
    let (rating, total_reviews) = Reviews::find()
        .select_only()
        .column_as(Expr::cust("COALESCE(AVG(rating), 0)::float8"), "rating")
        .column_as(Expr::cust("COUNT(*)::int4"), "total_reviews")
        .filter(ReviewCol::LawyerId.eq(lawyer_id))
        .into_tuple::<(f64, i32)>()
        .one(conn)
        .await?
        .unwrap_or((0.0, 0));

    Lawyers::update_many()
        .col_expr(LawyerCol::Rating, Expr::value(rating))
        .col_expr(LawyerCol::TotalReviews, Expr::value(total_reviews))
        .filter(LawyerCol::Id.eq(lawyer_id))
        .exec(conn)
        .await?;

    tracing::debug!(lawyer_id, rating, total_reviews, "rating recomputed");

    Ok(LawyerRating {
        rating,
        total_reviews,
    })
}

pub async fn create_review(
    state: &AppState,
    user: &AuthUser,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    let txn = state.orm.begin().await?;

    let booking = Bookings::find()
        .filter(
            Condition::all()
                .add(BookingCol::Id.eq(payload.booking_id))
                .add(BookingCol::ClientId.eq(user.user_id)),
        )
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Booking"))?;

    if booking.status != BookingStatus::Completed.as_str() {
        return Err(AppError::Conflict(
            "Can only review completed bookings".into(),
        ));
    }

    lock_lawyer(&txn, booking.lawyer_id).await?;

    let existing = Reviews::find()
        .filter(ReviewCol::BookingId.eq(booking.id))
        .one(&txn)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(REVIEW_EXISTS.into()));
    }

    let review = ReviewActive {
        id: NotSet,
        booking_id: Set(booking.id),
        client_id: Set(user.user_id),
        lawyer_id: Set(booking.lawyer_id),
        rating: Set(payload.rating),
        title: Set(payload.title.trim().to_string()),
        comment: Set(payload.comment),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await
    .map_err(|err| {
        if is_orm_unique_violation(&err) {
            AppError::Conflict(REVIEW_EXISTS.into())
        } else {
            err.into()
        }
    })?;

    let rating = recompute_lawyer_rating(&txn, booking.lawyer_id).await?;
    txn.commit().await?;

    tracing::info!(
        review_id = review.id,
        lawyer_id = review.lawyer_id,
        rating = rating.rating,
        "review created"
    );
    audit::record(
        &state.pool,
        Some(user.user_id),
        "review_create",
        "reviews",
        serde_json::json!({ "review_id": review.id, "booking_id": review.booking_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Review submitted successfully",
        review_from_entity(review),
        Some(Meta::empty()),
    ))
}

pub async fn update_review(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: UpdateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    let txn = state.orm.begin().await?;

    let review = Reviews::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Review"))?;
    if review.client_id != user.user_id {
        return Err(AppError::Forbidden(
            "Not authorized to update this review".into(),
        ));
    }

    let lawyer_id = review.lawyer_id;
    lock_lawyer(&txn, lawyer_id).await?;
    let mut active: ReviewActive = review.into();
    if let Some(rating) = payload.rating {
        active.rating = Set(rating);
    }
    if let Some(title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(comment) = payload.comment {
        active.comment = Set(comment);
    }
    active.updated_at = Set(Utc::now().into());
    let review = active.update(&txn).await?;

    recompute_lawyer_rating(&txn, lawyer_id).await?;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Review updated successfully",
        review_from_entity(review),
        None,
    ))
}

pub async fn delete_review(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<()>> {
    let txn = state.orm.begin().await?;

    let review = Reviews::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Review"))?;
    if review.client_id != user.user_id && !user.is_admin() {
        return Err(AppError::Forbidden(
            "Not authorized to delete this review".into(),
        ));
    }

    let lawyer_id = review.lawyer_id;
    lock_lawyer(&txn, lawyer_id).await?;
    review.delete(&txn).await?;
    recompute_lawyer_rating(&txn, lawyer_id).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "review_delete",
        "reviews",
        serde_json::json!({ "review_id": id, "lawyer_id": lawyer_id }),
    )
    .await;

    Ok(ApiResponse::message("Review deleted successfully"))
}

pub async fn lawyer_reviews(
    state: &AppState,
    lawyer_id: i64,
    pagination: Pagination,
) -> AppResult<ApiResponse<LawyerReviewList>> {
    let (page, per_page, offset) = pagination.normalize();

    let items: Vec<ReviewWithClient> = sqlx::query_as(&format!(
        r#"
        SELECT {REVIEW_COLUMNS}, u.name AS client_name
        FROM reviews r
        JOIN users u ON u.id = r.client_id
        WHERE r.lawyer_id = $1
        ORDER BY r.created_at DESC, r.id DESC
        LIMIT $2 OFFSET $3
        "#
    ))
    .bind(lawyer_id)
    .bind(per_page)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reviews WHERE lawyer_id = $1")
        .bind(lawyer_id)
        .fetch_one(&state.pool)
        .await?;

    let has_more = offset.saturating_add(items.len() as i64) < total;
    Ok(ApiResponse::success(
        "Reviews",
        LawyerReviewList { items, has_more },
        Some(Meta::new(page, per_page, total)),
    ))
}

pub async fn lawyer_rating(
    state: &AppState,
    lawyer_id: i64,
) -> AppResult<ApiResponse<LawyerRating>> {
    let lawyer = fetch_lawyer(&state.pool, lawyer_id).await?;
    Ok(ApiResponse::success(
        "Lawyer rating",
        LawyerRating {
            rating: lawyer.rating,
            total_reviews: lawyer.total_reviews,
        },
        None,
    ))
}

pub async fn my_reviews(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<MyReviewList>> {
    let items: Vec<ReviewWithLawyer> = sqlx::query_as(&format!(
        r#"
        SELECT {REVIEW_COLUMNS}, u.name AS lawyer_name, l.specialization
        FROM reviews r
        JOIN lawyers l ON l.id = r.lawyer_id
        JOIN users u ON u.id = l.user_id
        WHERE r.client_id = $1
        ORDER BY r.created_at DESC, r.id DESC
        "#
    ))
    .bind(user.user_id)
    .fetch_all(&state.pool)
    .await?;

    let meta = Meta::count(items.len());
    Ok(ApiResponse::success(
        "Reviews",
        MyReviewList { items },
        Some(meta),
    ))
}

fn review_from_entity(model: ReviewModel) -> Review {
    Review {
        id: model.id,
        booking_id: model.booking_id,
        client_id: model.client_id,
        lawyer_id: model.lawyer_id,
        rating: model.rating,
        title: model.title,
        comment: model.comment,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
