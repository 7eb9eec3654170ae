mod common;

use legal_eye_api::{
    dto::reviews::{CreateReviewRequest, UpdateReviewRequest},
    error::AppError,
    middleware::auth::AuthUser,
    models::Role,
    routes::params::Pagination,
    services::{booking_service, review_service},
    state::AppState,
};

async fn completed_booking(
    state: &AppState,
    client: &AuthUser,
    lawyer_user: &AuthUser,
    lawyer_id: i64,
    slot: &str,
) -> anyhow::Result<i64> {
    let booking = booking_service::create_booking(
        state,
        client,
        common::booking_request(lawyer_id, common::date(2024, 2, 2), slot),
    )
    .await?
    .data
    .expect("booking");
    booking_service::complete_booking(state, lawyer_user, booking.id).await?;
    Ok(booking.id)
}

fn review(booking_id: i64, rating: i32) -> CreateReviewRequest {
    CreateReviewRequest {
        booking_id,
        rating,
        title: "Helpful consultation".into(),
        comment: "Explained every option clearly and patiently.".into(),
    }
}

#[tokio::test]
async fn only_completed_bookings_can_be_reviewed_once() -> anyhow::Result<()> {
    let Some(state) = common::test_state().await? else {
        return Ok(());
    };
    let client = common::create_user(&state, Role::Client).await?;
    let (lawyer_user, lawyer_id) = common::create_lawyer(&state, 500).await?;

    let pending = booking_service::create_booking(
        &state,
        &client,
        common::booking_request(lawyer_id, common::date(2024, 2, 1), "10:00"),
    )
    .await?
    .data
    .expect("booking");
    let err = review_service::create_review(&state, &client, review(pending.id, 5))
        .await
        .err()
        .expect("pending booking cannot be reviewed");
    assert!(matches!(err, AppError::Conflict(ref m) if m == "Can only review completed bookings"));

    let booking_id = completed_booking(&state, &client, &lawyer_user, lawyer_id, "11:00").await?;
    let created = review_service::create_review(&state, &client, review(booking_id, 4))
        .await?
        .data
        .expect("review");
    assert_eq!(created.lawyer_id, lawyer_id);

    let err = review_service::create_review(&state, &client, review(booking_id, 5))
        .await
        .err()
        .expect("second review must fail");
    assert!(
        matches!(err, AppError::Conflict(ref m) if m == "Review already exists for this booking")
    );

    // Someone else's booking looks absent.
    let stranger = common::create_user(&state, Role::Client).await?;
    let err = review_service::create_review(&state, &stranger, review(booking_id, 1))
        .await
        .err()
        .expect("foreign booking must fail");
    assert!(matches!(err, AppError::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn rating_tracks_mean_and_count_of_reviews() -> anyhow::Result<()> {
    let Some(state) = common::test_state().await? else {
        return Ok(());
    };
    let client = common::create_user(&state, Role::Client).await?;
    let (lawyer_user, lawyer_id) = common::create_lawyer(&state, 500).await?;

    let first = completed_booking(&state, &client, &lawyer_user, lawyer_id, "09:00").await?;
    let second = completed_booking(&state, &client, &lawyer_user, lawyer_id, "10:00").await?;

    review_service::create_review(&state, &client, review(first, 5)).await?;
    let rating = review_service::lawyer_rating(&state, lawyer_id)
        .await?
        .data
        .expect("rating");
    assert_eq!(rating.total_reviews, 1);
    assert!((rating.rating - 5.0).abs() < 1e-9);

    let second_review = review_service::create_review(&state, &client, review(second, 2))
        .await?
        .data
        .expect("review");
    let rating = review_service::lawyer_rating(&state, lawyer_id)
        .await?
        .data
        .expect("rating");
    assert_eq!(rating.total_reviews, 2);
    assert!((rating.rating - 3.5).abs() < 1e-9);

    review_service::update_review(
        &state,
        &client,
        second_review.id,
        UpdateReviewRequest {
            rating: Some(3),
            title: None,
            comment: None,
        },
    )
    .await?;
    let rating = review_service::lawyer_rating(&state, lawyer_id)
        .await?
        .data
        .expect("rating");
    assert!((rating.rating - 4.0).abs() < 1e-9);

    review_service::delete_review(&state, &client, second_review.id).await?;
    let rating = review_service::lawyer_rating(&state, lawyer_id)
        .await?
        .data
        .expect("rating");
    assert_eq!(rating.total_reviews, 1);
    assert!((rating.rating - 5.0).abs() < 1e-9);

    let listed = review_service::lawyer_reviews(&state, lawyer_id, Pagination::new(1, 10))
        .await?
        .data
        .expect("reviews");
    assert_eq!(listed.items.len(), 1);
    assert!(!listed.has_more);

    let mine = review_service::my_reviews(&state, &client)
        .await?
        .data
        .expect("reviews");
    assert_eq!(mine.items.len(), 1);
    assert_eq!(mine.items[0].specialization, "Family Law");
    Ok(())
}

#[tokio::test]
async fn only_author_may_edit_a_review() -> anyhow::Result<()> {
    let Some(state) = common::test_state().await? else {
        return Ok(());
    };
    let client = common::create_user(&state, Role::Client).await?;
    let other = common::create_user(&state, Role::Client).await?;
    let (lawyer_user, lawyer_id) = common::create_lawyer(&state, 500).await?;
    let booking_id = completed_booking(&state, &client, &lawyer_user, lawyer_id, "15:00").await?;
    let created = review_service::create_review(&state, &client, review(booking_id, 4))
        .await?
        .data
        .expect("review");

    let err = review_service::update_review(
        &state,
        &other,
        created.id,
        UpdateReviewRequest {
            rating: Some(1),
            title: None,
            comment: None,
        },
    )
    .await
    .err()
    .expect("non-author update must fail");
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = review_service::delete_review(&state, &other, created.id)
        .await
        .err()
        .expect("non-author delete must fail");
    assert!(matches!(err, AppError::Forbidden(_)));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_reviews_keep_rating_exact() -> anyhow::Result<()> {
    let Some(state) = common::test_state().await? else {
        return Ok(());
    };

    for round in 0..3 {
        let client = common::create_user(&state, Role::Client).await?;
        let (lawyer_user, lawyer_id) = common::create_lawyer(&state, 600).await?;

        let ratings = [1, 2, 4, 5, 3, 5];
        let mut bookings = Vec::new();
        for (i, rating) in ratings.iter().enumerate() {
            let slot = format!("{:02}:00", 9 + i);
            let booking_id =
                completed_booking(&state, &client, &lawyer_user, lawyer_id, &slot).await?;
            bookings.push((booking_id, *rating));
        }

        let handles: Vec<_> = bookings
            .into_iter()
            .map(|(booking_id, rating)| {
                let state = state.clone();
                let client = client.clone();
                tokio::spawn(async move {
                    review_service::create_review(&state, &client, review(booking_id, rating))
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await??;
        }

        let stored = review_service::lawyer_rating(&state, lawyer_id)
            .await?
            .data
            .expect("rating");
        let (actual_avg, actual_count): (f64, i64) = sqlx::query_as(
            "SELECT AVG(rating)::float8, COUNT(*) FROM reviews WHERE lawyer_id = $1",
        )
        .bind(lawyer_id)
        .fetch_one(&state.pool)
        .await?;

        assert_eq!(actual_count, ratings.len() as i64, "round {round}");
        assert_eq!(stored.total_reviews as i64, actual_count, "round {round}");
        assert!((stored.rating - actual_avg).abs() < 1e-9, "round {round}");
        assert!((stored.rating - 20.0 / 6.0).abs() < 1e-9, "round {round}");
    }
    Ok(())
}

