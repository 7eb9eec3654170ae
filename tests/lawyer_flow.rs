mod common;

use std::collections::BTreeMap;

use legal_eye_api::{
    dto::{
        bookings::CancelBookingRequest,
        lawyers::{CreateLawyerRequest, SetAvailabilityRequest, UpdateLawyerRequest},
    },
    error::AppError,
    models::Role,
    routes::params::{LawyerSearchQuery, LawyerSortBy},
    services::{booking_service, lawyer_service},
};
use uuid::Uuid;

fn profile_request() -> CreateLawyerRequest {
    CreateLawyerRequest {
        specialization: "Criminal Law".into(),
        bar_council_number: "BAR-X".into(),
        experience: 3,
        education: None,
        about: None,
        consultation_fee: 900,
        languages: None,
        location: None,
        practice_areas: Vec::new(),
    }
}

fn location_update(location: &str, fee: i64) -> UpdateLawyerRequest {
    UpdateLawyerRequest {
        specialization: None,
        bar_council_number: None,
        experience: None,
        education: None,
        about: None,
        consultation_fee: Some(fee),
        languages: None,
        location: Some(location.into()),
        practice_areas: None,
    }
}

#[tokio::test]
async fn profile_creation_is_limited_to_one_per_lawyer() -> anyhow::Result<()> {
    let Some(state) = common::test_state().await? else {
        return Ok(());
    };
    let client = common::create_user(&state, Role::Client).await?;
    let err = lawyer_service::create_lawyer_profile(&state, &client, profile_request())
        .await
        .err()
        .expect("client cannot create a lawyer profile");
    assert!(matches!(err, AppError::Forbidden(_)));

    let (lawyer_user, _lawyer_id) = common::create_lawyer(&state, 1000).await?;
    let err = lawyer_service::create_lawyer_profile(&state, &lawyer_user, profile_request())
        .await
        .err()
        .expect("second profile must fail");
    assert!(matches!(err, AppError::Conflict(ref m) if m == "Lawyer profile already exists"));
    Ok(())
}

#[tokio::test]
async fn only_owner_or_admin_updates_profile() -> anyhow::Result<()> {
    let Some(state) = common::test_state().await? else {
        return Ok(());
    };
    let (owner, lawyer_id) = common::create_lawyer(&state, 1000).await?;
    let (other_lawyer, _) = common::create_lawyer(&state, 1000).await?;
    let admin = common::create_user(&state, Role::Admin).await?;

    let err = lawyer_service::update_lawyer_profile(
        &state,
        &other_lawyer,
        lawyer_id,
        location_update("Nagpur", 1200),
    )
    .await
    .err()
    .expect("other lawyer cannot update");
    assert!(matches!(err, AppError::Forbidden(_)));

    let updated = lawyer_service::update_lawyer_profile(
        &state,
        &owner,
        lawyer_id,
        location_update("Nagpur", 1200),
    )
    .await?
    .data
    .expect("lawyer");
    assert_eq!(updated.consultation_fee, 1200);
    assert_eq!(updated.specialization, "Family Law");

    lawyer_service::update_lawyer_profile(&state, &admin, lawyer_id, location_update("Goa", 1300))
        .await?;

    let err = lawyer_service::get_lawyer(&state, i64::MAX)
        .await
        .err()
        .expect("missing lawyer");
    assert!(matches!(err, AppError::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn search_filters_by_location_and_fee() -> anyhow::Result<()> {
    let Some(state) = common::test_state().await? else {
        return Ok(());
    };
    let town = format!("Town-{}", Uuid::new_v4().simple());
    let (cheap_user, cheap_id) = common::create_lawyer(&state, 500).await?;
    let (pricey_user, pricey_id) = common::create_lawyer(&state, 5000).await?;
    lawyer_service::update_lawyer_profile(&state, &cheap_user, cheap_id, location_update(&town, 500))
        .await?;
    lawyer_service::update_lawyer_profile(
        &state,
        &pricey_user,
        pricey_id,
        location_update(&town, 5000),
    )
    .await?;

    let by_fee = lawyer_service::search_lawyers(
        &state,
        LawyerSearchQuery {
            location: Some(town.to_lowercase()),
            sort_by: Some(LawyerSortBy::FeeHigh),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(by_fee.meta.as_ref().and_then(|m| m.total), Some(2));
    let ids: Vec<i64> = by_fee
        .data
        .expect("list")
        .items
        .iter()
        .map(|l| l.lawyer.id)
        .collect();
    assert_eq!(ids, vec![pricey_id, cheap_id]);

    let capped = lawyer_service::search_lawyers(
        &state,
        LawyerSearchQuery {
            location: Some(town.clone()),
            max_fee: Some(1000),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("list");
    assert_eq!(capped.items.len(), 1);
    assert_eq!(capped.items[0].lawyer.id, cheap_id);
    Ok(())
}

#[tokio::test]
async fn search_treats_wildcards_literally() -> anyhow::Result<()> {
    let Some(state) = common::test_state().await? else {
        return Ok(());
    };
    let town = format!("Town-{}", Uuid::new_v4().simple());
    let (user, lawyer_id) = common::create_lawyer(&state, 700).await?;
    lawyer_service::update_lawyer_profile(&state, &user, lawyer_id, location_update(&town, 700))
        .await?;

    let exact = lawyer_service::search_lawyers(
        &state,
        LawyerSearchQuery {
            location: Some(town.clone()),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(exact.meta.as_ref().and_then(|m| m.total), Some(1));

    let underscored = format!("{}_", &town[..town.len() - 1]);
    let wildcard = lawyer_service::search_lawyers(
        &state,
        LawyerSearchQuery {
            location: Some(underscored),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(wildcard.meta.as_ref().and_then(|m| m.total), Some(0));

    let percent = lawyer_service::search_lawyers(
        &state,
        LawyerSearchQuery {
            location: Some(format!("{}%", &town[..8])),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(percent.meta.as_ref().and_then(|m| m.total), Some(0));
    Ok(())
}

#[tokio::test]
async fn availability_days_differing_in_case_are_merged() -> anyhow::Result<()> {
    let Some(state) = common::test_state().await? else {
        return Ok(());
    };
    let (owner, lawyer_id) = common::create_lawyer(&state, 1000).await?;

    let mut week = BTreeMap::new();
    week.insert("Monday".to_string(), vec!["10:00".to_string()]);
    week.insert("monday".to_string(), vec!["10:00".to_string(), "11:00".to_string()]);
    let current = lawyer_service::set_availability(
        &state,
        &owner,
        lawyer_id,
        SetAvailabilityRequest { availability: week },
    )
    .await?
    .data
    .expect("availability");

    assert_eq!(current.slots.len(), 2);
    assert_eq!(current.availability.len(), 1);
    assert_eq!(
        current.availability.get("monday"),
        Some(&vec!["10:00".to_string(), "11:00".to_string()])
    );
    Ok(())
}

#[tokio::test]
async fn availability_is_replaced_wholesale() -> anyhow::Result<()> {
    let Some(state) = common::test_state().await? else {
        return Ok(());
    };
    let (owner, lawyer_id) = common::create_lawyer(&state, 1000).await?;

    let mut week = BTreeMap::new();
    week.insert("monday".to_string(), vec!["10:00".to_string(), "11:00".to_string()]);
    week.insert("friday".to_string(), vec!["15:00".to_string()]);
    lawyer_service::set_availability(
        &state,
        &owner,
        lawyer_id,
        SetAvailabilityRequest { availability: week },
    )
    .await?;

    let mut week = BTreeMap::new();
    week.insert("tuesday".to_string(), vec!["09:00".to_string()]);
    lawyer_service::set_availability(
        &state,
        &owner,
        lawyer_id,
        SetAvailabilityRequest { availability: week },
    )
    .await?;

    let current = lawyer_service::get_availability(&state, lawyer_id)
        .await?
        .data
        .expect("availability");
    assert_eq!(current.slots.len(), 1);
    assert_eq!(
        current.availability.get("tuesday"),
        Some(&vec!["09:00".to_string()])
    );
    assert!(!current.availability.contains_key("monday"));
    Ok(())
}

#[tokio::test]
async fn stats_count_bookings_by_status() -> anyhow::Result<()> {
    let Some(state) = common::test_state().await? else {
        return Ok(());
    };
    let client = common::create_user(&state, Role::Client).await?;
    let other_client = common::create_user(&state, Role::Client).await?;
    let (lawyer_user, lawyer_id) = common::create_lawyer(&state, 700).await?;
    let day = common::date(2024, 9, 9);

    let a = booking_service::create_booking(
        &state,
        &client,
        common::booking_request(lawyer_id, day, "10:00"),
    )
    .await?
    .data
    .expect("booking");
    booking_service::create_booking(
        &state,
        &other_client,
        common::booking_request(lawyer_id, day, "11:00"),
    )
    .await?;
    booking_service::cancel_booking(&state, &lawyer_user, a.id, CancelBookingRequest::default())
        .await?;

    let stats = lawyer_service::get_lawyer_stats(&state, lawyer_id)
        .await?
        .data
        .expect("stats");
    assert_eq!(stats.total_bookings, 2);
    assert_eq!(stats.pending_bookings, 1);
    assert_eq!(stats.cancelled_bookings, 1);
    assert_eq!(stats.total_clients, 2);
    assert_eq!(stats.total_reviews, 0);

    let profile = lawyer_service::get_lawyer(&state, lawyer_id)
        .await?
        .data
        .expect("lawyer");
    assert_eq!(profile.lawyer.total_bookings, 2);
    Ok(())
}
