#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use legal_eye_api::{
    db::{create_pool, run_migrations},
    dto::{bookings::CreateBookingRequest, lawyers::CreateLawyerRequest},
    entity::users::ActiveModel as UserActive,
    middleware::auth::AuthUser,
    models::Role,
    services::{credential_service::CredentialService, lawyer_service},
    state::AppState,
};
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, Set};
use uuid::Uuid;

/// Connect to the test database, or `None` when none is configured.
pub async fn test_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests."
            );
            return Ok(None);
        }
    };

    let pool = create_pool(&database_url, 5).await?;
    run_migrations(&pool).await?;
    let credentials = CredentialService::new("integration-test-secret", Duration::hours(1));
    Ok(Some(AppState::new(pool, credentials)))
}

pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.test", Uuid::new_v4().simple())
}

pub async fn create_user(state: &AppState, role: Role) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: NotSet,
        name: Set(format!("Test {}", role.as_str())),
        email: Set(unique_email(role.as_str())),
        password_hash: Set("not-a-real-hash".into()),
        phone: Set(None),
        role: Set(role.as_str().into()),
        address: Set(None),
        profile_image: Set(None),
        is_active: Set(true),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        role: user.role,
    })
}

/// A lawyer user with a profile; returns the user and the lawyer id.
pub async fn create_lawyer(state: &AppState, fee: i64) -> anyhow::Result<(AuthUser, i64)> {
    let user = create_user(state, Role::Lawyer).await?;
    let resp = lawyer_service::create_lawyer_profile(
        state,
        &user,
        CreateLawyerRequest {
            specialization: "Family Law".into(),
            bar_council_number: format!("BAR-{}", user.user_id),
            experience: 7,
            education: None,
            about: None,
            consultation_fee: fee,
            languages: Some("English".into()),
            location: Some("Pune".into()),
            practice_areas: vec!["Divorce".into()],
        },
    )
    .await?;
    let lawyer = resp.data.ok_or_else(|| anyhow::anyhow!("lawyer profile missing"))?;
    Ok((user, lawyer.id))
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn booking_request(lawyer_id: i64, date: NaiveDate, time_slot: &str) -> CreateBookingRequest {
    CreateBookingRequest {
        lawyer_id,
        date,
        time_slot: time_slot.into(),
        date_time: None,
        case_type: "Property dispute".into(),
        description: "Neighbour has built over the shared boundary wall.".into(),
        urgency: None,
    }
}
