use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Client,
    Lawyer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Lawyer => "lawyer",
            Role::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    /// Completed and cancelled bookings are terminal.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed | Completed | Cancelled) | (Confirmed, Completed | Cancelled)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    #[default]
    Normal,
    Urgent,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Normal => "normal",
            Urgency::Urgent => "urgent",
        }
    }
}

/// Public view of a user row; never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    pub address: Option<String>,
    pub profile_image: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

pub const USER_COLUMNS: &str =
    "id, name, email, phone, role, address, profile_image, is_active, created_at";

#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    pub id: i64,
    pub role: String,
    pub password_hash: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Lawyer {
    pub id: i64,
    pub user_id: i64,
    pub specialization: String,
    pub bar_council_number: String,
    pub experience: i32,
    pub education: Option<String>,
    pub about: Option<String>,
    pub consultation_fee: i64,
    pub languages: Option<String>,
    pub location: Option<String>,
    #[schema(value_type = Vec<String>)]
    pub practice_areas: Json<Vec<String>>,
    pub rating: f64,
    pub total_reviews: i32,
    pub total_bookings: i32,
    pub created_at: DateTime<Utc>,
}

/// Lawyer profile joined with the owning user's contact fields.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct LawyerDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub lawyer: Lawyer,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub profile_image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AvailabilitySlot {
    pub day_of_week: String,
    pub time_slot: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Booking {
    pub id: i64,
    pub client_id: i64,
    pub lawyer_id: i64,
    pub booking_date: NaiveDate,
    pub time_slot: String,
    pub date_time: NaiveDateTime,
    pub case_type: String,
    pub description: String,
    pub urgency: String,
    pub status: String,
    pub consultation_fee: i64,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Booking joined with both parties' contact details.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct BookingDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub booking: Booking,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub lawyer_name: String,
    pub lawyer_email: String,
    pub lawyer_phone: Option<String>,
    pub specialization: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Review {
    pub id: i64,
    pub booking_id: i64,
    pub client_id: i64,
    pub lawyer_id: i64,
    pub rating: i32,
    pub title: String,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ReviewWithClient {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub review: Review,
    pub client_name: String,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ReviewWithLawyer {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub review: Review,
    pub lawyer_name: String,
    pub specialization: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LawyerRating {
    pub rating: f64,
    pub total_reviews: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LegalArticle {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub summary: Option<String>,
    pub content: String,
    pub tags: Vec<String>,
    pub read_time: Option<i32>,
    pub author_id: Option<i64>,
    pub views: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses_reject_every_transition() {
        for next in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ] {
            assert!(!BookingStatus::Completed.can_transition_to(next));
            assert!(!BookingStatus::Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn pending_moves_forward_only() {
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Confirmed));
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Cancelled));
        assert!(BookingStatus::Confirmed.can_transition_to(BookingStatus::Completed));
        assert!(!BookingStatus::Confirmed.can_transition_to(BookingStatus::Pending));
        assert!(!BookingStatus::Pending.can_transition_to(BookingStatus::Pending));
    }

    #[test]
    fn status_parse_matches_storage_strings() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ] {
            assert_eq!(BookingStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(BookingStatus::parse("archived"), None);
    }
}
