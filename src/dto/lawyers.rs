use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dto::rules::{not_blank, weekly_availability},
    models::{AvailabilitySlot, LawyerDetail},
};

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateLawyerRequest {
    #[validate(custom(function = "not_blank"))]
    pub specialization: String,
    #[validate(custom(function = "not_blank"))]
    pub bar_council_number: String,
    #[validate(range(min = 0, max = 80, message = "Experience must be between 0 and 80 years"))]
    pub experience: i32,
    pub education: Option<String>,
    pub about: Option<String>,
    #[validate(range(min = 0, message = "Consultation fee cannot be negative"))]
    pub consultation_fee: i64,
    pub languages: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub practice_areas: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateLawyerRequest {
    #[validate(custom(function = "not_blank"))]
    pub specialization: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub bar_council_number: Option<String>,
    #[validate(range(min = 0, max = 80, message = "Experience must be between 0 and 80 years"))]
    pub experience: Option<i32>,
    pub education: Option<String>,
    pub about: Option<String>,
    #[validate(range(min = 0, message = "Consultation fee cannot be negative"))]
    pub consultation_fee: Option<i64>,
    pub languages: Option<String>,
    pub location: Option<String>,
    pub practice_areas: Option<Vec<String>>,
}

/// Weekly schedule keyed by lowercase day name.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SetAvailabilityRequest {
    #[validate(custom(function = "weekly_availability"))]
    pub availability: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AvailabilityResponse {
    pub availability: BTreeMap<String, Vec<String>>,
    pub slots: Vec<AvailabilitySlot>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct LawyerList {
    #[schema(value_type = Vec<LawyerDetail>)]
    pub items: Vec<LawyerDetail>,
}

#[derive(Debug, Default, Serialize, ToSchema)]
pub struct LawyerStats {
    pub total_bookings: i64,
    pub pending_bookings: i64,
    pub confirmed_bookings: i64,
    pub completed_bookings: i64,
    pub cancelled_bookings: i64,
    pub total_clients: i64,
    pub average_rating: f64,
    pub total_reviews: i32,
    pub monthly_earnings: i64,
}
