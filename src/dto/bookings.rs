use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dto::rules::not_blank,
    models::{BookingDetail, BookingStatus, Urgency},
};

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateBookingRequest {
    #[validate(range(min = 1, message = "Valid lawyer ID is required"))]
    pub lawyer_id: i64,
    pub date: NaiveDate,
    #[validate(custom(function = "not_blank"))]
    pub time_slot: String,
    /// Defaults to `date` at the start of `time_slot`.
    pub date_time: Option<NaiveDateTime>,
    #[validate(custom(function = "not_blank"))]
    pub case_type: String,
    #[validate(length(min = 20, message = "Description must be at least 20 characters"))]
    pub description: String,
    pub urgency: Option<Urgency>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateBookingStatusRequest {
    pub status: BookingStatus,
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct CancelBookingRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RescheduleBookingRequest {
    pub date: NaiveDate,
    #[validate(custom(function = "not_blank"))]
    pub time_slot: String,
    pub date_time: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct BookingList {
    #[schema(value_type = Vec<BookingDetail>)]
    pub items: Vec<BookingDetail>,
}
