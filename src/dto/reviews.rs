use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dto::rules::not_blank,
    models::{ReviewWithClient, ReviewWithLawyer},
};

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateReviewRequest {
    #[validate(range(min = 1, message = "Valid booking ID is required"))]
    pub booking_id: i64,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    #[validate(length(min = 20, message = "Comment must be at least 20 characters"))]
    pub comment: String,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateReviewRequest {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<i32>,
    #[validate(custom(function = "not_blank"))]
    pub title: Option<String>,
    #[validate(length(min = 20, message = "Comment must be at least 20 characters"))]
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LawyerReviewList {
    pub items: Vec<ReviewWithClient>,
    pub has_more: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct MyReviewList {
    #[schema(value_type = Vec<ReviewWithLawyer>)]
    pub items: Vec<ReviewWithLawyer>,
}
