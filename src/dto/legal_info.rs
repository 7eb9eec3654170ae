use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dto::rules::{not_blank, tag_list},
    models::LegalArticle,
};

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateArticleRequest {
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    #[validate(custom(function = "not_blank"))]
    pub category: String,
    pub summary: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub content: String,
    #[serde(default)]
    #[validate(custom(function = "tag_list"))]
    pub tags: Vec<String>,
    #[validate(range(min = 1, message = "Read time must be positive"))]
    pub read_time: Option<i32>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateArticleRequest {
    #[validate(custom(function = "not_blank"))]
    pub title: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub category: Option<String>,
    pub summary: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub content: Option<String>,
    #[validate(custom(function = "tag_list"))]
    pub tags: Option<Vec<String>>,
    #[validate(range(min = 1, message = "Read time must be positive"))]
    pub read_time: Option<i32>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ArticleList {
    #[schema(value_type = Vec<LegalArticle>)]
    pub items: Vec<LegalArticle>,
}
