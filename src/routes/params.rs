use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    /// Page number, default 1
    pub page: Option<i64>,
    /// Items per page, default 20
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
        }
    }

    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1).saturating_mul(per_page);
        (page, per_page, offset)
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum LawyerSortBy {
    FeeLow,
    FeeHigh,
    Experience,
    #[default]
    Rating,
}

impl LawyerSortBy {
    pub fn as_sql(&self) -> &'static str {
        match self {
            LawyerSortBy::FeeLow => "l.consultation_fee ASC, l.id",
            LawyerSortBy::FeeHigh => "l.consultation_fee DESC, l.id",
            LawyerSortBy::Experience => "l.experience DESC, l.id",
            LawyerSortBy::Rating => "l.rating DESC, l.id",
        }
    }
}

// Pagination fields are inlined: `serde(flatten)` breaks numeric parsing in query strings.
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LawyerSearchQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// Case-insensitive match on lawyer name or specialization
    pub search: Option<String>,
    pub specialization: Option<String>,
    pub location: Option<String>,
    pub min_rating: Option<f64>,
    pub max_fee: Option<i64>,
    pub sort_by: Option<LawyerSortBy>,
}

impl LawyerSearchQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ArticleSearchQuery {
    pub q: String,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ArticleCategoryQuery {
    pub category: String,
}
