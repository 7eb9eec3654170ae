use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::legal_info::{ArticleList, CreateArticleRequest, UpdateArticleRequest},
    error::AppResult,
    middleware::{
        auth::AuthUser,
        extract::{Path, Query},
        validate::ValidatedJson,
    },
    models::LegalArticle,
    response::ApiResponse,
    routes::params::{ArticleCategoryQuery, ArticleSearchQuery, Pagination},
    services::legal_info_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_articles).post(create_article))
        .route("/search", get(search_articles))
        .route("/category", get(articles_by_category))
        .route("/popular", get(popular_articles))
        .route(
            "/{id}",
            get(get_article).put(update_article).delete(delete_article),
        )
        .route("/{id}/related", get(related_articles))
}

#[utoipa::path(
    get,
    path = "/api/legal-info",
    params(Pagination),
    responses(
        (status = 200, description = "Published articles", body = ApiResponse<ArticleList>)
    ),
    tag = "Legal Info"
)]
pub async fn list_articles(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ArticleList>>> {
    let resp = legal_info_service::list_articles(&state, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/legal-info/search",
    params(ArticleSearchQuery),
    responses(
        (status = 200, description = "Matching articles", body = ApiResponse<ArticleList>),
        (status = 400, description = "Missing query")
    ),
    tag = "Legal Info"
)]
pub async fn search_articles(
    State(state): State<AppState>,
    Query(query): Query<ArticleSearchQuery>,
) -> AppResult<Json<ApiResponse<ArticleList>>> {
    let resp = legal_info_service::search_articles(&state, &query.q).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/legal-info/category",
    params(ArticleCategoryQuery),
    responses(
        (status = 200, description = "Articles in category", body = ApiResponse<ArticleList>)
    ),
    tag = "Legal Info"
)]
pub async fn articles_by_category(
    State(state): State<AppState>,
    Query(query): Query<ArticleCategoryQuery>,
) -> AppResult<Json<ApiResponse<ArticleList>>> {
    let resp = legal_info_service::articles_by_category(&state, &query.category).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/legal-info/popular",
    responses(
        (status = 200, description = "Most viewed articles", body = ApiResponse<ArticleList>)
    ),
    tag = "Legal Info"
)]
pub async fn popular_articles(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<ArticleList>>> {
    let resp = legal_info_service::popular_articles(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/legal-info/{id}",
    params(("id" = i64, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Article", body = ApiResponse<LegalArticle>),
        (status = 404, description = "Article not found")
    ),
    tag = "Legal Info"
)]
pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<LegalArticle>>> {
    let resp = legal_info_service::get_article(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/legal-info/{id}/related",
    params(("id" = i64, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Related articles", body = ApiResponse<ArticleList>),
        (status = 404, description = "Article not found")
    ),
    tag = "Legal Info"
)]
pub async fn related_articles(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<ArticleList>>> {
    let resp = legal_info_service::related_articles(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/legal-info",
    request_body = CreateArticleRequest,
    responses(
        (status = 201, description = "Article created", body = ApiResponse<LegalArticle>),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Legal Info"
)]
pub async fn create_article(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateArticleRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<LegalArticle>>)> {
    let resp = legal_info_service::create_article(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/legal-info/{id}",
    params(("id" = i64, Path, description = "Article ID")),
    request_body = UpdateArticleRequest,
    responses(
        (status = 200, description = "Article updated", body = ApiResponse<LegalArticle>),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Article not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Legal Info"
)]
pub async fn update_article(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateArticleRequest>,
) -> AppResult<Json<ApiResponse<LegalArticle>>> {
    let resp = legal_info_service::update_article(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/legal-info/{id}",
    params(("id" = i64, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Article deleted"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Article not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Legal Info"
)]
pub async fn delete_article(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = legal_info_service::delete_article(&state, &user, id).await?;
    Ok(Json(resp))
}
