use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
    sea_query::{Expr, Func},
};

use crate::{
    audit,
    db::contains_pattern,
    dto::legal_info::{ArticleList, CreateArticleRequest, UpdateArticleRequest},
    entity::{
        LegalInfo,
        legal_info::{ActiveModel as ArticleActive, Column as ArticleCol, Model as ArticleModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::LegalArticle,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

const POPULAR_LIMIT: u64 = 10;
const RELATED_LIMIT: u64 = 3;

pub async fn list_articles(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<ArticleList>> {
    let (page, per_page, offset) = pagination.normalize();
    let finder = LegalInfo::find()
        .filter(ArticleCol::IsPublished.eq(true))
        .order_by_desc(ArticleCol::CreatedAt)
        .order_by_desc(ArticleCol::Id);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(article_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ApiResponse::success(
        "Articles",
        ArticleList { items },
        Some(Meta::new(page, per_page, total)),
    ))
}

/// Case-insensitive substring match on title, summary or content.
pub async fn search_articles(state: &AppState, q: &str) -> AppResult<ApiResponse<ArticleList>> {
    let needle = q.trim().to_lowercase();
    if needle.is_empty() {
        return Err(AppError::BadRequest("Search query is required".into()));
    }
    let pattern = contains_pattern(&needle);

    let matches = Condition::any()
        .add(Expr::expr(Func::lower(Expr::col(ArticleCol::Title))).like(pattern.as_str()))
        .add(Expr::expr(Func::lower(Expr::col(ArticleCol::Summary))).like(pattern.as_str()))
        .add(Expr::expr(Func::lower(Expr::col(ArticleCol::Content))).like(pattern.as_str()));

    let items = LegalInfo::find()
        .filter(ArticleCol::IsPublished.eq(true))
        .filter(matches)
        .order_by_desc(ArticleCol::Views)
        .order_by_desc(ArticleCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(article_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    let meta = Meta::count(items.len());
    Ok(ApiResponse::success("Articles", ArticleList { items }, Some(meta)))
}

pub async fn articles_by_category(
    state: &AppState,
    category: &str,
) -> AppResult<ApiResponse<ArticleList>> {
    let items = LegalInfo::find()
        .filter(ArticleCol::IsPublished.eq(true))
        .filter(ArticleCol::Category.eq(category.trim()))
        .order_by_desc(ArticleCol::CreatedAt)
        .order_by_desc(ArticleCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(article_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    let meta = Meta::count(items.len());
    Ok(ApiResponse::success("Articles", ArticleList { items }, Some(meta)))
}

pub async fn popular_articles(state: &AppState) -> AppResult<ApiResponse<ArticleList>> {
    let items = LegalInfo::find()
        .filter(ArticleCol::IsPublished.eq(true))
        .order_by_desc(ArticleCol::Views)
        .order_by_desc(ArticleCol::Id)
        .limit(POPULAR_LIMIT)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(article_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    let meta = Meta::count(items.len());
    Ok(ApiResponse::success("Articles", ArticleList { items }, Some(meta)))
}

/// Fetch an article and count the view.
pub async fn get_article(state: &AppState, id: i64) -> AppResult<ApiResponse<LegalArticle>> {
    let result = LegalInfo::update_many()
        .col_expr(ArticleCol::Views, Expr::col(ArticleCol::Views).add(1))
        .filter(ArticleCol::Id.eq(id))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("Article"));
    }

    let article = LegalInfo::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Article"))?;

    Ok(ApiResponse::success(
        "Article",
        article_from_entity(article)?,
        None,
    ))
}

pub async fn related_articles(state: &AppState, id: i64) -> AppResult<ApiResponse<ArticleList>> {
    let article = LegalInfo::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Article"))?;

    let items = LegalInfo::find()
        .filter(
            Condition::all()
                .add(ArticleCol::Category.eq(article.category))
                .add(ArticleCol::IsPublished.eq(true))
                .add(ArticleCol::Id.ne(article.id)),
        )
        .order_by_desc(ArticleCol::Views)
        .order_by_desc(ArticleCol::Id)
        .limit(RELATED_LIMIT)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(article_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    let meta = Meta::count(items.len());
    Ok(ApiResponse::success("Related articles", ArticleList { items }, Some(meta)))
}

pub async fn create_article(
    state: &AppState,
    user: &AuthUser,
    payload: CreateArticleRequest,
) -> AppResult<ApiResponse<LegalArticle>> {
    ensure_admin(user)?;

    let article = ArticleActive {
        id: NotSet,
        title: Set(payload.title.trim().to_string()),
        category: Set(payload.category.trim().to_string()),
        summary: Set(payload.summary),
        content: Set(payload.content),
        tags: Set(serde_json::json!(payload.tags)),
        read_time: Set(payload.read_time),
        author_id: Set(Some(user.user_id)),
        views: NotSet,
        is_published: Set(payload.is_published.unwrap_or(true)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(article_id = article.id, category = %article.category, "article created");
    audit::record(
        &state.pool,
        Some(user.user_id),
        "article_create",
        "legal_info",
        serde_json::json!({ "article_id": article.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Article created successfully",
        article_from_entity(article)?,
        Some(Meta::empty()),
    ))
}

pub async fn update_article(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: UpdateArticleRequest,
) -> AppResult<ApiResponse<LegalArticle>> {
    ensure_admin(user)?;

    let article = LegalInfo::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Article"))?;

    let mut active: ArticleActive = article.into();
    if let Some(title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(category) = payload.category {
        active.category = Set(category.trim().to_string());
    }
    if let Some(summary) = payload.summary {
        active.summary = Set(Some(summary));
    }
    if let Some(content) = payload.content {
        active.content = Set(content);
    }
    if let Some(tags) = payload.tags {
        active.tags = Set(serde_json::json!(tags));
    }
    if let Some(read_time) = payload.read_time {
        active.read_time = Set(Some(read_time));
    }
    if let Some(is_published) = payload.is_published {
        active.is_published = Set(is_published);
    }
    active.updated_at = Set(Utc::now().into());
    let article = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Article updated successfully",
        article_from_entity(article)?,
        None,
    ))
}

pub async fn delete_article(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<()>> {
    ensure_admin(user)?;

    let result = LegalInfo::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("Article"));
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "article_delete",
        "legal_info",
        serde_json::json!({ "article_id": id }),
    )
    .await;

    Ok(ApiResponse::message("Article deleted successfully"))
}

fn article_from_entity(model: ArticleModel) -> AppResult<LegalArticle> {
    let tags: Vec<String> = serde_json::from_value(model.tags)
        .map_err(|err| AppError::Internal(anyhow::anyhow!("invalid article tags: {err}")))?;

    Ok(LegalArticle {
        id: model.id,
        title: model.title,
        category: model.category,
        summary: model.summary,
        content: model.content,
        tags,
        read_time: model.read_time,
        author_id: model.author_id,
        views: model.views,
        is_published: model.is_published,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(tags: serde_json::Value) -> ArticleModel {
        let now = Utc::now().fixed_offset();
        ArticleModel {
            id: 1,
            title: "Tenant rights".into(),
            category: "property".into(),
            summary: None,
            content: "Body".into(),
            tags,
            read_time: Some(4),
            author_id: None,
            views: 12,
            is_published: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn entity_tags_become_string_list() {
        let article = article_from_entity(model(serde_json::json!(["rent", "lease"]))).unwrap();
        assert_eq!(article.tags, vec!["rent".to_string(), "lease".to_string()]);
        assert_eq!(article.views, 12);
    }

    #[test]
    fn malformed_tags_are_an_internal_error() {
        let err = article_from_entity(model(serde_json::json!({ "rent": true }))).unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
