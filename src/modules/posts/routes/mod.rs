//! HTTP handlers for the posts module, mounted under `/api/posts`.

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use inkwell_http::{AppError, PathParams, QueryParams, ValidatedJson};

use super::models::{Deleted, Post, PostCreate, PostPatch, PostQuery};
use super::repository::SharedPostRepository;

pub fn router(repository: SharedPostRepository) -> Router {
    tracing::debug!(target: "inkwell.routes", module = "posts", "registering routes");

    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/health", get(health_check))
        .route(
            "/{id}",
            get(get_post)
                .put(replace_post)
                .patch(patch_post)
                .delete(delete_post),
        )
        .with_state(repository)
}

fn not_found(id: &str) -> AppError {
    AppError::not_found(format!("post '{}' does not exist", id))
}

async fn health_check() -> &'static str {
    "posts module is healthy"
}

async fn create_post(
    State(repository): State<SharedPostRepository>,
    ValidatedJson(input): ValidatedJson<PostCreate>,
) -> Result<(StatusCode, Json<Post>), AppError> {
    let post = repository.create(input).await?;
    tracing::info!(post_id = %post.id, "post created");
    Ok((StatusCode::CREATED, Json(post)))
}

async fn list_posts(
    State(repository): State<SharedPostRepository>,
    QueryParams(query): QueryParams<PostQuery>,
) -> Result<Json<Vec<Post>>, AppError> {
    let posts = match query.title.as_deref() {
        Some(fragment) if !fragment.is_empty() => repository.search_by_title(fragment).await?,
        _ => repository.list().await?,
    };
    Ok(Json(posts))
}

async fn get_post(
    State(repository): State<SharedPostRepository>,
    PathParams(id): PathParams<String>,
) -> Result<Json<Post>, AppError> {
    repository
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(&id))
}

async fn replace_post(
    State(repository): State<SharedPostRepository>,
    PathParams(id): PathParams<String>,
    ValidatedJson(input): ValidatedJson<PostCreate>,
) -> Result<Json<Post>, AppError> {
    let post = repository
        .replace(&id, input)
        .await?
        .ok_or_else(|| not_found(&id))?;
    tracing::info!(post_id = %post.id, "post replaced");
    Ok(Json(post))
}

async fn patch_post(
    State(repository): State<SharedPostRepository>,
    PathParams(id): PathParams<String>,
    ValidatedJson(patch): ValidatedJson<PostPatch>,
) -> Result<Json<Post>, AppError> {
    let post = repository
        .patch(&id, patch)
        .await?
        .ok_or_else(|| not_found(&id))?;
    tracing::info!(post_id = %post.id, "post updated");
    Ok(Json(post))
}

async fn delete_post(
    State(repository): State<SharedPostRepository>,
    PathParams(id): PathParams<String>,
) -> Result<Json<Deleted>, AppError> {
    if !repository.delete(&id).await? {
        return Err(not_found(&id));
    }

    tracing::info!(post_id = %id, "post deleted");
    Ok(Json(Deleted {
        message: "post deleted".to_string(),
        id,
    }))
}
