use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::{AppError, CommentError},
    models::comment::{CreateCommentRequest, DeleteParams, RootListParams, SearchParams},
    services::{CommentService, DeleteMode},
};

/// Health check.
pub async fn ping() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "pong" }))
}

/// Create a new comment, optionally as a reply to `parent_id`.
pub async fn create_comment(
    State(service): State<CommentService>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let created = service.create(payload).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// List root comments.
/// Supports page/limit pagination and sorting by author, text or creation time.
pub async fn list_root_comments(
    State(service): State<CommentService>,
    Query(params): Query<RootListParams>,
) -> Result<impl IntoResponse, AppError> {
    let roots = service.list_roots(params).await?;

    Ok(Json(roots))
}

/// Get a comment together with all of its replies.
pub async fn get_comment_with_children(
    State(service): State<CommentService>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let tree = service.get_with_children(id).await?;

    // The lookup succeeded, so an empty subtree means storage is inconsistent.
    if tree.is_empty() {
        return Err(AppError::InternalServerError(format!(
            "Subtree fetch for comment {} returned nothing",
            id
        )));
    }

    Ok(Json(tree))
}

/// Delete a comment.
/// `mode=soft` hides the comment and keeps its replies; `mode=hard` removes
/// the whole branch.
pub async fn delete_comment(
    State(service): State<CommentService>,
    Path(id): Path<i64>,
    Query(params): Query<DeleteParams>,
) -> Result<impl IntoResponse, AppError> {
    let mode = params
        .mode
        .as_deref()
        .and_then(DeleteMode::parse)
        .ok_or(CommentError::InvalidQuery)?;

    service.delete(id, mode).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Full-text search over comment content.
pub async fn search_comments(
    State(service): State<CommentService>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let query = params.q.unwrap_or_default();
    if query.trim().is_empty() {
        return Err(CommentError::InvalidQuery.into());
    }

    let hits = service.search(&query).await?;

    Ok(Json(hits))
}
