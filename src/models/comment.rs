use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Text shown in place of a soft-deleted comment's content.
pub const DELETED_PLACEHOLDER: &str = "[comment deleted]";

/// Represents the 'comments' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub content: String,
    pub author: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Comment {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// DTO for creating a new comment.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateCommentRequest {
    /// Optional: the ID of the comment being replied to.
    pub parent_id: Option<i64>,

    #[validate(length(max = 10000, message = "Comment must be at most 10000 characters"))]
    pub content: String,

    #[serde(default)]
    #[validate(length(max = 100, message = "Author must be at most 100 characters"))]
    pub author: String,
}

/// Display-ready comment with its replies nested under it.
///
/// Deleted comments stay in the tree: their text is replaced with
/// [`DELETED_PLACEHOLDER`] and replies are disabled, but their children
/// remain attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentNode {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub deleted: bool,
    pub replyable: bool,
    pub author: String,
    pub children: Vec<CommentNode>,
}

impl From<Comment> for CommentNode {
    fn from(comment: Comment) -> Self {
        let deleted = comment.is_deleted();
        let content = if deleted {
            DELETED_PLACEHOLDER.to_string()
        } else {
            comment.content
        };

        Self {
            id: comment.id,
            parent_id: comment.parent_id,
            content,
            created_at: comment.created_at,
            deleted,
            replyable: !deleted,
            author: comment.author,
            children: Vec::new(),
        }
    }
}

/// Query parameters for listing root comments.
/// Every field is optional; see `services::pagination` for the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RootListParams {
    /// 1-based page number.
    pub page: Option<i64>,
    /// Page size (default: 30, max: 100).
    pub limit: Option<i64>,
    /// 'author', 'text_content' or 'created' (default).
    pub sort: Option<String>,
    /// 'ascending' (default) or 'descending'.
    pub order: Option<String>,
}

/// Query parameters for `DELETE /comments/{id}`.
#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    pub mode: Option<String>,
}

/// Query parameters for full-text search.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}
