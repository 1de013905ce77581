// src/services/comment_service.rs

use std::sync::Arc;

use crate::{
    error::CommentError,
    models::comment::{CommentNode, CreateCommentRequest, RootListParams},
    repository::{CommentRepository, RepoError},
    services::tree::{TreeMode, build_tree, flatten_for_search},
};

/// How a comment is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    /// Stamp `deleted_at` on the comment; replies stay visible.
    Soft,
    /// Remove the comment and its whole subtree.
    Hard,
}

impl DeleteMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "soft" => Some(DeleteMode::Soft),
            "hard" => Some(DeleteMode::Hard),
            _ => None,
        }
    }
}

/// Business rules for comments. Cheap to clone; holds no per-request state.
#[derive(Clone)]
pub struct CommentService {
    repo: Arc<dyn CommentRepository>,
}

impl CommentService {
    pub fn new(repo: Arc<dyn CommentRepository>) -> Self {
        Self { repo }
    }

    /// Creates a comment, optionally as a reply.
    /// Replying to a missing or deleted comment is rejected.
    pub async fn create(&self, request: CreateCommentRequest) -> Result<CommentNode, CommentError> {
        if let Some(parent_id) = request.parent_id {
            let parent = self.repo.find_by_id(parent_id).await.map_err(|e| match e {
                RepoError::NotFound => CommentError::ParentNotFound,
                other => {
                    tracing::error!(
                        "Failed to check parent {} before creating comment: {}",
                        parent_id,
                        other
                    );
                    CommentError::Internal
                }
            })?;

            if parent.is_deleted() {
                return Err(CommentError::ParentDeleted);
            }
        }

        let created = self
            .repo
            .insert(request.parent_id, &request.content, &request.author)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create comment: {}", e);
                CommentError::Internal
            })?;

        tracing::debug!("Created comment {}", created.id);
        Ok(CommentNode::from(created))
    }

    /// One page of root comments. Replies are not included.
    pub async fn list_roots(&self, params: RootListParams) -> Result<Vec<CommentNode>, CommentError> {
        let page = params.normalize();

        let roots = self
            .repo
            .list_roots(page.limit, page.offset(), page.sort, page.order)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list root comments: {}", e);
                CommentError::Internal
            })?;

        Ok(build_tree(roots, TreeMode::RootsOnly))
    }

    /// The comment with all of its replies nested under it.
    ///
    /// Returns a one-element list. An empty list means storage lost the
    /// comment between the lookup and the subtree fetch.
    pub async fn get_with_children(&self, id: i64) -> Result<Vec<CommentNode>, CommentError> {
        if id <= 0 {
            return Err(CommentError::InvalidId);
        }

        self.repo.find_by_id(id).await.map_err(|e| match e {
            RepoError::NotFound => CommentError::ParentNotFound,
            other => {
                tracing::error!("Failed to look up comment {}: {}", id, other);
                CommentError::Internal
            }
        })?;

        let records = self.repo.fetch_subtree(id).await.map_err(|e| {
            tracing::error!("Failed to fetch replies of comment {}: {}", id, e);
            CommentError::Internal
        })?;

        Ok(build_tree(records, TreeMode::SubtreeOf(id)))
    }

    pub async fn delete(&self, id: i64, mode: DeleteMode) -> Result<(), CommentError> {
        if id <= 0 {
            return Err(CommentError::InvalidId);
        }

        self.repo.find_by_id(id).await.map_err(|e| match e {
            RepoError::NotFound => CommentError::CommentNotFound,
            other => {
                tracing::error!("Failed to check comment {} before deleting: {}", id, other);
                CommentError::Internal
            }
        })?;

        let result = match mode {
            DeleteMode::Soft => self.repo.mark_deleted(id).await,
            DeleteMode::Hard => self.repo.delete_subtree(id).await,
        };

        result.map_err(|e| match e {
            // Removed concurrently by another request.
            RepoError::NotFound => CommentError::CommentNotFound,
            other => {
                tracing::error!("Failed to delete comment {} ({:?}): {}", id, mode, other);
                CommentError::Internal
            }
        })?;

        tracing::info!("Deleted comment {} ({:?})", id, mode);
        Ok(())
    }

    /// Ranked full-text search. Results are flat; a blank query returns
    /// nothing without touching storage.
    pub async fn search(&self, query: &str) -> Result<Vec<CommentNode>, CommentError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let hits = self.repo.search(query).await.map_err(|e| {
            tracing::error!("Failed to run search query: {}", e);
            CommentError::Internal
        })?;

        Ok(flatten_for_search(hits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::comment::{Comment, DELETED_PLACEHOLDER},
        repository::memory::{InMemoryCommentRepository, RepoCall},
        services::tree::MAX_NESTING_DEPTH,
    };
    use chrono::Utc;

    fn comment(id: i64, parent_id: Option<i64>, content: &str) -> Comment {
        Comment {
            id,
            parent_id,
            content: content.to_string(),
            author: "tester".to_string(),
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    fn service(repo: InMemoryCommentRepository) -> (CommentService, Arc<InMemoryCommentRepository>) {
        let repo = Arc::new(repo);
        (CommentService::new(repo.clone()), repo)
    }

    fn request(parent_id: Option<i64>, content: &str) -> CreateCommentRequest {
        CreateCommentRequest {
            parent_id,
            content: content.to_string(),
            author: "alice".to_string(),
        }
    }

    // --- create ---

    #[tokio::test]
    async fn test_create_without_parent_skips_lookup() {
        let (svc, repo) = service(InMemoryCommentRepository::new());

        let node = svc.create(request(None, "hello")).await.unwrap();
        assert_eq!(node.id, 1);
        assert_eq!(node.content, "hello");
        assert_eq!(node.author, "alice");
        assert!(node.replyable);
        assert!(!node.deleted);
        assert_eq!(repo.calls(), vec![RepoCall::Insert]);
    }

    #[tokio::test]
    async fn test_create_reply() {
        let (svc, repo) = service(InMemoryCommentRepository::with_comments(vec![comment(
            5, None, "root",
        )]));

        let node = svc.create(request(Some(5), "reply")).await.unwrap();
        assert_eq!(node.id, 6);
        assert_eq!(node.parent_id, Some(5));
        assert_eq!(repo.calls(), vec![RepoCall::FindById, RepoCall::Insert]);
    }

    #[tokio::test]
    async fn test_create_parent_not_found() {
        let (svc, repo) = service(InMemoryCommentRepository::new());

        let err = svc.create(request(Some(10), "orphan")).await.unwrap_err();
        assert_eq!(err, CommentError::ParentNotFound);
        assert_eq!(repo.calls(), vec![RepoCall::FindById]);
    }

    #[tokio::test]
    async fn test_create_parent_deleted() {
        let mut parent = comment(5, None, "gone");
        parent.deleted_at = Some(Utc::now());
        let (svc, repo) = service(InMemoryCommentRepository::with_comments(vec![parent]));

        let err = svc.create(request(Some(5), "reply")).await.unwrap_err();
        assert_eq!(err, CommentError::ParentDeleted);
        assert!(!repo.calls().contains(&RepoCall::Insert));
    }

    #[tokio::test]
    async fn test_create_lookup_failure_is_internal() {
        let repo = InMemoryCommentRepository::new().fail_on(RepoCall::FindById);
        let (svc, _) = service(repo);

        let err = svc.create(request(Some(1), "reply")).await.unwrap_err();
        assert_eq!(err, CommentError::Internal);
    }

    #[tokio::test]
    async fn test_create_insert_failure_is_internal() {
        let repo = InMemoryCommentRepository::new().fail_on(RepoCall::Insert);
        let (svc, _) = service(repo);

        let err = svc.create(request(None, "hello")).await.unwrap_err();
        assert_eq!(err, CommentError::Internal);
    }

    // --- list_roots ---

    #[tokio::test]
    async fn test_list_roots_returns_only_roots() {
        let (svc, _) = service(InMemoryCommentRepository::with_comments(vec![
            comment(1, None, "root1"),
            comment(2, Some(1), "child"),
            comment(3, None, "root2"),
        ]));

        let roots = svc.list_roots(RootListParams::default()).await.unwrap();
        assert_eq!(roots.iter().map(|n| n.id).collect::<Vec<_>>(), vec![1, 3]);
        assert!(roots.iter().all(|n| n.children.is_empty()));
    }

    #[tokio::test]
    async fn test_list_roots_normalizes_and_paginates() {
        let records = (1..=5).map(|id| comment(id, None, &format!("c{}", id))).collect();
        let (svc, _) = service(InMemoryCommentRepository::with_comments(records));

        let params = RootListParams {
            page: Some(2),
            limit: Some(2),
            sort: Some("TEXT".to_string()),
            order: Some("desc".to_string()),
        };
        let page = svc.list_roots(params).await.unwrap();
        assert_eq!(page.iter().map(|n| n.id).collect::<Vec<_>>(), vec![3, 2]);

        // An oversized limit falls back to the default page size.
        let params = RootListParams {
            limit: Some(500),
            ..RootListParams::default()
        };
        assert_eq!(svc.list_roots(params).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_list_roots_storage_failure() {
        let repo = InMemoryCommentRepository::new().fail_on(RepoCall::ListRoots);
        let (svc, _) = service(repo);

        let err = svc.list_roots(RootListParams::default()).await.unwrap_err();
        assert_eq!(err, CommentError::Internal);
    }

    // --- get_with_children ---

    #[tokio::test]
    async fn test_get_with_children_invalid_id() {
        let (svc, repo) = service(InMemoryCommentRepository::new());

        assert_eq!(svc.get_with_children(0).await.unwrap_err(), CommentError::InvalidId);
        assert_eq!(svc.get_with_children(-1).await.unwrap_err(), CommentError::InvalidId);
        assert!(repo.calls().is_empty());
    }

    #[tokio::test]
    async fn test_get_with_children_not_found() {
        let (svc, _) = service(InMemoryCommentRepository::new());

        let err = svc.get_with_children(1).await.unwrap_err();
        assert_eq!(err, CommentError::ParentNotFound);
    }

    #[tokio::test]
    async fn test_get_with_children_masks_but_keeps_replies() {
        let mut middle = comment(3, Some(2), "middle");
        middle.deleted_at = Some(Utc::now());
        let (svc, _) = service(InMemoryCommentRepository::with_comments(vec![
            comment(1, None, "top"),
            comment(2, Some(1), "branch"),
            middle,
            comment(4, Some(3), "leaf"),
            comment(5, None, "unrelated"),
        ]));

        let tree = svc.get_with_children(2).await.unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id, 2);

        let masked = &tree[0].children[0];
        assert_eq!(masked.content, DELETED_PLACEHOLDER);
        assert!(!masked.replyable);
        assert_eq!(masked.children[0].content, "leaf");
    }

    #[tokio::test]
    async fn test_get_with_children_fetch_failure() {
        let repo = InMemoryCommentRepository::with_comments(vec![comment(1, None, "root")])
            .fail_on(RepoCall::FetchSubtree);
        let (svc, _) = service(repo);

        let err = svc.get_with_children(1).await.unwrap_err();
        assert_eq!(err, CommentError::Internal);
    }

    #[tokio::test]
    async fn test_get_with_children_deep_thread_serializes() {
        let depth = 20_000;
        let mut records = vec![comment(1, None, "root")];
        records.extend((2..=depth).map(|id| comment(id, Some(id - 1), "reply")));
        let (svc, _) = service(InMemoryCommentRepository::with_comments(records));

        let tree = svc.get_with_children(1).await.unwrap();
        assert_eq!(tree.len(), 1);

        let mut count = 0;
        let mut level = 0;
        let mut pending: Vec<(&CommentNode, usize)> = vec![(&tree[0], 1)];
        while let Some((node, at)) = pending.pop() {
            count += 1;
            level = level.max(at);
            pending.extend(node.children.iter().map(|child| (child, at + 1)));
        }
        assert_eq!(count, depth as usize);
        assert_eq!(level, MAX_NESTING_DEPTH + 1);

        let body = serde_json::to_vec(&tree).unwrap();
        assert!(!body.is_empty());
        drop(tree);
    }

    // --- delete ---

    #[tokio::test]
    async fn test_delete_invalid_id_makes_no_calls() {
        let (svc, repo) = service(InMemoryCommentRepository::new());

        assert_eq!(svc.delete(0, DeleteMode::Soft).await.unwrap_err(), CommentError::InvalidId);
        assert_eq!(svc.delete(-5, DeleteMode::Hard).await.unwrap_err(), CommentError::InvalidId);
        assert!(repo.calls().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_comment() {
        let (svc, repo) = service(InMemoryCommentRepository::new());

        let err = svc.delete(3, DeleteMode::Hard).await.unwrap_err();
        assert_eq!(err, CommentError::CommentNotFound);
        assert_eq!(repo.calls(), vec![RepoCall::FindById]);
    }

    #[tokio::test]
    async fn test_soft_delete_marks_only_target() {
        let (svc, repo) = service(InMemoryCommentRepository::with_comments(vec![
            comment(1, None, "root"),
            comment(2, Some(1), "reply"),
        ]));

        svc.delete(1, DeleteMode::Soft).await.unwrap();
        assert_eq!(repo.calls(), vec![RepoCall::FindById, RepoCall::MarkDeleted]);

        let rows = repo.comments();
        assert!(rows[0].is_deleted());
        assert!(!rows[1].is_deleted());
    }

    #[tokio::test]
    async fn test_hard_delete_removes_subtree() {
        let (svc, repo) = service(InMemoryCommentRepository::with_comments(vec![
            comment(1, None, "root"),
            comment(2, Some(1), "reply"),
            comment(3, Some(2), "reply to reply"),
            comment(4, None, "other"),
        ]));

        svc.delete(1, DeleteMode::Hard).await.unwrap();
        assert_eq!(repo.calls(), vec![RepoCall::FindById, RepoCall::DeleteSubtree]);
        assert_eq!(repo.comments().iter().map(|c| c.id).collect::<Vec<_>>(), vec![4]);
    }

    #[tokio::test]
    async fn test_delete_storage_failure() {
        let repo = InMemoryCommentRepository::with_comments(vec![comment(1, None, "root")])
            .fail_on(RepoCall::MarkDeleted);
        let (svc, _) = service(repo);

        let err = svc.delete(1, DeleteMode::Soft).await.unwrap_err();
        assert_eq!(err, CommentError::Internal);
    }

    #[test]
    fn test_delete_mode_parse() {
        assert_eq!(DeleteMode::parse("soft"), Some(DeleteMode::Soft));
        assert_eq!(DeleteMode::parse("hard"), Some(DeleteMode::Hard));
        assert_eq!(DeleteMode::parse(""), None);
        assert_eq!(DeleteMode::parse("SOFT"), None);
    }

    // --- search ---

    #[tokio::test]
    async fn test_search_empty_query_skips_storage() {
        let (svc, repo) = service(InMemoryCommentRepository::new());

        assert!(svc.search("").await.unwrap().is_empty());
        assert!(svc.search("   ").await.unwrap().is_empty());
        assert!(repo.calls().is_empty());
    }

    #[tokio::test]
    async fn test_search_returns_flat_results() {
        let (svc, _) = service(InMemoryCommentRepository::with_comments(vec![
            comment(1, None, "rust is great"),
            comment(2, Some(1), "Rust tree compiler"),
            comment(3, None, "something else"),
        ]));

        let hits = svc.search("rust").await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|n| n.children.is_empty()));
    }

    #[tokio::test]
    async fn test_search_storage_failure() {
        let repo = InMemoryCommentRepository::new().fail_on(RepoCall::Search);
        let (svc, _) = service(repo);

        assert_eq!(svc.search("rust").await.unwrap_err(), CommentError::Internal);
    }
}
