// src/repository/memory.rs

use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::Utc;

use super::{CommentRepository, RepoError};
use crate::{
    models::comment::Comment,
    services::pagination::{SortKey, SortOrder},
};

/// Storage operation, as recorded in the call log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepoCall {
    FindById,
    Insert,
    ListRoots,
    FetchSubtree,
    DeleteSubtree,
    MarkDeleted,
    Search,
}

#[derive(Default)]
struct Store {
    comments: Vec<Comment>,
    next_id: i64,
    calls: Vec<RepoCall>,
    failing: HashSet<RepoCall>,
}

/// In-process comment storage.
///
/// Records every call it receives and can be told to fail specific
/// operations, so the service and the HTTP layer can be tested without a
/// database.
#[derive(Default)]
pub struct InMemoryCommentRepository {
    store: Mutex<Store>,
}

impl InMemoryCommentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from existing rows. New IDs continue after the highest one.
    pub fn with_comments(comments: Vec<Comment>) -> Self {
        let next_id = comments.iter().map(|c| c.id).max().unwrap_or(0);
        Self {
            store: Mutex::new(Store {
                comments,
                next_id,
                ..Store::default()
            }),
        }
    }

    /// Makes every later `call` fail with a database error.
    pub fn fail_on(self, call: RepoCall) -> Self {
        self.lock().failing.insert(call);
        self
    }

    /// Operations received so far, in order.
    pub fn calls(&self) -> Vec<RepoCall> {
        self.lock().calls.clone()
    }

    /// Current rows, in insertion order.
    pub fn comments(&self) -> Vec<Comment> {
        self.lock().comments.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Logs the call and returns the store, or the injected failure.
    fn enter(&self, call: RepoCall) -> Result<MutexGuard<'_, Store>, RepoError> {
        let mut store = self.lock();
        store.calls.push(call);
        if store.failing.contains(&call) {
            return Err(RepoError::Database(sqlx::Error::PoolClosed));
        }
        Ok(store)
    }
}

/// IDs of `id` and all of its descendants, breadth first.
fn subtree_ids(comments: &[Comment], id: i64) -> Vec<i64> {
    if !comments.iter().any(|c| c.id == id) {
        return Vec::new();
    }

    let mut replies: HashMap<i64, Vec<&Comment>> = HashMap::new();
    for comment in comments {
        if let Some(parent_id) = comment.parent_id {
            replies.entry(parent_id).or_default().push(comment);
        }
    }
    for siblings in replies.values_mut() {
        siblings.sort_by_key(|c| (c.created_at, c.id));
    }

    let mut ids = Vec::new();
    let mut queue = VecDeque::from([id]);
    while let Some(current) = queue.pop_front() {
        ids.push(current);
        if let Some(siblings) = replies.get(&current) {
            queue.extend(siblings.iter().map(|c| c.id));
        }
    }
    ids
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn find_by_id(&self, id: i64) -> Result<Comment, RepoError> {
        let store = self.enter(RepoCall::FindById)?;
        store
            .comments
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn insert(
        &self,
        parent_id: Option<i64>,
        content: &str,
        author: &str,
    ) -> Result<Comment, RepoError> {
        let mut store = self.enter(RepoCall::Insert)?;
        store.next_id += 1;

        let comment = Comment {
            id: store.next_id,
            parent_id,
            content: content.to_string(),
            author: author.to_string(),
            created_at: Utc::now(),
            deleted_at: None,
        };
        store.comments.push(comment.clone());
        Ok(comment)
    }

    async fn list_roots(
        &self,
        limit: i64,
        offset: i64,
        sort: SortKey,
        order: SortOrder,
    ) -> Result<Vec<Comment>, RepoError> {
        let store = self.enter(RepoCall::ListRoots)?;

        let mut roots: Vec<Comment> = store
            .comments
            .iter()
            .filter(|c| c.parent_id.is_none())
            .cloned()
            .collect();

        roots.sort_by(|a, b| {
            let by_key = match sort {
                SortKey::Author => a.author.cmp(&b.author),
                SortKey::Content => a.content.cmp(&b.content),
                SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            by_key.then(a.id.cmp(&b.id))
        });
        if order == SortOrder::Desc {
            roots.reverse();
        }

        Ok(roots
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn fetch_subtree(&self, id: i64) -> Result<Vec<Comment>, RepoError> {
        let store = self.enter(RepoCall::FetchSubtree)?;

        let by_id: HashMap<i64, &Comment> = store.comments.iter().map(|c| (c.id, c)).collect();
        Ok(subtree_ids(&store.comments, id)
            .into_iter()
            .filter_map(|sid| by_id.get(&sid).map(|c| (*c).clone()))
            .collect())
    }

    async fn delete_subtree(&self, id: i64) -> Result<(), RepoError> {
        let mut store = self.enter(RepoCall::DeleteSubtree)?;

        let doomed: HashSet<i64> = subtree_ids(&store.comments, id).into_iter().collect();
        if doomed.is_empty() {
            return Err(RepoError::NotFound);
        }
        store.comments.retain(|c| !doomed.contains(&c.id));
        Ok(())
    }

    async fn mark_deleted(&self, id: i64) -> Result<(), RepoError> {
        let mut store = self.enter(RepoCall::MarkDeleted)?;

        let comment = store
            .comments
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(RepoError::NotFound)?;
        comment.deleted_at.get_or_insert_with(Utc::now);
        Ok(())
    }

    async fn search(&self, query: &str) -> Result<Vec<Comment>, RepoError> {
        let store = self.enter(RepoCall::Search)?;

        let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        let mut hits: Vec<Comment> = store
            .comments
            .iter()
            .filter(|c| !c.is_deleted())
            .filter(|c| {
                let text = c.content.to_lowercase();
                !terms.is_empty() && terms.iter().all(|t| text.contains(t.as_str()))
            })
            .cloned()
            .collect();

        hits.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(hits)
    }
}
