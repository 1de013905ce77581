// src/repository/postgres.rs

use async_trait::async_trait;
use sqlx::PgPool;

use super::{CommentRepository, RepoError};
use crate::{
    models::comment::Comment,
    services::pagination::{SortKey, SortOrder},
};

/// PostgreSQL-backed comment storage.
#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
    search_limit: i64,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool, search_limit: i64) -> Self {
        Self { pool, search_limit }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn find_by_id(&self, id: i64) -> Result<Comment, RepoError> {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, parent_id, content, author, created_at, deleted_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepoError::NotFound)
    }

    async fn insert(
        &self,
        parent_id: Option<i64>,
        content: &str,
        author: &str,
    ) -> Result<Comment, RepoError> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (parent_id, content, author)
            VALUES ($1, $2, $3)
            RETURNING id, parent_id, content, author, created_at, deleted_at
            "#,
        )
        .bind(parent_id)
        .bind(content)
        .bind(author)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn list_roots(
        &self,
        limit: i64,
        offset: i64,
        sort: SortKey,
        order: SortOrder,
    ) -> Result<Vec<Comment>, RepoError> {
        // Column and direction come from closed enums, never from raw input.
        let sql = format!(
            r#"
            SELECT id, parent_id, content, author, created_at, deleted_at
            FROM comments
            WHERE parent_id IS NULL
            ORDER BY {column} {direction}, id {direction}
            LIMIT $1
            OFFSET $2
            "#,
            column = sort.column(),
            direction = order.as_sql(),
        );

        let comments = sqlx::query_as::<_, Comment>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(comments)
    }

    async fn fetch_subtree(&self, id: i64) -> Result<Vec<Comment>, RepoError> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            WITH RECURSIVE comment_tree AS (
                SELECT id, parent_id, content, author, created_at, deleted_at, 0 AS depth
                FROM comments
                WHERE id = $1

                UNION ALL

                SELECT c.id, c.parent_id, c.content, c.author, c.created_at, c.deleted_at, ct.depth + 1
                FROM comments c
                JOIN comment_tree ct ON c.parent_id = ct.id
            )
            SELECT id, parent_id, content, author, created_at, deleted_at
            FROM comment_tree
            ORDER BY depth ASC, created_at ASC, id ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    async fn delete_subtree(&self, id: i64) -> Result<(), RepoError> {
        let result = sqlx::query(
            r#"
            WITH RECURSIVE comment_tree AS (
                SELECT id
                FROM comments
                WHERE id = $1

                UNION ALL

                SELECT c.id
                FROM comments c
                JOIN comment_tree ct ON c.parent_id = ct.id
            )
            DELETE FROM comments
            WHERE id IN (SELECT id FROM comment_tree)
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn mark_deleted(&self, id: i64) -> Result<(), RepoError> {
        // Keep the first deletion time if the comment is deleted twice.
        let result = sqlx::query(
            "UPDATE comments SET deleted_at = COALESCE(deleted_at, NOW()) WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn search(&self, query: &str) -> Result<Vec<Comment>, RepoError> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, parent_id, content, author, created_at, deleted_at
            FROM comments
            WHERE deleted_at IS NULL
              AND content_tsv @@ websearch_to_tsquery('simple', $1)
            ORDER BY ts_rank(content_tsv, websearch_to_tsquery('simple', $1)) DESC,
                     created_at DESC
            LIMIT $2
            "#,
        )
        .bind(query)
        .bind(self.search_limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }
}
