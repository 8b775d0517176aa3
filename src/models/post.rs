use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, QueryBuilder, Sqlite, SqliteConnection};
use validator::Validate;

use crate::{models::tag::Tag, utils::form::FormFields};

/// Represents the 'posts' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,

    /// Set once at creation, never updated.
    pub created_at: DateTime<Utc>,

    pub user_id: i64,
}

/// Homepage row: a post plus its author's name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PostSummary {
    pub id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub user_id: i64,
    pub author: String,
}

impl Post {
    /// The `limit` most recently created posts, newest first.
    pub async fn latest<'e, E>(executor: E, limit: i64) -> Result<Vec<PostSummary>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, PostSummary>(
            r#"
            SELECT
                p.id, p.title, p.created_at, p.user_id,
                u.first_name || ' ' || u.last_name AS author
            FROM posts p
            JOIN users u ON u.id = p.user_id
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(executor)
        .await
    }

    pub async fn all<'e, E>(executor: E) -> Result<Vec<Post>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Post>("SELECT id, title, content, created_at, user_id FROM posts")
            .fetch_all(executor)
            .await
    }

    pub async fn find<'e, E>(executor: E, id: i64) -> Result<Option<Post>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Post>(
            "SELECT id, title, content, created_at, user_id FROM posts WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Posts whose id is in `ids`. Ids that match nothing are simply absent.
    pub async fn find_many<'e, E>(executor: E, ids: &[i64]) -> Result<Vec<Post>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, title, content, created_at, user_id FROM posts WHERE id IN (",
        );
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        builder.build_query_as::<Post>().fetch_all(executor).await
    }

    /// A user's posts, newest first.
    pub async fn for_user<'e, E>(executor: E, user_id: i64) -> Result<Vec<Post>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, content, created_at, user_id
            FROM posts
            WHERE user_id = ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await
    }

    /// Posts carrying a tag, newest first.
    pub async fn for_tag<'e, E>(executor: E, tag_id: i64) -> Result<Vec<Post>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT p.id, p.title, p.content, p.created_at, p.user_id
            FROM posts p
            JOIN post_tags pt ON pt.post_id = p.id
            WHERE pt.tag_id = ?
            ORDER BY p.created_at DESC, p.id DESC
            "#,
        )
        .bind(tag_id)
        .fetch_all(executor)
        .await
    }

    pub async fn insert<'e, E>(
        executor: E,
        user_id: i64,
        title: &str,
        content: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Post, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (title, content, created_at, user_id)
            VALUES (?, ?, ?, ?)
            RETURNING id, title, content, created_at, user_id
            "#,
        )
        .bind(title)
        .bind(content)
        .bind(created_at)
        .bind(user_id)
        .fetch_one(executor)
        .await
    }

    /// Overwrites title and content. `created_at` and the owner never change.
    pub async fn update<'e, E>(
        executor: E,
        id: i64,
        title: &str,
        content: &str,
    ) -> Result<Post, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts SET title = ?, content = ?
            WHERE id = ?
            RETURNING id, title, content, created_at, user_id
            "#,
        )
        .bind(title)
        .bind(content)
        .bind(id)
        .fetch_one(executor)
        .await
    }

    /// Join rows to tags go with the post; the tags stay.
    pub async fn delete<'e, E>(executor: E, id: i64) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Replace the post's tag set with exactly `tags`.
    pub async fn set_tags(
        conn: &mut SqliteConnection,
        post_id: i64,
        tags: &[Tag],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM post_tags WHERE post_id = ?")
            .bind(post_id)
            .execute(&mut *conn)
            .await?;

        if tags.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("INSERT INTO post_tags (post_id, tag_id) ");
        builder.push_values(tags, |mut row, tag| {
            row.push_bind(post_id).push_bind(tag.id);
        });
        builder.build().execute(&mut *conn).await?;

        Ok(())
    }
}

/// Submitted post form (`title`, `content`, zero or more `tags`).
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct PostForm {
    #[validate(length(min = 1, max = 100, message = "Title must be between 1 and 100 characters."))]
    pub title: String,

    #[validate(length(min = 1, max = 10000, message = "Content must be between 1 and 10000 characters."))]
    pub content: String,

    /// Selected tag ids, as submitted. Resolution against the store happens later.
    pub tag_ids: Vec<i64>,
}

impl PostForm {
    pub fn from_fields(fields: &FormFields) -> Self {
        Self {
            title: fields.text("title"),
            content: fields.text("content"),
            tag_ids: fields.ids("tags"),
        }
    }

    pub fn from_post(post: &Post, tags: &[Tag]) -> Self {
        Self {
            title: post.title.clone(),
            content: post.content.clone(),
            tag_ids: tags.iter().map(|t| t.id).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_collects_every_selected_tag() {
        let fields: FormFields = [
            ("title", "First"),
            ("content", "Hello"),
            ("tags", "2"),
            ("tags", "5"),
        ]
        .into_iter()
        .collect();

        let form = PostForm::from_fields(&fields);
        assert_eq!(form.title, "First");
        assert_eq!(form.tag_ids, vec![2, 5]);
        assert!(form.validate().is_ok());
    }

    #[test]
    fn blank_title_is_rejected() {
        let fields: FormFields = [("title", "  "), ("content", "Hello")].into_iter().collect();
        let errors = PostForm::from_fields(&fields).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
    }
}
