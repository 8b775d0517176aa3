use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, QueryBuilder, Sqlite, SqliteConnection};
use validator::Validate;

use crate::{models::post::Post, utils::form::FormFields};

/// Represents the 'tags' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,

    /// Unique (enforced by the schema).
    pub name: String,
}

impl Tag {
    pub async fn all<'e, E>(executor: E) -> Result<Vec<Tag>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Tag>("SELECT id, name FROM tags")
            .fetch_all(executor)
            .await
    }

    pub async fn find<'e, E>(executor: E, id: i64) -> Result<Option<Tag>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Tag>("SELECT id, name FROM tags WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Tags whose id is in `ids`. Ids that match nothing are simply absent.
    pub async fn find_many<'e, E>(executor: E, ids: &[i64]) -> Result<Vec<Tag>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT id, name FROM tags WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        builder.build_query_as::<Tag>().fetch_all(executor).await
    }

    /// Tags attached to a post, by name.
    pub async fn for_post<'e, E>(executor: E, post_id: i64) -> Result<Vec<Tag>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.id, t.name
            FROM tags t
            JOIN post_tags pt ON pt.tag_id = t.id
            WHERE pt.post_id = ?
            ORDER BY t.name
            "#,
        )
        .bind(post_id)
        .fetch_all(executor)
        .await
    }

    pub async fn insert<'e, E>(executor: E, name: &str) -> Result<Tag, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Tag>("INSERT INTO tags (name) VALUES (?) RETURNING id, name")
            .bind(name)
            .fetch_one(executor)
            .await
    }

    pub async fn update<'e, E>(executor: E, id: i64, name: &str) -> Result<Tag, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Tag>("UPDATE tags SET name = ? WHERE id = ? RETURNING id, name")
            .bind(name)
            .bind(id)
            .fetch_one(executor)
            .await
    }

    /// Removes the tag and its join rows; tagged posts are untouched.
    pub async fn delete<'e, E>(executor: E, id: i64) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Replace the tag's post set with exactly `posts`.
    pub async fn set_posts(
        conn: &mut SqliteConnection,
        tag_id: i64,
        posts: &[Post],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM post_tags WHERE tag_id = ?")
            .bind(tag_id)
            .execute(&mut *conn)
            .await?;

        if posts.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("INSERT INTO post_tags (post_id, tag_id) ");
        builder.push_values(posts, |mut row, post| {
            row.push_bind(post.id).push_bind(tag_id);
        });
        builder.build().execute(&mut *conn).await?;

        Ok(())
    }
}

/// Submitted tag form (`name`, zero or more `posts`).
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct TagForm {
    #[validate(length(min = 1, max = 50, message = "Tag name must be between 1 and 50 characters."))]
    pub name: String,

    pub post_ids: Vec<i64>,
}

impl TagForm {
    pub fn from_fields(fields: &FormFields) -> Self {
        Self {
            name: fields.text("name"),
            post_ids: fields.ids("posts"),
        }
    }

    pub fn from_tag(tag: &Tag, posts: &[Post]) -> Self {
        Self {
            name: tag.name.clone(),
            post_ids: posts.iter().map(|p| p.id).collect(),
        }
    }
}
