// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite};
use validator::{Validate, ValidationError};

use crate::utils::form::FormFields;

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,

    /// Always set; blank submissions are replaced by the configured placeholder.
    pub image_url: String,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Template value: the row plus the derived `full_name`.
    pub fn to_value(&self) -> minijinja::Value {
        minijinja::context! {
            full_name => self.full_name(),
            ..minijinja::Value::from_serialize(self)
        }
    }

    /// All users, by last name then first name.
    pub async fn all<'e, E>(executor: E) -> Result<Vec<User>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, first_name, last_name, image_url
            FROM users
            ORDER BY last_name, first_name
            "#,
        )
        .fetch_all(executor)
        .await
    }

    pub async fn find<'e, E>(executor: E, id: i64) -> Result<Option<User>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, User>(
            "SELECT id, first_name, last_name, image_url FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    pub async fn insert<'e, E>(executor: E, data: &UserData) -> Result<User, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (first_name, last_name, image_url)
            VALUES (?, ?, ?)
            RETURNING id, first_name, last_name, image_url
            "#,
        )
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.image_url)
        .fetch_one(executor)
        .await
    }

    /// Full replacement of the mutable columns.
    pub async fn update<'e, E>(executor: E, id: i64, data: &UserData) -> Result<User, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET first_name = ?, last_name = ?, image_url = ?
            WHERE id = ?
            RETURNING id, first_name, last_name, image_url
            "#,
        )
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.image_url)
        .bind(id)
        .fetch_one(executor)
        .await
    }

    /// Owned posts go with the user (ON DELETE CASCADE).
    pub async fn delete<'e, E>(executor: E, id: i64) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Validated column values ready to be written.
#[derive(Debug, Clone)]
pub struct UserData {
    pub first_name: String,
    pub last_name: String,
    pub image_url: String,
}

/// Submitted user form (`first_name`, `last_name`, optional `image_url`).
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct UserForm {
    #[validate(length(min = 1, max = 50, message = "First name must be between 1 and 50 characters."))]
    pub first_name: String,

    #[validate(length(min = 1, max = 50, message = "Last name must be between 1 and 50 characters."))]
    pub last_name: String,

    #[validate(length(max = 500, message = "Image URL must be at most 500 characters."), custom(function = validate_image_url))]
    pub image_url: String,
}

impl UserForm {
    pub fn from_fields(fields: &FormFields) -> Self {
        Self {
            first_name: fields.text("first_name"),
            last_name: fields.text("last_name"),
            image_url: fields.text("image_url"),
        }
    }

    /// Pre-populated edit form. A stored placeholder is shown as-is.
    pub fn from_user(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            image_url: user.image_url.clone(),
        }
    }

    /// Column values, with a blank image URL replaced by `default_image_url`.
    /// Applied on both create and update.
    pub fn into_data(self, default_image_url: &str) -> UserData {
        let image_url = if self.image_url.is_empty() {
            default_image_url.to_string()
        } else {
            self.image_url
        };

        UserData {
            first_name: self.first_name,
            last_name: self.last_name,
            image_url,
        }
    }
}

/// Blank is allowed (placeholder applies); otherwise it must be an absolute
/// http or https URL, since it ends up in an `<img src>`.
fn validate_image_url(url: &str) -> Result<(), ValidationError> {
    if url.is_empty() {
        return Ok(());
    }
    if let Ok(parsed) = url::Url::parse(url) {
        if matches!(parsed.scheme(), "http" | "https") {
            return Ok(());
        }
    }
    Err(ValidationError::new("invalid_url").with_message("Image URL must be a valid URL.".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLACEHOLDER: &str = "https://example.com/default.png";

    fn form(first: &str, last: &str, image: &str) -> UserForm {
        let fields: FormFields = [("first_name", first), ("last_name", last), ("image_url", image)]
            .into_iter()
            .collect();
        UserForm::from_fields(&fields)
    }

    #[test]
    fn full_name_joins_first_and_last() {
        let user = User {
            id: 1,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            image_url: PLACEHOLDER.to_string(),
        };
        assert_eq!(user.full_name(), "Ada Lovelace");
    }

    #[test]
    fn blank_image_url_falls_back_to_placeholder() {
        let data = form("Ada", "Lovelace", "   ").into_data(PLACEHOLDER);
        assert_eq!(data.image_url, PLACEHOLDER);

        let data = form("Ada", "Lovelace", "https://example.com/ada.jpg").into_data(PLACEHOLDER);
        assert_eq!(data.image_url, "https://example.com/ada.jpg");
    }

    #[test]
    fn names_are_required() {
        let errors = form("Ada", "", "").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("last_name"));
        assert!(!errors.field_errors().contains_key("first_name"));
    }

    #[test]
    fn image_url_must_parse_when_present() {
        assert!(form("Ada", "Lovelace", "not a url").validate().is_err());
        assert!(form("Ada", "Lovelace", "").validate().is_ok());
    }

    #[test]
    fn image_url_must_be_http_or_https() {
        assert!(form("Ada", "Lovelace", "http://example.com/ada.png").validate().is_ok());
        assert!(form("Ada", "Lovelace", "https://example.com/ada.png").validate().is_ok());
        assert!(form("Ada", "Lovelace", "javascript:alert(1)").validate().is_err());
        assert!(form("Ada", "Lovelace", "data:image/png;base64,AAAA").validate().is_err());
        assert!(form("Ada", "Lovelace", "ftp://example.com/ada.png").validate().is_err());
    }
}
