use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::Response,
};
use minijinja::{Value, context};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    handlers::reject_form,
    models::{
        post::Post,
        user::{User, UserForm},
    },
    templates::render_page,
    utils::{
        extract::EntityId,
        flash::{Flash, redirect_with_flash},
        form::{FormFields, error_messages},
    },
};

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}

/// Lists all users, by last name then first name.
pub async fn list_users(
    State(pool): State<SqlitePool>,
    flash: Flash,
) -> Result<Response, AppError> {
    let users = User::all(&pool).await.map_err(|e| {
        tracing::error!("Failed to list users: {:?}", e);
        AppError::from(e)
    })?;
    let users: Vec<Value> = users.iter().map(User::to_value).collect();

    render_page("users/index.html", context! { users => users }, &flash)
}

pub async fn new_user_form(flash: Flash) -> Result<Response, AppError> {
    render_page(
        "users/new.html",
        context! { form => UserForm::default(), errors => Vec::<String>::new() },
        &flash,
    )
}

/// Creates a user. A blank image URL gets the configured placeholder.
pub async fn create_user(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    flash: Flash,
    Form(fields): Form<FormFields>,
) -> Result<Response, AppError> {
    let form = UserForm::from_fields(&fields);
    if let Err(validation_errors) = form.validate() {
        return reject_form(
            StatusCode::BAD_REQUEST,
            "users/new.html",
            context! { form => form, errors => error_messages(&validation_errors) },
            &flash,
        );
    }

    let data = form.into_data(&config.default_image_url);

    let mut tx = pool.begin().await?;
    let user = User::insert(&mut *tx, &data).await.map_err(|e| {
        tracing::error!("Failed to create user: {:?}", e);
        AppError::from(e)
    })?;
    tx.commit().await?;

    tracing::info!(user_id = user.id, "User created");
    Ok(redirect_with_flash("/users", format!("User {} added.", user.full_name())))
}

/// User detail with the user's posts.
pub async fn show_user(
    State(pool): State<SqlitePool>,
    EntityId(id): EntityId,
    flash: Flash,
) -> Result<Response, AppError> {
    let user = User::find(&pool, id).await?.ok_or_else(user_not_found)?;
    let posts = Post::for_user(&pool, user.id).await?;

    render_page(
        "users/show.html",
        context! { user => user.to_value(), posts => posts },
        &flash,
    )
}

pub async fn edit_user_form(
    State(pool): State<SqlitePool>,
    EntityId(id): EntityId,
    flash: Flash,
) -> Result<Response, AppError> {
    let user = User::find(&pool, id).await?.ok_or_else(user_not_found)?;
    let form = UserForm::from_user(&user);

    render_page(
        "users/edit.html",
        context! { user => user.to_value(), form => form, errors => Vec::<String>::new() },
        &flash,
    )
}

/// Replaces first name, last name and image URL.
pub async fn update_user(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    EntityId(id): EntityId,
    flash: Flash,
    Form(fields): Form<FormFields>,
) -> Result<Response, AppError> {
    let mut tx = pool.begin().await?;
    let user = User::find(&mut *tx, id).await?.ok_or_else(user_not_found)?;

    let form = UserForm::from_fields(&fields);
    if let Err(validation_errors) = form.validate() {
        return reject_form(
            StatusCode::BAD_REQUEST,
            "users/edit.html",
            context! { user => user.to_value(), form => form, errors => error_messages(&validation_errors) },
            &flash,
        );
    }

    let data = form.into_data(&config.default_image_url);
    let user = User::update(&mut *tx, user.id, &data).await.map_err(|e| {
        tracing::error!("Failed to update user {}: {:?}", id, e);
        AppError::from(e)
    })?;
    tx.commit().await?;

    tracing::info!(user_id = user.id, "User updated");
    Ok(redirect_with_flash("/users", format!("User {} edited.", user.full_name())))
}

/// Deletes a user; the schema cascades the delete to their posts.
pub async fn delete_user(
    State(pool): State<SqlitePool>,
    EntityId(id): EntityId,
) -> Result<Response, AppError> {
    let mut tx = pool.begin().await?;
    let user = User::find(&mut *tx, id).await?.ok_or_else(user_not_found)?;

    User::delete(&mut *tx, user.id).await.map_err(|e| {
        tracing::error!("Failed to delete user {}: {:?}", id, e);
        AppError::from(e)
    })?;
    tx.commit().await?;

    tracing::info!(user_id = user.id, "User deleted");
    Ok(redirect_with_flash("/users", format!("User {} deleted.", user.full_name())))
}
