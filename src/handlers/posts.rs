use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::Response,
};
use chrono::Utc;
use minijinja::context;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    handlers::reject_form,
    models::{
        post::{Post, PostForm},
        tag::Tag,
        user::User,
    },
    templates::render_page,
    utils::{
        extract::EntityId,
        flash::{Flash, redirect_with_flash},
        form::{FormFields, error_messages},
    },
};

fn post_not_found() -> AppError {
    AppError::NotFound("Post not found".to_string())
}

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}

/// New-post form for an existing user, offering every tag.
pub async fn new_post_form(
    State(pool): State<SqlitePool>,
    EntityId(user_id): EntityId,
    flash: Flash,
) -> Result<Response, AppError> {
    let user = User::find(&pool, user_id).await?.ok_or_else(user_not_found)?;
    let tags = Tag::all(&pool).await?;

    render_page(
        "posts/new.html",
        context! {
            user => user.to_value(),
            tags => tags,
            form => PostForm::default(),
            errors => Vec::<String>::new(),
        },
        &flash,
    )
}

/// Creates a post owned by the user. Selected tag ids that do not exist are ignored.
pub async fn create_post(
    State(pool): State<SqlitePool>,
    EntityId(user_id): EntityId,
    flash: Flash,
    Form(fields): Form<FormFields>,
) -> Result<Response, AppError> {
    let mut tx = pool.begin().await?;
    let user = User::find(&mut *tx, user_id).await?.ok_or_else(user_not_found)?;

    let form = PostForm::from_fields(&fields);
    if let Err(validation_errors) = form.validate() {
        let tags = Tag::all(&mut *tx).await?;
        return reject_form(
            StatusCode::BAD_REQUEST,
            "posts/new.html",
            context! {
                user => user.to_value(),
                tags => tags,
                form => form,
                errors => error_messages(&validation_errors),
            },
            &flash,
        );
    }

    let tags = Tag::find_many(&mut *tx, &form.tag_ids).await?;
    let post = Post::insert(&mut *tx, user.id, &form.title, &form.content, Utc::now())
        .await
        .map_err(|e| {
            tracing::error!("Failed to create post for user {}: {:?}", user.id, e);
            AppError::from(e)
        })?;
    Post::set_tags(&mut *tx, post.id, &tags).await?;
    tx.commit().await?;

    tracing::info!(post_id = post.id, user_id = user.id, tags = tags.len(), "Post created");
    Ok(redirect_with_flash(
        &format!("/users/{}", user.id),
        format!("Post {} added.", post.title),
    ))
}

/// Post detail with its author and tags.
pub async fn show_post(
    State(pool): State<SqlitePool>,
    EntityId(id): EntityId,
    flash: Flash,
) -> Result<Response, AppError> {
    let post = Post::find(&pool, id).await?.ok_or_else(post_not_found)?;
    let user = User::find(&pool, post.user_id).await?.ok_or_else(|| {
        AppError::InternalServerError(format!("post {} has no owner {}", post.id, post.user_id))
    })?;
    let tags = Tag::for_post(&pool, post.id).await?;

    render_page(
        "posts/show.html",
        context! { post => post, user => user.to_value(), tags => tags },
        &flash,
    )
}

pub async fn edit_post_form(
    State(pool): State<SqlitePool>,
    EntityId(id): EntityId,
    flash: Flash,
) -> Result<Response, AppError> {
    let post = Post::find(&pool, id).await?.ok_or_else(post_not_found)?;
    let selected = Tag::for_post(&pool, post.id).await?;
    let tags = Tag::all(&pool).await?;
    let form = PostForm::from_post(&post, &selected);

    render_page(
        "posts/edit.html",
        context! { post => post, tags => tags, form => form, errors => Vec::<String>::new() },
        &flash,
    )
}

/// Overwrites title and content and replaces the whole tag set.
pub async fn update_post(
    State(pool): State<SqlitePool>,
    EntityId(id): EntityId,
    flash: Flash,
    Form(fields): Form<FormFields>,
) -> Result<Response, AppError> {
    let mut tx = pool.begin().await?;
    let post = Post::find(&mut *tx, id).await?.ok_or_else(post_not_found)?;

    let form = PostForm::from_fields(&fields);
    if let Err(validation_errors) = form.validate() {
        let tags = Tag::all(&mut *tx).await?;
        return reject_form(
            StatusCode::BAD_REQUEST,
            "posts/edit.html",
            context! { post => post, tags => tags, form => form, errors => error_messages(&validation_errors) },
            &flash,
        );
    }

    let post = Post::update(&mut *tx, post.id, &form.title, &form.content)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update post {}: {:?}", id, e);
            AppError::from(e)
        })?;
    let tags = Tag::find_many(&mut *tx, &form.tag_ids).await?;
    Post::set_tags(&mut *tx, post.id, &tags).await?;
    tx.commit().await?;

    tracing::info!(post_id = post.id, tags = tags.len(), "Post updated");
    Ok(redirect_with_flash(
        &format!("/users/{}", post.user_id),
        format!("Post {} edited.", post.title),
    ))
}

/// Deletes a post; its tag associations go with it, the tags stay.
pub async fn delete_post(
    State(pool): State<SqlitePool>,
    EntityId(id): EntityId,
) -> Result<Response, AppError> {
    let mut tx = pool.begin().await?;
    let post = Post::find(&mut *tx, id).await?.ok_or_else(post_not_found)?;

    Post::delete(&mut *tx, post.id).await.map_err(|e| {
        tracing::error!("Failed to delete post {}: {:?}", id, e);
        AppError::from(e)
    })?;
    tx.commit().await?;

    tracing::info!(post_id = post.id, user_id = post.user_id, "Post deleted");
    Ok(redirect_with_flash(
        &format!("/users/{}", post.user_id),
        format!("Post {} deleted.", post.title),
    ))
}
