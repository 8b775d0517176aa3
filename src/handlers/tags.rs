use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::Response,
};
use minijinja::context;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::{AppError, is_unique_violation},
    handlers::reject_form,
    models::{
        post::Post,
        tag::{Tag, TagForm},
    },
    templates::render_page,
    utils::{
        extract::EntityId,
        flash::{Flash, redirect_with_flash},
        form::{FormFields, error_messages},
    },
};

fn tag_not_found() -> AppError {
    AppError::NotFound("Tag not found".to_string())
}

fn duplicate_name(name: &str) -> String {
    format!("Tag '{}' already exists.", name)
}

/// Lists all tags in store order.
pub async fn list_tags(
    State(pool): State<SqlitePool>,
    flash: Flash,
) -> Result<Response, AppError> {
    let tags = Tag::all(&pool).await.map_err(|e| {
        tracing::error!("Failed to list tags: {:?}", e);
        AppError::from(e)
    })?;

    render_page("tags/index.html", context! { tags => tags }, &flash)
}

pub async fn new_tag_form(
    State(pool): State<SqlitePool>,
    flash: Flash,
) -> Result<Response, AppError> {
    let posts = Post::all(&pool).await?;

    render_page(
        "tags/new.html",
        context! { posts => posts, form => TagForm::default(), errors => Vec::<String>::new() },
        &flash,
    )
}

/// Creates a tag attached to the selected posts. Unknown post ids are ignored.
pub async fn create_tag(
    State(pool): State<SqlitePool>,
    flash: Flash,
    Form(fields): Form<FormFields>,
) -> Result<Response, AppError> {
    let form = TagForm::from_fields(&fields);
    if let Err(validation_errors) = form.validate() {
        let posts = Post::all(&pool).await?;
        return reject_form(
            StatusCode::BAD_REQUEST,
            "tags/new.html",
            context! { posts => posts, form => form, errors => error_messages(&validation_errors) },
            &flash,
        );
    }

    let mut tx = pool.begin().await?;
    let tag = match Tag::insert(&mut *tx, &form.name).await {
        Ok(tag) => tag,
        Err(e) if is_unique_violation(&e) => {
            let posts = Post::all(&mut *tx).await?;
            let errors = vec![duplicate_name(&form.name)];
            return reject_form(
                StatusCode::CONFLICT,
                "tags/new.html",
                context! { posts => posts, form => form, errors => errors },
                &flash,
            );
        }
        Err(e) => {
            tracing::error!("Failed to create tag: {:?}", e);
            return Err(e.into());
        }
    };

    let posts = Post::find_many(&mut *tx, &form.post_ids).await?;
    Tag::set_posts(&mut *tx, tag.id, &posts).await?;
    tx.commit().await?;

    tracing::info!(tag_id = tag.id, posts = posts.len(), "Tag created");
    Ok(redirect_with_flash("/tags", format!("Tag {} added.", tag.name)))
}

/// Tag detail with its posts.
pub async fn show_tag(
    State(pool): State<SqlitePool>,
    EntityId(id): EntityId,
    flash: Flash,
) -> Result<Response, AppError> {
    let tag = Tag::find(&pool, id).await?.ok_or_else(tag_not_found)?;
    let posts = Post::for_tag(&pool, tag.id).await?;

    render_page("tags/show.html", context! { tag => tag, posts => posts }, &flash)
}

pub async fn edit_tag_form(
    State(pool): State<SqlitePool>,
    EntityId(id): EntityId,
    flash: Flash,
) -> Result<Response, AppError> {
    let tag = Tag::find(&pool, id).await?.ok_or_else(tag_not_found)?;
    let selected = Post::for_tag(&pool, tag.id).await?;
    let posts = Post::all(&pool).await?;
    let form = TagForm::from_tag(&tag, &selected);

    render_page(
        "tags/edit.html",
        context! { tag => tag, posts => posts, form => form, errors => Vec::<String>::new() },
        &flash,
    )
}

/// Renames the tag and replaces its whole post set.
pub async fn update_tag(
    State(pool): State<SqlitePool>,
    EntityId(id): EntityId,
    flash: Flash,
    Form(fields): Form<FormFields>,
) -> Result<Response, AppError> {
    let mut tx = pool.begin().await?;
    let tag = Tag::find(&mut *tx, id).await?.ok_or_else(tag_not_found)?;

    let form = TagForm::from_fields(&fields);
    if let Err(validation_errors) = form.validate() {
        let posts = Post::all(&mut *tx).await?;
        return reject_form(
            StatusCode::BAD_REQUEST,
            "tags/edit.html",
            context! { tag => tag, posts => posts, form => form, errors => error_messages(&validation_errors) },
            &flash,
        );
    }

    let tag = match Tag::update(&mut *tx, tag.id, &form.name).await {
        Ok(updated) => updated,
        Err(e) if is_unique_violation(&e) => {
            let posts = Post::all(&mut *tx).await?;
            let errors = vec![duplicate_name(&form.name)];
            return reject_form(
                StatusCode::CONFLICT,
                "tags/edit.html",
                context! { tag => tag, posts => posts, form => form, errors => errors },
                &flash,
            );
        }
        Err(e) => {
            tracing::error!("Failed to update tag {}: {:?}", id, e);
            return Err(e.into());
        }
    };

    let posts = Post::find_many(&mut *tx, &form.post_ids).await?;
    Tag::set_posts(&mut *tx, tag.id, &posts).await?;
    tx.commit().await?;

    tracing::info!(tag_id = tag.id, posts = posts.len(), "Tag updated");
    Ok(redirect_with_flash("/tags", format!("Tag {} edited.", tag.name)))
}

/// Deletes a tag; only its join rows go with it.
pub async fn delete_tag(
    State(pool): State<SqlitePool>,
    EntityId(id): EntityId,
) -> Result<Response, AppError> {
    let mut tx = pool.begin().await?;
    let tag = Tag::find(&mut *tx, id).await?.ok_or_else(tag_not_found)?;

    Tag::delete(&mut *tx, tag.id).await.map_err(|e| {
        tracing::error!("Failed to delete tag {}: {:?}", id, e);
        AppError::from(e)
    })?;
    tx.commit().await?;

    tracing::info!(tag_id = tag.id, "Tag deleted");
    Ok(redirect_with_flash("/tags", format!("Tag {} deleted.", tag.name)))
}
