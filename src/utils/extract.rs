use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::error::AppError;

/// Integer `{id}` path segment. Anything that is not an integer cannot name
/// an entity, so it is answered with the not-found page rather than a 400.
#[derive(Debug, Clone, Copy)]
pub struct EntityId(pub i64);

impl<S> FromRequestParts<S> for EntityId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::NotFound("Page not found".to_string()))?;

        raw.parse::<i64>()
            .map(EntityId)
            .map_err(|_| AppError::NotFound("Page not found".to_string()))
    }
}
