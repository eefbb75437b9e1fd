//! Boundary extractors that validate request bodies and path parameters

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::AppError;

/// JSON body extractor that re-checks the input schema at the boundary.
///
/// Deserialization failures and the first validation violation both
/// surface as a 400 `{message, field}` response via [`AppError`].
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Validation {
                message: rejection.body_text(),
                field: None,
            })?;

        payload.validate()?;
        Ok(Self(payload))
    }
}

/// Path extractor whose rejection follows the 400 `{message, field}`
/// error shape instead of axum's plain-text default. A non-numeric id
/// segment is rejected here, at the boundary.
pub struct ValidatedPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ValidatedPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::Validation {
                message: rejection.body_text(),
                field: None,
            })?;

        Ok(Self(value))
    }
}
