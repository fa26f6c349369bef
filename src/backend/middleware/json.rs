//! `ValidJson<T>`: `Json<T>` that also runs `T::validate`.
//!
//! Both a body that fails to parse and one that parses but fails validation
//! come back as a 400 `BackendError::Validation`, so every route reports bad
//! input with the same envelope.

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::backend::error::BackendError;
use crate::shared::error::FieldError;
use crate::shared::validation::Validate;

#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = BackendError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(request, state)
            .await
            .map_err(|rejection| BackendError::Validation {
                message: "Validation failed".to_string(),
                details: vec![FieldError::new("body", rejection.body_text())],
            })?;

        value.validate()?;
        Ok(Self(value))
    }
}
