//! Request body extraction for create and update routes.
//!
//! # Design
//! `Payload` never rejects the request. Decoding failures are handed to the
//! handler as `Err`, so a handler can look up the addressed record first and
//! answer 404 for a missing id regardless of what the body contained.
//!
//! An empty body decodes to `T::default()`, i.e. "no attributes supplied".
//! Non-empty bodies are read as JSON or as form-encoded parameters depending
//! on `Content-Type`.

use std::convert::Infallible;

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

pub struct Payload<T>(pub Result<T, ApiError>);

impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        let decoded = match Bytes::from_request(req, state).await {
            Ok(body) => decode(content_type.as_deref(), &body),
            Err(rejection) => Err(rejection.into()),
        };
        Ok(Payload(decoded))
    }
}

#[derive(Debug, PartialEq, Eq)]
enum BodyFormat {
    Json,
    Form,
}

fn body_format(content_type: &str) -> Option<BodyFormat> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if essence == "application/json" || essence.ends_with("+json") {
        Some(BodyFormat::Json)
    } else if essence == "application/x-www-form-urlencoded" {
        Some(BodyFormat::Form)
    } else {
        None
    }
}

fn decode<T>(content_type: Option<&str>, body: &[u8]) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    match content_type.and_then(body_format) {
        Some(BodyFormat::Json) => {
            let Json(value) = Json::<T>::from_bytes(body)?;
            Ok(value)
        }
        Some(BodyFormat::Form) => Ok(serde_urlencoded::from_bytes(body)?),
        None => Err(ApiError::UnsupportedMediaType),
    }
}
