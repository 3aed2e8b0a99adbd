//! Axum extractors for request bodies and query strings
//!
//! Clients send either a bare JSON object or a one-element array wrapping
//! it. `Payload<D>` accepts both, deserializes the object into `D`, and
//! rejects anything else with a [`MetaError`] so malformed bodies get the
//! same error envelope as every other failure. `QueryArgs<Q>` does the
//! same for query strings.

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::error::{MetaError, ValidationError};

/// A request body deserialized into `D`
#[derive(Debug)]
pub struct Payload<D>(pub D);

impl<S, D> FromRequest<S> for Payload<D>
where
    S: Send + Sync,
    D: DeserializeOwned,
{
    type Rejection = MetaError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body): Json<Value> = Json::from_request(req, state).await.map_err(|e| {
            ValidationError::InvalidJson {
                message: e.body_text(),
            }
        })?;

        let object = unwrap_body(body)?;
        let draft = serde_json::from_value(object)?;
        Ok(Payload(draft))
    }
}

/// Query string parameters deserialized into `Q`
#[derive(Debug)]
pub struct QueryArgs<Q>(pub Q);

impl<S, Q> FromRequestParts<S> for QueryArgs<Q>
where
    S: Send + Sync,
    Q: DeserializeOwned,
{
    type Rejection = MetaError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<Q>::from_request_parts(parts, state)
            .await
            .map_err(|e| ValidationError::FieldError {
                field: "query".into(),
                message: e.body_text(),
            })?;
        Ok(QueryArgs(query))
    }
}

/// Take the object out of `{..}` or `[{..}]`
pub fn unwrap_body(body: Value) -> Result<Value, ValidationError> {
    match body {
        Value::Object(_) => Ok(body),
        Value::Array(mut items) if items.len() == 1 => match items.pop() {
            Some(item @ Value::Object(_)) => Ok(item),
            _ => Err(ValidationError::InvalidJson {
                message: "array element must be a JSON object".into(),
            }),
        },
        Value::Array(items) if items.is_empty() => Err(ValidationError::MissingArgument {
            argument: "request body object".into(),
        }),
        Value::Array(items) => Err(ValidationError::InvalidJson {
            message: format!("expected a single object, got an array of {}", items.len()),
        }),
        other => Err(ValidationError::InvalidJson {
            message: format!("expected a JSON object, got {}", json_type(&other)),
        }),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
