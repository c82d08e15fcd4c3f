use std::collections::HashMap;

use axum::async_trait;
use axum::body::HttpBody;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Form, FromRequest};
use axum::http::{header, HeaderMap, Request};
use axum::{BoxError, Json};
use chrono::{SecondsFormat, TimeZone, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::controllers::paste::{FetchedPaste, NewPaste};
use crate::error::{ApiError, Invalid};

#[derive(Serialize)]
pub struct CreatedPaste {
    pub id: String,
    pub url: String,
}

#[derive(Serialize)]
pub struct PasteContent {
    pub content: String,
    pub remaining_views: Option<i64>,
    /// ISO-8601 in UTC with millisecond precision.
    pub expires_at: Option<String>,
}

impl From<FetchedPaste> for PasteContent {
    fn from(paste: FetchedPaste) -> Self {
        PasteContent {
            content: paste.content,
            remaining_views: paste.remaining_views,
            expires_at: paste.expires_at.and_then(format_timestamp),
        }
    }
}

#[derive(Serialize)]
pub struct Health {
    pub ok: bool,
}

fn format_timestamp(millis: i64) -> Option<String> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(|time| time.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Body of a create request, sent either as JSON or as an urlencoded form.
#[derive(Debug, Default)]
pub struct CreatePasteBody {
    fields: Map<String, Value>,
}

impl CreatePasteBody {
    pub fn into_new_paste(mut self) -> Result<NewPaste, Invalid> {
        let content = match self.fields.remove("content") {
            Some(Value::String(content)) => content,
            _ => return Err(Invalid::Content),
        };
        Ok(NewPaste {
            content,
            ttl_seconds: optional_int(self.fields.get("ttl_seconds"), Invalid::TtlSeconds)?,
            max_views: optional_int(self.fields.get("max_views"), Invalid::MaxViews)?,
        })
    }
}

/// Read an optional integer field. Blank strings and `null` count as absent; integral floats
/// and integer strings are accepted. Range checks happen in validation.
fn optional_int(value: Option<&Value>, invalid: Invalid) -> Result<Option<i64>, Invalid> {
    // largest magnitude an f64 holds without losing integer precision
    const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_991.0;

    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => number
            .as_i64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|float| float.fract() == 0.0 && float.abs() <= MAX_EXACT_FLOAT)
                    .map(|float| float as i64)
            })
            .map(Some)
            .ok_or(invalid),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(Value::String(text)) => text.trim().parse().map(Some).map_err(|_| invalid),
        Some(_) => Err(invalid),
    }
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}

#[async_trait]
impl<S, B> FromRequest<S, B> for CreatePasteBody
where
    B: HttpBody + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request<B>, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(req.headers()) {
            let Form(form) = Form::<HashMap<String, String>>::from_request(req, state).await?;
            let fields = form
                .into_iter()
                .map(|(key, value)| (key, Value::String(value)))
                .collect();
            return Ok(CreatePasteBody { fields });
        }

        let fields = match Json::<Value>::from_request(req, state).await {
            Ok(Json(Value::Object(fields))) => fields,
            Ok(Json(_)) => Map::new(),
            // an untyped body carries no fields, which then fails as missing content
            Err(JsonRejection::MissingJsonContentType(_)) => Map::new(),
            Err(rejection) => return Err(rejection.into()),
        };
        Ok(CreatePasteBody { fields })
    }
}
