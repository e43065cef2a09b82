//! HTTP mapping for domain errors and extractor failures.
//!
//! A check refused because of an active incident is a `conflict` in the
//! domain but answers `403 Forbidden`, the status clients already key on.
//! Internal errors are logged in full and replaced by a generic body that
//! keeps only the trace id.

use std::borrow::Cow;

use actix_web::error::{JsonPayloadError, PathError};
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode, web};
use serde_json::json;
use tracing::{debug, error};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

const REDACTED_MESSAGE: &str = "Internal server error";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden | ErrorCode::Conflict => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// The body a client may see for `error`.
fn client_view(error: &Error) -> Cow<'_, Error> {
    if error.code() != ErrorCode::InternalError {
        return Cow::Borrowed(error);
    }
    error!(
        message = error.message(),
        details = ?error.details(),
        trace_id = ?error.trace_id(),
        "internal error"
    );
    let redacted = Error::internal(REDACTED_MESSAGE);
    Cow::Owned(match error.trace_id() {
        Some(id) => redacted.with_trace_id(id.to_owned()),
        None => redacted,
    })
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(client_view(self).as_ref())
    }
}

/// Turn JSON body failures into `invalid_request` with a short reason.
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!(path = req.path(), error = %err, "rejected request body");
    let (message, reason) = match &err {
        JsonPayloadError::ContentType => (
            "request body must be application/json".to_owned(),
            "content_type",
        ),
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            ("request body is too large".to_owned(), "too_large")
        }
        JsonPayloadError::Deserialize(source) => {
            (format!("invalid JSON body: {source}"), "malformed")
        }
        other => (format!("invalid JSON body: {other}"), "malformed"),
    };
    Error::invalid_request(message)
        .with_details(json!({ "reason": reason }))
        .into()
}

/// Turn unparsable path segments (`/restrooms/abc/status`) into
/// `invalid_request`.
pub fn path_error_handler(err: PathError, req: &HttpRequest) -> actix_web::Error {
    debug!(path = req.path(), error = %err, "rejected path parameter");
    Error::invalid_request(format!("invalid path parameter: {err}"))
        .with_details(json!({ "reason": "path" }))
        .into()
}

/// Unwrap a JSON body extracted as `Result` so handlers can check the
/// session first. Failures keep the body built by [`json_error_handler`].
pub fn accept_json<T>(payload: Result<web::Json<T>, actix_web::Error>) -> ApiResult<T> {
    match payload {
        Ok(body) => Ok(body.into_inner()),
        Err(err) => Err(err
            .as_error::<Error>()
            .cloned()
            .unwrap_or_else(|| Error::invalid_request(format!("invalid JSON body: {err}")))),
    }
}
