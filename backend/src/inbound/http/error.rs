//! Rendering of domain [`Error`] values as HTTP responses.
//!
//! Status codes derive from [`ErrorCode`] alone. Internal failures reach
//! clients as a fixed message with only the trace identifier preserved;
//! the original is logged where it was raised.

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode, web};
use serde_json::json;
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Result type returned by every handler in this adapter.
pub type ApiResult<T> = Result<T, Error>;

const INTERNAL_MESSAGE: &str = "Internal server error";

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self.code() {
            ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        let trace_id = self.trace_id().map(str::to_owned);
        if let Some(id) = &trace_id {
            response.insert_header((TRACE_ID_HEADER, id.as_str()));
        }
        if self.code() != ErrorCode::InternalError {
            return response.json(self);
        }
        let public = Error::internal(INTERNAL_MESSAGE);
        match trace_id {
            Some(id) => response.json(public.with_trace_id(id)),
            None => response.json(public),
        }
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "framework error surfaced through a handler");
        Error::internal(INTERNAL_MESSAGE)
    }
}

fn malformed(what: &str, code: &str, err: impl std::fmt::Display) -> actix_web::Error {
    Error::invalid_request(format!("malformed {what}: {err}"))
        .with_details(json!({ "code": code }))
        .into()
}

/// `web::Json` settings that report decode failures as `invalid_request`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _: &HttpRequest| {
        malformed("request body", "malformed_body", err)
    })
}

/// `web::Query` settings that report decode failures as `invalid_request`.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: QueryPayloadError, _: &HttpRequest| {
        malformed("query string", "malformed_query", err)
    })
}
