//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every request validation failure becomes `400 invalid_request`. Single
//! field problems carry `details.field` and `details.code`; form failures
//! carry `details.fields`, a map from wire field name to message.

use std::collections::BTreeMap;

use actix_web::HttpRequest;
use actix_web::http::header;
use serde_json::json;

use crate::domain::{Error, FieldError, FormErrors, FormField, ImageUpload, ImageUploadError, Role};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    UnknownField,
    InvalidRole,
    InvalidField,
    InvalidImage,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::UnknownField => "unknown_field",
            ErrorCode::InvalidRole => "invalid_role",
            ErrorCode::InvalidField => "invalid_field",
            ErrorCode::InvalidImage => "invalid_image",
        }
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

/// Report a failed form, one message per field.
pub(crate) fn form_errors(errors: &FormErrors) -> Error {
    Error::invalid_request("form has invalid fields").with_details(json!({ "fields": errors }))
}

/// Report one failed field.
pub(crate) fn field_error(error: &FieldError) -> Error {
    ValidationError::new(error.field.as_str(), error.message).with_code(ErrorCode::InvalidField)
}

pub(crate) fn image_error(error: &ImageUploadError) -> Error {
    ValidationError::new("profile_image", error.to_string()).with_code(ErrorCode::InvalidImage)
}

/// Build an upload from a raw image body and its declared `Content-Type`.
pub(crate) fn image_upload(
    req: &HttpRequest,
    file_name: &str,
    body: &[u8],
    max_bytes: usize,
) -> Result<ImageUpload, Error> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    ImageUpload::try_new(file_name, content_type, body.to_vec(), max_bytes)
        .map_err(|err| image_error(&err))
}

pub(crate) fn parse_role(value: &str) -> Result<Role, Error> {
    value.parse().map_err(|_| {
        ValidationError::new("role", "role must be admin, caregiver or patient")
            .with_value(ErrorCode::InvalidRole, value)
    })
}

pub(crate) fn parse_field(value: &str) -> Result<FormField, Error> {
    value.parse().map_err(|_| {
        ValidationError::new("field", format!("unknown form field: {value}"))
            .with_value(ErrorCode::UnknownField, value)
    })
}

/// Convert wire field names into typed form fields.
pub(crate) fn parse_fields(
    values: BTreeMap<String, String>,
) -> Result<BTreeMap<FormField, String>, Error> {
    values
        .into_iter()
        .map(|(name, value)| parse_field(&name).map(|field| (field, value)))
        .collect()
}
