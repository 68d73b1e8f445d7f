//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! It is the central error handler of the request pipeline: every failure, whether returned
//! by a handler, raised by a middleware, produced by a framework extractor or caused by a
//! panic, ends up rendered through `AppError::error_response` as a JSON body of the form
//! `{"message": "..."}`.
//!
//! Server-side failures (5xx) are logged with their details while the client only sees a
//! generic message. `From` implementations for `sqlx::Error`, `validator::ValidationErrors`,
//! `jsonwebtoken::errors::Error`, `bcrypt::BcryptError` and `actix_web::Error` allow
//! conversion with the `?` operator.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::any::Any;
use std::fmt;
use validator::ValidationErrors;

/// Message sent to clients for any 5xx response.
pub const INTERNAL_ERROR_MESSAGE: &str = "Внутренняя ошибка сервера";

/// Message sent for requests that no stage of the pipeline could route.
pub const ROUTE_NOT_FOUND_MESSAGE: &str = "Маршрут не найден";

/// Represents all possible errors that can occur within the application.
///
/// Each variant corresponds to a specific type of error, carrying a message
/// detailing the issue. These errors are then converted into HTTP responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Authentication failed or is required but missing (HTTP 401).
    Unauthorized(String),
    /// Malformed or invalid request (HTTP 400).
    BadRequest(String),
    /// The requested route or resource does not exist (HTTP 404).
    NotFound(String),
    /// Unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// Error originating from database operations (HTTP 500).
    DatabaseError(String),
    /// Input validation failed (HTTP 422 Unprocessable Entity).
    ValidationError(String),
    /// An error raised by the framework itself (payload too large, unsupported
    /// media type, ...). Keeps the status chosen by the framework.
    Http(StatusCode, String),
}

impl AppError {
    /// The HTTP status this error is rendered with.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Http(status, _) => *status,
        }
    }

    /// The message carried by the error, before any 5xx masking.
    pub fn message(&self) -> &str {
        match self {
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::InternalServerError(msg)
            | AppError::DatabaseError(msg)
            | AppError::ValidationError(msg)
            | AppError::Http(_, msg) => msg,
        }
    }

    /// Builds an error for a route that nothing in the pipeline matched.
    pub fn route_not_found() -> Self {
        AppError::NotFound(ROUTE_NOT_FOUND_MESSAGE.into())
    }

    /// Converts a panic payload caught by the error boundary into an error.
    ///
    /// `panic!` payloads are either `&'static str` or `String`; anything else
    /// is reported without detail.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let detail = if let Some(msg) = payload.downcast_ref::<&'static str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "unknown panic payload".to_string()
        };
        AppError::InternalServerError(format!("handler panicked: {}", detail))
    }

    /// For `map_err` on writes guarded by a unique constraint: a violation becomes
    /// `BadRequest(message)`, any other error converts as usual.
    pub fn unique_violation(message: &str) -> impl FnOnce(sqlx::Error) -> AppError + '_ {
        move |error| {
            let duplicate = matches!(&error, sqlx::Error::Database(db) if db.is_unique_violation());
            if duplicate {
                AppError::BadRequest(message.into())
            } else {
                AppError::from(error)
            }
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::Http(status, msg) => write!(f, "{}: {}", status, msg),
        }
    }
}

/// Converts `AppError` variants into JSON `HttpResponse` objects.
///
/// 5xx errors are logged here, once, with their details; the client receives
/// `INTERNAL_ERROR_MESSAGE` instead.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let message = if status.is_server_error() {
            log::error!("{}", self);
            INTERNAL_ERROR_MESSAGE
        } else {
            self.message()
        };
        HttpResponse::build(status).json(json!({ "message": message }))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `sqlx::Error::RowNotFound` is mapped to `AppError::NotFound` and unique
/// violations to `AppError::BadRequest`; other database errors become
/// `AppError::DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Запись не найдена".into()),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::BadRequest("Запись уже существует".into())
            }
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

/// Flattens field errors into `"field: message"` pairs, sorted by field.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        let mut details: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |err| match &err.message {
                    Some(message) => format!("{}: {}", field, message),
                    None => format!("{}: {}", field, err.code),
                })
            })
            .collect();
        details.sort();
        AppError::ValidationError(details.join("; "))
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized(error.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}

/// Recovers an `AppError` from a type-erased actix error.
///
/// Errors that were created from an `AppError` come back unchanged. Anything
/// else (extractor failures, framework errors) keeps its status and display text.
impl From<actix_web::Error> for AppError {
    fn from(error: actix_web::Error) -> AppError {
        AppError::from(&error)
    }
}

impl From<&actix_web::Error> for AppError {
    fn from(error: &actix_web::Error) -> AppError {
        if let Some(app_error) = error.as_error::<AppError>() {
            return app_error.clone();
        }
        let status = error.as_response_error().status_code();
        match status {
            StatusCode::BAD_REQUEST => AppError::BadRequest(error.to_string()),
            StatusCode::UNAUTHORIZED => AppError::Unauthorized(error.to_string()),
            StatusCode::NOT_FOUND => AppError::NotFound(error.to_string()),
            StatusCode::INTERNAL_SERVER_ERROR => AppError::InternalServerError(error.to_string()),
            _ => AppError::Http(status, error.to_string()),
        }
    }
}
