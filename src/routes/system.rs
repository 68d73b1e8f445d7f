use actix_web::{get, HttpResponse};

use crate::error::AppError;

/// Diagnostic endpoint: always fails, to exercise error reporting end to end.
#[get("/error-test")]
pub async fn error_test() -> Result<HttpResponse, AppError> {
    Err(AppError::InternalServerError("Тестовая ошибка!".into()))
}

/// Fallback for requests no other stage of the pipeline handled.
pub async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::route_not_found())
}
