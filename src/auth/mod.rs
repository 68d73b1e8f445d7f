pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

pub use extractors::AuthenticatedUserId;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{generate_token, verify_token, Claims};

lazy_static! {
    static ref USERNAME: regex::Regex = regex::Regex::new(r"^[A-Za-z0-9_-]{3,32}$").unwrap();
}

/// Credentials accepted by `POST /api/auth/login`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "некорректный email"))]
    pub email: String,
    /// bcrypt ignores everything past 72 bytes.
    #[validate(length(min = 1, max = 72, message = "от 1 до 72 символов"))]
    pub password: String,
}

/// Account data accepted by `POST /api/auth/register`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// 3 to 32 latin letters, digits, `_` or `-`.
    #[validate(regex(
        path = "USERNAME",
        message = "от 3 до 32 символов: латинские буквы, цифры, _ или -"
    ))]
    pub username: String,
    #[validate(email(message = "некорректный email"))]
    pub email: String,
    #[validate(length(min = 6, max = 72, message = "от 6 до 72 символов"))]
    pub password: String,
}

/// Returned by register and login.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    /// JWT to send back as `Authorization: Bearer <token>`.
    pub token: String,
    pub user_id: i32,
}
