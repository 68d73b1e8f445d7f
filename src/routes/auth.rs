use crate::{
    auth::{
        generate_token, hash_password, verify_password, AuthResponse, AuthenticatedUserId,
        AuthMiddleware, LoginRequest, RegisterRequest,
    },
    context::AppContext,
    error::AppError,
    models::User,
    routes::Body,
};
use actix_web::{get, post, web, HttpResponse, Responder};
use validator::Validate;

const EMAIL_TAKEN: &str = "Email уже зарегистрирован";

/// Register a new user
///
/// Creates a new user account and returns an authentication token.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = AuthResponse),
        (status = 400, description = "Email already registered"),
        (status = 422, description = "Invalid input")
    )
)]
#[post("/register")]
pub async fn register(
    ctx: web::Data<AppContext>,
    body: Body<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let register_data = body.into_inner();
    register_data.validate()?;

    let existing_user = sqlx::query_as::<_, (i32,)>("SELECT id FROM users WHERE email = $1")
        .bind(&register_data.email)
        .fetch_optional(&ctx.db)
        .await?;

    if existing_user.is_some() {
        return Err(AppError::BadRequest(EMAIL_TAKEN.into()));
    }

    let password_hash = hash_password(&register_data.password)?;

    let (user_id,) = sqlx::query_as::<_, (i32,)>(
        "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(&register_data.username)
    .bind(&register_data.email)
    .bind(&password_hash)
    .fetch_one(&ctx.db)
    .await
    .map_err(AppError::unique_violation(EMAIL_TAKEN))?;

    let token = generate_token(user_id, &ctx.config.jwt_secret)?;
    log::info!("Registered user {}", user_id);

    Ok(HttpResponse::Created().json(AuthResponse { token, user_id }))
}

/// Login user
///
/// Authenticates a user and returns an authentication token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 422, description = "Invalid input")
    )
)]
#[post("/login")]
pub async fn login(
    ctx: web::Data<AppContext>,
    body: Body<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let login_data = body.into_inner();
    login_data.validate()?;

    let user = sqlx::query_as::<_, (i32, String)>(
        "SELECT id, password_hash FROM users WHERE email = $1",
    )
    .bind(&login_data.email)
    .fetch_optional(&ctx.db)
    .await?;

    match user {
        Some((user_id, password_hash)) if verify_password(&login_data.password, &password_hash)? => {
            let token = generate_token(user_id, &ctx.config.jwt_secret)?;
            Ok(HttpResponse::Ok().json(AuthResponse { token, user_id }))
        }
        _ => Err(AppError::Unauthorized("Неверные учетные данные".into())),
    }
}

/// Current user
///
/// Returns the profile of the user owning the bearer token.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
#[get("/me", wrap = "AuthMiddleware")]
pub async fn me(
    ctx: web::Data<AppContext>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, email, created_at FROM users WHERE id = $1",
    )
    .bind(user_id.0)
    .fetch_optional(&ctx.db)
    .await?
    .ok_or_else(|| AppError::NotFound("Пользователь не найден".into()))?;

    Ok(HttpResponse::Ok().json(user))
}
