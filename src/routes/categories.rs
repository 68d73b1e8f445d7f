use crate::{
    auth::{AuthMiddleware, AuthenticatedUserId},
    context::AppContext,
    error::AppError,
    models::{Category, CategoryInput},
    routes::Body,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

const CATEGORY_COLUMNS: &str = "id, name, user_id, created_at, updated_at";

const NAME_TAKEN: &str = "Категория с таким названием уже существует";

fn category_not_found() -> AppError {
    AppError::NotFound("Категория не найдена".into())
}

/// Fails when the user already owns another category with this name.
async fn ensure_name_free(
    ctx: &AppContext,
    user_id: i32,
    name: &str,
    except: Option<Uuid>,
) -> Result<(), AppError> {
    let clash = sqlx::query_as::<_, (Uuid,)>(
        "SELECT id FROM categories WHERE user_id = $1 AND name = $2 AND ($3::uuid IS NULL OR id <> $3)",
    )
    .bind(user_id)
    .bind(name)
    .bind(except)
    .fetch_optional(&ctx.db)
    .await?;

    match clash {
        Some(_) => Err(AppError::BadRequest(NAME_TAKEN.into())),
        None => Ok(()),
    }
}

/// Lists the authenticated user's categories, ordered by name.
#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "categories",
    responses(
        (status = 200, description = "Categories of the user", body = [Category]),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
#[get("", wrap = "AuthMiddleware")]
pub async fn list_categories(
    ctx: web::Data<AppContext>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let categories = sqlx::query_as::<_, Category>(&format!(
        "SELECT {} FROM categories WHERE user_id = $1 ORDER BY name",
        CATEGORY_COLUMNS
    ))
    .bind(user_id.0)
    .fetch_all(&ctx.db)
    .await?;

    Ok(HttpResponse::Ok().json(categories))
}

/// Creates a category for the authenticated user.
///
/// ## Responses:
/// - `201 Created`: the new `Category`.
/// - `400 Bad Request`: the user already has a category with this name.
/// - `422 Unprocessable Entity`: the name is empty or longer than 100 characters.
#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "categories",
    request_body = CategoryInput,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Duplicate name"),
        (status = 401, description = "Missing or invalid token"),
        (status = 422, description = "Invalid input")
    ),
    security(("bearer_auth" = []))
)]
#[post("", wrap = "AuthMiddleware")]
pub async fn create_category(
    ctx: web::Data<AppContext>,
    user_id: AuthenticatedUserId,
    body: Body<CategoryInput>,
) -> Result<impl Responder, AppError> {
    let input = body.into_inner();
    input.validate()?;
    ensure_name_free(&ctx, user_id.0, &input.name, None).await?;

    let category = sqlx::query_as::<_, Category>(&format!(
        "INSERT INTO categories (id, name, user_id) VALUES ($1, $2, $3) RETURNING {}",
        CATEGORY_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&input.name)
    .bind(user_id.0)
    .fetch_one(&ctx.db)
    .await
    .map_err(AppError::unique_violation(NAME_TAKEN))?;

    Ok(HttpResponse::Created().json(category))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    tag = "categories",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "The category", body = Category),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "No such category for this user")
    ),
    security(("bearer_auth" = []))
)]
#[get("/{id}", wrap = "AuthMiddleware")]
pub async fn get_category(
    ctx: web::Data<AppContext>,
    user_id: AuthenticatedUserId,
    category_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let category = sqlx::query_as::<_, Category>(&format!(
        "SELECT {} FROM categories WHERE id = $1 AND user_id = $2",
        CATEGORY_COLUMNS
    ))
    .bind(category_id.into_inner())
    .bind(user_id.0)
    .fetch_optional(&ctx.db)
    .await?
    .ok_or_else(category_not_found)?;

    Ok(HttpResponse::Ok().json(category))
}

/// Renames a category owned by the authenticated user.
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    tag = "categories",
    params(("id" = Uuid, Path, description = "Category id")),
    request_body = CategoryInput,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 400, description = "Duplicate name"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "No such category for this user"),
        (status = 422, description = "Invalid input")
    ),
    security(("bearer_auth" = []))
)]
#[put("/{id}", wrap = "AuthMiddleware")]
pub async fn update_category(
    ctx: web::Data<AppContext>,
    user_id: AuthenticatedUserId,
    category_id: web::Path<Uuid>,
    body: Body<CategoryInput>,
) -> Result<impl Responder, AppError> {
    let input = body.into_inner();
    input.validate()?;
    let category_id = category_id.into_inner();
    ensure_name_free(&ctx, user_id.0, &input.name, Some(category_id)).await?;

    let category = sqlx::query_as::<_, Category>(&format!(
        "UPDATE categories SET name = $1, updated_at = NOW() \
         WHERE id = $2 AND user_id = $3 RETURNING {}",
        CATEGORY_COLUMNS
    ))
    .bind(&input.name)
    .bind(category_id)
    .bind(user_id.0)
    .fetch_optional(&ctx.db)
    .await
    .map_err(AppError::unique_violation(NAME_TAKEN))?
    .ok_or_else(category_not_found)?;

    Ok(HttpResponse::Ok().json(category))
}

/// Deletes a category. Todos in it are kept and lose their category.
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    tag = "categories",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "No such category for this user")
    ),
    security(("bearer_auth" = []))
)]
#[delete("/{id}", wrap = "AuthMiddleware")]
pub async fn delete_category(
    ctx: web::Data<AppContext>,
    user_id: AuthenticatedUserId,
    category_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND user_id = $2")
        .bind(category_id.into_inner())
        .bind(user_id.0)
        .execute(&ctx.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(category_not_found());
    }

    Ok(HttpResponse::NoContent().finish())
}
