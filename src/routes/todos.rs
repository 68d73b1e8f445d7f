use crate::{
    auth::{AuthMiddleware, AuthenticatedUserId},
    context::AppContext,
    error::AppError,
    models::{Todo, TodoInput, TodoQuery},
    routes::Body,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

const TODO_COLUMNS: &str = "id, title, description, priority, status, due_date, category_id, \
                            user_id, created_at, updated_at";

fn todo_not_found() -> AppError {
    AppError::NotFound("Задача не найдена".into())
}

/// Fails with 404 unless `category_id` is absent or owned by `user_id`.
async fn ensure_category_owned(
    ctx: &AppContext,
    user_id: i32,
    category_id: Option<Uuid>,
) -> Result<(), AppError> {
    let Some(category_id) = category_id else {
        return Ok(());
    };

    sqlx::query_as::<_, (Uuid,)>("SELECT id FROM categories WHERE id = $1 AND user_id = $2")
        .bind(category_id)
        .bind(user_id)
        .fetch_optional(&ctx.db)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound("Категория не найдена".into()))
}

/// Builds the list query for `query`. Placeholders are numbered in the order
/// `get_todos` binds the filters.
fn list_sql(query: &TodoQuery) -> String {
    let mut sql = format!("SELECT {} FROM todos WHERE user_id = $1", TODO_COLUMNS);
    let mut param_count = 2;

    if query.status.is_some() {
        sql.push_str(&format!(" AND status = ${}", param_count));
        param_count += 1;
    }
    if query.priority.is_some() {
        sql.push_str(&format!(" AND priority = ${}", param_count));
        param_count += 1;
    }
    if query.category_id.is_some() {
        sql.push_str(&format!(" AND category_id = ${}", param_count));
        param_count += 1;
    }
    if query.search.is_some() {
        // The same pattern is used for both columns.
        sql.push_str(&format!(
            " AND (title ILIKE ${0} ESCAPE '\\' OR description ILIKE ${0} ESCAPE '\\')",
            param_count
        ));
    }

    sql.push_str(" ORDER BY created_at DESC");
    sql
}

/// `ILIKE` pattern matching `search` literally anywhere in the text.
fn contains_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Retrieves the authenticated user's todos.
///
/// ## Query Parameters:
/// - `status` (optional): `todo`, `in_progress` or `done`.
/// - `priority` (optional): `low`, `medium`, `high` or `urgent`.
/// - `category_id` (optional): only todos in this category.
/// - `search` (optional): case-insensitive match in title or description.
///
/// Todos are ordered by creation date, newest first.
#[utoipa::path(
    get,
    path = "/api/todos",
    tag = "todos",
    params(TodoQuery),
    responses(
        (status = 200, description = "Todos of the user", body = [Todo]),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
#[get("", wrap = "AuthMiddleware")]
pub async fn get_todos(
    ctx: web::Data<AppContext>,
    user_id: AuthenticatedUserId,
    query_params: web::Query<TodoQuery>,
) -> Result<impl Responder, AppError> {
    let sql = list_sql(&query_params);
    let mut query_builder = sqlx::query_as::<_, Todo>(&sql).bind(user_id.0);

    if let Some(status) = query_params.status {
        query_builder = query_builder.bind(status);
    }
    if let Some(priority) = query_params.priority {
        query_builder = query_builder.bind(priority);
    }
    if let Some(category_id) = query_params.category_id {
        query_builder = query_builder.bind(category_id);
    }
    if let Some(search) = &query_params.search {
        query_builder = query_builder.bind(contains_pattern(search));
    }

    let todos = query_builder.fetch_all(&ctx.db).await?;

    Ok(HttpResponse::Ok().json(todos))
}

/// Creates a new todo for the authenticated user.
///
/// ## Responses:
/// - `201 Created`: the new `Todo`.
/// - `404 Not Found`: `category_id` does not name a category of the user.
/// - `422 Unprocessable Entity`: title or description length out of bounds.
#[utoipa::path(
    post,
    path = "/api/todos",
    tag = "todos",
    request_body = TodoInput,
    responses(
        (status = 201, description = "Todo created", body = Todo),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Unknown category"),
        (status = 422, description = "Invalid input")
    ),
    security(("bearer_auth" = []))
)]
#[post("", wrap = "AuthMiddleware")]
pub async fn create_todo(
    ctx: web::Data<AppContext>,
    user_id: AuthenticatedUserId,
    body: Body<TodoInput>,
) -> Result<impl Responder, AppError> {
    let input = body.into_inner();
    input.validate()?;
    ensure_category_owned(&ctx, user_id.0, input.category_id).await?;

    let todo = Todo::new(input, user_id.0);

    let result = sqlx::query_as::<_, Todo>(&format!(
        "INSERT INTO todos (id, title, description, priority, status, due_date, category_id, user_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
        TODO_COLUMNS
    ))
    .bind(todo.id)
    .bind(todo.title)
    .bind(todo.description)
    .bind(todo.priority)
    .bind(todo.status)
    .bind(todo.due_date)
    .bind(todo.category_id)
    .bind(todo.user_id)
    .fetch_one(&ctx.db)
    .await?;

    Ok(HttpResponse::Created().json(result))
}

#[utoipa::path(
    get,
    path = "/api/todos/{id}",
    tag = "todos",
    params(("id" = Uuid, Path, description = "Todo id")),
    responses(
        (status = 200, description = "The todo", body = Todo),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "No such todo for this user")
    ),
    security(("bearer_auth" = []))
)]
#[get("/{id}", wrap = "AuthMiddleware")]
pub async fn get_todo(
    ctx: web::Data<AppContext>,
    user_id: AuthenticatedUserId,
    todo_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let todo = sqlx::query_as::<_, Todo>(&format!(
        "SELECT {} FROM todos WHERE id = $1 AND user_id = $2",
        TODO_COLUMNS
    ))
    .bind(todo_id.into_inner())
    .bind(user_id.0)
    .fetch_optional(&ctx.db)
    .await?
    .ok_or_else(todo_not_found)?;

    Ok(HttpResponse::Ok().json(todo))
}

/// Replaces every editable field of a todo owned by the authenticated user.
#[utoipa::path(
    put,
    path = "/api/todos/{id}",
    tag = "todos",
    params(("id" = Uuid, Path, description = "Todo id")),
    request_body = TodoInput,
    responses(
        (status = 200, description = "Todo updated", body = Todo),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "No such todo or category for this user"),
        (status = 422, description = "Invalid input")
    ),
    security(("bearer_auth" = []))
)]
#[put("/{id}", wrap = "AuthMiddleware")]
pub async fn update_todo(
    ctx: web::Data<AppContext>,
    user_id: AuthenticatedUserId,
    todo_id: web::Path<Uuid>,
    body: Body<TodoInput>,
) -> Result<impl Responder, AppError> {
    let input = body.into_inner();
    input.validate()?;
    ensure_category_owned(&ctx, user_id.0, input.category_id).await?;

    let todo = sqlx::query_as::<_, Todo>(&format!(
        "UPDATE todos \
         SET title = $1, description = $2, priority = $3, status = $4, due_date = $5, \
             category_id = $6, updated_at = NOW() \
         WHERE id = $7 AND user_id = $8 RETURNING {}",
        TODO_COLUMNS
    ))
    .bind(&input.title)
    .bind(&input.description)
    .bind(input.priority)
    .bind(input.status)
    .bind(input.due_date)
    .bind(input.category_id)
    .bind(todo_id.into_inner())
    .bind(user_id.0)
    .fetch_optional(&ctx.db)
    .await?
    .ok_or_else(todo_not_found)?;

    Ok(HttpResponse::Ok().json(todo))
}

#[utoipa::path(
    delete,
    path = "/api/todos/{id}",
    tag = "todos",
    params(("id" = Uuid, Path, description = "Todo id")),
    responses(
        (status = 204, description = "Todo deleted"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "No such todo for this user")
    ),
    security(("bearer_auth" = []))
)]
#[delete("/{id}", wrap = "AuthMiddleware")]
pub async fn delete_todo(
    ctx: web::Data<AppContext>,
    user_id: AuthenticatedUserId,
    todo_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND user_id = $2")
        .bind(todo_id.into_inner())
        .bind(user_id.0)
        .execute(&ctx.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(todo_not_found());
    }

    Ok(HttpResponse::NoContent().finish())
}
