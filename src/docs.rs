//! API documentation stage: the generated OpenAPI document and a Swagger UI page.

use actix_web::{get, http::header::ContentType, web, HttpResponse, Responder};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::auth::{AuthResponse, LoginRequest, RegisterRequest};
use crate::models::{Category, CategoryInput, Todo, TodoInput, TodoPriority, TodoStatus, User};
use crate::routes;

pub const DOCS_PATH: &str = "/api-docs";
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(title = "Todo API", description = "Todos grouped in categories, per user."),
    paths(
        routes::auth::register,
        routes::auth::login,
        routes::auth::me,
        routes::categories::list_categories,
        routes::categories::create_category,
        routes::categories::get_category,
        routes::categories::update_category,
        routes::categories::delete_category,
        routes::todos::get_todos,
        routes::todos::create_todo,
        routes::todos::get_todo,
        routes::todos::update_todo,
        routes::todos::delete_todo
    ),
    components(schemas(
        AuthResponse,
        LoginRequest,
        RegisterRequest,
        User,
        Category,
        CategoryInput,
        Todo,
        TodoInput,
        TodoPriority,
        TodoStatus
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "categories", description = "Categories of the current user"),
        (name = "todos", description = "Todos of the current user")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

fn swagger_page(spec_url: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>Todo API docs</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js" crossorigin></script>
  <script>
    window.onload = () => {{
      window.ui = SwaggerUIBundle({{ url: "{}", dom_id: "#swagger-ui" }});
    }};
  </script>
</body>
</html>"##,
        spec_url
    )
}

/// Serves the interactive Swagger UI page.
#[get("/api-docs")]
pub async fn swagger_ui() -> impl Responder {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(swagger_page(OPENAPI_PATH))
}

/// Serves the OpenAPI document rendered by the Swagger UI page.
#[get("/api-docs/openapi.json")]
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(swagger_ui).service(openapi_json);
}
