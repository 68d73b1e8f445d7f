pub mod auth;
pub mod categories;
pub mod system;
pub mod todos;

use actix_web::{web, Either};

/// Request body accepted either as JSON or as a URL-encoded form.
///
/// Size limits come from the `JsonConfig`/`FormConfig` registered by the pipeline.
pub type Body<T> = Either<web::Json<T>, web::Form<T>>;

/// Mounted under `/api/auth`.
pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::register)
        .service(auth::login)
        .service(auth::me);
}

/// Mounted under `/api/categories`.
pub fn categories_config(cfg: &mut web::ServiceConfig) {
    cfg.service(categories::list_categories)
        .service(categories::create_category)
        .service(categories::get_category)
        .service(categories::update_category)
        .service(categories::delete_category);
}

/// Mounted under `/api/todos`.
pub fn todos_config(cfg: &mut web::ServiceConfig) {
    cfg.service(todos::get_todos)
        .service(todos::create_todo)
        .service(todos::get_todo)
        .service(todos::update_todo)
        .service(todos::delete_todo);
}
