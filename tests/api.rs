//! End-to-end flows against a real PostgreSQL database.
//!
//! Run with `DATABASE_URL=postgres://... cargo test -- --ignored`.

mod common;

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::test;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use todo_api::{build_app, AppContext, RouteTable};
use uuid::Uuid;

use common::test_config;

async fn context() -> AppContext {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let config = test_config(&url);
    let db = PgPoolOptions::new()
        .max_connections(2)
        .connect(&config.database_url)
        .await
        .expect("database reachable");
    sqlx::migrate!().run(&db).await.expect("migrations apply");
    AppContext::new(config, db)
}

async fn send<S, B>(app: &S, req: actix_http::Request) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let reply = common::send(app, req).await;
    (reply.status, reply.body)
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

#[actix_rt::test]
#[ignore = "requires DATABASE_URL pointing at a disposable PostgreSQL database"]
async fn test_register_login_and_me() {
    let app = test::init_service(build_app(context().await, RouteTable::api())).await;
    let suffix = Uuid::new_v4().simple().to_string();
    let email = format!("user-{}@example.com", &suffix[..12]);
    let username = format!("user_{}", &suffix[..12]);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "username": username, "email": email, "password": "secret123" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["token"].is_string());

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "username": username, "email": email, "password": "secret123" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "message": "Email уже зарегистрирован" }));

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_form([("email", email.as_str()), ("password", "wrong-password")])
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "message": "Неверные учетные данные" }));

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_form([("email", email.as_str()), ("password", "secret123")])
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(bearer(&token))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], email.as_str());
    assert!(body.get("password_hash").is_none());
}

#[actix_rt::test]
#[ignore = "requires DATABASE_URL pointing at a disposable PostgreSQL database"]
async fn test_categories_and_todos_flow() {
    let app = test::init_service(build_app(context().await, RouteTable::api())).await;
    let suffix = Uuid::new_v4().simple().to_string();

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "username": format!("flow_{}", &suffix[..12]),
            "email": format!("flow-{}@example.com", &suffix[..12]),
            "password": "secret123"
        }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    let token = body["token"].as_str().unwrap().to_string();

    // Categories.
    let req = test::TestRequest::post()
        .uri("/api/categories")
        .insert_header(bearer(&token))
        .set_json(json!({ "name": "Work" }))
        .to_request();
    let (status, category) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    let category_id = category["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/api/categories")
        .insert_header(bearer(&token))
        .set_json(json!({ "name": "Work" }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = test::TestRequest::put()
        .uri(&format!("/api/categories/{}", category_id))
        .insert_header(bearer(&token))
        .set_json(json!({ "name": "Office" }))
        .to_request();
    let (status, category) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(category["name"], "Office");

    // Todos.
    let req = test::TestRequest::post()
        .uri("/api/todos")
        .insert_header(bearer(&token))
        .set_json(json!({
            "title": "Write report",
            "description": "Quarterly numbers",
            "priority": "high",
            "category_id": category_id
        }))
        .to_request();
    let (status, todo) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(todo["status"], "todo");
    let todo_id = todo["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/api/todos")
        .insert_header(bearer(&token))
        .set_json(json!({ "title": "Buy milk", "priority": "low" }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/todos")
        .insert_header(bearer(&token))
        .set_json(json!({ "title": "Foreign", "category_id": Uuid::new_v4() }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "message": "Категория не найдена" }));

    let req = test::TestRequest::get()
        .uri("/api/todos?priority=high")
        .insert_header(bearer(&token))
        .to_request();
    let (status, todos) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(todos.as_array().unwrap().len(), 1);

    let req = test::TestRequest::get()
        .uri("/api/todos?search=QUARTERLY")
        .insert_header(bearer(&token))
        .to_request();
    let (_, todos) = send(&app, req).await;
    assert_eq!(todos[0]["id"], todo_id.as_str());

    // Wildcards in the search text match literally.
    let req = test::TestRequest::post()
        .uri("/api/todos")
        .insert_header(bearer(&token))
        .set_json(json!({ "title": "Charge to 100%" }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);

    for (search, expected) in [("%25", 1), ("_", 0), ("0%25", 1)] {
        let req = test::TestRequest::get()
            .uri(&format!("/api/todos?search={}", search))
            .insert_header(bearer(&token))
            .to_request();
        let (status, todos) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(todos.as_array().unwrap().len(), expected, "search {}", search);
    }

    let req = test::TestRequest::put()
        .uri(&format!("/api/todos/{}", todo_id))
        .insert_header(bearer(&token))
        .set_json(json!({
            "title": "Write report",
            "status": "done",
            "category_id": category_id
        }))
        .to_request();
    let (status, todo) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(todo["status"], "done");

    // Deleting the category detaches its todos.
    let req = test::TestRequest::delete()
        .uri(&format!("/api/categories/{}", category_id))
        .insert_header(bearer(&token))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/todos/{}", todo_id))
        .insert_header(bearer(&token))
        .to_request();
    let (status, todo) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(todo["category_id"], Value::Null);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/todos/{}", todo_id))
        .insert_header(bearer(&token))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/todos/{}", todo_id))
        .insert_header(bearer(&token))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "message": "Задача не найдена" }));
}
