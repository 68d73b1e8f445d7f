use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Represents the priority of a todo.
/// Corresponds to the `todo_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type, ToSchema)]
#[sqlx(type_name = "todo_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TodoPriority {
    Low,
    Medium,
    High,
    Urgent,
}

/// Represents the status of a todo.
/// Corresponds to the `todo_status` SQL enum.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type, ToSchema)]
#[sqlx(type_name = "todo_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    /// Not started yet.
    #[default]
    Todo,
    InProgress,
    Done,
}

/// Input structure for creating or updating a todo.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct TodoInput {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200, message = "от 1 до 200 символов"))]
    pub title: String,

    /// At most 1000 characters.
    #[validate(length(max = 1000, message = "не более 1000 символов"))]
    pub description: Option<String>,

    pub priority: Option<TodoPriority>,

    pub due_date: Option<DateTime<Utc>>,

    /// Defaults to `todo` when omitted.
    #[serde(default)]
    pub status: TodoStatus,

    /// Category owned by the same user, if any.
    pub category_id: Option<Uuid>,
}

/// Represents a todo as stored in the database and returned by the API.
#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<TodoPriority>,
    pub status: TodoStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub category_id: Option<Uuid>,
    /// Owner of the todo.
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Query parameters for filtering the todo list.
#[derive(Debug, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TodoQuery {
    pub status: Option<TodoStatus>,
    pub priority: Option<TodoPriority>,
    pub category_id: Option<Uuid>,
    /// Case-insensitive match against title and description.
    pub search: Option<String>,
}

impl Todo {
    /// Creates a new `Todo` from `TodoInput` and the owner's `user_id`,
    /// with a fresh UUID and both timestamps set to now.
    pub fn new(input: TodoInput, user_id: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            priority: input.priority,
            status: input.status,
            due_date: input.due_date,
            category_id: input.category_id,
            user_id,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str) -> TodoInput {
        TodoInput {
            title: title.to_string(),
            description: Some("Купить молоко".to_string()),
            priority: Some(TodoPriority::High),
            status: TodoStatus::Todo,
            due_date: Some(Utc::now()),
            category_id: None,
        }
    }

    #[test]
    fn test_todo_creation() {
        let category_id = Uuid::new_v4();
        let todo = Todo::new(
            TodoInput {
                category_id: Some(category_id),
                ..input("Test Todo")
            },
            1,
        );
        assert_eq!(todo.title, "Test Todo");
        assert_eq!(todo.user_id, 1);
        assert_eq!(todo.category_id, Some(category_id));
        assert_eq!(todo.created_at, todo.updated_at);
    }

    #[test]
    fn test_todo_validation() {
        assert!(input("Valid Todo").validate().is_ok());
        assert!(input("").validate().is_err());
        assert!(input(&"a".repeat(201)).validate().is_err());

        let long_description = TodoInput {
            description: Some("b".repeat(1001)),
            ..input("Valid title")
        };
        assert!(long_description.validate().is_err());
    }

    #[test]
    fn test_status_defaults_to_todo() {
        let parsed: TodoInput = serde_json::from_str(r#"{"title": "no status"}"#).unwrap();
        assert_eq!(parsed.status, TodoStatus::Todo);
        assert!(parsed.priority.is_none());
    }

    #[actix_web::test]
    async fn test_form_encoded_input() {
        use actix_web::test::TestRequest;
        use actix_web::web::Form;
        use actix_web::FromRequest;

        let (req, mut payload) = TestRequest::default()
            .insert_header(("content-type", "application/x-www-form-urlencoded"))
            .set_payload("title=Form+todo&status=in_progress&priority=urgent")
            .to_http_parts();
        let parsed = Form::<TodoInput>::from_request(&req, &mut payload)
            .await
            .unwrap()
            .into_inner();

        assert_eq!(parsed.title, "Form todo");
        assert_eq!(parsed.status, TodoStatus::InProgress);
        assert_eq!(parsed.priority, Some(TodoPriority::Urgent));
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_value(TodoStatus::InProgress).unwrap(), "in_progress");
        assert_eq!(serde_json::to_value(TodoPriority::Medium).unwrap(), "medium");
    }
}
