use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A user-defined grouping for todos.
#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    /// Owner of the category.
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input structure for creating or renaming a category.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CategoryInput {
    /// Must be between 1 and 100 characters, unique per user.
    #[validate(length(min = 1, max = 100, message = "от 1 до 100 символов"))]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_input_validation() {
        let valid = CategoryInput {
            name: "Работа".to_string(),
        };
        assert!(valid.validate().is_ok());

        let empty = CategoryInput {
            name: String::new(),
        };
        assert!(empty.validate().is_err());

        let too_long = CategoryInput {
            name: "c".repeat(101),
        };
        assert!(too_long.validate().is_err());
    }
}
