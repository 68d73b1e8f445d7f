pub mod category;
pub mod todo;
pub mod user;

pub use category::{Category, CategoryInput};
pub use todo::{Todo, TodoInput, TodoPriority, TodoQuery, TodoStatus};
pub use user::User;
