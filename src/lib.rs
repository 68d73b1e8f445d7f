#![doc = "The `todo_api` library crate."]
#![doc = ""]
#![doc = "Contains the request pipeline, the authentication, category and todo route groups,"]
#![doc = "the domain models and the error handling of the todo API."]
#![doc = "The binary (`main.rs`) only loads configuration and starts the server."]

pub mod auth;
pub mod config;
pub mod context;
pub mod docs;
pub mod error;
pub mod middleware;
pub mod models;
pub mod pipeline;
pub mod routes;
pub mod server;
pub mod telemetry;

pub use config::Config;
pub use context::AppContext;
pub use error::AppError;
pub use pipeline::{build_app, Mount, RouteTable};
