//! The request pipeline.
//!
//! `build_app` assembles every stage in a fixed order. Reading the request path
//! from the outside in:
//!
//! 1. `sentry_actix::Sentry` opens a hub and a transaction for the request, and on the
//!    way out reports any 5xx response carrying an error.
//! 2. `RequestLogger` logs the method and URI.
//! 3. Body limits for JSON and URL-encoded forms; handlers decode with `routes::Body`.
//! 4. The documentation endpoints.
//! 5. One scope per `Mount` of the `RouteTable`, longest prefix first.
//! 6. `not_found` for anything left unmatched, including unmatched paths inside a scope.
//! 7. `ErrorBoundary`, the central error handler, renders every error and panic.

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App, Error,
};

use crate::config::ConfigError;
use crate::context::AppContext;
use crate::docs;
use crate::middleware::{ErrorBoundary, RequestLogger};
use crate::routes;

/// Registers a collaborator's services inside its scope.
pub type Configure = fn(&mut web::ServiceConfig);

/// A collaborator mounted under a path prefix.
#[derive(Clone, Copy)]
pub struct Mount {
    pub prefix: &'static str,
    pub configure: Configure,
}

impl Mount {
    pub const fn new(prefix: &'static str, configure: Configure) -> Self {
        Self { prefix, configure }
    }

    /// Segment-aware prefix match: `/api/todos` matches `/api/todos` and
    /// `/api/todos/1`, but not `/api/todosx`.
    pub fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

impl std::fmt::Debug for Mount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mount").field("prefix", &self.prefix).finish()
    }
}

/// Static routing table, built once at startup.
///
/// Mounts are kept longest prefix first, which is also the order their scopes are
/// registered in, so the most specific prefix wins when prefixes nest.
#[derive(Debug, Clone)]
pub struct RouteTable {
    mounts: Vec<Mount>,
}

impl RouteTable {
    pub fn new<I>(mounts: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = Mount>,
    {
        let mut table: Vec<Mount> = Vec::new();
        for mount in mounts {
            let prefix = mount.prefix;
            if !prefix.starts_with('/') || prefix.len() < 2 || prefix.ends_with('/') {
                return Err(ConfigError::InvalidMount(format!(
                    "prefix {:?} must start with '/' and must not end with '/'",
                    prefix
                )));
            }
            if table.iter().any(|m| m.prefix == prefix) {
                return Err(ConfigError::InvalidMount(format!("prefix {:?} is mounted twice", prefix)));
            }
            table.push(mount);
        }
        Ok(Self::sorted(table))
    }

    fn sorted(mut mounts: Vec<Mount>) -> Self {
        mounts.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        Self { mounts }
    }

    /// The production table: authentication, categories and todos.
    pub fn api() -> Self {
        Self::sorted(vec![
            Mount::new("/api/auth", routes::auth_config),
            Mount::new("/api/categories", routes::categories_config),
            Mount::new("/api/todos", routes::todos_config),
        ])
    }

    pub fn mounts(&self) -> &[Mount] {
        &self.mounts
    }

    /// The mount a request path is dispatched to, if any.
    pub fn resolve(&self, path: &str) -> Option<&Mount> {
        self.mounts.iter().find(|mount| mount.matches(path))
    }
}

/// Builds the application for one worker.
pub fn build_app(
    ctx: AppContext,
    routes: RouteTable,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    let body_limit = ctx.config.body_limit;

    let mut app = App::new()
        .app_data(web::Data::new(ctx))
        .app_data(web::PayloadConfig::new(body_limit))
        .app_data(web::JsonConfig::default().limit(body_limit))
        .app_data(web::FormConfig::default().limit(body_limit))
        .configure(docs::config);

    for mount in routes.mounts() {
        app = app.service(
            web::scope(mount.prefix)
                .configure(mount.configure)
                .default_service(web::to(routes::system::not_found)),
        );
    }

    app.service(routes::system::error_test)
        .default_service(web::to(routes::system::not_found))
        .wrap(ErrorBoundary)
        .wrap(RequestLogger)
        .wrap(
            sentry_actix::Sentry::builder()
                .capture_server_errors(true)
                .start_transaction(true)
                .finish(),
        )
}
