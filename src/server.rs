use actix_web::{dev::Server, HttpServer};
use std::io;
use std::net::TcpListener;

use crate::config::Config;
use crate::context::AppContext;
use crate::pipeline::{build_app, RouteTable};

/// Binds the listening socket described by `config`.
///
/// Binding happens before the server is built so a failure is reported before
/// any readiness message.
pub fn bind(config: &Config) -> io::Result<TcpListener> {
    TcpListener::bind((config.server_host.as_str(), config.server_port))
}

/// Starts serving `routes` on an already bound listener.
///
/// The returned `Server` must be awaited (or spawned) to process requests.
pub fn run(listener: TcpListener, ctx: AppContext, routes: RouteTable) -> io::Result<Server> {
    let workers = ctx.config.workers;
    let mut server = HttpServer::new(move || build_app(ctx.clone(), routes.clone()));
    if let Some(workers) = workers {
        server = server.workers(workers);
    }
    Ok(server.listen(listener)?.run())
}
