use sqlx::postgres::PgPoolOptions;
use std::io;
use todo_api::{server, telemetry, AppContext, Config, RouteTable};

fn other_error<E: std::fmt::Display>(context: &str, err: E) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    telemetry::init_logging();

    let config = Config::from_env().map_err(|e| other_error("invalid configuration", e))?;
    let _tracking = telemetry::init_tracking(&config);

    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .map_err(|e| other_error("failed to connect to database", e))?;
    sqlx::migrate!()
        .run(&db)
        .await
        .map_err(|e| other_error("failed to run migrations", e))?;

    let listener = server::bind(&config).map_err(|e| {
        log::error!("Failed to bind port {}: {}", config.server_port, e);
        e
    })?;
    let server_url = config.server_url();

    let ctx = AppContext::new(config, db);
    let server = server::run(listener, ctx, RouteTable::api())?;
    println!("🚀 Сервер запущен на {}", server_url);
    server.await
}
