//! Logging and error-tracking setup.

use crate::config::Config;

/// Initializes `env_logger`, defaulting to the `info` level when `RUST_LOG` is unset.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

/// Initializes the Sentry client.
///
/// The returned guard flushes pending events when dropped, so it must live for the
/// whole process. Without a DSN the client is disabled and every capture is a no-op.
pub fn init_tracking(config: &Config) -> sentry::ClientInitGuard {
    let guard = sentry::init(sentry::ClientOptions {
        dsn: config.sentry_dsn.clone(),
        release: sentry::release_name!(),
        traces_sample_rate: config.traces_sample_rate,
        ..Default::default()
    });
    if guard.is_enabled() {
        log::info!("Error tracking enabled");
    } else {
        log::info!("SENTRY_DSN not set, error tracking disabled");
    }
    guard
}
