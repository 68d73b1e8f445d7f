//! Terminal stage of the pipeline: the central error handler.
//!
//! `ErrorBoundary` guarantees that every request leaves the pipeline following
//! the `AppError` JSON contract:
//!
//! - responses carrying a framework error (extractor failures, payload limits)
//!   are re-rendered through `AppError`,
//! - `Err` values from inner services come back as `AppError`,
//! - panics, both while building the handler future and while polling it, are
//!   caught and returned as a 500 `AppError`.
//!
//! No clone of the request is held while the inner service runs: routing needs
//! exclusive access to it. Responses keep their error attached and failures are
//! returned as `Err`, so the tracking middleware wrapped around this stage still
//! sees and reports 5xx failures.

use actix_web::{
    body::{EitherBody, MessageBody},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::{Method, Uri},
    Error, HttpResponse,
};
use futures::future::{ready, FutureExt, LocalBoxFuture, Ready};
use std::panic::{self, AssertUnwindSafe};

use crate::error::AppError;

pub struct ErrorBoundary;

impl<S, B> Transform<S, ServiceRequest> for ErrorBoundary
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = ErrorBoundaryService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ErrorBoundaryService { service }))
    }
}

pub struct ErrorBoundaryService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for ErrorBoundaryService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let method = req.method().clone();
        let uri = req.uri().clone();

        let fut = match panic::catch_unwind(AssertUnwindSafe(|| self.service.call(req))) {
            Ok(fut) => fut,
            Err(payload) => {
                let err = failure(AppError::from_panic(payload), &method, &uri);
                return Box::pin(async move { Err::<Self::Response, _>(err) });
            }
        };

        Box::pin(async move {
            match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(Ok(res)) => Ok(normalize(res)),
                Ok(Err(err)) => Err(failure(AppError::from(err), &method, &uri)),
                Err(payload) => Err(failure(AppError::from_panic(payload), &method, &uri)),
            }
        })
    }
}

/// Converts a failure that left no response behind.
///
/// The request was consumed by the inner service, so the error is returned as
/// `Err` and actix renders it with `AppError::error_response`.
fn failure(err: AppError, method: &Method, uri: &Uri) -> Error {
    if err.status().is_server_error() {
        log::warn!("{} {} failed: {}", method, uri, err);
    }
    err.into()
}

/// Re-renders responses whose attached error is not already an `AppError`.
fn normalize<B>(res: ServiceResponse<B>) -> ServiceResponse<EitherBody<B>> {
    let foreign = match res.response().error() {
        Some(err) if err.as_error::<AppError>().is_none() => Some(AppError::from(err)),
        _ => None,
    };

    match foreign {
        Some(app_err) => res
            .into_response(HttpResponse::from_error(app_err))
            .map_into_right_body(),
        None => res.map_into_left_body(),
    }
}
