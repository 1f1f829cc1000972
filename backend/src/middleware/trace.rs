//! Tracing middleware attaching a request-scoped trace identifier.
//!
//! Each request runs with a fresh [`TraceId`] in task-local scope, so domain
//! errors raised while serving it carry the same identifier that is echoed
//! in the `trace-id` response header. One completion event is logged per
//! request.

use std::task::{Context, Poll};
use std::time::Instant;

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{error, info, warn};

use crate::domain::{TRACE_ID_HEADER, TraceId};

/// Middleware assigning a trace identifier to every request.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use deals_backend::Trace;
///
/// let app = App::new().wrap(Trace);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Trace;

impl<S, B> Transform<S, ServiceRequest> for Trace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceMiddleware { service }))
    }
}

/// Service wrapper produced by [`Trace`].
pub struct TraceMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for TraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let trace_id = TraceId::generate();
        let method = req.method().clone();
        let path = req.path().to_owned();
        let started = Instant::now();
        let fut = self.service.call(req);
        Box::pin(TraceId::scope(trace_id, async move {
            let result = fut.await;
            let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            match result {
                Ok(mut res) => {
                    match HeaderValue::from_str(&trace_id.to_string()) {
                        Ok(value) => {
                            res.response_mut()
                                .headers_mut()
                                .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
                        }
                        Err(err) => {
                            error!(error = %err, %trace_id, "failed to encode trace identifier header");
                        }
                    }
                    let status = res.status().as_u16();
                    info!(%trace_id, %method, %path, status, latency_ms, "request completed");
                    Ok(res)
                }
                Err(err) => {
                    warn!(%trace_id, %method, %path, error = %err, latency_ms, "request failed");
                    Err(err)
                }
            }
        }))
    }
}
