//! Idempotency guard for retried mutations.
//!
//! Wraps the mutation routes: a request carrying an `Idempotency-Key` header
//! is answered from the stored response when one exists, and otherwise runs
//! normally with its response body captured and stored with insert-if-absent
//! semantics. Requests without a key, and non-mutation verbs, bypass the
//! guard entirely.

use std::rc::Rc;
use std::task::{Context, Poll};

use actix_web::{
    body::{to_bytes, BoxBody, MessageBody},
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::{header::HeaderMap, Method, StatusCode},
    web::Bytes,
    Error, HttpResponse,
};
use futures::future::{ok, LocalBoxFuture, Ready};

use crate::database::repositories::IdempotencyRepository;

pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

/// Only mutation verbs are eligible; reads are never wrapped.
pub fn is_idempotent_method(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

/// Non-empty, trimmed key from the request headers, if any.
pub fn idempotency_key(headers: &HeaderMap) -> Option<String> {
    headers
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(String::from)
}

pub struct IdempotencyGuard {
    repository: IdempotencyRepository,
    ttl_hours: i64,
}

impl IdempotencyGuard {
    pub fn new(repository: IdempotencyRepository, ttl_hours: i64) -> Self {
        Self {
            repository,
            ttl_hours,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for IdempotencyGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
    <B as MessageBody>::Error: actix_web::ResponseError,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = IdempotencyGuardService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(IdempotencyGuardService {
            service: Rc::new(service),
            repository: self.repository.clone(),
            ttl_hours: self.ttl_hours,
        })
    }
}

pub struct IdempotencyGuardService<S> {
    service: Rc<S>,
    repository: IdempotencyRepository,
    ttl_hours: i64,
}

impl<S, B> Service<ServiceRequest> for IdempotencyGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
    <B as MessageBody>::Error: actix_web::ResponseError,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Reads and keyless mutations pass straight through.
        let key = match (is_idempotent_method(req.method()), idempotency_key(req.headers())) {
            (true, Some(key)) => key,
            _ => {
                let svc = self.service.clone();
                return Box::pin(async move { Ok(svc.call(req).await?.map_into_boxed_body()) });
            }
        };

        let repository = self.repository.clone();
        let ttl_hours = self.ttl_hours;
        let svc = self.service.clone();

        Box::pin(async move {
            match repository.get(&key, ttl_hours).await {
                Ok(Some(record)) => {
                    log::info!(
                        "Replaying stored idempotent response: key={} status={}",
                        key,
                        record.status_code
                    );
                    let status = StatusCode::from_u16(record.status_code as u16)
                        .unwrap_or(StatusCode::OK);
                    let res = HttpResponse::build(status)
                        .content_type("application/json")
                        .body(record.response_body);
                    return Ok(req.into_response(res));
                }
                Ok(None) => {}
                Err(err) => {
                    // Degraded mode: run the mutation unguarded. A later
                    // retry re-executes and the business rules absorb it.
                    log::error!("Idempotency lookup failed for key {}: {}", key, err);
                }
            }

            let res = svc.call(req).await?;
            let (req, res) = res.into_parts();
            let status = res.status();
            let headers = res.headers().clone();

            let body_bytes = to_bytes(res.into_body()).await?;

            let mut builder = HttpResponse::build(status);
            for (name, value) in headers.iter() {
                builder.insert_header((name.clone(), value.clone()));
            }
            let out_res = builder.body(Bytes::from(body_bytes.to_vec()));

            match std::str::from_utf8(&body_bytes) {
                Ok(body_str) => {
                    // First writer wins; a concurrent retry's write is
                    // dropped by the key constraint. A store failure is
                    // logged and never fails the request - the mutation
                    // already happened.
                    if let Err(err) = repository
                        .store(&key, body_str, status.as_u16() as i32)
                        .await
                    {
                        log::error!("Failed to store idempotent response for key {}: {}", key, err);
                    }
                }
                Err(_) => {
                    log::warn!("Skipping idempotency store for non-UTF8 body: key={}", key);
                }
            }

            Ok(ServiceResponse::new(req, out_res))
        })
    }
}
