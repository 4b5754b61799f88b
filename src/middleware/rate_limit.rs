use axum::http::Request;
use std::task::{Context, Poll};
use tower::{Layer, Service};

// Simplified rate limiting for now - can be enhanced later
#[derive(Clone)]
pub struct RateLimitLayer {
    _per_second: u64,
    _burst: u32,
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitService<S>;

    fn layer(&self, service: S) -> Self::Service {
        RateLimitService { inner: service }
    }
}

#[derive(Clone)]
pub struct RateLimitService<S> {
    inner: S,
}

impl<S, ReqBody> Service<Request<ReqBody>> for RateLimitService<S>
where
    S: Service<Request<ReqBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        // TODO: Implement actual rate limiting logic
        self.inner.call(req)
    }
}

pub fn create_rate_limit_layer(per_second: u64, burst: u32) -> RateLimitLayer {
    RateLimitLayer {
        _per_second: per_second,
        _burst: burst,
    }
}
