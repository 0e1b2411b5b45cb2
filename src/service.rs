//! hyper adaptation.
//!
//! hyper hands us an `http::Request<B>` with a streaming body. The chain wants
//! a [`Request`] it can borrow synchronously, so each invocation:
//!
//! 1. Collects the body. A body that fails to arrive gets `400 Bad Request`
//!    and never reaches the chain.
//! 2. Derives the starting [`Context`](crate::Context) from the chain's
//!    factory.
//! 3. Runs the composed chain, then the handler if nothing halted.
//! 4. Turns the [`ResponseWriter`] into the hyper response.
//!
//! The service error type is [`Infallible`]: every outcome is a response.

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use hyper::service::Service;
use tracing::{debug, warn};

use crate::chain::{Chain, ChainHandler};
use crate::context::Context;
use crate::handler::{Handler, handler_fn};
use crate::request::Request;
use crate::response::{Response, ResponseWriter};

/// A heap-allocated, type-erased future.
///
/// `Pin<Box<…>>` so hyper can poll it in place; `Send + 'static` so tokio can
/// move it across worker threads.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// The response type every chain service produces.
pub type HttpResponse = http::Response<Full<Bytes>>;

impl<H, B> Service<http::Request<B>> for ChainHandler<H>
where
    H: Handler,
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: fmt::Display + Send,
{
    type Response = HttpResponse;
    type Error = Infallible;
    type Future = BoxFuture<Result<HttpResponse, Infallible>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        let this = self.clone();
        Box::pin(async move { Ok(dispatch(&this, req).await) })
    }
}

impl Chain {
    /// Ends the chain in the function `f` and returns a plain request
    /// function, ready for `hyper::service::service_fn`.
    ///
    /// ```rust,no_run
    /// use chainware::{Context, Request, ResponseWriter, chain, middleware::trace::Trace};
    ///
    /// fn hello(_cx: Context, w: &mut ResponseWriter, _req: &Request) {
    ///     w.text("hello");
    /// }
    ///
    /// let svc = hyper::service::service_fn(
    ///     chain![Trace].then::<_, hyper::body::Incoming>(hello),
    /// );
    /// ```
    pub fn then<F, B>(
        &self,
        f: F,
    ) -> impl Fn(http::Request<B>) -> BoxFuture<Result<HttpResponse, Infallible>>
           + Clone + Send + Sync + use<F, B>
    where
        F: Fn(Context, &mut ResponseWriter, &Request) + Send + Sync + 'static,
        B: Body + Send + 'static,
        B::Data: Send,
        B::Error: fmt::Display + Send,
    {
        let handler = self.handle(handler_fn(f));
        move |req| handler.call(req)
    }
}

/// Hot path: one request in, one response out.
async fn dispatch<H, B>(handler: &ChainHandler<H>, req: http::Request<B>) -> HttpResponse
where
    H: Handler,
    B: Body,
    B::Error: fmt::Display,
{
    let (head, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(method = %head.method, path = head.uri.path(), "failed to read request body: {e}");
            return Response::status(StatusCode::BAD_REQUEST).into_inner();
        }
    };

    let started = Instant::now();
    let req = Request::from_parts(head, body);
    let mut w = ResponseWriter::new();

    let cx = handler.inner.derive_context(&req);
    let served = handler.inner.execute(cx, &mut w, &req);

    debug!(
        method = %req.method(),
        path = req.path(),
        status = w.status().as_u16(),
        halted = !served,
        elapsed_us = started.elapsed().as_micros() as u64,
        "request completed"
    );

    w.into_response().into_inner()
}
