//! Middleware steps.
//!
//! A middleware step is anything that takes the current [`Context`], the
//! [`ResponseWriter`] and the [`Request`], and returns the context the next
//! step should see. To stop the chain, return a context whose
//! [`err`](Context::err) is `Some` — usually via [`Context::fail`] after
//! writing an error response:
//!
//! ```rust
//! use chainware::{Context, Request, ResponseWriter};
//! use http::StatusCode;
//!
//! fn require_api_key(cx: Context, w: &mut ResponseWriter, req: &Request) -> Context {
//!     if req.header("x-api-key").is_some() {
//!         return cx;
//!     }
//!     w.set_status(StatusCode::UNAUTHORIZED).text("missing api key");
//!     cx.fail("missing api key")
//! }
//! ```
//!
//! Plain `fn` items like the one above are middleware as they are. Closures
//! need [`from_fn`] so the compiler picks the right signature.
//!
//! Built-in middleware:
//! - [`trace::Trace`] — logs method and path of every request
//! - [`timeout::Timeout`] — puts a deadline on the rest of the chain

use std::sync::Arc;

use crate::context::Context;
use crate::request::Request;
use crate::response::ResponseWriter;

pub mod timeout;
pub mod trace;

/// One step of a [`Chain`](crate::Chain).
pub trait Middleware: Send + Sync + 'static {
    fn call(&self, cx: Context, w: &mut ResponseWriter, req: &Request) -> Context;

    /// Name used in log events when this step halts a chain.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// A shared, type-erased middleware step.
///
/// `Arc` so chains can be cloned and extended without copying their steps.
pub type BoxedMiddleware = Arc<dyn Middleware>;

impl<F> Middleware for F
where
    F: Fn(Context, &mut ResponseWriter, &Request) -> Context + Send + Sync + 'static,
{
    fn call(&self, cx: Context, w: &mut ResponseWriter, req: &Request) -> Context {
        self(cx, w, req)
    }
}

/// Middleware built from a closure by [`from_fn`].
pub struct MiddlewareFn<F>(F);

impl<F> Middleware for MiddlewareFn<F>
where
    F: Fn(Context, &mut ResponseWriter, &Request) -> Context + Send + Sync + 'static,
{
    fn call(&self, cx: Context, w: &mut ResponseWriter, req: &Request) -> Context {
        (self.0)(cx, w, req)
    }

    fn name(&self) -> &str {
        std::any::type_name::<F>()
    }
}

/// Turns a closure into middleware.
///
/// ```rust
/// use chainware::{Chain, middleware};
///
/// let greeting = String::from("hello");
/// let chain = Chain::new().with(middleware::from_fn(move |cx, w, _req| {
///     w.header("x-greeting", &greeting);
///     cx
/// }));
/// assert_eq!(chain.len(), 1);
/// ```
pub fn from_fn<F>(f: F) -> MiddlewareFn<F>
where
    F: Fn(Context, &mut ResponseWriter, &Request) -> Context + Send + Sync + 'static,
{
    MiddlewareFn(f)
}
