//! The terminal unit of a chain.
//!
//! # Plain functions and handler objects
//!
//! A chain ends either in a plain function or in an object with its own
//! state. Both reach the chain through one capability, [`Handler::serve`]:
//!
//! ```text
//! fn hello(cx, w, req) { … }            ← user writes this
//!        ↓ chain.then(hello)
//! HandlerFn(hello)                      ← default adapter
//!        ↓ chain.handle(handler)
//! ChainHandler { link, factory, h }     ← shared behind one Arc
//!        ↓ per request
//! h.serve(cx, &mut w, &req)             ← only if cx.err() is None
//! ```
//!
//! So the chain logic exists once, whatever the terminal looks like.

use std::sync::Arc;

use crate::context::Context;
use crate::request::Request;
use crate::response::ResponseWriter;

/// Anything that can finish a request once every middleware step has passed.
///
/// ```rust
/// use chainware::{Context, Handler, Request, ResponseWriter};
///
/// struct Greeter {
///     greeting: String,
/// }
///
/// impl Handler for Greeter {
///     fn serve(&self, _cx: Context, w: &mut ResponseWriter, _req: &Request) {
///         w.text(self.greeting.clone());
///     }
/// }
/// ```
pub trait Handler: Send + Sync + 'static {
    fn serve(&self, cx: Context, w: &mut ResponseWriter, req: &Request);
}

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn serve(&self, cx: Context, w: &mut ResponseWriter, req: &Request) {
        (**self).serve(cx, w, req);
    }
}

impl<H: Handler + ?Sized> Handler for Box<H> {
    fn serve(&self, cx: Context, w: &mut ResponseWriter, req: &Request) {
        (**self).serve(cx, w, req);
    }
}

/// Adapter that lets a plain function act as a [`Handler`].
///
/// Build one with [`handler_fn`]; [`Chain::then`](crate::Chain::then) does it
/// for you.
#[derive(Clone)]
pub struct HandlerFn<F>(F);

impl<F> Handler for HandlerFn<F>
where
    F: Fn(Context, &mut ResponseWriter, &Request) + Send + Sync + 'static,
{
    fn serve(&self, cx: Context, w: &mut ResponseWriter, req: &Request) {
        (self.0)(cx, w, req);
    }
}

/// Wraps `f` in the default [`Handler`] adapter.
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: Fn(Context, &mut ResponseWriter, &Request) + Send + Sync + 'static,
{
    HandlerFn(f)
}
