//! Chain composition.
//!
//! # How a chain becomes one function
//!
//! Steps are folded right to left. The function for position `i` calls step
//! `i`, looks at the returned context, and calls the function for `i + 1`
//! only if [`Context::err`] is `None`:
//!
//! ```text
//! [a, b, c]  →  link(a, link(b, link(c, ∅)))
//!
//! a(cx) ── ok ──▶ b(cx) ── ok ──▶ c(cx) ── ok ──▶ cx
//!   │               │               │
//!   └─ err ─▶ cx    └─ err ─▶ cx    └─ err ─▶ cx
//! ```
//!
//! An empty chain composes to the identity, so a handler behind zero
//! middleware needs no special case. The first step always runs, even if the
//! incoming context already carries an error.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::context::Context;
use crate::handler::Handler;
use crate::middleware::{BoxedMiddleware, Middleware};
use crate::request::Request;
use crate::response::ResponseWriter;

/// Builds a request's starting [`Context`].
pub(crate) type ContextFactory = Arc<dyn Fn(&Request) -> Context + Send + Sync + 'static>;

fn background(_req: &Request) -> Context {
    Context::background()
}

// ── Chain ─────────────────────────────────────────────────────────────────────

/// An ordered, append-only list of middleware steps.
///
/// Insertion order is execution order. Build it at startup, then turn it into
/// a hyper service with [`then`](Chain::then) or [`handle`](Chain::handle).
/// Those snapshot the steps: adding to the chain afterwards does not change
/// services already built from it.
///
/// ```rust
/// use chainware::{Context, Request, ResponseWriter, chain};
///
/// fn cors(cx: Context, w: &mut ResponseWriter, _req: &Request) -> Context {
///     w.header("access-control-allow-origin", "*");
///     cx
/// }
///
/// fn format(cx: Context, _w: &mut ResponseWriter, _req: &Request) -> Context {
///     cx
/// }
///
/// fn auth(cx: Context, _w: &mut ResponseWriter, _req: &Request) -> Context {
///     cx
/// }
///
/// let mut chain = chain![cors, format];
/// chain.add(auth);
/// assert_eq!(chain.len(), 3);
/// ```
#[derive(Clone)]
pub struct Chain {
    steps: Vec<BoxedMiddleware>,
    factory: ContextFactory,
}

impl Chain {
    pub fn new() -> Self {
        Self { steps: Vec::new(), factory: Arc::new(background) }
    }

    /// Appends a step.
    pub fn add(&mut self, step: impl Middleware) -> &mut Self {
        self.steps.push(Arc::new(step));
        self
    }

    /// Appends a step. Returns `self` so construction chains naturally.
    pub fn with(mut self, step: impl Middleware) -> Self {
        self.add(step);
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Replaces the factory that builds each request's starting context.
    ///
    /// Defaults to [`Context::background`]. Only [`then`](Chain::then) and
    /// [`handle`](Chain::handle) use it; [`run`](Chain::run) takes the
    /// context from its caller.
    pub fn with_context<F>(mut self, factory: F) -> Self
    where
        F: Fn(&Request) -> Context + Send + Sync + 'static,
    {
        self.factory = Arc::new(factory);
        self
    }

    /// Composes the steps into a single function.
    pub fn link(&self) -> Link {
        let mut next = None;
        for (index, step) in self.steps.iter().enumerate().rev() {
            next = Some(link(index, Arc::clone(step), next));
        }
        next.unwrap_or_else(Link::identity)
    }

    /// Runs the steps against a caller-supplied context and returns the
    /// context the chain ended with. Mostly useful in tests.
    pub fn run(&self, cx: Context, w: &mut ResponseWriter, req: &Request) -> Context {
        self.link().call(cx, w, req)
    }

    /// Ends the chain in `handler` and returns it as a hyper service.
    pub fn handle<H: Handler>(&self, handler: H) -> ChainHandler<H> {
        ChainHandler {
            inner: Arc::new(Bound {
                link: self.link(),
                factory: Arc::clone(&self.factory),
                handler,
            }),
        }
    }
}

impl Default for Chain {
    fn default() -> Self { Self::new() }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.steps.iter().map(|step| step.name()))
            .finish()
    }
}

impl Extend<BoxedMiddleware> for Chain {
    fn extend<I: IntoIterator<Item = BoxedMiddleware>>(&mut self, steps: I) {
        self.steps.extend(steps);
    }
}

impl FromIterator<BoxedMiddleware> for Chain {
    fn from_iter<I: IntoIterator<Item = BoxedMiddleware>>(steps: I) -> Self {
        let mut chain = Self::new();
        chain.extend(steps);
        chain
    }
}

/// Builds a [`Chain`] from a list of steps, in order.
///
/// `chain![a, b]` is `Chain::new().with(a).with(b)`; `chain![]` is empty.
#[macro_export]
macro_rules! chain {
    ($($step:expr),* $(,)?) => {
        $crate::Chain::new()$(.with($step))*
    };
}

// ── Link ──────────────────────────────────────────────────────────────────────

/// A composed chain: every step folded into one function.
///
/// A `Link` is itself [`Middleware`], so one chain can be spliced into another
/// with `outer.add(inner.link())`.
#[derive(Clone)]
pub struct Link(Arc<dyn Fn(Context, &mut ResponseWriter, &Request) -> Context + Send + Sync + 'static>);

impl Link {
    fn new<F>(f: F) -> Self
    where
        F: Fn(Context, &mut ResponseWriter, &Request) -> Context + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    fn identity() -> Self {
        Self::new(|cx, _w, _req| cx)
    }
}

impl Middleware for Link {
    fn call(&self, cx: Context, w: &mut ResponseWriter, req: &Request) -> Context {
        (self.0)(cx, w, req)
    }

    fn name(&self) -> &str {
        "chain"
    }
}

/// Runs `current`, then `next` unless `current` left an error on the context.
fn link(index: usize, current: BoxedMiddleware, next: Option<Link>) -> Link {
    Link::new(move |cx, w, req| {
        let cx = current.call(cx, w, req);
        if let Some(err) = cx.err() {
            debug!(step = index, middleware = current.name(), error = %err, "chain halted");
            return cx;
        }
        match &next {
            Some(next) => next.call(cx, w, req),
            None => cx,
        }
    })
}

// ── ChainHandler ──────────────────────────────────────────────────────────────

/// A composed chain bound to its terminal [`Handler`].
///
/// Implements [`hyper::service::Service`] for any request body and is
/// itself a [`Handler`], so it can end another chain:
/// `chain![a].handle(chain![b].handle(h))` behaves like `chain![a, b].handle(h)`
/// (the inner chain reuses the outer chain's context).
pub struct ChainHandler<H> {
    pub(crate) inner: Arc<Bound<H>>,
}

pub(crate) struct Bound<H> {
    link: Link,
    factory: ContextFactory,
    handler: H,
}

impl<H: Handler> Bound<H> {
    pub(crate) fn derive_context(&self, req: &Request) -> Context {
        (self.factory)(req)
    }

    /// Runs the chain and, if it did not halt, the handler. Returns whether
    /// the handler ran.
    pub(crate) fn execute(&self, cx: Context, w: &mut ResponseWriter, req: &Request) -> bool {
        let cx = self.link.call(cx, w, req);
        if cx.err().is_some() {
            return false;
        }
        self.handler.serve(cx, w, req);
        true
    }
}

impl<H> Clone for ChainHandler<H> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<H: Handler> Handler for ChainHandler<H> {
    fn serve(&self, cx: Context, w: &mut ResponseWriter, req: &Request) {
        self.inner.execute(cx, w, req);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::handler::handler_fn;
    use crate::middleware::from_fn;

    fn request() -> Request {
        Request::from(http::Request::get("/").body("").expect("request"))
    }

    /// A step that appends `tag` to a shared log and passes through.
    fn record(log: &Arc<Mutex<Vec<&'static str>>>, tag: &'static str) -> impl Middleware + use<> {
        let log = Arc::clone(log);
        from_fn(move |cx, _w, _req| {
            log.lock().expect("log").push(tag);
            cx
        })
    }

    #[test]
    fn steps_run_in_insertion_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = chain![record(&log, "a"), record(&log, "b")];
        chain.add(record(&log, "c"));

        chain.run(Context::background(), &mut ResponseWriter::new(), &request());
        assert_eq!(*log.lock().expect("log"), ["a", "b", "c"]);
    }

    #[test]
    fn empty_chain_is_identity() {
        #[derive(Clone)]
        struct Marker;

        let cx = Chain::new().run(
            Context::background().with_value(Marker),
            &mut ResponseWriter::new(),
            &request(),
        );
        assert!(cx.value::<Marker>().is_some());
        assert!(cx.err().is_none());
    }

    #[test]
    fn first_step_runs_even_on_a_failed_context() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain = chain![record(&log, "a"), record(&log, "b")];

        let cx = chain.run(Context::background().fail("already"), &mut ResponseWriter::new(), &request());
        assert!(cx.err().is_some());
        assert_eq!(*log.lock().expect("log"), ["a"]);
    }

    #[test]
    fn extending_with_nothing_is_a_no_op() {
        let mut chain = chain![|cx: Context, _: &mut ResponseWriter, _: &Request| cx];
        chain.extend(std::iter::empty());
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn built_handlers_ignore_later_additions() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = chain![record(&log, "a")];
        let handler = chain.handle(handler_fn(|_cx, _w, _req| {}));
        chain.add(record(&log, "late"));

        handler.serve(Context::background(), &mut ResponseWriter::new(), &request());
        assert_eq!(*log.lock().expect("log"), ["a"]);
    }

    #[test]
    fn debug_lists_step_names() {
        let chain = chain![crate::middleware::trace::Trace, Chain::new().link()];
        assert_eq!(format!("{chain:?}"), r#"["trace", "chain"]"#);
    }
}
