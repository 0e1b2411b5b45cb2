//! # chainware
//!
//! Ordered middleware chains for hyper services, with a request-scoped
//! [`Context`] threaded through every step.
//!
//! ## The contract
//!
//! A chain is a list of steps and one handler. Each step gets the context,
//! the [`ResponseWriter`] and the [`Request`], and returns the context for the
//! next step. A step that returns a context with an error stops the chain:
//! no later step runs and neither does the handler. That is the only way a
//! chain stops. No panics, no `Result`s, no "next" callbacks to forget.
//!
//! What the host already owns, and chainware leaves alone:
//!
//! - **Routing** — put a chain behind each route of the router you already use
//! - **Connections** — hyper / hyper-util accept and drive them
//! - **Serialization** — steps and handlers write bytes; which bytes is theirs to decide
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use chainware::{Context, Request, ResponseWriter, chain, middleware::trace::Trace};
//! use http::StatusCode;
//!
//! #[derive(Clone)]
//! struct User(String);
//!
//! fn auth(cx: Context, w: &mut ResponseWriter, req: &Request) -> Context {
//!     match req.header("x-user") {
//!         Some(name) => cx.with_value(User(name.to_owned())),
//!         None => {
//!             w.set_status(StatusCode::UNAUTHORIZED).text("who are you?");
//!             cx.fail("missing x-user")
//!         }
//!     }
//! }
//!
//! fn hello(cx: Context, w: &mut ResponseWriter, _req: &Request) {
//!     let user = cx.value::<User>().map_or("stranger", |u| u.0.as_str());
//!     w.text(format!("hello, {user}"));
//! }
//!
//! # async fn run(io: hyper_util::rt::TokioIo<tokio::net::TcpStream>) {
//! let svc = chain![Trace, auth].handle(chainware::handler_fn(hello));
//! hyper::server::conn::http1::Builder::new()
//!     .serve_connection(io, svc)
//!     .await
//!     .unwrap();
//! # }
//! ```

mod chain;
mod context;
mod error;
mod handler;
mod request;
mod response;
mod service;

pub mod middleware;

pub use chain::{Chain, ChainHandler, Link};
pub use context::{CancelHandle, Context};
pub use error::Error;
pub use handler::{Handler, HandlerFn, handler_fn};
pub use middleware::{BoxedMiddleware, Middleware};
pub use request::Request;
pub use response::{ContentType, Response, ResponseWriter};
pub use service::{BoxFuture, HttpResponse};
