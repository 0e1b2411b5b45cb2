//! Minimal chainware demo — one chain, one handler, one hyper server.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/hello
//!   curl -i -H 'x-user: alice' http://localhost:3000/hello
//!   curl -i -H 'x-user: alice' -X POST http://localhost:3000/hello -d 'hi'

use std::time::Duration;

use chainware::middleware::{timeout::Timeout, trace::Trace};
use chainware::{Context, Request, ResponseWriter, chain};
use http::StatusCode;
use hyper::body::Incoming;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info};

#[derive(Clone)]
struct User(String);

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let app = chain![Trace, Timeout::new(Duration::from_secs(5)), authenticate]
        .then::<_, Incoming>(hello);

    let listener = TcpListener::bind("0.0.0.0:3000").await.expect("bind");
    info!(addr = "0.0.0.0:3000", "listening");

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(v) => v,
            Err(e) => {
                error!("accept error: {e}");
                continue;
            }
        };

        let svc = hyper::service::service_fn(app.clone());
        tokio::spawn(async move {
            if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                .serve_connection(TokioIo::new(stream), svc)
                .await
            {
                error!(%peer, "connection error: {e}");
            }
        });
    }
}

// Rejects requests without an `x-user` header. Writes the 401 itself: once it
// fails the context nothing else will.
fn authenticate(cx: Context, w: &mut ResponseWriter, req: &Request) -> Context {
    match req.header("x-user") {
        Some(name) => cx.with_value(User(name.to_owned())),
        None => {
            w.set_status(StatusCode::UNAUTHORIZED).text("missing x-user header\n");
            cx.fail("unauthenticated")
        }
    }
}

// GET|POST /hello
fn hello(cx: Context, w: &mut ResponseWriter, req: &Request) {
    let user = cx.value::<User>().map_or("stranger", |u| u.0.as_str());
    if req.body().is_empty() {
        w.text(format!("hello, {user}\n"));
    } else {
        w.text(format!("{user} said: {}\n", String::from_utf8_lossy(req.body())));
    }
}
