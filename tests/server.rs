//! End to end: a real listener, hyper-util driving the connection, raw HTTP/1.1
//! on the wire.

use std::net::SocketAddr;

use chainware::{Context, Request, ResponseWriter, chain, handler_fn, middleware::trace::Trace};
use http::StatusCode;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

fn api_key(cx: Context, w: &mut ResponseWriter, req: &Request) -> Context {
    if req.header("x-api-key") == Some("letmein") {
        return cx;
    }
    w.set_status(StatusCode::UNAUTHORIZED).text("bad key");
    cx.fail("bad api key")
}

fn hello(_cx: Context, w: &mut ResponseWriter, req: &Request) {
    w.text(format!("hello from {}", req.path()));
}

/// Serves the chain on an ephemeral port until the test's runtime shuts down.
async fn spawn_server() -> SocketAddr {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let svc = chain![Trace, api_key].handle(handler_fn(hello));

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else { continue };
            let svc = svc.clone();
            tokio::spawn(async move {
                let _ = ConnBuilder::new(TokioExecutor::new())
                    .serve_connection(TokioIo::new(stream), svc)
                    .await;
            });
        }
    });

    addr
}

async fn roundtrip(addr: SocketAddr, raw: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.expect("connect");
    stream.write_all(raw.as_bytes()).await.expect("write");

    let mut out = String::new();
    stream.read_to_string(&mut out).await.expect("read");
    out
}

#[tokio::test]
async fn serves_through_the_chain() {
    let addr = spawn_server().await;

    let ok = roundtrip(
        addr,
        "GET /greeting HTTP/1.1\r\nhost: test\r\nx-api-key: letmein\r\nconnection: close\r\n\r\n",
    )
    .await;
    assert!(ok.starts_with("HTTP/1.1 200 OK\r\n"), "{ok}");
    assert!(ok.ends_with("hello from /greeting"), "{ok}");

    let denied = roundtrip(
        addr,
        "GET /greeting HTTP/1.1\r\nhost: test\r\nconnection: close\r\n\r\n",
    )
    .await;
    assert!(denied.starts_with("HTTP/1.1 401 Unauthorized\r\n"), "{denied}");
    assert!(denied.ends_with("bad key"), "{denied}");
}
