//! Per-request log line.

use tracing::info;

use crate::context::Context;
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::ResponseWriter;

/// Logs the method, path and user agent of every request at `info` level.
///
/// Put it first so rejected requests are logged too.
#[derive(Clone, Copy, Debug, Default)]
pub struct Trace;

impl Middleware for Trace {
    fn call(&self, cx: Context, _w: &mut ResponseWriter, req: &Request) -> Context {
        info!(
            method = %req.method(),
            path = req.path(),
            user_agent = req.header("user-agent").unwrap_or("-"),
            "request"
        );
        cx
    }

    fn name(&self) -> &str {
        "trace"
    }
}
