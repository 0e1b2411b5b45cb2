//! Deadline for the rest of the chain.

use std::time::Duration;

use crate::context::Context;
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::ResponseWriter;

/// Puts a deadline `duration` from now on the context.
///
/// The chain checks the context after every step, so once the deadline has
/// passed no further step (and not the handler) runs. Steps that block can
/// also watch [`Context::done`] themselves. A deadline already on the context
/// that expires sooner is kept.
///
/// Nothing is written to the response on expiry; pair it with a step that
/// checks [`Context::err`] if clients need a `504`.
#[derive(Clone, Copy, Debug)]
pub struct Timeout {
    duration: Duration,
}

impl Timeout {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl Middleware for Timeout {
    fn call(&self, cx: Context, _w: &mut ResponseWriter, _req: &Request) -> Context {
        cx.with_timeout(self.duration)
    }

    fn name(&self) -> &str {
        "timeout"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[tokio::test(start_paused = true)]
    async fn expired_deadline_halts() {
        let req = Request::from(http::Request::get("/").body("").expect("request"));
        let mut w = ResponseWriter::new();

        let cx = Timeout::new(Duration::from_millis(10)).call(Context::background(), &mut w, &req);
        assert!(cx.err().is_none());

        tokio::time::advance(Duration::from_millis(11)).await;
        assert!(matches!(cx.err(), Some(Error::DeadlineExceeded)));
    }
}
