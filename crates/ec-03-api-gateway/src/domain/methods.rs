//! HTTP method classification.
//!
//! Reads and writes draw on separate rate-limit budgets and are counted
//! separately in `/metrics`. Anything that is not a safe method counts as a
//! write, including methods no route accepts.

use axum::http::Method;

/// Whether `method` mutates state (any method other than GET, HEAD, OPTIONS).
pub fn is_write_method(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}
