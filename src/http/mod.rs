//! Minimal HTTP request/response surface for deployed apps.
//!
//! The connector never parses HTTP itself; these types are the contract
//! between the host (which owns the wire) and the app handlers it serves.

use std::collections::HashMap;

/// One HTTP request as seen by an app handler.
#[derive(Debug, Clone, Default)]
pub struct HttpRequest {
    /// Request method, e.g. "GET".
    pub method: String,
    /// Full request path, including the app's context path.
    pub path: String,
    /// Raw query string, without the leading `?`.
    pub query: Option<String>,
    /// Request headers. Repeated headers keep the last value.
    pub headers: HashMap<String, String>,
    /// Request body bytes.
    pub body: Vec<u8>,
}

/// Response produced by an app handler.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create an empty response with the given status code.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// 200 response with a `text/plain` body.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::text(200, body)
    }

    /// Plain-text response with the given status code.
    pub fn text(status: u16, body: impl Into<Vec<u8>>) -> Self {
        let mut response = Self::new(status);
        response.body = body.into();
        response
            .headers
            .insert("content-type".to_string(), "text/plain".to_string());
        response
    }

    /// 404 response used when no app is bound at a requested path.
    pub fn not_found() -> Self {
        Self::text(404, "Not Found")
    }

    /// Add or replace a response header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Request-handling capability a web app is deployed with.
///
/// Supplied by the deployment collaborator on registration; invoked by the
/// host for every request that resolves to the app's context path.
pub trait AppHandler: Send + Sync {
    fn handle(&self, request: HttpRequest) -> HttpResponse;
}

impl<F> AppHandler for F
where
    F: Fn(HttpRequest) -> HttpResponse + Send + Sync,
{
    fn handle(&self, request: HttpRequest) -> HttpResponse {
        self(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_response_sets_content_type() {
        let response = HttpResponse::ok("hello");
        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"hello");
        assert_eq!(
            response.headers.get("content-type").map(String::as_str),
            Some("text/plain")
        );
    }

    #[test]
    fn test_closures_are_handlers() {
        let handler = |request: HttpRequest| HttpResponse::ok(request.path);
        let response = handler.handle(HttpRequest {
            path: "/shop".to_string(),
            ..HttpRequest::default()
        });
        assert_eq!(response.body, b"/shop");
    }
}
