//! Multi-listener HTTP host.
//!
//! Runs one axum server per configured listener and dispatches every
//! request through the shared route table. Listeners can be started and
//! stopped while the host is running; each change is reported to the
//! connector so app bindings follow the live transport set.

pub mod routes;

pub use routes::{RouteBindingPort, RouteTable};

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ListenerConfig;
use crate::connector::HttpConnector;
use crate::error::{Error, Result};
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

/// Maximum request body size accepted by the dispatch handler.
const MAX_BODY_BYTES: usize = 1024 * 1024;

struct ActiveListener {
    transport: Transport,
    local_addr: SocketAddr,
    task: JoinHandle<()>,
}

/// Host for the HTTP side: owns the route table and the running listeners.
///
/// TLS termination is out of scope; an "https" listener is served as plain
/// TCP and the scheme is carried as transport identity for URL reporting
/// (a fronting proxy terminates TLS).
pub struct ListenerHost {
    table: Arc<RouteTable>,
    connector: Arc<HttpConnector>,
    listeners: Mutex<HashMap<String, ActiveListener>>,
}

impl ListenerHost {
    /// Create a host dispatching through `table` and reporting transport
    /// changes to `connector`.
    pub fn new(table: Arc<RouteTable>, connector: Arc<HttpConnector>) -> Self {
        Self {
            table,
            connector,
            listeners: Mutex::new(HashMap::new()),
        }
    }

    /// Bind and serve one listener, then report the new transport to the
    /// connector. Apps registered afterwards become reachable on it.
    pub async fn start_listener(&self, config: &ListenerConfig) -> Result<()> {
        {
            let listeners = self.listeners.lock().unwrap();
            if listeners.contains_key(config.id.as_str()) {
                return Err(Error::ListenerAlreadyRunning(config.id.clone()));
            }
        }

        let tcp = TcpListener::bind((config.host.as_str(), config.port)).await?;
        let local_addr = tcp.local_addr()?;
        // report the actual port so OS-assigned ports (port 0) resolve
        let transport = Transport::new(&config.id, &config.scheme, &config.host, local_addr.port());

        let app = self.router(transport.id());
        let listener_id = config.id.clone();
        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(tcp, app).await {
                error!("HTTP listener '{}' failed: {}", listener_id, e);
            }
        });

        self.table.insert_transport(transport.id());
        info!(
            "HTTP listener '{}' serving on {}://{}.",
            transport.id(),
            transport.scheme(),
            local_addr
        );
        self.connector.on_transport_added(transport.clone());

        self.listeners.lock().unwrap().insert(
            transport.id().to_string(),
            ActiveListener {
                transport,
                local_addr,
                task,
            },
        );
        Ok(())
    }

    /// Stop one listener and release every binding that was open on it.
    pub fn stop_listener(&self, transport_id: &str) -> Result<()> {
        let active = self
            .listeners
            .lock()
            .unwrap()
            .remove(transport_id)
            .ok_or_else(|| Error::ListenerNotRunning(transport_id.to_string()))?;

        // stop accepting first, then release bindings while the transport
        // is still present in the table so unbinds resolve cleanly
        active.task.abort();
        self.connector.on_transport_removed(&active.transport);
        self.table.remove_transport(transport_id);
        info!("HTTP listener '{}' stopped.", transport_id);
        Ok(())
    }

    /// Stop every running listener. Registered apps lose all bindings.
    pub fn shutdown(&self) {
        let ids: Vec<String> = self.listeners.lock().unwrap().keys().cloned().collect();
        for id in ids {
            if let Err(e) = self.stop_listener(&id) {
                error!("Failed to stop listener '{}': {}", id, e);
            }
        }
    }

    /// Actual bound address of a running listener, if any. Useful when the
    /// configured port was 0.
    pub fn listener_addr(&self, transport_id: &str) -> Option<SocketAddr> {
        self.listeners
            .lock()
            .unwrap()
            .get(transport_id)
            .map(|active| active.local_addr)
    }

    /// Ids of the listeners currently running.
    pub fn running_listeners(&self) -> Vec<String> {
        self.listeners.lock().unwrap().keys().cloned().collect()
    }

    fn router(&self, transport_id: &str) -> Router {
        let state = DispatchState {
            transport_id: transport_id.to_string(),
            table: Arc::clone(&self.table),
        };
        Router::new()
            .fallback(dispatch)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(state)
    }
}

#[derive(Clone)]
struct DispatchState {
    transport_id: String,
    table: Arc<RouteTable>,
}

/// Resolve the request path against the transport's bound context paths
/// and invoke the app handler, or answer 404.
async fn dispatch(State(state): State<DispatchState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes.to_vec(),
        Err(_) => return StatusCode::PAYLOAD_TOO_LARGE.into_response(),
    };

    let mut headers = HashMap::new();
    for (name, value) in &parts.headers {
        if let Ok(value) = value.to_str() {
            headers.insert(name.as_str().to_string(), value.to_string());
        }
    }

    let app_request = HttpRequest {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(String::from),
        headers,
        body,
    };

    let app_response = match state.table.resolve(&state.transport_id, &app_request.path) {
        Some(handler) => handler.handle(app_request),
        None => HttpResponse::not_found(),
    };
    into_axum_response(app_response)
}

fn into_axum_response(response: HttpResponse) -> Response {
    let status =
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut builder = Response::builder().status(status);
    for (name, value) in &response.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
        .body(Body::from(response.body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_axum_response_carries_status_and_headers() {
        let response = into_axum_response(
            HttpResponse::text(201, "created").with_header("x-app", "shop"),
        );
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get("x-app").unwrap().to_str().unwrap(),
            "shop"
        );
    }

    #[test]
    fn test_invalid_status_maps_to_internal_error() {
        let response = into_axum_response(HttpResponse::new(1000));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
