#![allow(dead_code)]

use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
struct MockState {
    routes: Arc<HashMap<String, (StatusCode, String)>>,
    requests: Arc<Mutex<Vec<Uri>>>,
}

/// A canned upstream API: fixed responses per path, every request recorded.
pub struct MockUpstream {
    pub url: String,
    requests: Arc<Mutex<Vec<Uri>>>,
}

impl MockUpstream {
    pub async fn start(routes: &[(&str, StatusCode, String)]) -> Self {
        init_tracing();

        let state = MockState {
            routes: Arc::new(
                routes
                    .iter()
                    .map(|(path, status, body)| (path.to_string(), (*status, body.clone())))
                    .collect(),
            ),
            requests: Arc::new(Mutex::new(Vec::new())),
        };
        let requests = state.requests.clone();
        let app = Router::new().fallback(respond).with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}", addr),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<Uri> {
        self.requests.lock().unwrap().clone()
    }

    /// Decoded query parameters of the `index`-th request, in wire order.
    pub fn query_params(&self, index: usize) -> Vec<(String, String)> {
        let uri = self.requests()[index].clone();
        url::form_urlencoded::parse(uri.query().unwrap_or("").as_bytes())
            .into_owned()
            .collect()
    }

    pub fn param(&self, index: usize, key: &str) -> Option<String> {
        self.query_params(index)
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

async fn respond(State(state): State<MockState>, uri: Uri) -> Response {
    state.requests.lock().unwrap().push(uri.clone());
    match state.routes.get(uri.path()) {
        Some((status, body)) => (
            *status,
            [(header::CONTENT_TYPE, "application/json")],
            body.clone(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// An address nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
