#![allow(dead_code)]

//! Canned HTTP endpoints for exercising the clients in integration tests

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Router;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: String,
}

pub struct CannedServer {
    pub url: String,
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

#[derive(Clone)]
pub enum Reply {
    Respond { status: u16, body: String },
    Hang,
}

#[derive(Clone)]
struct ServerState {
    reply: Reply,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

async fn canned(
    State(state): State<ServerState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    state.requests.lock().unwrap().push(RecordedRequest {
        method,
        uri,
        headers,
        body: String::from_utf8_lossy(&body).to_string(),
    });

    match state.reply {
        Reply::Respond { status, body } => {
            let status = StatusCode::from_u16(status).unwrap();
            (status, [(header::CONTENT_TYPE, "application/json")], body)
        }
        Reply::Hang => {
            tokio::time::sleep(Duration::from_secs(30)).await;
            (StatusCode::GATEWAY_TIMEOUT, [(header::CONTENT_TYPE, "application/json")], String::new())
        }
    }
}

/// Serve the same reply to every request on every path
pub async fn serve(reply: Reply) -> CannedServer {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let router = Router::new().fallback(canned).with_state(ServerState {
        reply,
        requests: requests.clone(),
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    CannedServer {
        url: format!("http://{}/query", addr),
        requests,
    }
}

/// A URL on which nothing is listening
pub async fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/query", addr)
}
