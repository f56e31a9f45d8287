//! Local axum server mimicking the Drilldex REST API
//!
//! - `GET /api/beats/:id/preview-url` answers `{"url": ...}`; id `broken`
//!   answers 500, id `double` answers a double-encoded URL
//! - `GET /api/packs/:id/preview-playlist` and the kit variant answer a
//!   two-track playlist with one unplayable entry; id `missing` answers 404

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/api/beats/:id/preview-url", get(preview_url))
            .route("/api/packs/:id/preview-playlist", get(preview_playlist))
            .route("/api/kits/:id/preview-playlist", get(preview_playlist));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test server");
        let addr = listener.local_addr().expect("No local address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self { addr, handle }
    }

    /// Base URL including the `/api` prefix
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn preview_url(Path(id): Path<String>) -> Response {
    match id.as_str() {
        "broken" => (StatusCode::INTERNAL_SERVER_ERROR, "signing failed").into_response(),
        "double" => Json(json!({
            "url": "https://cdn.test/previews%252Fdouble.mp3?sig=1"
        }))
        .into_response(),
        _ => Json(json!({ "url": format!("https://cdn.test/{}.mp3?sig=1", id) })).into_response(),
    }
}

async fn preview_playlist(Path(id): Path<String>) -> Response {
    if id == "missing" {
        return (StatusCode::NOT_FOUND, "not found").into_response();
    }

    Json(json!([
        {
            "_id": format!("{}-1", id),
            "title": "First",
            "artistName": "Producer",
            "coverUrl": "https://cdn.test/cover.jpg",
            "previewUrl": format!("https://cdn.test/{}-1.mp3", id),
            "durationInSeconds": 30
        },
        {
            "_id": format!("{}-2", id),
            "title": "Second",
            "artistName": null,
            "previewUrl": null,
            "durationInSeconds": null
        }
    ]))
    .into_response()
}
