//! The chat page: settings panel, transcript, and input line.
//!
//! Compiled in from `frontend/` so `routechat serve` needs no files on disk.

use axum::{
    Router,
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};

/// One file of the page, served at a fixed path.
struct Asset {
    path: &'static str,
    content_type: &'static str,
    body: &'static str,
}

static ASSETS: [Asset; 3] = [
    Asset {
        path: "/",
        content_type: "text/html; charset=utf-8",
        body: include_str!("../../../frontend/index.html"),
    },
    Asset {
        path: "/static/style.css",
        content_type: "text/css; charset=utf-8",
        body: include_str!("../../../frontend/style.css"),
    },
    Asset {
        path: "/static/app.js",
        content_type: "application/javascript; charset=utf-8",
        body: include_str!("../../../frontend/app.js"),
    },
];

/// Routes for every page asset.
pub fn frontend_router() -> Router {
    ASSETS.iter().fold(Router::new(), |router, asset| {
        router.route(asset.path, get(move || async move { serve(asset) }))
    })
}

fn serve(asset: &'static Asset) -> Response {
    (
        [
            (header::CONTENT_TYPE, asset.content_type),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        asset.body,
    )
        .into_response()
}
