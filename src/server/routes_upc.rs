//! `GET /upc`: a thin UPCitemdb proxy for browser clients that cannot call
//! the API directly.

use crate::server::AppContext;
use crate::upc::api::title_of_first;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use discfinder_common::Error;
use serde::Deserialize;
use serde_json::json;

pub fn upc_routes() -> Router<AppContext> {
    Router::new().route("/upc", get(upc_lookup))
}

#[derive(Debug, Deserialize)]
struct UpcQuery {
    upc: Option<String>,
}

fn no_store(status: StatusCode, body: serde_json::Value) -> Response {
    (status, [(header::CACHE_CONTROL, "no-store")], Json(body)).into_response()
}

async fn upc_lookup(State(ctx): State<AppContext>, Query(query): Query<UpcQuery>) -> Response {
    let Some(upc) = query.upc.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) else {
        return no_store(
            StatusCode::BAD_REQUEST,
            json!({ "ok": false, "error": "Missing upc param" }),
        );
    };

    match ctx.upc_proxy.fetch_items(&upc).await {
        Ok(items) => no_store(
            StatusCode::OK,
            json!({
                "ok": true,
                "title": title_of_first(&items),
                "items": items,
                "source": "upcitemdb",
            }),
        ),
        Err(Error::Status { status, .. }) => {
            tracing::warn!(upc = %upc, status, "UPCitemdb upstream error");
            no_store(
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                json!({ "ok": false, "error": format!("Upstream error: {status}") }),
            )
        }
        Err(e) => {
            tracing::error!(upc = %upc, "UPC proxy failed: {}", e);
            no_store(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "ok": false, "error": e.to_string() }),
            )
        }
    }
}
