use crate::server::AppContext;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use discfinder_common::MovieInfo;
use serde::Deserialize;
use serde_json::Value;

pub fn lookup_routes() -> Router<AppContext> {
    Router::new().route("/lookup-movie", post(lookup_movie).options(preflight))
}

#[derive(Debug, Deserialize)]
struct LookupRequest {
    #[serde(default)]
    barcode: Option<Value>,
}

impl LookupRequest {
    /// Barcodes arrive as strings, but clients also send bare numbers.
    fn barcode(&self) -> Option<String> {
        match self.barcode.as_ref()? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

fn barcode_required() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": "Barcode is required" })),
    )
        .into_response()
}

/// The body is parsed by hand so requests without a JSON content type are
/// still accepted.
async fn lookup_movie(State(ctx): State<AppContext>, body: Bytes) -> Response {
    let barcode = match serde_json::from_slice::<LookupRequest>(&body) {
        Ok(req) => req.barcode(),
        Err(e) => {
            tracing::debug!("Rejected lookup body: {}", e);
            None
        }
    };

    let Some(barcode) = barcode else {
        return barcode_required();
    };

    let info: MovieInfo = ctx.resolver.lookup_movie(&barcode).await;
    tracing::info!(barcode = %info.barcode, source = %info.source, "Lookup complete");
    Json(info).into_response()
}

async fn preflight() -> &'static str {
    "ok"
}
