use axum::{routing, Json, Router};
use serde_json::{json, Value};

/// Routes mounted at the root of the server.
pub fn router() -> Router<()> {
    Router::new().route("/", routing::get(index))
}

/// Routes mounted below `/api`.
pub fn api_router() -> Router<()> {
    Router::new().route("/", routing::get(api_index))
}

async fn index() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Quick Pack Canada API is running",
        "endpoints": {
            "health": "/api/health",
            "contact": "/api/contact",
            "order": "/api/order",
        },
    }))
}

async fn api_index() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "API routes are working",
        "availableRoutes": [
            "GET /api/health",
            "GET /api/contact",
            "POST /api/contact",
            "GET /api/order",
            "POST /api/order",
        ],
    }))
}
