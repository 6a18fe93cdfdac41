use axum::Json;
use serde_json::{json, Value};

use crate::fixtures::GENRES;

pub async fn index() -> &'static str {
    "Cine Cornélio API"
}

pub async fn genres() -> Json<Value> {
    Json(json!(GENRES))
}
