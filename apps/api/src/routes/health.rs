use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version and loaded reference data.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let taxonomy = state.analyzer.taxonomy();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "resume-analyzer",
        "skills": taxonomy.skills.len(),
        "careerPaths": taxonomy.career_paths.len()
    }))
}
