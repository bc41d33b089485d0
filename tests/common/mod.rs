//! Stand-in PokeAPI served by axum on an ephemeral port.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
};
use pokedex_core::config::ApiConfig;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;

pub const LAST_ID: u32 = 151;

#[derive(Deserialize)]
struct PageParams {
    offset: u32,
    limit: u32,
}

pub fn api_config(base_url: &str, timeout: Option<u64>) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        timeout,
        description_language: "en".to_string(),
        user_agent: "pokedex-core-tests".to_string(),
    }
}

async fn list_handler(State(base): State<String>, Query(params): Query<PageParams>) -> Json<Value> {
    let results: Vec<Value> = (params.offset + 1..=params.offset + params.limit)
        .take_while(|id| *id <= LAST_ID)
        .map(|id| json!({ "name": format!("mon-{}", id), "url": format!("{}/pokemon/{}/", base, id) }))
        .collect();
    Json(json!({ "count": LAST_ID, "next": null, "previous": null, "results": results }))
}

async fn pokemon_handler(Path(id): Path<u32>) -> Result<Json<Value>, StatusCode> {
    if id == 0 {
        // well-formed JSON, wrong shape
        return Ok(Json(json!({ "id": "zero", "name": null })));
    }
    if id > LAST_ID {
        return Err(StatusCode::NOT_FOUND);
    }
    // scramble completion order
    let latency = rand::random_range(0..40u64);
    tokio::time::sleep(Duration::from_millis(latency)).await;
    Ok(Json(json!({
        "id": id,
        "name": format!("mon-{}", id),
        "height": 7,
        "weight": 69,
        "sprites": { "front_default": null, "other": null },
        "types": [{ "slot": 1, "type": { "name": "normal", "url": "" } }],
    })))
}

async fn agent_handler(headers: HeaderMap) -> Json<Value> {
    let agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    Json(json!({ "agent": agent }))
}

/// Returns the `/api/v2` base URL of the running stand-in.
pub async fn spawn_upstream() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}/api/v2", listener.local_addr().unwrap());

    let app = Router::new()
        .route("/api/v2/pokemon", get(list_handler))
        .route("/api/v2/pokemon/{id}/", get(pokemon_handler))
        .route("/api/v2/broken", get(|| async { "<html>maintenance</html>" }))
        .route(
            "/api/v2/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(json!({}))
            }),
        )
        .route("/api/v2/agent", get(agent_handler))
        .with_state(base.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    base
}

/// Serves `app` on an ephemeral port and returns its root URL.
pub async fn spawn_app(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let root = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    root
}
