use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_health(state: &AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "studentCount": state.store.len(),
        }),
    )
}

fn handle_seed_load(state: &mut AppState, req: &Request) -> serde_json::Value {
    let count = state.store.load_seed();
    ok(&req.id, json!({ "studentCount": count }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "seed.load" => Some(handle_seed_load(state, req)),
        _ => None,
    }
}
