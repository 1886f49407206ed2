use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::tasks::{TaskKind, TaskState, SIMULATED_IMPORT_ROWS};
use serde_json::json;

fn get_str<'a>(params: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    params.get(key).and_then(|v| v.as_str())
}

fn handle_start(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(kind_raw) = get_str(&req.params, "kind") else {
        return err(&req.id, "bad_params", "missing kind", None);
    };
    let Some(kind) = TaskKind::parse(kind_raw) else {
        return err(
            &req.id,
            "bad_params",
            format!("unknown task kind: {}", kind_raw),
            None,
        );
    };
    let file_name = get_str(&req.params, "fileName").map(|s| s.to_string());
    let delay_ms = req.params.get("delayMs").and_then(|v| v.as_u64());
    let simulate_failure = req
        .params
        .get("simulateFailure")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    match state.tasks.start(kind, file_name, delay_ms, simulate_failure) {
        Ok(task) => ok(
            &req.id,
            json!({
                "taskId": task.id,
                "kind": task.kind.as_str(),
                "state": TaskState::Pending.as_str(),
            }),
        ),
        Err(e) => err(&req.id, e.code, e.message, None),
    }
}

fn handle_poll(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(task_id) = get_str(&req.params, "taskId") else {
        return err(&req.id, "bad_params", "missing taskId", None);
    };
    let student_count = state.store.len();
    let Some((task_state, task)) = state.tasks.poll(task_id) else {
        return err(
            &req.id,
            "not_found",
            format!("task {} not found", task_id),
            None,
        );
    };

    let mut result = json!({
        "taskId": task.id,
        "kind": task.kind.as_str(),
        "state": task_state.as_str(),
    });
    if task_state == TaskState::Success {
        match task.kind {
            TaskKind::Import => {
                result["importedCount"] = json!(SIMULATED_IMPORT_ROWS);
                if let Some(name) = &task.file_name {
                    result["fileName"] = json!(name);
                }
            }
            TaskKind::Export => result["exportedCount"] = json!(student_count),
            TaskKind::Refresh => result["studentCount"] = json!(student_count),
        }
    }
    ok(&req.id, result)
}

fn handle_cancel(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(task_id) = get_str(&req.params, "taskId") else {
        return err(&req.id, "bad_params", "missing taskId", None);
    };
    match state.tasks.cancel(task_id) {
        None => err(
            &req.id,
            "not_found",
            format!("task {} not found", task_id),
            None,
        ),
        Some(Ok(())) => ok(
            &req.id,
            json!({ "taskId": task_id, "state": TaskState::Cancelled.as_str() }),
        ),
        Some(Err(settled)) => err(
            &req.id,
            "conflict",
            format!("task already settled: {}", settled.as_str()),
            None,
        ),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "tasks.start" => Some(handle_start(state, req)),
        "tasks.poll" => Some(handle_poll(state, req)),
        "tasks.cancel" => Some(handle_cancel(state, req)),
        _ => None,
    }
}
