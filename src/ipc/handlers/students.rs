use crate::gateway;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::roster::{self, RosterFilter, SortDirection, SortField, DEFAULT_PAGE_SIZE};
use serde_json::json;

struct HandlerErr {
    code: &'static str,
    message: String,
}

impl HandlerErr {
    fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, None)
    }
}

fn bad(message: impl Into<String>) -> HandlerErr {
    HandlerErr {
        code: "bad_params",
        message: message.into(),
    }
}

fn get_str<'a>(params: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    params.get(key).and_then(|v| v.as_str())
}

fn get_required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    get_str(params, key)
        .map(|s| s.to_string())
        .ok_or_else(|| bad(format!("missing {}", key)))
}

fn parse_sort_field(params: &serde_json::Value, key: &str) -> Result<SortField, HandlerErr> {
    match get_str(params, key) {
        None => Ok(SortField::Name),
        Some(s) => SortField::parse(s).ok_or_else(|| bad(format!("unknown sort field: {}", s))),
    }
}

fn parse_sort_direction(params: &serde_json::Value) -> Result<SortDirection, HandlerErr> {
    match get_str(params, "sortDirection") {
        None => Ok(SortDirection::Asc),
        Some(s) => {
            SortDirection::parse(s).ok_or_else(|| bad(format!("unknown sort direction: {}", s)))
        }
    }
}

fn parse_positive(
    params: &serde_json::Value,
    key: &str,
    default: usize,
) -> Result<usize, HandlerErr> {
    match params.get(key) {
        None => Ok(default),
        Some(v) => match v.as_u64() {
            Some(n) if n >= 1 => Ok(n as usize),
            _ => Err(bad(format!("{} must be a positive integer", key))),
        },
    }
}

fn list(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let filter = RosterFilter {
        class_value: get_str(params, "class").unwrap_or("").to_string(),
        section_value: get_str(params, "section").unwrap_or("").to_string(),
        query_text: get_str(params, "query").unwrap_or("").to_string(),
    };
    let sort_field = parse_sort_field(params, "sortField")?;
    let sort_direction = parse_sort_direction(params)?;
    let page = parse_positive(params, "page", 1)?;
    let page_size = parse_positive(params, "pageSize", DEFAULT_PAGE_SIZE)?;

    let matched = roster::filter(state.store.all(), &filter);
    let ordered = roster::sort(&matched, sort_field, sort_direction);
    let window = roster::paginate(&ordered, page, page_size);

    Ok(json!({
        "students": window.rows,
        "total": window.total,
        "page": window.page,
        "pageCount": window.page_count,
        "pageSize": page_size,
        "sortField": sort_field.as_str(),
        "sortDirection": sort_direction.as_str(),
    }))
}

fn get(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let Some(record) = state.store.get(&student_id) else {
        return Err(HandlerErr {
            code: "not_found",
            message: format!("student {} not found", student_id),
        });
    };
    Ok(json!({ "student": record }))
}

fn submit(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let Some(payload) = params.get("payload").and_then(|v| v.as_object()) else {
        return Err(bad("missing/invalid payload"));
    };
    let edit_target = get_str(params, "editTargetId").map(|s| s.to_string());

    let record =
        gateway::submit(&mut state.store, payload, edit_target.as_deref()).map_err(|e| {
            HandlerErr {
                code: e.code,
                message: e.message,
            }
        })?;
    Ok(json!({
        "student": record,
        "created": edit_target.is_none(),
    }))
}

fn toggle_sort(params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let active = parse_sort_field(params, "sortField")?;
    let direction = parse_sort_direction(params)?;
    let clicked_raw = get_required_str(params, "clicked")?;
    let clicked = SortField::parse(&clicked_raw)
        .ok_or_else(|| bad(format!("unknown sort field: {}", clicked_raw)))?;

    let (field, direction) = roster::toggle_sort(active, direction, clicked);
    Ok(json!({
        "sortField": field.as_str(),
        "sortDirection": direction.as_str(),
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(match list(state, &req.params) {
            Ok(result) => ok(&req.id, result),
            Err(e) => e.response(&req.id),
        }),
        "students.get" => Some(match get(state, &req.params) {
            Ok(result) => ok(&req.id, result),
            Err(e) => e.response(&req.id),
        }),
        "students.submit" => Some(match submit(state, &req.params) {
            Ok(result) => ok(&req.id, result),
            Err(e) => e.response(&req.id),
        }),
        "students.toggleSort" => Some(match toggle_sort(&req.params) {
            Ok(result) => ok(&req.id, result),
            Err(e) => e.response(&req.id),
        }),
        // Deletion stays unimplemented for regular users.
        "students.delete" => Some(err(
            &req.id,
            "approval_required",
            "student deletion requires administrator approval",
            None,
        )),
        _ => None,
    }
}
