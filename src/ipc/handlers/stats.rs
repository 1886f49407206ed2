use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};
use crate::store::FeeStatus;
use serde_json::json;
use std::collections::BTreeMap;

fn handle_stats(state: &AppState, req: &Request) -> serde_json::Value {
    let records = state.store.all();
    let total = records.len();

    let attendance_sum: i64 = records.iter().map(|r| r.attendance).sum();
    let average_attendance = if total > 0 {
        // 1-decimal rounding, matching the dashboard display.
        ((attendance_sum as f64 / total as f64) * 10.0).round() / 10.0
    } else {
        0.0
    };

    let fee_defaulters = records
        .iter()
        .filter(|r| r.fee_status != FeeStatus::Paid)
        .count();
    let transport_users = records
        .iter()
        .filter(|r| r.transport_details.is_some())
        .count();

    let mut per_class: BTreeMap<&str, usize> = BTreeMap::new();
    for r in records {
        *per_class.entry(r.class.as_str()).or_insert(0) += 1;
    }
    let per_class: Vec<serde_json::Value> = per_class
        .into_iter()
        .map(|(class, count)| json!({ "class": class, "count": count }))
        .collect();

    ok(
        &req.id,
        json!({
            "totalStudents": total,
            "averageAttendance": average_attendance,
            "feeDefaulters": fee_defaulters,
            "transportUsers": transport_users,
            "perClass": per_class,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "dashboard.stats" => Some(handle_stats(state, req)),
        _ => None,
    }
}
