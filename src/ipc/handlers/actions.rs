use crate::gateway;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::store::StudentRecord;
use serde_json::{json, Map, Value};

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

fn lookup_student<'a>(
    state: &'a AppState,
    params: &serde_json::Value,
) -> Result<&'a StudentRecord, HandlerErr> {
    let Some(student_id) = get_str(params, "studentId") else {
        return Err(bad("missing studentId"));
    };
    state.store.get(student_id).ok_or_else(|| HandlerErr {
        code: "not_found",
        message: format!("student {} not found", student_id),
    })
}

/// Moves a student to another section, or another class and section. The
/// change goes through the same gateway merge as a form edit.
fn section_transfer(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let before = lookup_student(state, params)?.clone();
    let transfer_type = get_str(params, "transferType").unwrap_or("section");

    let new_section = get_str(params, "newSection").unwrap_or("").trim().to_string();
    let new_class = get_str(params, "newClass").unwrap_or("").trim().to_string();

    let mut patch = Map::new();
    let description = match transfer_type {
        "section" => {
            if new_section.is_empty() {
                return Err(bad("missing newSection"));
            }
            patch.insert("section".to_string(), Value::String(new_section.clone()));
            format!("from Section {} to Section {}", before.section, new_section)
        }
        "class" => {
            if new_class.is_empty() || new_section.is_empty() {
                return Err(bad("class transfer needs newClass and newSection"));
            }
            patch.insert("class".to_string(), Value::String(new_class.clone()));
            patch.insert("section".to_string(), Value::String(new_section.clone()));
            format!(
                "from Class {}-{} to Class {}-{}",
                before.class, before.section, new_class, new_section
            )
        }
        other => return Err(bad(format!("unknown transferType: {}", other))),
    };

    let record = gateway::submit(&mut state.store, &patch, Some(&before.id)).map_err(|e| {
        HandlerErr {
            code: e.code,
            message: e.message,
        }
    })?;

    Ok(json!({
        "student": record,
        "transferred": description,
        "reason": get_str(params, "reason").unwrap_or(""),
    }))
}

/// Read-only: resolves the recipient and acknowledges. No message is stored
/// or sent anywhere.
fn send_message(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student = lookup_student(state, params)?;
    let message = get_str(params, "message").unwrap_or("").trim();
    if message.is_empty() {
        return Err(bad("missing message"));
    }
    Ok(json!({
        "recipient": student.parent_contact,
        "studentName": student.name,
        "delivered": true,
    }))
}

fn id_card(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let student = lookup_student(state, params)?;
    Ok(json!({
        "idCard": {
            "name": student.name,
            "class": student.class,
            "section": student.section,
            "rollNumber": student.roll_number,
            "admissionNumber": student.admission_number,
            "parentContact": student.parent_contact,
        }
    }))
}

fn report_card(
    state: &AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student = lookup_student(state, params)?;
    Ok(json!({
        "reportCard": {
            "name": student.name,
            "class": student.class,
            "section": student.section,
            "rollNumber": student.roll_number,
            "admissionNumber": student.admission_number,
            "attendance": student.attendance,
            "feeStatus": student.fee_status.as_str(),
        }
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "actions.sectionTransfer" => Some(match section_transfer(state, &req.params) {
            Ok(result) => ok(&req.id, result),
            Err(e) => e.response(&req.id),
        }),
        "actions.sendMessage" => Some(match send_message(state, &req.params) {
            Ok(result) => ok(&req.id, result),
            Err(e) => e.response(&req.id),
        }),
        "actions.idCard" => Some(match id_card(state, &req.params) {
            Ok(result) => ok(&req.id, result),
            Err(e) => e.response(&req.id),
        }),
        "actions.reportCard" => Some(match report_card(state, &req.params) {
            Ok(result) => ok(&req.id, result),
            Err(e) => e.response(&req.id),
        }),
        _ => None,
    }
}
