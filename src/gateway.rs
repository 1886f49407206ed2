use serde_json::{Map, Value};

use crate::store::{FeeStatus, RecordStore, StudentRecord, TransportDetails};

/// Everything `students.submit` recognizes. Payload keys outside this list
/// are rejected rather than silently carried along.
const REQUIRED_ON_CREATE: &[&str] = &["name", "rollNumber", "admissionNumber", "class", "section"];

const TEXT_FIELDS: &[&str] = &[
    "name",
    "rollNumber",
    "admissionNumber",
    "class",
    "section",
    "fatherName",
    "motherName",
    "fatherContact",
    "motherContact",
    "parentContact",
    "address",
    "emergencyContact",
    "bloodGroup",
    "medicalInfo",
    "dob",
    "previousSchool",
    "admissionDate",
    "documents",
    "remarks",
    "feeStatus",
];

const TRANSPORT_FIELDS: &[&str] = &[
    "busRoute",
    "busStop",
    "pickupTime",
    "dropTime",
    "monthlyFee",
    "busNumber",
    "distance",
    "busMonitor",
    "driverName",
    "driverContact",
];

/// Candidate payload fields for the stored parent contact, in priority
/// order. The first non-empty value wins. Applies at creation only; edits
/// patch `parentContact` directly.
pub const PARENT_CONTACT_FALLBACK: &[&str] = &["parentContact", "fatherContact", "motherContact"];

#[derive(Debug)]
pub struct SubmitError {
    pub code: &'static str,
    pub message: String,
}

fn bad(message: impl Into<String>) -> SubmitError {
    SubmitError {
        code: "bad_params",
        message: message.into(),
    }
}

fn recognized(key: &str) -> bool {
    key == "transportNeeded"
        || key == "attendance"
        || TEXT_FIELDS.contains(&key)
        || TRANSPORT_FIELDS.contains(&key)
}

fn get_text(payload: &Map<String, Value>, key: &str) -> Result<Option<String>, SubmitError> {
    match payload.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(_) => Err(bad(format!("{} must be a string", key))),
    }
}

fn get_flag(payload: &Map<String, Value>, key: &str) -> Result<Option<bool>, SubmitError> {
    match payload.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(bad(format!("{} must be a boolean", key))),
    }
}

fn get_attendance(payload: &Map<String, Value>) -> Result<Option<i64>, SubmitError> {
    let v = match payload.get("attendance") {
        None | Some(Value::Null) => return Ok(None),
        Some(v) => v,
    };
    let n = match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    let Some(n) = n else {
        return Err(bad("attendance must be an integer"));
    };
    if !(0..=100).contains(&n) {
        return Err(bad("attendance must be between 0 and 100"));
    }
    Ok(Some(n))
}

fn get_fee_status(payload: &Map<String, Value>) -> Result<Option<FeeStatus>, SubmitError> {
    let Some(s) = get_text(payload, "feeStatus")? else {
        return Ok(None);
    };
    if s.is_empty() {
        return Ok(None);
    }
    FeeStatus::parse(&s)
        .map(Some)
        .ok_or_else(|| bad("feeStatus must be one of Paid, Pending, Partial"))
}

fn reject_unrecognized(payload: &Map<String, Value>) -> Result<(), SubmitError> {
    let unknown: Vec<&str> = payload
        .keys()
        .map(|k| k.as_str())
        .filter(|k| !recognized(k))
        .collect();
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(bad(format!("unrecognized fields: {}", unknown.join(", "))))
    }
}

fn resolve_parent_contact(payload: &Map<String, Value>) -> Result<String, SubmitError> {
    for key in PARENT_CONTACT_FALLBACK {
        if let Some(v) = get_text(payload, key)? {
            if !v.is_empty() {
                return Ok(v);
            }
        }
    }
    Ok(String::new())
}

fn transport_from_payload(
    payload: &Map<String, Value>,
    existing: Option<&TransportDetails>,
) -> Result<TransportDetails, SubmitError> {
    let pick = |key: &str, old: &str| -> Result<String, SubmitError> {
        Ok(get_text(payload, key)?.unwrap_or_else(|| old.to_string()))
    };
    let empty = TransportDetails {
        bus_route: String::new(),
        bus_stop: String::new(),
        pickup_time: String::new(),
        drop_time: String::new(),
        monthly_fee: String::new(),
        bus_number: String::new(),
        distance: String::new(),
        bus_monitor: String::new(),
        driver_name: String::new(),
        driver_contact: String::new(),
    };
    let old = existing.unwrap_or(&empty);
    Ok(TransportDetails {
        bus_route: pick("busRoute", &old.bus_route)?,
        bus_stop: pick("busStop", &old.bus_stop)?,
        pickup_time: pick("pickupTime", &old.pickup_time)?,
        drop_time: pick("dropTime", &old.drop_time)?,
        monthly_fee: pick("monthlyFee", &old.monthly_fee)?,
        bus_number: pick("busNumber", &old.bus_number)?,
        distance: pick("distance", &old.distance)?,
        bus_monitor: pick("busMonitor", &old.bus_monitor)?,
        driver_name: pick("driverName", &old.driver_name)?,
        driver_contact: pick("driverContact", &old.driver_contact)?,
    })
}

fn create(store: &mut RecordStore, payload: &Map<String, Value>) -> Result<StudentRecord, SubmitError> {
    let mut required = std::collections::HashMap::new();
    for key in REQUIRED_ON_CREATE {
        let v = get_text(payload, key)?.unwrap_or_default();
        if v.is_empty() {
            return Err(bad(format!("missing {}", key)));
        }
        required.insert(*key, v);
    }

    let admission_number = required["admissionNumber"].clone();
    if store.admission_number_taken(&admission_number) {
        return Err(SubmitError {
            code: "conflict",
            message: format!("admissionNumber {} already exists", admission_number),
        });
    }

    // feeStatus and attendance are never user-supplied at creation; any
    // submitted values are validated above but overridden here.
    get_fee_status(payload)?;
    get_attendance(payload)?;

    let transport_needed = get_flag(payload, "transportNeeded")?.unwrap_or(false);
    let transport_details = if transport_needed {
        Some(transport_from_payload(payload, None)?)
    } else {
        None
    };

    let record = StudentRecord {
        id: store.next_id(),
        name: required["name"].clone(),
        roll_number: required["rollNumber"].clone(),
        class: required["class"].clone(),
        section: required["section"].clone(),
        admission_number,
        parent_contact: resolve_parent_contact(payload)?,
        fee_status: FeeStatus::Pending,
        attendance: 0,
        transport_details,
        updated_at: String::new(),
    };
    store.upsert(record.clone());
    Ok(store.get(&record.id).cloned().unwrap_or(record))
}

fn edit(
    store: &mut RecordStore,
    payload: &Map<String, Value>,
    target_id: &str,
) -> Result<StudentRecord, SubmitError> {
    let Some(existing) = store.get(target_id).cloned() else {
        return Err(SubmitError {
            code: "not_found",
            message: format!("student {} not found", target_id),
        });
    };

    let mut merged = existing.clone();

    if let Some(v) = get_text(payload, "name")? {
        if v.is_empty() {
            return Err(bad("name must not be empty"));
        }
        merged.name = v;
    }
    if let Some(v) = get_text(payload, "rollNumber")? {
        merged.roll_number = v;
    }
    if let Some(v) = get_text(payload, "admissionNumber")? {
        if v != existing.admission_number && store.admission_number_taken(&v) {
            return Err(SubmitError {
                code: "conflict",
                message: format!("admissionNumber {} already exists", v),
            });
        }
        merged.admission_number = v;
    }
    if let Some(v) = get_text(payload, "class")? {
        merged.class = v;
    }
    if let Some(v) = get_text(payload, "section")? {
        merged.section = v;
    }
    if let Some(v) = get_text(payload, "parentContact")? {
        merged.parent_contact = v;
    }
    if let Some(v) = get_fee_status(payload)? {
        merged.fee_status = v;
    }
    if let Some(v) = get_attendance(payload)? {
        merged.attendance = v;
    }
    let has_transport_keys = TRANSPORT_FIELDS.iter().any(|k| payload.contains_key(*k));
    match get_flag(payload, "transportNeeded")? {
        Some(true) => {
            merged.transport_details = Some(transport_from_payload(
                payload,
                existing.transport_details.as_ref(),
            )?);
        }
        Some(false) => merged.transport_details = None,
        // Transport keys merge into existing details without restating the
        // flag; for a student without transport they would be a silent
        // no-op, so they are rejected instead.
        None if has_transport_keys => match existing.transport_details.as_ref() {
            Some(old) => {
                merged.transport_details = Some(transport_from_payload(payload, Some(old))?);
            }
            None => {
                return Err(bad(
                    "transport fields require transportNeeded for a student without transport",
                ))
            }
        },
        None => {}
    }

    store.upsert(merged.clone());
    Ok(store.get(target_id).cloned().unwrap_or(merged))
}

/// The single write path into the Record Store. Validates the payload
/// against the field registry, then creates or merges. Nothing is mutated
/// when validation fails.
pub fn submit(
    store: &mut RecordStore,
    payload: &Map<String, Value>,
    edit_target_id: Option<&str>,
) -> Result<StudentRecord, SubmitError> {
    reject_unrecognized(payload)?;
    match edit_target_id {
        Some(id) => edit(store, payload, id),
        None => create(store, payload),
    }
}
