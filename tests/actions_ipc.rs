use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_rosterd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn rosterd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        id,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn error_code(value: &serde_json::Value) -> &str {
    assert_eq!(value.get("ok").and_then(|v| v.as_bool()), Some(false));
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
        .expect("error code")
}

#[test]
fn section_transfer_moves_within_the_class() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(&mut stdin, &mut reader, "1", "seed.load", json!({}));

    // Priya Patel: class 5 section B.
    let result = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "actions.sectionTransfer",
        json!({
            "studentId": "3",
            "transferType": "section",
            "newSection": "C",
            "reason": "parent request"
        }),
    );
    assert_eq!(
        result.get("transferred").and_then(|v| v.as_str()),
        Some("from Section B to Section C")
    );
    let student = result.get("student").expect("student");
    assert_eq!(student.get("section").and_then(|v| v.as_str()), Some("C"));
    assert_eq!(student.get("class").and_then(|v| v.as_str()), Some("5"));
    assert_eq!(
        student.get("name").and_then(|v| v.as_str()),
        Some("Priya Patel")
    );
}

#[test]
fn section_transfer_touches_only_section_and_updated_at() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(&mut stdin, &mut reader, "1", "seed.load", json!({}));

    let before = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.get",
        json!({ "studentId": "3" }),
    );
    let before = before.get("student").expect("student").clone();

    // Timestamps have one-second resolution; make sure the re-stamp lands
    // in a later second.
    std::thread::sleep(std::time::Duration::from_millis(1100));

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "actions.sectionTransfer",
        json!({ "studentId": "3", "transferType": "section", "newSection": "C" }),
    );
    let after = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "students.get",
        json!({ "studentId": "3" }),
    );
    let after = after.get("student").expect("student");

    assert_eq!(after.get("section").and_then(|v| v.as_str()), Some("C"));
    assert_ne!(after.get("updatedAt"), before.get("updatedAt"));
    for key in [
        "id",
        "name",
        "rollNumber",
        "class",
        "admissionNumber",
        "parentContact",
        "feeStatus",
        "attendance",
    ] {
        assert_eq!(after.get(key), before.get(key), "{} changed", key);
    }
}

#[test]
fn class_transfer_needs_both_targets_and_updates_both_fields() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(&mut stdin, &mut reader, "1", "seed.load", json!({}));

    let missing = request(
        &mut stdin,
        &mut reader,
        "2",
        "actions.sectionTransfer",
        json!({ "studentId": "3", "transferType": "class", "newClass": "4" }),
    );
    assert_eq!(error_code(&missing), "bad_params");

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "actions.sectionTransfer",
        json!({
            "studentId": "3",
            "transferType": "class",
            "newClass": "4",
            "newSection": "A"
        }),
    );
    assert_eq!(
        result.get("transferred").and_then(|v| v.as_str()),
        Some("from Class 5-B to Class 4-A")
    );
    let student = result.get("student").expect("student");
    assert_eq!(student.get("class").and_then(|v| v.as_str()), Some("4"));
    assert_eq!(student.get("section").and_then(|v| v.as_str()), Some("A"));
}

#[test]
fn section_transfer_requires_a_new_section() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(&mut stdin, &mut reader, "1", "seed.load", json!({}));

    let resp = request(
        &mut stdin,
        &mut reader,
        "2",
        "actions.sectionTransfer",
        json!({ "studentId": "3", "transferType": "section" }),
    );
    assert_eq!(error_code(&resp), "bad_params");
}

#[test]
fn send_message_resolves_parent_contact() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(&mut stdin, &mut reader, "1", "seed.load", json!({}));

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "actions.sendMessage",
        json!({ "studentId": "5", "message": "PTM on Friday" }),
    );
    assert_eq!(
        result.get("recipient").and_then(|v| v.as_str()),
        Some("+91 9876543214")
    );
    assert_eq!(
        result.get("studentName").and_then(|v| v.as_str()),
        Some("Zara Khan")
    );

    let empty = request(
        &mut stdin,
        &mut reader,
        "3",
        "actions.sendMessage",
        json!({ "studentId": "5", "message": "   " }),
    );
    assert_eq!(error_code(&empty), "bad_params");
}

#[test]
fn id_card_and_report_card_models() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(&mut stdin, &mut reader, "1", "seed.load", json!({}));

    let id_card = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "actions.idCard",
        json!({ "studentId": "4" }),
    );
    let card = id_card.get("idCard").expect("id card");
    assert_eq!(
        card.get("name").and_then(|v| v.as_str()),
        Some("Arjun Singh")
    );
    assert_eq!(
        card.get("admissionNumber").and_then(|v| v.as_str()),
        Some("AKS-2023-104")
    );

    let report = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "actions.reportCard",
        json!({ "studentId": "4" }),
    );
    let card = report.get("reportCard").expect("report card");
    assert_eq!(card.get("attendance").and_then(|v| v.as_i64()), Some(98));
    assert_eq!(card.get("feeStatus").and_then(|v| v.as_str()), Some("Paid"));
}

#[test]
fn actions_on_unknown_student_are_not_found() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    for (i, method) in [
        "actions.sectionTransfer",
        "actions.sendMessage",
        "actions.idCard",
        "actions.reportCard",
    ]
    .iter()
    .enumerate()
    {
        let resp = request(
            &mut stdin,
            &mut reader,
            &format!("{}", i + 1),
            method,
            json!({ "studentId": "42", "message": "x", "newSection": "A" }),
        );
        assert_eq!(error_code(&resp), "not_found", "{}", method);
    }
}
