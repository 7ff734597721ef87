mod test_support;

use serde_json::json;
use std::io::{BufRead, Write};
use test_support::{request, request_err, request_ok, spawn_sidecar, temp_dir};

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let workspace = temp_dir("attendance-router-smoke");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let health = request_ok(&mut stdin, &mut reader, "1", "health", json!({}));
    assert_eq!(health["workspacePath"], json!(null));
    assert_eq!(health["session"]["role"], json!(null));

    // Store-backed methods need a workspace first.
    assert_eq!(
        request_err(&mut stdin, &mut reader, "2", "attendance.list", json!({})),
        "no_workspace"
    );

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    assert!(workspace.join("attendance_gui.db").is_file());

    let methods = [
        "session.current",
        "accounts.list",
        "attendance.list",
        "attendance.search",
        "attendance.summary",
        "courses.list",
        "courses.options",
        "classes.list",
    ];
    for (i, m) in methods.iter().enumerate() {
        let resp = request(&mut stdin, &mut reader, &format!("m{}", i), m, json!({}));
        let code = resp
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str());
        assert_ne!(code, Some("not_implemented"), "{} not routed", m);
    }

    assert_eq!(
        request_err(&mut stdin, &mut reader, "4", "grades.list", json!({})),
        "not_implemented"
    );
    assert_eq!(
        request_err(&mut stdin, &mut reader, "5", "workspace.select", json!({})),
        "bad_params"
    );
}

#[test]
fn unparseable_line_gets_bad_json_and_loop_continues() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    writeln!(stdin, "{{not json").expect("write");
    stdin.flush().expect("flush");
    let mut line = String::new();
    reader.read_line(&mut line).expect("read");
    let v: serde_json::Value = serde_json::from_str(line.trim()).expect("json");
    assert_eq!(v["ok"], json!(false));
    assert_eq!(v["error"]["code"], json!("bad_json"));

    let _ = request_ok(&mut stdin, &mut reader, "after", "health", json!({}));
}
