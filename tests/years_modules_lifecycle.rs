mod test_support;

use serde_json::json;
use test_support::{request_err, request_ok, spawn_sidecar, temp_dir};

#[test]
fn year_and_module_create_duplicate_and_cascade_delete() {
    let workspace = temp_dir("gradeplus-lifecycle");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "years.create",
        json!({ "yearNumber": 1, "yearCredit": 120, "yearWeight": 40 }),
    );
    let year_id = created
        .get("yearId")
        .and_then(|v| v.as_str())
        .expect("yearId")
        .to_string();

    // Same year number again is rejected.
    let _ = request_err(
        &mut stdin,
        &mut reader,
        "3",
        "years.create",
        json!({ "yearNumber": 1, "yearCredit": 100, "yearWeight": 40 }),
        "duplicate",
    );

    let _ = request_err(
        &mut stdin,
        &mut reader,
        "4",
        "years.create",
        json!({ "yearNumber": 2, "yearCredit": 0, "yearWeight": 40 }),
        "bad_params",
    );
    let _ = request_err(
        &mut stdin,
        &mut reader,
        "5",
        "years.create",
        json!({ "yearNumber": 2, "yearCredit": 120, "yearWeight": 120 }),
        "bad_params",
    );

    let module = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "modules.create",
        json!({ "yearId": year_id, "moduleName": "Databases", "moduleCredit": 20 }),
    );
    let module_id = module
        .get("moduleId")
        .and_then(|v| v.as_str())
        .expect("moduleId")
        .to_string();

    // Duplicate name in the same year, case-insensitive.
    let _ = request_err(
        &mut stdin,
        &mut reader,
        "7",
        "modules.create",
        json!({ "yearId": year_id, "moduleName": "databases", "moduleCredit": 10 }),
        "duplicate",
    );

    let _ = request_err(
        &mut stdin,
        &mut reader,
        "8",
        "modules.create",
        json!({ "yearId": "no-such-year", "moduleName": "Orphan", "moduleCredit": 10 }),
        "not_found",
    );
    let _ = request_err(
        &mut stdin,
        &mut reader,
        "9",
        "modules.create",
        json!({ "yearId": year_id, "moduleName": "Too Heavy", "moduleCredit": 121 }),
        "bad_params",
    );

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "assessments.create",
        json!({
            "moduleId": module_id,
            "assessmentName": "Coursework",
            "assessmentWeight": 40,
            "assessmentGrade": 65
        }),
    );

    let listed = request_ok(
        &mut stdin,
        &mut reader,
        "11",
        "years.list",
        json!({}),
    );
    let years = listed.get("years").and_then(|v| v.as_array()).expect("years");
    assert_eq!(years.len(), 1);
    assert_eq!(years[0].get("moduleCount").and_then(|v| v.as_i64()), Some(1));

    // Deleting the year takes its modules and assessments with it.
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "12",
        "years.delete",
        json!({ "yearId": year_id }),
    );

    let modules = request_ok(&mut stdin, &mut reader, "13", "modules.list", json!({}));
    assert_eq!(
        modules
            .get("modules")
            .and_then(|v| v.as_array())
            .map(|v| v.len()),
        Some(0)
    );
    let assessments = request_ok(
        &mut stdin,
        &mut reader,
        "14",
        "assessments.list",
        json!({}),
    );
    assert_eq!(
        assessments
            .get("assessments")
            .and_then(|v| v.as_array())
            .map(|v| v.len()),
        Some(0)
    );

    let _ = request_err(
        &mut stdin,
        &mut reader,
        "15",
        "years.delete",
        json!({ "yearId": year_id }),
        "not_found",
    );

    drop(stdin);
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn mutations_require_a_workspace() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_err(
        &mut stdin,
        &mut reader,
        "1",
        "years.create",
        json!({ "yearNumber": 1, "yearCredit": 120, "yearWeight": 40 }),
        "no_workspace",
    );
    // Reads degrade to empty collections instead of erroring.
    let listed = request_ok(&mut stdin, &mut reader, "2", "years.list", json!({}));
    assert_eq!(
        listed.get("years").and_then(|v| v.as_array()).map(|v| v.len()),
        Some(0)
    );

    drop(stdin);
}
