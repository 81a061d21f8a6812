use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, OptionalExtension};
use serde_json::json;
use uuid::Uuid;

/// Weight must land in (0, 100]. Returns an error message on failure so the
/// create and update paths complain identically.
fn check_weight(weight: f64) -> Result<(), &'static str> {
    if weight > 0.0 && weight <= 100.0 {
        Ok(())
    } else {
        Err("assessmentWeight must be greater than 0 and at most 100")
    }
}

fn check_grade(grade: f64) -> Result<(), &'static str> {
    if (0.0..=100.0).contains(&grade) {
        Ok(())
    } else {
        Err("assessmentGrade must be between 0 and 100")
    }
}

fn handle_assessments_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return ok(&req.id, json!({ "assessments": [] }));
    };

    let module_id = req.params.get("moduleId").and_then(|v| v.as_str());

    let mut stmt = match conn.prepare(
        "SELECT id, module_id, assessment_name, assessment_weight, assessment_grade,
                created_at, updated_at
         FROM assessments
         WHERE (?1 IS NULL OR module_id = ?1)
         ORDER BY created_at",
    ) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    let rows = stmt
        .query_map([module_id], |row| {
            let id: String = row.get(0)?;
            let module_id: String = row.get(1)?;
            let name: String = row.get(2)?;
            let weight: f64 = row.get(3)?;
            let grade: Option<f64> = row.get(4)?;
            let created_at: String = row.get(5)?;
            let updated_at: Option<String> = row.get(6)?;
            Ok(json!({
                "id": id,
                "moduleId": module_id,
                "assessmentName": name,
                "assessmentWeight": weight,
                "assessmentGrade": grade,
                "createdAt": created_at,
                "updatedAt": updated_at
            }))
        })
        .and_then(|it| it.collect::<Result<Vec<_>, _>>());

    match rows {
        Ok(assessments) => ok(&req.id, json!({ "assessments": assessments })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_assessments_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let name = match req.params.get("assessmentName").and_then(|v| v.as_str()) {
        Some(v) => v.trim().to_string(),
        None => return err(&req.id, "bad_params", "missing assessmentName", None),
    };
    if name.is_empty() {
        return err(
            &req.id,
            "bad_params",
            "assessmentName must not be empty",
            None,
        );
    }
    let weight = match req.params.get("assessmentWeight").and_then(|v| v.as_f64()) {
        Some(v) => v,
        None => return err(&req.id, "bad_params", "missing assessmentWeight", None),
    };
    if let Err(msg) = check_weight(weight) {
        return err(&req.id, "bad_params", msg, None);
    }

    // Grade is optional at creation; absent or null means "not yet graded".
    let grade = match req.params.get("assessmentGrade") {
        None => None,
        Some(v) if v.is_null() => None,
        Some(v) => match v.as_f64() {
            Some(g) => {
                if let Err(msg) = check_grade(g) {
                    return err(&req.id, "bad_params", msg, None);
                }
                Some(g)
            }
            None => {
                return err(
                    &req.id,
                    "bad_params",
                    "assessmentGrade must be a number or null",
                    None,
                )
            }
        },
    };

    let module_id = match req.params.get("moduleId").and_then(|v| v.as_str()) {
        Some(v) => v.to_string(),
        None => return err(&req.id, "bad_params", "missing moduleId", None),
    };
    let module_exists: Option<i64> = match conn
        .query_row("SELECT 1 FROM modules WHERE id = ?", [&module_id], |r| {
            r.get(0)
        })
        .optional()
    {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    if module_exists.is_none() {
        return err(&req.id, "not_found", "module not found", None);
    }

    let assessment_id = Uuid::new_v4().to_string();
    let created_at = Utc::now().to_rfc3339();
    if let Err(e) = conn.execute(
        "INSERT INTO assessments(id, module_id, assessment_name, assessment_weight,
                                 assessment_grade, created_at)
         VALUES(?, ?, ?, ?, ?, ?)",
        (&assessment_id, &module_id, &name, weight, grade, &created_at),
    ) {
        return err(
            &req.id,
            "db_insert_failed",
            e.to_string(),
            Some(json!({ "table": "assessments" })),
        );
    }

    ok(
        &req.id,
        json!({ "assessmentId": assessment_id, "assessmentName": name }),
    )
}

fn handle_assessments_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let assessment_id = match req.params.get("assessmentId").and_then(|v| v.as_str()) {
        Some(v) => v.to_string(),
        None => return err(&req.id, "bad_params", "missing assessmentId", None),
    };
    let Some(patch) = req.params.get("patch").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "missing patch object", None);
    };

    // Validate the whole patch before touching the row; a rejected request
    // must leave the workspace untouched.
    let mut set_parts: Vec<String> = Vec::new();
    let mut bind_values: Vec<Value> = Vec::new();

    if let Some(v) = patch.get("assessmentName") {
        let name = v.as_str().map(str::trim).unwrap_or("");
        if name.is_empty() {
            return err(
                &req.id,
                "bad_params",
                "assessmentName must not be empty",
                None,
            );
        }
        set_parts.push("assessment_name = ?".into());
        bind_values.push(Value::Text(name.to_string()));
    }

    if let Some(v) = patch.get("assessmentWeight") {
        let Some(weight) = v.as_f64() else {
            return err(
                &req.id,
                "bad_params",
                "assessmentWeight must be a number",
                None,
            );
        };
        if let Err(msg) = check_weight(weight) {
            return err(&req.id, "bad_params", msg, None);
        }
        set_parts.push("assessment_weight = ?".into());
        bind_values.push(Value::Real(weight));
    }

    // A null grade in the patch clears the mark back to "not yet graded".
    if let Some(v) = patch.get("assessmentGrade") {
        if v.is_null() {
            set_parts.push("assessment_grade = ?".into());
            bind_values.push(Value::Null);
        } else {
            match v.as_f64() {
                Some(g) => {
                    if let Err(msg) = check_grade(g) {
                        return err(&req.id, "bad_params", msg, None);
                    }
                    set_parts.push("assessment_grade = ?".into());
                    bind_values.push(Value::Real(g));
                }
                None => {
                    return err(
                        &req.id,
                        "bad_params",
                        "assessmentGrade must be a number or null",
                        None,
                    )
                }
            }
        }
    }

    if set_parts.is_empty() {
        return err(
            &req.id,
            "bad_params",
            "patch must include at least one field",
            None,
        );
    }

    set_parts.push("updated_at = ?".into());
    bind_values.push(Value::Text(Utc::now().to_rfc3339()));

    let sql = format!(
        "UPDATE assessments SET {} WHERE id = ?",
        set_parts.join(", ")
    );
    bind_values.push(Value::Text(assessment_id.clone()));

    let changed = match conn.execute(&sql, params_from_iter(bind_values)) {
        Ok(n) => n,
        Err(e) => {
            return err(
                &req.id,
                "db_update_failed",
                e.to_string(),
                Some(json!({ "table": "assessments" })),
            )
        }
    };
    if changed == 0 {
        return err(&req.id, "not_found", "assessment not found", None);
    }

    ok(&req.id, json!({ "assessmentId": assessment_id }))
}

fn handle_assessments_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let assessment_id = match req.params.get("assessmentId").and_then(|v| v.as_str()) {
        Some(v) => v.to_string(),
        None => return err(&req.id, "bad_params", "missing assessmentId", None),
    };

    let deleted = match conn.execute("DELETE FROM assessments WHERE id = ?", [&assessment_id]) {
        Ok(n) => n,
        Err(e) => {
            return err(
                &req.id,
                "db_delete_failed",
                e.to_string(),
                Some(json!({ "table": "assessments" })),
            )
        }
    };
    if deleted == 0 {
        return err(&req.id, "not_found", "assessment not found", None);
    }

    ok(&req.id, json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "assessments.list" => Some(handle_assessments_list(state, req)),
        "assessments.create" => Some(handle_assessments_create(state, req)),
        "assessments.update" => Some(handle_assessments_update(state, req)),
        "assessments.delete" => Some(handle_assessments_delete(state, req)),
        _ => None,
    }
}
