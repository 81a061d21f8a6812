use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use chrono::Utc;
use rusqlite::OptionalExtension;
use serde_json::json;
use uuid::Uuid;

fn handle_modules_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return ok(&req.id, json!({ "modules": [] }));
    };

    // Optional yearId filter; without it the whole workspace is returned.
    let year_id = req.params.get("yearId").and_then(|v| v.as_str());

    let sql = "SELECT
                 m.id,
                 m.year_id,
                 m.module_name,
                 m.module_credit,
                 m.created_at,
                 (SELECT COUNT(*) FROM assessments a WHERE a.module_id = m.id) AS assessment_count
               FROM modules m
               WHERE (?1 IS NULL OR m.year_id = ?1)
               ORDER BY m.created_at, m.module_name";
    let mut stmt = match conn.prepare(sql) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    let rows = stmt
        .query_map([year_id], |row| {
            let id: String = row.get(0)?;
            let year_id: String = row.get(1)?;
            let module_name: String = row.get(2)?;
            let module_credit: f64 = row.get(3)?;
            let created_at: String = row.get(4)?;
            let assessment_count: i64 = row.get(5)?;
            Ok(json!({
                "id": id,
                "yearId": year_id,
                "moduleName": module_name,
                "moduleCredit": module_credit,
                "createdAt": created_at,
                "assessmentCount": assessment_count
            }))
        })
        .and_then(|it| it.collect::<Result<Vec<_>, _>>());

    match rows {
        Ok(modules) => ok(&req.id, json!({ "modules": modules })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_modules_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let module_name = match req.params.get("moduleName").and_then(|v| v.as_str()) {
        Some(v) => v.trim().to_string(),
        None => return err(&req.id, "bad_params", "missing moduleName", None),
    };
    if module_name.is_empty() {
        return err(&req.id, "bad_params", "moduleName must not be empty", None);
    }
    let module_credit = match req.params.get("moduleCredit").and_then(|v| v.as_f64()) {
        Some(v) => v,
        None => return err(&req.id, "bad_params", "missing moduleCredit", None),
    };
    if !(1.0..=120.0).contains(&module_credit) {
        return err(
            &req.id,
            "bad_params",
            "moduleCredit must be between 1 and 120",
            None,
        );
    }
    let year_id = match req.params.get("yearId").and_then(|v| v.as_str()) {
        Some(v) => v.to_string(),
        None => return err(&req.id, "bad_params", "missing yearId", None),
    };

    let year_exists: Option<i64> = match conn
        .query_row("SELECT 1 FROM years WHERE id = ?", [&year_id], |r| r.get(0))
        .optional()
    {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    if year_exists.is_none() {
        return err(&req.id, "not_found", "year not found", None);
    }

    // Module names are unique within a year; match case-insensitively so
    // "Databases" and "databases" don't both slip in.
    let duplicate: Option<String> = match conn
        .query_row(
            "SELECT id FROM modules
             WHERE year_id = ? AND module_name = ? COLLATE NOCASE",
            (&year_id, &module_name),
            |r| r.get(0),
        )
        .optional()
    {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    if duplicate.is_some() {
        return err(
            &req.id,
            "duplicate",
            format!("module '{}' already exists in this year", module_name),
            Some(json!({ "moduleName": module_name })),
        );
    }

    let module_id = Uuid::new_v4().to_string();
    let created_at = Utc::now().to_rfc3339();
    if let Err(e) = conn.execute(
        "INSERT INTO modules(id, year_id, module_name, module_credit, created_at)
         VALUES(?, ?, ?, ?, ?)",
        (&module_id, &year_id, &module_name, module_credit, &created_at),
    ) {
        return err(
            &req.id,
            "db_insert_failed",
            e.to_string(),
            Some(json!({ "table": "modules" })),
        );
    }

    ok(
        &req.id,
        json!({ "moduleId": module_id, "moduleName": module_name }),
    )
}

fn handle_modules_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let module_id = match req.params.get("moduleId").and_then(|v| v.as_str()) {
        Some(v) => v.to_string(),
        None => return err(&req.id, "bad_params", "missing moduleId", None),
    };

    let exists: Option<i64> = match conn
        .query_row("SELECT 1 FROM modules WHERE id = ?", [&module_id], |r| {
            r.get(0)
        })
        .optional()
    {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    if exists.is_none() {
        return err(&req.id, "not_found", "module not found", None);
    }

    let tx = match conn.unchecked_transaction() {
        Ok(t) => t,
        Err(e) => return err(&req.id, "db_tx_failed", e.to_string(), None),
    };

    if let Err(e) = tx.execute("DELETE FROM assessments WHERE module_id = ?", [&module_id]) {
        let _ = tx.rollback();
        return err(
            &req.id,
            "db_delete_failed",
            e.to_string(),
            Some(json!({ "table": "assessments" })),
        );
    }

    if let Err(e) = tx.execute("DELETE FROM modules WHERE id = ?", [&module_id]) {
        let _ = tx.rollback();
        return err(
            &req.id,
            "db_delete_failed",
            e.to_string(),
            Some(json!({ "table": "modules" })),
        );
    }

    if let Err(e) = tx.commit() {
        return err(&req.id, "db_commit_failed", e.to_string(), None);
    }

    ok(&req.id, json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "modules.list" => Some(handle_modules_list(state, req)),
        "modules.create" => Some(handle_modules_create(state, req)),
        "modules.delete" => Some(handle_modules_delete(state, req)),
        _ => None,
    }
}
