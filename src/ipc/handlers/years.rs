use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use chrono::Utc;
use rusqlite::OptionalExtension;
use serde_json::json;
use uuid::Uuid;

fn handle_years_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return ok(&req.id, json!({ "years": [] }));
    };

    // Module counts let the dashboard render without a second round trip.
    let mut stmt = match conn.prepare(
        "SELECT
           y.id,
           y.year_number,
           y.year_credit,
           y.year_weight,
           y.created_at,
           (SELECT COUNT(*) FROM modules m WHERE m.year_id = y.id) AS module_count
         FROM years y
         ORDER BY y.year_number",
    ) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    let rows = stmt
        .query_map([], |row| {
            let id: String = row.get(0)?;
            let year_number: i64 = row.get(1)?;
            let year_credit: f64 = row.get(2)?;
            let year_weight: f64 = row.get(3)?;
            let created_at: String = row.get(4)?;
            let module_count: i64 = row.get(5)?;
            Ok(json!({
                "id": id,
                "yearNumber": year_number,
                "yearCredit": year_credit,
                "yearWeight": year_weight,
                "createdAt": created_at,
                "moduleCount": module_count
            }))
        })
        .and_then(|it| it.collect::<Result<Vec<_>, _>>());

    match rows {
        Ok(years) => ok(&req.id, json!({ "years": years })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_years_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let year_number = match req.params.get("yearNumber").and_then(|v| v.as_i64()) {
        Some(v) => v,
        None => return err(&req.id, "bad_params", "missing yearNumber", None),
    };
    if year_number < 1 {
        return err(&req.id, "bad_params", "yearNumber must be at least 1", None);
    }
    let year_credit = match req.params.get("yearCredit").and_then(|v| v.as_f64()) {
        Some(v) => v,
        None => return err(&req.id, "bad_params", "missing yearCredit", None),
    };
    if year_credit <= 0.0 {
        return err(&req.id, "bad_params", "yearCredit must be positive", None);
    }
    let year_weight = match req.params.get("yearWeight").and_then(|v| v.as_f64()) {
        Some(v) => v,
        None => return err(&req.id, "bad_params", "missing yearWeight", None),
    };
    if !(0.0..=100.0).contains(&year_weight) {
        return err(
            &req.id,
            "bad_params",
            "yearWeight must be between 0 and 100",
            None,
        );
    }

    let existing: Option<String> = match conn
        .query_row(
            "SELECT id FROM years WHERE year_number = ?",
            [year_number],
            |r| r.get(0),
        )
        .optional()
    {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    if existing.is_some() {
        return err(
            &req.id,
            "duplicate",
            format!("year {} already exists", year_number),
            Some(json!({ "yearNumber": year_number })),
        );
    }

    let year_id = Uuid::new_v4().to_string();
    let created_at = Utc::now().to_rfc3339();
    if let Err(e) = conn.execute(
        "INSERT INTO years(id, year_number, year_credit, year_weight, created_at)
         VALUES(?, ?, ?, ?, ?)",
        (&year_id, year_number, year_credit, year_weight, &created_at),
    ) {
        return err(
            &req.id,
            "db_insert_failed",
            e.to_string(),
            Some(json!({ "table": "years" })),
        );
    }

    ok(
        &req.id,
        json!({ "yearId": year_id, "yearNumber": year_number }),
    )
}

fn handle_years_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let year_id = match req.params.get("yearId").and_then(|v| v.as_str()) {
        Some(v) => v.to_string(),
        None => return err(&req.id, "bad_params", "missing yearId", None),
    };

    let exists: Option<i64> = match conn
        .query_row("SELECT 1 FROM years WHERE id = ?", [&year_id], |r| r.get(0))
        .optional()
    {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    if exists.is_none() {
        return err(&req.id, "not_found", "year not found", None);
    }

    let tx = match conn.unchecked_transaction() {
        Ok(t) => t,
        Err(e) => return err(&req.id, "db_tx_failed", e.to_string(), None),
    };

    // Explicitly delete in dependency order (no ON DELETE CASCADE).
    if let Err(e) = tx.execute(
        "DELETE FROM assessments
         WHERE module_id IN (SELECT id FROM modules WHERE year_id = ?)",
        [&year_id],
    ) {
        let _ = tx.rollback();
        return err(
            &req.id,
            "db_delete_failed",
            e.to_string(),
            Some(json!({ "table": "assessments" })),
        );
    }

    if let Err(e) = tx.execute("DELETE FROM modules WHERE year_id = ?", [&year_id]) {
        let _ = tx.rollback();
        return err(
            &req.id,
            "db_delete_failed",
            e.to_string(),
            Some(json!({ "table": "modules" })),
        );
    }

    if let Err(e) = tx.execute("DELETE FROM years WHERE id = ?", [&year_id]) {
        let _ = tx.rollback();
        return err(
            &req.id,
            "db_delete_failed",
            e.to_string(),
            Some(json!({ "table": "years" })),
        );
    }

    if let Err(e) = tx.commit() {
        return err(&req.id, "db_commit_failed", e.to_string(), None);
    }

    ok(&req.id, json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "years.list" => Some(handle_years_list(state, req)),
        "years.create" => Some(handle_years_create(state, req)),
        "years.delete" => Some(handle_years_delete(state, req)),
        _ => None,
    }
}
