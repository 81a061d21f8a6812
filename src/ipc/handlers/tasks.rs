use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use chrono::Utc;
use rusqlite::params_from_iter;
use rusqlite::types::Value;
use serde_json::json;
use uuid::Uuid;

const VALID_STATUSES: [&str; 4] = ["upcoming", "due", "overdue", "complete"];

fn check_status(status: &str) -> Result<(), String> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(format!(
            "invalid status; must be one of: {}",
            VALID_STATUSES.join(", ")
        ))
    }
}

fn handle_tasks_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return ok(&req.id, json!({ "tasks": [] }));
    };

    let status = req.params.get("status").and_then(|v| v.as_str());

    let mut stmt = match conn.prepare(
        "SELECT id, title, description, status, due_date, created_at, updated_at
         FROM tasks
         WHERE (?1 IS NULL OR status = ?1)
         ORDER BY due_date IS NULL, due_date, created_at",
    ) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    let rows = stmt
        .query_map([status], |row| {
            let id: String = row.get(0)?;
            let title: String = row.get(1)?;
            let description: Option<String> = row.get(2)?;
            let status: String = row.get(3)?;
            let due_date: Option<String> = row.get(4)?;
            let created_at: String = row.get(5)?;
            let updated_at: Option<String> = row.get(6)?;
            Ok(json!({
                "id": id,
                "title": title,
                "description": description,
                "status": status,
                "dueDate": due_date,
                "createdAt": created_at,
                "updatedAt": updated_at
            }))
        })
        .and_then(|it| it.collect::<Result<Vec<_>, _>>());

    match rows {
        Ok(tasks) => ok(&req.id, json!({ "tasks": tasks })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_tasks_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let title = match req.params.get("title").and_then(|v| v.as_str()) {
        Some(v) => v.trim().to_string(),
        None => return err(&req.id, "bad_params", "missing title", None),
    };
    if title.is_empty() {
        return err(&req.id, "bad_params", "title must not be empty", None);
    }

    let description = req
        .params
        .get("description")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let status = req
        .params
        .get("status")
        .and_then(|v| v.as_str())
        .unwrap_or("upcoming")
        .to_string();
    if let Err(msg) = check_status(&status) {
        return err(&req.id, "bad_params", msg, None);
    }
    let due_date = req
        .params
        .get("dueDate")
        .and_then(|v| v.as_str())
        .map(str::to_string);

    let task_id = Uuid::new_v4().to_string();
    let created_at = Utc::now().to_rfc3339();
    if let Err(e) = conn.execute(
        "INSERT INTO tasks(id, title, description, status, due_date, created_at)
         VALUES(?, ?, ?, ?, ?, ?)",
        (&task_id, &title, &description, &status, &due_date, &created_at),
    ) {
        return err(
            &req.id,
            "db_insert_failed",
            e.to_string(),
            Some(json!({ "table": "tasks" })),
        );
    }

    ok(&req.id, json!({ "taskId": task_id, "title": title }))
}

fn handle_tasks_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let task_id = match req.params.get("taskId").and_then(|v| v.as_str()) {
        Some(v) => v.to_string(),
        None => return err(&req.id, "bad_params", "missing taskId", None),
    };
    let Some(patch) = req.params.get("patch").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "missing patch object", None);
    };

    // Validate the whole patch before touching the row; a rejected request
    // must leave the workspace untouched.
    let mut set_parts: Vec<String> = Vec::new();
    let mut bind_values: Vec<Value> = Vec::new();

    if let Some(v) = patch.get("title") {
        let title = v.as_str().map(str::trim).unwrap_or("");
        if title.is_empty() {
            return err(&req.id, "bad_params", "title must not be empty", None);
        }
        set_parts.push("title = ?".into());
        bind_values.push(Value::Text(title.to_string()));
    }

    if let Some(v) = patch.get("description") {
        if v.is_null() {
            set_parts.push("description = ?".into());
            bind_values.push(Value::Null);
        } else if let Some(s) = v.as_str() {
            let t = s.trim().to_string();
            set_parts.push("description = ?".into());
            if t.is_empty() {
                bind_values.push(Value::Null);
            } else {
                bind_values.push(Value::Text(t));
            }
        } else {
            return err(
                &req.id,
                "bad_params",
                "description must be a string or null",
                None,
            );
        }
    }

    if let Some(v) = patch.get("status") {
        let status = v.as_str().unwrap_or("");
        if let Err(msg) = check_status(status) {
            return err(&req.id, "bad_params", msg, None);
        }
        set_parts.push("status = ?".into());
        bind_values.push(Value::Text(status.to_string()));
    }

    if let Some(v) = patch.get("dueDate") {
        if v.is_null() {
            set_parts.push("due_date = ?".into());
            bind_values.push(Value::Null);
        } else if let Some(s) = v.as_str() {
            set_parts.push("due_date = ?".into());
            bind_values.push(Value::Text(s.to_string()));
        } else {
            return err(
                &req.id,
                "bad_params",
                "dueDate must be a string or null",
                None,
            );
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

    let sql = format!("UPDATE tasks SET {} WHERE id = ?", set_parts.join(", "));
    bind_values.push(Value::Text(task_id.clone()));

    let changed = match conn.execute(&sql, params_from_iter(bind_values)) {
        Ok(n) => n,
        Err(e) => {
            return err(
                &req.id,
                "db_update_failed",
                e.to_string(),
                Some(json!({ "table": "tasks" })),
            )
        }
    };
    if changed == 0 {
        return err(&req.id, "not_found", "task not found", None);
    }

    ok(&req.id, json!({ "taskId": task_id }))
}

// Quick status flips (e.g. marking a task complete from the list view) skip
// the full patch shape.
fn handle_tasks_update_status(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let task_id = match req.params.get("taskId").and_then(|v| v.as_str()) {
        Some(v) => v.to_string(),
        None => return err(&req.id, "bad_params", "missing taskId", None),
    };
    let status = match req.params.get("status").and_then(|v| v.as_str()) {
        Some(v) => v.to_string(),
        None => return err(&req.id, "bad_params", "missing status", None),
    };
    if let Err(msg) = check_status(&status) {
        return err(&req.id, "bad_params", msg, None);
    }

    let updated_at = Utc::now().to_rfc3339();
    let updated = match conn.execute(
        "UPDATE tasks SET status = ?, updated_at = ? WHERE id = ?",
        (&status, &updated_at, &task_id),
    ) {
        Ok(n) => n,
        Err(e) => return err(&req.id, "db_update_failed", e.to_string(), None),
    };
    if updated == 0 {
        return err(&req.id, "not_found", "task not found", None);
    }

    ok(&req.id, json!({ "taskId": task_id, "status": status }))
}

fn handle_tasks_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let task_id = match req.params.get("taskId").and_then(|v| v.as_str()) {
        Some(v) => v.to_string(),
        None => return err(&req.id, "bad_params", "missing taskId", None),
    };

    let deleted = match conn.execute("DELETE FROM tasks WHERE id = ?", [&task_id]) {
        Ok(n) => n,
        Err(e) => {
            return err(
                &req.id,
                "db_delete_failed",
                e.to_string(),
                Some(json!({ "table": "tasks" })),
            )
        }
    };
    if deleted == 0 {
        return err(&req.id, "not_found", "task not found", None);
    }

    ok(&req.id, json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "tasks.list" => Some(handle_tasks_list(state, req)),
        "tasks.create" => Some(handle_tasks_create(state, req)),
        "tasks.update" => Some(handle_tasks_update(state, req)),
        "tasks.updateStatus" => Some(handle_tasks_update_status(state, req)),
        "tasks.delete" => Some(handle_tasks_delete(state, req)),
        _ => None,
    }
}
