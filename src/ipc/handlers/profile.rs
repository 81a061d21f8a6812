use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use chrono::Utc;
use rusqlite::OptionalExtension;
use serde_json::json;

fn handle_profile_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return ok(&req.id, json!({ "profile": null }));
    };

    let row = conn
        .query_row(
            "SELECT university, field_of_study, year_of_study, graduation_year,
                    first_name, last_name, bio, updated_at
             FROM profile WHERE id = 1",
            [],
            |r| {
                let university: Option<String> = r.get(0)?;
                let field_of_study: Option<String> = r.get(1)?;
                let year_of_study: Option<i64> = r.get(2)?;
                let graduation_year: Option<i64> = r.get(3)?;
                let first_name: Option<String> = r.get(4)?;
                let last_name: Option<String> = r.get(5)?;
                let bio: Option<String> = r.get(6)?;
                let updated_at: Option<String> = r.get(7)?;
                Ok(json!({
                    "university": university,
                    "fieldOfStudy": field_of_study,
                    "yearOfStudy": year_of_study,
                    "graduationYear": graduation_year,
                    "firstName": first_name,
                    "lastName": last_name,
                    "bio": bio,
                    "updatedAt": updated_at
                }))
            },
        )
        .optional();

    match row {
        Ok(profile) => ok(&req.id, json!({ "profile": profile })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_profile_upsert(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let get_str = |key: &str| {
        req.params
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    let get_int = |key: &str| req.params.get(key).and_then(|v| v.as_i64());

    let university = get_str("university");
    let field_of_study = get_str("fieldOfStudy");
    let year_of_study = get_int("yearOfStudy");
    if let Some(y) = year_of_study {
        if y < 1 {
            return err(&req.id, "bad_params", "yearOfStudy must be at least 1", None);
        }
    }
    let graduation_year = get_int("graduationYear");
    let first_name = get_str("firstName");
    let last_name = get_str("lastName");
    let bio = get_str("bio");
    let updated_at = Utc::now().to_rfc3339();

    if let Err(e) = conn.execute(
        "INSERT INTO profile(id, university, field_of_study, year_of_study, graduation_year,
                             first_name, last_name, bio, updated_at)
         VALUES(1, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET
             university = excluded.university,
             field_of_study = excluded.field_of_study,
             year_of_study = excluded.year_of_study,
             graduation_year = excluded.graduation_year,
             first_name = excluded.first_name,
             last_name = excluded.last_name,
             bio = excluded.bio,
             updated_at = excluded.updated_at",
        (
            &university,
            &field_of_study,
            year_of_study,
            graduation_year,
            &first_name,
            &last_name,
            &bio,
            &updated_at,
        ),
    ) {
        return err(
            &req.id,
            "db_insert_failed",
            e.to_string(),
            Some(json!({ "table": "profile" })),
        );
    }

    ok(&req.id, json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "profile.get" => Some(handle_profile_get(state, req)),
        "profile.upsert" => Some(handle_profile_upsert(state, req)),
        _ => None,
    }
}
