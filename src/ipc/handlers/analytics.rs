use crate::calc::{self, AssessmentRow, ModuleRow, YearRow};
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use rusqlite::Connection;
use serde_json::json;

/// Full workspace snapshot handed to the aggregation engine. Row order is
/// what the engine's "source order" guarantees are anchored to: years by
/// year number, modules and assessments by creation time.
struct Snapshot {
    years: Vec<YearRow>,
    modules: Vec<ModuleRow>,
    assessments: Vec<AssessmentRow>,
}

fn load_snapshot(conn: &Connection) -> Result<Snapshot, rusqlite::Error> {
    let mut years_stmt = conn.prepare(
        "SELECT id, year_number, year_credit
         FROM years
         ORDER BY year_number",
    )?;
    let years = years_stmt
        .query_map([], |r| {
            Ok(YearRow {
                id: r.get(0)?,
                year_number: r.get(1)?,
                year_credit: r.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut modules_stmt = conn.prepare(
        "SELECT id, year_id, module_name, module_credit
         FROM modules
         ORDER BY created_at, module_name",
    )?;
    let modules = modules_stmt
        .query_map([], |r| {
            Ok(ModuleRow {
                id: r.get(0)?,
                year_id: r.get(1)?,
                module_name: r.get(2)?,
                module_credit: r.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut assessments_stmt = conn.prepare(
        "SELECT module_id, assessment_name, assessment_weight, assessment_grade, created_at
         FROM assessments
         ORDER BY created_at",
    )?;
    let assessments = assessments_stmt
        .query_map([], |r| {
            Ok(AssessmentRow {
                module_id: r.get(0)?,
                assessment_name: r.get(1)?,
                assessment_weight: r.get(2)?,
                assessment_grade: r.get(3)?,
                created_at: r.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Snapshot {
        years,
        modules,
        assessments,
    })
}

fn with_snapshot(
    state: &mut AppState,
    req: &Request,
    f: impl FnOnce(&Snapshot) -> serde_json::Value,
) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    match load_snapshot(conn) {
        Ok(snapshot) => ok(&req.id, f(&snapshot)),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_overview(state: &mut AppState, req: &Request) -> serde_json::Value {
    with_snapshot(state, req, |s| {
        json!(calc::overview(&s.years, &s.modules, &s.assessments))
    })
}

fn handle_by_module(state: &mut AppState, req: &Request) -> serde_json::Value {
    with_snapshot(state, req, |s| {
        json!({ "byModule": calc::module_grades(&s.modules, &s.assessments) })
    })
}

fn handle_by_year(state: &mut AppState, req: &Request) -> serde_json::Value {
    with_snapshot(state, req, |s| {
        json!({ "byYear": calc::year_grades(&s.years, &s.modules, &s.assessments) })
    })
}

fn handle_distribution(state: &mut AppState, req: &Request) -> serde_json::Value {
    with_snapshot(state, req, |s| {
        json!({ "gradeDistribution": calc::grade_distribution(&s.assessments) })
    })
}

fn handle_recent(state: &mut AppState, req: &Request) -> serde_json::Value {
    let limit = req
        .params
        .get("limit")
        .and_then(|v| v.as_u64())
        .map(|v| v as usize)
        .unwrap_or(calc::RECENT_LIMIT_DEFAULT);
    with_snapshot(state, req, |s| {
        json!({
            "assessmentScores": calc::recent_assessments(&s.modules, &s.assessments, limit)
        })
    })
}

fn handle_progress(state: &mut AppState, req: &Request) -> serde_json::Value {
    with_snapshot(state, req, |s| {
        json!({
            "yearProgress": calc::year_progress(&s.years, &s.modules, &s.assessments)
        })
    })
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "grades.overview" => Some(handle_overview(state, req)),
        "grades.byModule" => Some(handle_by_module(state, req)),
        "grades.byYear" => Some(handle_by_year(state, req)),
        "grades.distribution" => Some(handle_distribution(state, req)),
        "grades.recentAssessments" => Some(handle_recent(state, req)),
        "grades.yearProgress" => Some(handle_progress(state, req)),
        _ => None,
    }
}
