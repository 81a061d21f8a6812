use rusqlite::Connection;
use std::path::Path;

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join("gradeplus.sqlite3");
    let conn = Connection::open(db_path)?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS years(
            id TEXT PRIMARY KEY,
            year_number INTEGER NOT NULL UNIQUE,
            year_credit REAL NOT NULL,
            year_weight REAL NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS modules(
            id TEXT PRIMARY KEY,
            year_id TEXT NOT NULL,
            module_name TEXT NOT NULL,
            module_credit REAL NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY(year_id) REFERENCES years(id),
            UNIQUE(year_id, module_name)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_modules_year ON modules(year_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS assessments(
            id TEXT PRIMARY KEY,
            module_id TEXT NOT NULL,
            assessment_name TEXT NOT NULL,
            assessment_weight REAL NOT NULL,
            assessment_grade REAL,
            created_at TEXT NOT NULL,
            updated_at TEXT,
            FOREIGN KEY(module_id) REFERENCES modules(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_assessments_module ON assessments(module_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_assessments_created ON assessments(created_at)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS tasks(
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            status TEXT NOT NULL DEFAULT 'upcoming',
            due_date TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status)",
        [],
    )?;

    // Single-row table; the workspace belongs to one student.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS profile(
            id INTEGER PRIMARY KEY CHECK(id = 1),
            university TEXT,
            field_of_study TEXT,
            year_of_study INTEGER,
            graduation_year INTEGER,
            first_name TEXT,
            last_name TEXT,
            bio TEXT,
            updated_at TEXT
        )",
        [],
    )?;

    ensure_assessments_updated_at(&conn)?;
    ensure_tasks_updated_at(&conn)?;

    Ok(conn)
}

// Workspaces created before grade edits landed lack updated_at columns.

fn ensure_assessments_updated_at(conn: &Connection) -> anyhow::Result<()> {
    if table_has_column(conn, "assessments", "updated_at")? {
        return Ok(());
    }
    conn.execute("ALTER TABLE assessments ADD COLUMN updated_at TEXT", [])?;
    Ok(())
}

fn ensure_tasks_updated_at(conn: &Connection) -> anyhow::Result<()> {
    if table_has_column(conn, "tasks", "updated_at")? {
        return Ok(());
    }
    conn.execute("ALTER TABLE tasks ADD COLUMN updated_at TEXT", [])?;
    Ok(())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> anyhow::Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
