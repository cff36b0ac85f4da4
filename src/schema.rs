use rusqlite::{Connection, Result};

/// Initialize the upload queue persistence schema
pub fn init_queue_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS queue_schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    let current_version: i32 = conn
        .query_row(
            "SELECT version FROM queue_schema_version ORDER BY version DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current_version < 1 {
        create_queue_schema_v1(conn)?;
        conn.execute("INSERT INTO queue_schema_version (version) VALUES (1)", [])?;
    }

    Ok(())
}

/// Create queue persistence schema version 1
fn create_queue_schema_v1(conn: &Connection) -> Result<()> {
    // Single key-value table; the queue serializes its full entry list
    // into one row.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    Ok(())
}
