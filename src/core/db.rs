use anyhow::Result;
use tokio_rusqlite::Connection;

/// Open (or create) the sqlite database used for credential storage.
pub async fn async_db(db_path: &str) -> Result<Connection> {
    let db = Connection::open(db_path).await?;
    db.call(|conn| {
        initialize_db(conn)?;
        Ok(())
    })
    .await?;
    Ok(db)
}

/// Create the schema if it doesn't exist yet. Safe to call on every start.
pub fn initialize_db(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    // One row per mailbox account. The relay only ever uses a single row.
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS auth (
             id TEXT PRIMARY KEY,
             service TEXT NOT NULL,
             access_token TEXT NOT NULL,
             refresh_token TEXT,
             expires_at INTEGER,
             scopes TEXT NOT NULL DEFAULT ''
         );",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_db_is_idempotent() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        initialize_db(&conn).unwrap();
        initialize_db(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM auth", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
