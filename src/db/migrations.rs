use std::fs;
use std::path::Path;

use anyhow::Context;
use rusqlite::Connection;

const MIGRATIONS_DIR: &str = "migrations";

/// Applies `migrations/*.sql` in filename order, once each. Applied names are
/// tracked in the `_migrations` table.
pub fn run_migrations(conn: &Connection) -> anyhow::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
    .context("failed to create _migrations table")?;

    let dir = Path::new(MIGRATIONS_DIR);
    for name in migration_files(dir)? {
        if is_applied(conn, &name)? {
            continue;
        }

        let sql = fs::read_to_string(dir.join(&name))
            .with_context(|| format!("failed to read migration {name}"))?;
        conn.execute_batch(&sql)
            .with_context(|| format!("migration {name} failed"))?;
        conn.execute("INSERT INTO _migrations (name) VALUES (?1)", [&name])
            .with_context(|| format!("failed to record migration {name}"))?;

        tracing::info!(migration = %name, "applied migration");
    }

    Ok(())
}

fn migration_files(dir: &Path) -> anyhow::Result<Vec<String>> {
    if !dir.exists() {
        tracing::warn!("migrations directory not found, skipping");
        return Ok(vec![]);
    }

    let mut names: Vec<String> = fs::read_dir(dir)
        .context("failed to read migrations directory")?
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".sql"))
        .collect();
    names.sort();
    Ok(names)
}

fn is_applied(conn: &Connection, name: &str) -> anyhow::Result<bool> {
    let applied: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM _migrations WHERE name = ?1",
        [name],
        |row| row.get(0),
    )?;
    Ok(applied)
}
