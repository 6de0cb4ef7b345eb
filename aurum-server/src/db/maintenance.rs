//! Startup maintenance
//!
//! Runs before the HTTP listener starts:
//! - swap in a database staged by a restore upload
//! - copy the database (and its WAL/SHM files) aside
//! - normalize legacy `orders.shift` values to `MORNING` / `EVENING`

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use shared::models::ShiftKind;
use sqlx::SqlitePool;

/// Suffixes of the SQLite side files that travel with the main file
const SIDE_FILES: [&str; 2] = ["-wal", "-shm"];

/// `resto.db` → `resto.db{suffix}`
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Where a restore upload stages the database until the next startup
pub fn staged_restore_path(db_path: &Path) -> PathBuf {
    with_suffix(db_path, ".restore")
}

/// Copy the database and its side files to `*.bak.{stamp}`
///
/// Returns the backup path of the main file, or `None` when there is no
/// database yet.
pub fn backup_files(db_path: &Path, stamp: &str) -> std::io::Result<Option<PathBuf>> {
    if !db_path.exists() {
        return Ok(None);
    }
    let suffix = format!(".bak.{stamp}");
    let bak = with_suffix(db_path, &suffix);
    std::fs::copy(db_path, &bak)?;
    for side in SIDE_FILES {
        let side_path = with_suffix(db_path, side);
        if side_path.exists() {
            std::fs::copy(&side_path, with_suffix(&side_path, &suffix))?;
        }
    }
    Ok(Some(bak))
}

/// Startup copy of the database
pub fn backup_on_start(db_path: &Path) -> std::io::Result<Option<PathBuf>> {
    let bak = backup_files(db_path, &shared::util::file_stamp())?;
    match &bak {
        Some(p) => tracing::info!(backup = %p.display(), "Database backed up"),
        None => tracing::info!(
            path = %db_path.display(),
            "No database yet, it will be created"
        ),
    }
    Ok(bak)
}

/// Move a staged restore into place
///
/// The current database is backed up first and its WAL/SHM files are
/// removed so they are not replayed over the restored file.
pub fn apply_staged_restore(db_path: &Path) -> std::io::Result<bool> {
    let staged = staged_restore_path(db_path);
    if !staged.exists() {
        return Ok(false);
    }

    let stamp = shared::util::file_stamp();
    if let Some(bak) = backup_files(db_path, &stamp)? {
        tracing::info!(backup = %bak.display(), "Current database saved before restore");
    }
    for side in SIDE_FILES {
        let side_path = with_suffix(db_path, side);
        if side_path.exists() {
            std::fs::remove_file(&side_path)?;
        }
    }
    std::fs::rename(&staged, db_path)?;

    tracing::warn!(path = %db_path.display(), "Restored database from staged upload");
    Ok(true)
}

/// Result of shift normalization
#[derive(Debug, Default)]
pub struct ShiftNormalization {
    /// Rows rewritten
    pub updated: u64,
    /// Row count per value after normalization
    pub counts: Vec<(String, i64)>,
    /// Values that still are not a known shift code
    pub unknown: Vec<String>,
}

/// Rewrite `orders.shift` to canonical codes
pub async fn normalize_shifts(pool: &SqlitePool) -> Result<ShiftNormalization, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut updated = sqlx::query(
        "UPDATE orders SET shift = UPPER(TRIM(shift)) WHERE shift IS NOT NULL AND shift <> UPPER(TRIM(shift))",
    )
    .execute(&mut *tx)
    .await?
    .rows_affected();

    let values: Vec<String> =
        sqlx::query_scalar("SELECT DISTINCT shift FROM orders WHERE shift IS NOT NULL")
            .fetch_all(&mut *tx)
            .await?;

    for value in values {
        if let Some(kind) = ShiftKind::parse(&value)
            && kind.as_str() != value
        {
            updated += sqlx::query("UPDATE orders SET shift = ? WHERE shift = ?")
                .bind(kind.as_str())
                .bind(&value)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }
    }

    let counts: Vec<(String, i64)> = sqlx::query_as(
        "SELECT COALESCE(shift, ''), COUNT(*) FROM orders GROUP BY shift ORDER BY shift",
    )
    .fetch_all(&mut *tx)
    .await?;
    tx.commit().await?;

    let unknown: Vec<String> = counts
        .iter()
        .filter(|(v, _)| ShiftKind::ALL.iter().all(|k| k.as_str() != v))
        .map(|(v, _)| v.clone())
        .collect();

    tracing::info!(updated, counts = ?counts, "orders.shift normalized");
    if !unknown.is_empty() {
        tracing::warn!(values = ?unknown, "orders.shift still holds unknown values");
    }

    Ok(ShiftNormalization {
        updated,
        counts,
        unknown,
    })
}
