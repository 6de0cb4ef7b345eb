//! Backup handlers: ZIP export / restore

use std::io::{Cursor, Read, Write};
use std::path::Path;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::auth::credentials::{CredentialStore, parse_credential_bytes};
use crate::core::ServerState;
use crate::db::maintenance::{staged_restore_path, with_suffix};
use crate::utils::csv::content_disposition;
use crate::utils::{AppError, ErrorCode};
use shared::client::RestoreReport;

pub(super) const DB_ENTRY: &str = "aurum.db";
pub(super) const AUTH_ENTRY: &str = "auth.json";

const SQLITE_HEADER: &[u8] = b"SQLite format 3\0";

/// Decompressed size caps per archive entry
const MAX_DB_ENTRY_BYTES: u64 = 2 * 1024 * 1024 * 1024;
const MAX_AUTH_ENTRY_BYTES: u64 = 1024 * 1024;

fn backup_failed(e: impl std::fmt::Display) -> AppError {
    AppError::with_message(ErrorCode::BackupFailed, format!("Backup failed: {e}"))
}

fn restore_failed(e: impl std::fmt::Display) -> AppError {
    AppError::with_message(ErrorCode::RestoreFailed, format!("Restore failed: {e}"))
}

fn invalid_archive(msg: impl Into<String>) -> AppError {
    AppError::with_message(ErrorCode::InvalidArchive, msg)
}

// =============================================================================
// HTTP handlers
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct BackupQuery {
    #[serde(default = "default_true")]
    pub include_db: bool,
    #[serde(default = "default_true")]
    pub include_auth: bool,
}

fn default_true() -> bool {
    true
}

/// GET /api/v1/backup
pub async fn export(
    State(state): State<ServerState>,
    Query(query): Query<BackupQuery>,
) -> Result<impl IntoResponse, AppError> {
    if !query.include_db && !query.include_auth {
        return Err(AppError::validation(
            "at least one of include_db / include_auth must be true",
        ));
    }

    let mut entries: Vec<(&str, Vec<u8>)> = Vec::new();
    if query.include_db {
        entries.push((DB_ENTRY, snapshot_database(&state).await?));
    }
    if query.include_auth {
        match state.credentials.read_raw().await? {
            Some(raw) => entries.push((AUTH_ENTRY, raw)),
            None => tracing::warn!("auth.json does not exist, left out of backup"),
        }
    }

    let zip_bytes = build_archive(&entries)?;
    let filename = format!("aurum_backup_{}.zip", shared::util::archive_stamp());
    tracing::info!(
        file = %filename,
        entries = entries.len(),
        bytes = zip_bytes.len(),
        "Backup exported"
    );

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&filename)),
        ],
        zip_bytes,
    ))
}

/// POST /api/v1/backup/restore
pub async fn restore(
    State(state): State<ServerState>,
    body: Bytes,
) -> Result<Json<RestoreReport>, AppError> {
    let plan = read_archive(body.as_ref())?;
    let report = apply_restore(plan, &state.credentials, &state.config.db_path).await?;

    tracing::info!(
        restored = ?report.restored,
        skipped = ?report.skipped,
        restart_required = report.restart_required,
        "Backup restored"
    );
    Ok(Json(report))
}

// =============================================================================
// Core functions
// =============================================================================

/// Consistent copy of the live database via `VACUUM INTO`
async fn snapshot_database(state: &ServerState) -> Result<Vec<u8>, AppError> {
    let target = with_suffix(
        &state.config.db_path,
        &format!(".snapshot.{}", shared::util::now_millis()),
    );
    let target_str = target.to_string_lossy().to_string();

    let result = async {
        sqlx::query("VACUUM INTO ?")
            .bind(&target_str)
            .execute(&state.pool)
            .await
            .map_err(backup_failed)?;
        tokio::fs::read(&target).await.map_err(backup_failed)
    }
    .await;

    if let Err(e) = tokio::fs::remove_file(&target).await
        && e.kind() != std::io::ErrorKind::NotFound
    {
        tracing::warn!(path = %target.display(), error = %e, "Failed to remove snapshot file");
    }
    result
}

/// In-memory ZIP, Deflate compressed
pub(super) fn build_archive(entries: &[(&str, Vec<u8>)]) -> Result<Vec<u8>, AppError> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut zip = ZipWriter::new(&mut buf);
        let options: FileOptions<()> =
            FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        for (name, data) in entries {
            zip.start_file(*name, options).map_err(backup_failed)?;
            zip.write_all(data).map_err(backup_failed)?;
        }
        zip.finish().map_err(backup_failed)?;
    }
    Ok(buf.into_inner())
}

/// Validated archive contents
#[derive(Debug, Default)]
pub(super) struct RestorePlan {
    pub db: Option<Vec<u8>>,
    pub auth: Option<Vec<u8>>,
    pub skipped: Vec<String>,
}

/// Parse and validate an uploaded archive without touching disk
pub(super) fn read_archive(zip_bytes: &[u8]) -> Result<RestorePlan, AppError> {
    read_archive_capped(zip_bytes, MAX_DB_ENTRY_BYTES)
}

fn read_archive_capped(zip_bytes: &[u8], db_limit: u64) -> Result<RestorePlan, AppError> {
    let mut archive = ZipArchive::new(Cursor::new(zip_bytes))
        .map_err(|e| invalid_archive(format!("Invalid ZIP: {e}")))?;

    let mut plan = RestorePlan::default();
    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| invalid_archive(format!("Invalid ZIP entry: {e}")))?;
        if file.is_dir() {
            continue;
        }
        let name = file.name().to_string();
        if name != DB_ENTRY && name != AUTH_ENTRY {
            plan.skipped.push(name);
            continue;
        }

        let limit = if name == DB_ENTRY { db_limit } else { MAX_AUTH_ENTRY_BYTES };
        let declared = file.size();
        let data = read_entry(&mut file, declared, &name, limit)?;

        if name == DB_ENTRY {
            if !data.starts_with(SQLITE_HEADER) {
                return Err(invalid_archive("aurum.db is not a SQLite database"));
            }
            plan.db = Some(data);
        } else {
            parse_credential_bytes(&data)
                .map_err(|e| invalid_archive(format!("auth.json is invalid: {e}")))?;
            plan.auth = Some(data);
        }
    }

    if plan.db.is_none() && plan.auth.is_none() {
        return Err(invalid_archive("ZIP contains neither aurum.db nor auth.json"));
    }
    Ok(plan)
}

/// Decompress one entry, refusing anything above `limit` bytes
///
/// The declared size is checked first; the read itself is capped as well
/// since the header value is not trusted.
fn read_entry(
    reader: impl Read,
    declared: u64,
    name: &str,
    limit: u64,
) -> Result<Vec<u8>, AppError> {
    let too_large = || invalid_archive(format!("{name} exceeds {limit} bytes"));
    if declared > limit {
        return Err(too_large());
    }

    let mut data = Vec::new();
    reader
        .take(limit + 1)
        .read_to_end(&mut data)
        .map_err(|e| invalid_archive(format!("Cannot read {name}: {e}")))?;
    if data.len() as u64 > limit {
        return Err(too_large());
    }
    Ok(data)
}

/// Apply a validated plan
///
/// The database is staged before credentials are swapped; a failed swap
/// removes the staged file again so nothing is half applied.
async fn apply_restore(
    plan: RestorePlan,
    credentials: &CredentialStore,
    db_path: &Path,
) -> Result<RestoreReport, AppError> {
    let mut report = RestoreReport {
        skipped: plan.skipped,
        ..Default::default()
    };

    if let Some(db) = &plan.db {
        stage_database(db_path, db).await.map_err(restore_failed)?;
    }

    if let Some(auth) = &plan.auth
        && let Err(e) = credentials.replace_from_bytes(auth).await
    {
        if plan.db.is_some() {
            let staged = staged_restore_path(db_path);
            if let Err(rm) = tokio::fs::remove_file(&staged).await {
                tracing::error!(path = %staged.display(), error = %rm, "Failed to discard staged database");
            }
        }
        return Err(restore_failed(e));
    }

    if plan.auth.is_some() {
        report.restored.push(AUTH_ENTRY.to_string());
    }
    if plan.db.is_some() {
        report.restored.push(DB_ENTRY.to_string());
        report.restart_required = true;
    }
    Ok(report)
}

/// Write `{db}.restore`; it replaces the database at the next startup
async fn stage_database(db_path: &Path, data: &[u8]) -> std::io::Result<()> {
    let staged = staged_restore_path(db_path);
    let tmp = with_suffix(&staged, ".tmp");
    tokio::fs::write(&tmp, data).await?;
    tokio::fs::rename(&tmp, &staged).await?;
    tracing::warn!(path = %staged.display(), "Database restore staged, restart to apply");
    Ok(())
}
