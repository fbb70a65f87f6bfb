use std::path::Path;

use migration::{MigrationTrait, MigratorTrait, SchemaManager};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, DbErr, Statement,
    TransactionTrait,
};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};

const CREATE_MIGRATIONS_TABLE: &str = "CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at INTEGER NOT NULL
)";

const PRAGMAS: [&str; 3] =
    ["PRAGMA journal_mode=WAL", "PRAGMA synchronous=NORMAL", "PRAGMA foreign_keys=ON"];

pub async fn connect_and_migrate(path: &Path) -> StoreResult<DatabaseConnection> {
    let unavailable = |reason: String| StoreError::Unavailable {
        path: path.display().to_string(),
        reason,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| unavailable(e.to_string()))?;
    }

    let url = format!("sqlite://{}?mode=rwc", path.display());
    let db = Database::connect(ConnectOptions::new(url))
        .await
        .map_err(|e| unavailable(e.to_string()))?;

    for pragma in PRAGMAS {
        db.execute_unprepared(pragma).await.map_err(|e| unavailable(e.to_string()))?;
    }

    migrate(&db).await?;
    info!(path = %path.display(), "database ready");
    Ok(db)
}

#[cfg(test)]
/// Fresh in-memory database with the schema applied. Single connection, so every query sees
/// the same database.
pub async fn connect_in_memory() -> StoreResult<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1);
    let db = Database::connect(options).await?;
    db.execute_unprepared("PRAGMA foreign_keys=ON").await?;
    migrate(&db).await?;
    Ok(db)
}

/// Applies every migration newer than the recorded schema version, in order. Each one runs in
/// its own transaction together with the insert of its version row, so a failed step leaves no
/// trace. Returns the versions applied by this call.
pub async fn migrate(db: &DatabaseConnection) -> StoreResult<Vec<i64>> {
    migrate_steps(db, migration::Migrator::migrations()).await
}

async fn migrate_steps(
    db: &DatabaseConnection,
    migrations: Vec<Box<dyn MigrationTrait>>,
) -> StoreResult<Vec<i64>> {
    db.execute_unprepared(CREATE_MIGRATIONS_TABLE).await.map_err(|source| {
        StoreError::Migration { version: 0, name: "schema_migrations".to_string(), source }
    })?;

    let current = current_version(db).await?;
    debug!(current_version = current, target_version = migrations.len(), "migration check");

    let mut applied = Vec::new();
    for (idx, step) in migrations.into_iter().enumerate() {
        let version = idx as i64 + 1;
        if version <= current {
            continue;
        }
        let name = step.name().to_string();
        apply(db, version, &name, step.as_ref())
            .await
            .map_err(|source| StoreError::Migration { version, name: name.clone(), source })?;
        info!(version, name = %name, "applied migration");
        applied.push(version);
    }

    Ok(applied)
}

pub async fn current_version(db: &DatabaseConnection) -> StoreResult<i64> {
    let row = db
        .query_one(Statement::from_string(
            DbBackend::Sqlite,
            "SELECT COALESCE(MAX(version), 0) AS version FROM schema_migrations",
        ))
        .await?;
    Ok(match row {
        Some(row) => row.try_get::<i64>("", "version")?,
        None => 0,
    })
}

async fn apply(
    db: &DatabaseConnection,
    version: i64,
    name: &str,
    step: &dyn MigrationTrait,
) -> Result<(), DbErr> {
    let txn = db.begin().await?;
    step.up(&SchemaManager::new(&txn)).await?;
    txn.execute(Statement::from_sql_and_values(
        DbBackend::Sqlite,
        "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?, ?, ?)",
        [version.into(), name.into(), jiff::Timestamp::now().as_second().into()],
    ))
    .await?;
    txn.commit().await
}
