use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

/// The application's database as seen by the export endpoint.
#[derive(Clone)]
pub struct Database {
    engine: String,
    sqlite: Option<SqliteDatabase>,
}

#[derive(Clone)]
struct SqliteDatabase {
    path: PathBuf,
    pool: SqlitePool,
}

impl Database {
    pub fn engine(&self) -> &str {
        &self.engine
    }

    pub fn sqlite_path(&self) -> Option<&Path> {
        self.sqlite.as_ref().map(|db| db.path.as_path())
    }

    /// Folds the write-ahead log back into the main file so a copy of the
    /// file alone holds every committed transaction.
    pub async fn checkpoint(&self) -> Result<(), sqlx::Error> {
        if let Some(db) = &self.sqlite {
            sqlx::query("PRAGMA wal_checkpoint(TRUNCATE)")
                .execute(&db.pool)
                .await?;
            debug!(path = %db.path.display(), "wal checkpoint complete");
        }
        Ok(())
    }
}

pub async fn setup_database(database_url: &str) -> Result<Database, sqlx::Error> {
    let engine = engine_name(database_url);
    if engine != "sqlite" {
        info!(%engine, "non-sqlite database configured, export disabled");
        return Ok(Database {
            engine,
            sqlite: None,
        });
    }

    let path = sqlite_file_path(database_url);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(
            SqliteConnectOptions::from_str(database_url)?
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(Duration::from_secs(30)),
        )
        .await?;

    info!(path = %path.display(), "connected to sqlite database");
    Ok(Database {
        engine,
        sqlite: Some(SqliteDatabase { path, pool }),
    })
}

/// `postgres://...` -> `postgres`. A URL without a scheme is treated as a
/// bare SQLite path.
pub fn engine_name(database_url: &str) -> String {
    match database_url.split_once(':') {
        Some((scheme, _)) if !scheme.is_empty() && !scheme.contains(['/', '\\', '.']) => {
            match scheme.to_ascii_lowercase().as_str() {
                "postgresql" => "postgres".to_string(),
                other => other.to_string(),
            }
        }
        _ => "sqlite".to_string(),
    }
}

/// `sqlite://data/webui.db?mode=rwc` -> `data/webui.db`
pub fn sqlite_file_path(database_url: &str) -> PathBuf {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url);
    let rest = rest.split_once('?').map(|(path, _)| path).unwrap_or(rest);
    PathBuf::from(rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_name() {
        assert_eq!(engine_name("sqlite:data/webui.db"), "sqlite");
        assert_eq!(engine_name("sqlite:///abs/webui.db"), "sqlite");
        assert_eq!(engine_name("postgresql://user@localhost/webui"), "postgres");
        assert_eq!(engine_name("mysql://localhost/webui"), "mysql");
        assert_eq!(engine_name("data/webui.db"), "sqlite");
    }

    #[test]
    fn test_sqlite_file_path() {
        assert_eq!(sqlite_file_path("sqlite:data/webui.db"), PathBuf::from("data/webui.db"));
        assert_eq!(sqlite_file_path("sqlite://data/webui.db?mode=rwc"), PathBuf::from("data/webui.db"));
        assert_eq!(sqlite_file_path("sqlite:///var/lib/webui.db"), PathBuf::from("/var/lib/webui.db"));
    }

    #[tokio::test]
    async fn test_setup_sqlite_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("webui.db");
        let url = format!("sqlite:{}", path.display());

        let db = setup_database(&url).await.unwrap();
        assert_eq!(db.engine(), "sqlite");
        assert_eq!(db.sqlite_path(), Some(path.as_path()));
        db.checkpoint().await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_setup_postgres_skips_pool() {
        let db = setup_database("postgres://localhost/webui").await.unwrap();
        assert!(db.sqlite_path().is_none());
        assert_eq!(db.engine(), "postgres");
        db.checkpoint().await.unwrap();
    }
}
