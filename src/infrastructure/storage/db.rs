use crate::domain::error::NadriError;
use std::path::Path;
use tokio_rusqlite::Connection;

/// Opens (or creates) the on-disk database and applies the schema.
pub async fn init_database(db_path: &Path) -> Result<Connection, NadriError> {
    let db = Connection::open(db_path.to_path_buf())
        .await
        .map_err(tokio_rusqlite::Error::from)?;
    apply_schema(&db).await?;
    Ok(db)
}

/// In-memory database with the same schema. Used by tests.
pub async fn init_memory_database() -> Result<Connection, NadriError> {
    let db = Connection::open_in_memory()
        .await
        .map_err(tokio_rusqlite::Error::from)?;
    apply_schema(&db).await?;
    Ok(db)
}

async fn apply_schema(db: &Connection) -> Result<(), NadriError> {
    db.call(|conn| {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS places (
                content_id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                addr TEXT,
                image_url TEXT,
                map_x REAL,
                map_y REAL,
                tel TEXT,
                overview TEXT,
                content_type_id INTEGER,
                area_code TEXT,
                sigungu_code TEXT,
                cat1 TEXT,
                cat2 TEXT,
                cat3 TEXT,
                distance REAL,
                modified_time TEXT,
                event_start_date TEXT,
                event_end_date TEXT,
                is_favorite INTEGER NOT NULL DEFAULT 0,
                is_custom INTEGER NOT NULL DEFAULT 0,
                custom_place_id TEXT,
                cached_at INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_places_cached ON places(cached_at)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_places_filter
             ON places(area_code, sigungu_code, content_type_id)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_places_favorite ON places(is_favorite, cached_at)",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS operating_info (
                content_id TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                cached_at INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS recent_keywords (
                keyword TEXT PRIMARY KEY,
                searched_at INTEGER NOT NULL
            )",
            [],
        )?;

        Ok(())
    })
    .await?;

    Ok(())
}
