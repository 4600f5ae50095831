//! TTL-scoped cache over the SQLite store: place records, favorites,
//! operating info, and the bounded recent-keyword list.

use crate::domain::error::NadriError;
use crate::domain::model::{EventMeta, OperatingInfo, Place, PlaceFilter, RecentKeyword};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row, ToSql};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_rusqlite::Connection;

/// General place listings.
pub const LISTING_TTL: Duration = Duration::from_secs(3 * 3600);
/// Single-place detail and operating-info lookups.
pub const DETAIL_TTL: Duration = Duration::from_secs(7 * 24 * 3600);
/// Location-based listings go stale quickly as the user moves.
pub const LOCATION_TTL: Duration = Duration::from_secs(3600);
/// Non-favorite rows older than this are swept.
pub const EXPIRED_MAX_AGE: Duration = Duration::from_secs(7 * 24 * 3600);
/// At most this many recent search keywords are retained.
pub const RECENT_KEYWORD_CAP: usize = 10;

const PLACE_COLUMNS: &str = "content_id, title, addr, image_url, map_x, map_y, tel, overview, \
     content_type_id, area_code, sigungu_code, cat1, cat2, cat3, distance, modified_time, \
     event_start_date, event_end_date, is_favorite, is_custom, custom_place_id, cached_at";

/// Shared handle to the cache. Cloning is cheap; all clones feed the
/// same favorites watch channel.
#[derive(Clone)]
pub struct PlaceCache {
    db: Arc<Connection>,
    favorites_tx: Arc<watch::Sender<Vec<Place>>>,
}

impl PlaceCache {
    pub fn new(db: Arc<Connection>) -> Self {
        let (favorites_tx, _) = watch::channel(Vec::new());
        Self {
            db,
            favorites_tx: Arc::new(favorites_tx),
        }
    }

    /// All cached places matching `filter` whose `cached_at` is within
    /// `ttl` of now, most recently written first. A `None` filter field
    /// is no constraint.
    pub async fn get_places(
        &self,
        filter: &PlaceFilter,
        ttl: Duration,
    ) -> Result<Vec<Place>, NadriError> {
        let cutoff = cutoff_for(ttl);
        let filter = filter.clone();
        let places = self
            .db
            .call(move |conn| {
                let mut sql = format!("SELECT {PLACE_COLUMNS} FROM places WHERE cached_at >= ?");
                let mut params: Vec<Box<dyn ToSql + Send>> = vec![Box::new(cutoff)];
                if let Some(area) = filter.area_code {
                    sql.push_str(" AND area_code = ?");
                    params.push(Box::new(area));
                }
                if let Some(sigungu) = filter.sigungu_code {
                    sql.push_str(" AND sigungu_code = ?");
                    params.push(Box::new(sigungu));
                }
                if let Some(type_id) = filter.content_type_id {
                    sql.push_str(" AND content_type_id = ?");
                    params.push(Box::new(type_id as i64));
                }
                sql.push_str(" ORDER BY cached_at DESC");

                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(rusqlite::params_from_iter(params), row_to_place)?;
                rows.collect::<Result<Vec<_>, _>>()
            })
            .await?;

        Ok(places)
    }

    /// Single-record lookup, subject to the same TTL rule.
    pub async fn get_place(
        &self,
        content_id: &str,
        ttl: Duration,
    ) -> Result<Option<Place>, NadriError> {
        let cutoff = cutoff_for(ttl);
        let content_id = content_id.to_string();
        let place = self
            .db
            .call(move |conn| {
                conn.query_row(
                    &format!(
                        "SELECT {PLACE_COLUMNS} FROM places
                         WHERE content_id = ? AND cached_at >= ?"
                    ),
                    params![content_id, cutoff],
                    row_to_place,
                )
                .optional()
            })
            .await?;

        Ok(place)
    }

    /// Upserts by `content_id` inside one transaction. On conflict every
    /// field is overwritten except `is_favorite`, and `cached_at` is
    /// refreshed. Entries with an empty `content_id` are sentinels and
    /// are never persisted.
    pub async fn save_places(&self, places: &[Place]) -> Result<(), NadriError> {
        let now = Utc::now().timestamp();
        let rows: Vec<Place> = places
            .iter()
            .filter(|p| !p.content_id.is_empty())
            .cloned()
            .collect();
        if rows.is_empty() {
            return Ok(());
        }

        self.db
            .call(move |conn| {
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare(
                        "INSERT INTO places (
                            content_id, title, addr, image_url, map_x, map_y, tel, overview,
                            content_type_id, area_code, sigungu_code, cat1, cat2, cat3,
                            distance, modified_time, event_start_date, event_end_date,
                            is_favorite, is_custom, custom_place_id, cached_at
                         ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                         ON CONFLICT(content_id) DO UPDATE SET
                            title = excluded.title,
                            addr = excluded.addr,
                            image_url = excluded.image_url,
                            map_x = excluded.map_x,
                            map_y = excluded.map_y,
                            tel = excluded.tel,
                            overview = excluded.overview,
                            content_type_id = excluded.content_type_id,
                            area_code = excluded.area_code,
                            sigungu_code = excluded.sigungu_code,
                            cat1 = excluded.cat1,
                            cat2 = excluded.cat2,
                            cat3 = excluded.cat3,
                            distance = excluded.distance,
                            modified_time = excluded.modified_time,
                            event_start_date = excluded.event_start_date,
                            event_end_date = excluded.event_end_date,
                            is_custom = excluded.is_custom,
                            custom_place_id = excluded.custom_place_id,
                            cached_at = excluded.cached_at",
                    )?;
                    for p in &rows {
                        stmt.execute(params![
                            p.content_id,
                            p.title,
                            p.addr,
                            p.image_url,
                            p.map_x,
                            p.map_y,
                            p.tel,
                            p.overview,
                            p.content_type_id.map(|v| v as i64),
                            p.area_code,
                            p.sigungu_code,
                            p.cat1,
                            p.cat2,
                            p.cat3,
                            p.distance,
                            p.modified_time,
                            p.event.as_ref().map(|e| e.start_date.clone()),
                            p.event.as_ref().map(|e| e.end_date.clone()),
                            p.is_favorite,
                            p.is_custom,
                            p.custom_place_id,
                            now,
                        ])?;
                    }
                }
                tx.commit()?;
                Ok(())
            })
            .await?;

        self.refresh_favorites().await?;
        Ok(())
    }

    /// All favorites, most recently touched first.
    pub async fn get_favorites(&self) -> Result<Vec<Place>, NadriError> {
        let places = self
            .db
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {PLACE_COLUMNS} FROM places
                     WHERE is_favorite = 1 ORDER BY cached_at DESC"
                ))?;
                let rows = stmt.query_map([], row_to_place)?;
                rows.collect::<Result<Vec<_>, _>>()
            })
            .await?;

        Ok(places)
    }

    /// Continuous observation of the favorite set. The receiver starts
    /// out holding the persisted snapshot and wakes on every mutation.
    pub async fn watch_favorites(&self) -> Result<watch::Receiver<Vec<Place>>, NadriError> {
        self.refresh_favorites().await?;
        Ok(self.favorites_tx.subscribe())
    }

    /// Flips the favorite flag, creating a minimal placeholder row when
    /// the id was never cached (e.g. a search result the user starred).
    /// Returns the new flag value.
    pub async fn toggle_favorite(&self, content_id: &str) -> Result<bool, NadriError> {
        let now = Utc::now().timestamp();
        let content_id = content_id.to_string();
        let favored = self
            .db
            .call(move |conn| {
                let existing: Option<bool> = conn
                    .query_row(
                        "SELECT is_favorite FROM places WHERE content_id = ?",
                        params![content_id],
                        |row| row.get(0),
                    )
                    .optional()?;

                match existing {
                    Some(fav) => {
                        conn.execute(
                            "UPDATE places SET is_favorite = ?, cached_at = ?
                             WHERE content_id = ?",
                            params![!fav, now, content_id],
                        )?;
                        Ok(!fav)
                    }
                    None => {
                        conn.execute(
                            "INSERT INTO places (content_id, title, is_favorite, is_custom, cached_at)
                             VALUES (?, '', 1, 0, ?)",
                            params![content_id, now],
                        )?;
                        Ok(true)
                    }
                }
            })
            .await?;

        self.refresh_favorites().await?;
        Ok(favored)
    }

    /// Existence-and-freshness probe without materializing the record.
    pub async fn is_cache_valid(
        &self,
        content_id: &str,
        ttl: Duration,
    ) -> Result<bool, NadriError> {
        let cutoff = cutoff_for(ttl);
        let content_id = content_id.to_string();
        let valid = self
            .db
            .call(move |conn| {
                conn.query_row(
                    "SELECT EXISTS(
                        SELECT 1 FROM places WHERE content_id = ? AND cached_at >= ?
                     )",
                    params![content_id, cutoff],
                    |row| row.get(0),
                )
            })
            .await?;

        Ok(valid)
    }

    /// Deletes non-favorite rows older than seven days, favorites are
    /// never touched regardless of age. Returns the number of place
    /// rows removed.
    pub async fn clear_expired(&self) -> Result<usize, NadriError> {
        let cutoff = cutoff_for(EXPIRED_MAX_AGE);
        let removed = self
            .db
            .call(move |conn| {
                let removed = conn.execute(
                    "DELETE FROM places WHERE is_favorite = 0 AND cached_at < ?",
                    params![cutoff],
                )?;
                conn.execute(
                    "DELETE FROM operating_info WHERE cached_at < ?",
                    params![cutoff],
                )?;
                Ok(removed)
            })
            .await?;

        if removed > 0 {
            tracing::debug!(removed, "swept expired cache rows");
        }
        Ok(removed)
    }

    /// Deletes all non-favorite rows unconditionally.
    pub async fn clear_all(&self) -> Result<usize, NadriError> {
        let removed = self
            .db
            .call(move |conn| {
                let removed = conn.execute("DELETE FROM places WHERE is_favorite = 0", [])?;
                conn.execute("DELETE FROM operating_info", [])?;
                Ok(removed)
            })
            .await?;

        Ok(removed)
    }

    pub async fn get_operating_info(
        &self,
        content_id: &str,
        ttl: Duration,
    ) -> Result<Option<OperatingInfo>, NadriError> {
        let cutoff = cutoff_for(ttl);
        let content_id = content_id.to_string();
        let info = self
            .db
            .call(move |conn| {
                conn.query_row(
                    "SELECT payload FROM operating_info
                     WHERE content_id = ? AND cached_at >= ?",
                    params![content_id, cutoff],
                    |row| {
                        let payload: String = row.get(0)?;
                        serde_json::from_str::<OperatingInfo>(&payload).map_err(|e| {
                            rusqlite::Error::FromSqlConversionFailure(
                                0,
                                rusqlite::types::Type::Text,
                                Box::new(e),
                            )
                        })
                    },
                )
                .optional()
            })
            .await?;

        Ok(info)
    }

    pub async fn save_operating_info(
        &self,
        content_id: &str,
        info: &OperatingInfo,
    ) -> Result<(), NadriError> {
        let payload = serde_json::to_string(info)?;
        let now = Utc::now().timestamp();
        let content_id = content_id.to_string();
        self.db
            .call(move |conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO operating_info (content_id, payload, cached_at)
                     VALUES (?, ?, ?)",
                    params![content_id, payload, now],
                )
            })
            .await?;

        Ok(())
    }

    /// Adds a keyword or refreshes its timestamp, then trims the table
    /// back to the cap, evicting the oldest entries first.
    pub async fn add_recent_keyword(&self, keyword: &str) -> Result<(), NadriError> {
        let now = Utc::now().timestamp_millis();
        let keyword = keyword.trim().to_string();
        if keyword.is_empty() {
            return Ok(());
        }

        self.db
            .call(move |conn| {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT INTO recent_keywords (keyword, searched_at) VALUES (?, ?)
                     ON CONFLICT(keyword) DO UPDATE SET searched_at = excluded.searched_at",
                    params![keyword, now],
                )?;
                tx.execute(
                    "DELETE FROM recent_keywords WHERE keyword NOT IN (
                        SELECT keyword FROM recent_keywords
                        ORDER BY searched_at DESC, rowid DESC
                        LIMIT ?
                     )",
                    params![RECENT_KEYWORD_CAP as i64],
                )?;
                tx.commit()?;
                Ok(())
            })
            .await?;

        Ok(())
    }

    /// Newest-first, capped at `limit`.
    pub async fn recent_keywords(&self, limit: usize) -> Result<Vec<RecentKeyword>, NadriError> {
        let keywords = self
            .db
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT keyword, searched_at FROM recent_keywords
                     ORDER BY searched_at DESC, rowid DESC LIMIT ?",
                )?;
                let rows = stmt.query_map(params![limit as i64], |row| {
                    Ok(RecentKeyword {
                        keyword: row.get(0)?,
                        searched_at: row.get(1)?,
                    })
                })?;
                rows.collect::<Result<Vec<_>, _>>()
            })
            .await?;

        Ok(keywords)
    }

    pub async fn remove_recent_keyword(&self, keyword: &str) -> Result<(), NadriError> {
        let keyword = keyword.to_string();
        self.db
            .call(move |conn| {
                conn.execute(
                    "DELETE FROM recent_keywords WHERE keyword = ?",
                    params![keyword],
                )
            })
            .await?;

        Ok(())
    }

    pub async fn clear_recent_keywords(&self) -> Result<(), NadriError> {
        self.db
            .call(|conn| conn.execute("DELETE FROM recent_keywords", []))
            .await?;

        Ok(())
    }

    /// Re-reads the favorite set and publishes it to watchers.
    async fn refresh_favorites(&self) -> Result<(), NadriError> {
        let favorites = self.get_favorites().await?;
        self.favorites_tx.send_replace(favorites);
        Ok(())
    }
}

fn cutoff_for(ttl: Duration) -> i64 {
    Utc::now().timestamp() - ttl.as_secs() as i64
}

fn row_to_place(row: &Row<'_>) -> Result<Place, rusqlite::Error> {
    let event_start: Option<String> = row.get(16)?;
    let event_end: Option<String> = row.get(17)?;
    let event = match (event_start, event_end) {
        (Some(start_date), Some(end_date)) => Some(EventMeta {
            start_date,
            end_date,
        }),
        _ => None,
    };

    Ok(Place {
        content_id: row.get(0)?,
        title: row.get(1)?,
        addr: row.get(2)?,
        image_url: row.get(3)?,
        map_x: row.get(4)?,
        map_y: row.get(5)?,
        tel: row.get(6)?,
        overview: row.get(7)?,
        content_type_id: row.get::<_, Option<i64>>(8)?.map(|v| v as u32),
        area_code: row.get(9)?,
        sigungu_code: row.get(10)?,
        cat1: row.get(11)?,
        cat2: row.get(12)?,
        cat3: row.get(13)?,
        distance: row.get(14)?,
        modified_time: row.get(15)?,
        event,
        is_favorite: row.get(18)?,
        is_custom: row.get(19)?,
        custom_place_id: row.get(20)?,
        cached_at: row.get(21)?,
    })
}
