//! Repository orchestration: cache, remote, classifier, fallback, and
//! operating mode, stitched together per domain query.
//!
//! Every read follows the same shape: bypass everything when sample
//! data is active, try the cache within the query's TTL, go remote,
//! and on failure let the classifier decide between degrading to the
//! bundled dataset, going offline, or resolving to an empty result.

use crate::domain::error::NadriError;
use crate::domain::failure::{classify, FailurePolicy};
use crate::domain::mode::{ModeState, OperatingMode};
use crate::domain::model::{
    AreaQuery, ContentType, DataOrigin, FestivalQuery, LocationQuery, OperatingInfo, Place,
    PlaceFilter, PlaceImage, RecentKeyword, SearchQuery, Sourced,
};
use crate::domain::traits::RemoteSource;
use crate::infrastructure::fallback::MockDataSource;
use crate::infrastructure::storage::cache::{
    PlaceCache, DETAIL_TTL, EXPIRED_MAX_AGE, LISTING_TTL, LOCATION_TTL,
};
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::watch;
use uuid::Uuid;

/// When more than one cat3 code is requested, the upstream is asked for
/// an unfiltered superset with this many times the requested rows to
/// compensate for the client-side filtering loss.
const CAT3_SUPERSET_FACTOR: u32 = 3;

pub struct PlaceRepository<R: RemoteSource> {
    cache: PlaceCache,
    remote: R,
    fallback: MockDataSource,
    mode: ModeState,
}

impl<R: RemoteSource> PlaceRepository<R> {
    pub fn new(cache: PlaceCache, remote: R, fallback: MockDataSource, mode: ModeState) -> Self {
        Self {
            cache,
            remote,
            fallback,
            mode,
        }
    }

    pub fn current_mode(&self) -> OperatingMode {
        self.mode.current_mode()
    }

    /// Festival listing. Cache coverage counts as sufficient only when
    /// it holds at least as many rows as requested — partial coverage is
    /// indistinguishable from "no more exist".
    pub async fn get_festivals(
        &self,
        query: &FestivalQuery,
    ) -> Result<Sourced<Vec<Place>>, NadriError> {
        if self.in_mock_mode() {
            let places = self.fallback.fetch_festivals(query).await?;
            return Ok(Sourced::new(places, DataOrigin::Fallback));
        }

        let filter = PlaceFilter {
            area_code: query.area_code.clone(),
            sigungu_code: query.sigungu_code.clone(),
            content_type_id: Some(ContentType::Festival.id()),
        };

        if self.mode.current_mode() == OperatingMode::Offline {
            let places = self.offline_places(&filter).await?;
            return Ok(Sourced::new(
                truncate(places, query.num_of_rows),
                DataOrigin::LocalCache,
            ));
        }

        if let Some(cached) = self
            .cache_listing(&filter, LISTING_TTL, query.num_of_rows as usize)
            .await
        {
            return Ok(Sourced::new(
                truncate(cached, query.num_of_rows),
                DataOrigin::LocalCache,
            ));
        }

        match self.remote.fetch_festivals(query).await {
            Ok(places) => {
                self.spawn_write_back(places.clone());
                Ok(Sourced::new(places, DataOrigin::Remote))
            }
            Err(err) => match self.resolve_failure(&err) {
                FailurePolicy::Degrade { .. } => {
                    let places = self.fallback.fetch_festivals(query).await?;
                    Ok(Sourced::new(places, DataOrigin::Fallback))
                }
                FailurePolicy::GoOffline => {
                    let places = self.offline_places(&filter).await?;
                    Ok(Sourced::new(
                        truncate(places, query.num_of_rows),
                        DataOrigin::LocalCache,
                    ))
                }
                FailurePolicy::Empty => Ok(Sourced::new(Vec::new(), DataOrigin::Remote)),
            },
        }
    }

    /// Area-based browse. Paginated, so never cache-served: page
    /// semantics are not representable by a flat TTL cache.
    pub async fn get_area_places(
        &self,
        query: &AreaQuery,
    ) -> Result<Sourced<Vec<Place>>, NadriError> {
        if self.in_mock_mode() {
            let places = self.fallback.fetch_area_places(query).await?;
            return Ok(Sourced::new(
                truncate(filter_cat3(places, &query.cat3), query.num_of_rows),
                DataOrigin::Fallback,
            ));
        }

        if self.mode.current_mode() == OperatingMode::Offline {
            return self.offline_area(query).await;
        }

        // Upstream accepts a single cat3 code per request; for multiple
        // codes, ask for an unfiltered superset and filter here.
        let remote_query = if query.cat3.len() > 1 {
            let mut q = query.clone();
            q.cat3 = Vec::new();
            q.num_of_rows = query.num_of_rows.saturating_mul(CAT3_SUPERSET_FACTOR);
            q
        } else {
            query.clone()
        };

        match self.remote.fetch_area_places(&remote_query).await {
            Ok(places) => {
                let places = truncate(filter_cat3(places, &query.cat3), query.num_of_rows);
                self.spawn_write_back(places.clone());
                Ok(Sourced::new(places, DataOrigin::Remote))
            }
            Err(err) => match self.resolve_failure(&err) {
                FailurePolicy::Degrade { .. } => {
                    let places = self.fallback.fetch_area_places(query).await?;
                    Ok(Sourced::new(
                        truncate(filter_cat3(places, &query.cat3), query.num_of_rows),
                        DataOrigin::Fallback,
                    ))
                }
                FailurePolicy::GoOffline => self.offline_area(query).await,
                FailurePolicy::Empty => Ok(Sourced::new(Vec::new(), DataOrigin::Remote)),
            },
        }
    }

    /// Location-based listing, short TTL. Any in-radius cached result
    /// counts as a hit.
    pub async fn get_nearby_places(
        &self,
        query: &LocationQuery,
    ) -> Result<Sourced<Vec<Place>>, NadriError> {
        if self.in_mock_mode() {
            let places = self.fallback.fetch_location_places(query).await?;
            return Ok(Sourced::new(places, DataOrigin::Fallback));
        }

        if self.mode.current_mode() == OperatingMode::Offline {
            let places = self.cached_nearby(query, EXPIRED_MAX_AGE).await;
            if places.is_empty() {
                return Err(offline_error());
            }
            return Ok(Sourced::new(places, DataOrigin::LocalCache));
        }

        let cached = self.cached_nearby(query, LOCATION_TTL).await;
        if !cached.is_empty() {
            return Ok(Sourced::new(cached, DataOrigin::LocalCache));
        }

        match self.remote.fetch_location_places(query).await {
            Ok(places) => {
                self.spawn_write_back(places.clone());
                Ok(Sourced::new(places, DataOrigin::Remote))
            }
            Err(err) => match self.resolve_failure(&err) {
                FailurePolicy::Degrade { .. } => {
                    let places = self.fallback.fetch_location_places(query).await?;
                    Ok(Sourced::new(places, DataOrigin::Fallback))
                }
                FailurePolicy::GoOffline => {
                    let places = self.cached_nearby(query, EXPIRED_MAX_AGE).await;
                    if places.is_empty() {
                        return Err(offline_error());
                    }
                    Ok(Sourced::new(places, DataOrigin::LocalCache))
                }
                FailurePolicy::Empty => Ok(Sourced::new(Vec::new(), DataOrigin::Remote)),
            },
        }
    }

    /// Single-place detail, long TTL. Follows the full chain including
    /// a write-back of fallback data: a detail page benefits from
    /// caching even illustrative content temporarily.
    pub async fn get_place_detail(
        &self,
        content_id: &str,
    ) -> Result<Sourced<Option<Place>>, NadriError> {
        if self.in_mock_mode() {
            let place = self.fallback.fetch_detail(content_id).await?;
            return Ok(Sourced::new(place, DataOrigin::Fallback));
        }

        if self.mode.current_mode() == OperatingMode::Offline {
            return match self.cache.get_place(content_id, EXPIRED_MAX_AGE).await {
                Ok(Some(place)) => Ok(Sourced::new(Some(place), DataOrigin::LocalCache)),
                _ => Err(offline_error()),
            };
        }

        match self.cache.get_place(content_id, DETAIL_TTL).await {
            Ok(Some(place)) => return Ok(Sourced::new(Some(place), DataOrigin::LocalCache)),
            Ok(None) => {}
            Err(e) => tracing::warn!("cache read failed, treating as miss: {e}"),
        }

        match self.remote.fetch_detail(content_id).await {
            Ok(Some(place)) => {
                self.spawn_write_back(vec![place.clone()]);
                Ok(Sourced::new(Some(place), DataOrigin::Remote))
            }
            Ok(None) => Ok(Sourced::new(None, DataOrigin::Remote)),
            Err(err) => match self.resolve_failure(&err) {
                FailurePolicy::Degrade { .. } => {
                    let place = self.fallback.fetch_detail(content_id).await?;
                    if let Some(place) = &place {
                        self.spawn_write_back(vec![place.clone()]);
                    }
                    Ok(Sourced::new(place, DataOrigin::Fallback))
                }
                FailurePolicy::GoOffline => {
                    match self.cache.get_place(content_id, EXPIRED_MAX_AGE).await {
                        Ok(Some(place)) => Ok(Sourced::new(Some(place), DataOrigin::LocalCache)),
                        _ => Err(offline_error()),
                    }
                }
                FailurePolicy::Empty => Ok(Sourced::new(None, DataOrigin::Remote)),
            },
        }
    }

    /// Operating details for one place, long TTL, same chain as detail.
    pub async fn get_operating_info(
        &self,
        content_id: &str,
        content_type_id: u32,
    ) -> Result<Sourced<Option<OperatingInfo>>, NadriError> {
        if self.in_mock_mode() {
            let info = self
                .fallback
                .fetch_operating_info(content_id, content_type_id)
                .await?;
            return Ok(Sourced::new(info, DataOrigin::Fallback));
        }

        if self.mode.current_mode() == OperatingMode::Offline {
            return match self.cache.get_operating_info(content_id, EXPIRED_MAX_AGE).await {
                Ok(Some(info)) => Ok(Sourced::new(Some(info), DataOrigin::LocalCache)),
                _ => Err(offline_error()),
            };
        }

        match self.cache.get_operating_info(content_id, DETAIL_TTL).await {
            Ok(Some(info)) => return Ok(Sourced::new(Some(info), DataOrigin::LocalCache)),
            Ok(None) => {}
            Err(e) => tracing::warn!("cache read failed, treating as miss: {e}"),
        }

        match self
            .remote
            .fetch_operating_info(content_id, content_type_id)
            .await
        {
            Ok(Some(info)) => {
                self.spawn_info_write_back(content_id.to_string(), info.clone());
                Ok(Sourced::new(Some(info), DataOrigin::Remote))
            }
            Ok(None) => Ok(Sourced::new(None, DataOrigin::Remote)),
            Err(err) => match self.resolve_failure(&err) {
                FailurePolicy::Degrade { .. } => {
                    let info = self
                        .fallback
                        .fetch_operating_info(content_id, content_type_id)
                        .await?;
                    if let Some(info) = &info {
                        self.spawn_info_write_back(content_id.to_string(), info.clone());
                    }
                    Ok(Sourced::new(info, DataOrigin::Fallback))
                }
                FailurePolicy::GoOffline => {
                    match self.cache.get_operating_info(content_id, EXPIRED_MAX_AGE).await {
                        Ok(Some(info)) => Ok(Sourced::new(Some(info), DataOrigin::LocalCache)),
                        _ => Err(offline_error()),
                    }
                }
                FailurePolicy::Empty => Ok(Sourced::new(None, DataOrigin::Remote)),
            },
        }
    }

    /// Images are not cached; read-through only.
    pub async fn get_images(
        &self,
        content_id: &str,
    ) -> Result<Sourced<Vec<PlaceImage>>, NadriError> {
        if self.in_mock_mode() {
            let images = self.fallback.fetch_images(content_id).await?;
            return Ok(Sourced::new(images, DataOrigin::Fallback));
        }

        if self.mode.current_mode() == OperatingMode::Offline {
            return Err(offline_error());
        }

        match self.remote.fetch_images(content_id).await {
            Ok(images) => Ok(Sourced::new(images, DataOrigin::Remote)),
            Err(err) => match self.resolve_failure(&err) {
                FailurePolicy::Degrade { .. } => {
                    let images = self.fallback.fetch_images(content_id).await?;
                    Ok(Sourced::new(images, DataOrigin::Fallback))
                }
                FailurePolicy::GoOffline => Err(offline_error()),
                FailurePolicy::Empty => Ok(Sourced::new(Vec::new(), DataOrigin::Remote)),
            },
        }
    }

    /// Free-text search. Results are not written back: a keyword result
    /// set does not fit the flat filter cache, and favoriting one
    /// creates its placeholder row on demand instead.
    pub async fn search_places(
        &self,
        query: &SearchQuery,
    ) -> Result<Sourced<Vec<Place>>, NadriError> {
        if self.in_mock_mode() {
            let places = self.fallback.search_places(query).await?;
            return Ok(Sourced::new(places, DataOrigin::Fallback));
        }

        if self.mode.current_mode() == OperatingMode::Offline {
            return Err(offline_error());
        }

        match self.remote.search_places(query).await {
            Ok(places) => Ok(Sourced::new(places, DataOrigin::Remote)),
            Err(err) => match self.resolve_failure(&err) {
                FailurePolicy::Degrade { .. } => {
                    let places = self.fallback.search_places(query).await?;
                    Ok(Sourced::new(places, DataOrigin::Fallback))
                }
                FailurePolicy::GoOffline => Err(offline_error()),
                FailurePolicy::Empty => Ok(Sourced::new(Vec::new(), DataOrigin::Remote)),
            },
        }
    }

    // ----- cache-local reads -----

    pub async fn get_favorites(&self) -> Result<Vec<Place>, NadriError> {
        self.cache.get_favorites().await
    }

    pub async fn watch_favorites(&self) -> Result<watch::Receiver<Vec<Place>>, NadriError> {
        self.cache.watch_favorites().await
    }

    pub async fn recent_keywords(&self, limit: usize) -> Result<Vec<RecentKeyword>, NadriError> {
        self.cache.recent_keywords(limit).await
    }

    // ----- write operations, gated while sample data is active -----

    /// Returns the new favorite state.
    pub async fn toggle_favorite(&self, content_id: &str) -> Result<bool, NadriError> {
        self.ensure_writable()?;
        self.cache.toggle_favorite(content_id).await
    }

    pub async fn record_search_keyword(&self, keyword: &str) -> Result<(), NadriError> {
        self.ensure_writable()?;
        self.cache.add_recent_keyword(keyword).await
    }

    pub async fn remove_search_keyword(&self, keyword: &str) -> Result<(), NadriError> {
        self.ensure_writable()?;
        self.cache.remove_recent_keyword(keyword).await
    }

    pub async fn clear_search_keywords(&self) -> Result<(), NadriError> {
        self.ensure_writable()?;
        self.cache.clear_recent_keywords().await
    }

    /// Creates a user-defined place with a generated id. Saved
    /// synchronously: user writes must be durable, unlike write-backs.
    pub async fn add_custom_place(
        &self,
        title: &str,
        addr: Option<String>,
        map_x: Option<f64>,
        map_y: Option<f64>,
        content_type_id: Option<u32>,
    ) -> Result<Place, NadriError> {
        self.ensure_writable()?;
        let custom_id = Uuid::new_v4().to_string();
        let mut place = Place::new(format!("custom-{custom_id}"), title);
        place.addr = addr;
        place.map_x = map_x;
        place.map_y = map_y;
        place.content_type_id = content_type_id;
        place.is_custom = true;
        place.custom_place_id = Some(custom_id);
        self.cache.save_places(std::slice::from_ref(&place)).await?;
        Ok(place)
    }

    // ----- internals -----

    fn in_mock_mode(&self) -> bool {
        matches!(
            self.mode.current_mode(),
            OperatingMode::MockFallback { .. }
        )
    }

    fn ensure_writable(&self) -> Result<(), NadriError> {
        if self.mode.can_perform_write() {
            return Ok(());
        }
        let reason = match self.mode.current_mode() {
            OperatingMode::MockFallback { reason } => reason,
            _ => "sample data is active".to_string(),
        };
        Err(NadriError::WriteBlocked(format!(
            "changes are disabled while sample data is shown: {reason}"
        )))
    }

    /// Classifies the failure, performs any mode transition, and
    /// returns the policy for the caller to apply.
    fn resolve_failure(&self, err: &NadriError) -> FailurePolicy {
        let kind = classify(err);
        let policy = kind.policy();
        tracing::debug!(?kind, error = %err, "remote call failed");
        match &policy {
            FailurePolicy::Degrade { reason } => self.mode.enter_mock_mode(reason.clone()),
            FailurePolicy::GoOffline => self.mode.enter_offline_mode(),
            FailurePolicy::Empty => {}
        }
        policy
    }

    /// Cache read treated as a miss on error or insufficiency.
    async fn cache_listing(
        &self,
        filter: &PlaceFilter,
        ttl: Duration,
        wanted: usize,
    ) -> Option<Vec<Place>> {
        match self.cache.get_places(filter, ttl).await {
            Ok(cached) if cached.len() >= wanted => Some(cached),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("cache read failed, treating as miss: {e}");
                None
            }
        }
    }

    /// Offline reads relax the TTL to the sweep horizon: stale data
    /// beats no data when the network is gone. An empty cache is the
    /// one case surfaced to the user as an error.
    async fn offline_places(&self, filter: &PlaceFilter) -> Result<Vec<Place>, NadriError> {
        let cached = match self.cache.get_places(filter, EXPIRED_MAX_AGE).await {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!("cache read failed while offline: {e}");
                Vec::new()
            }
        };
        if cached.is_empty() {
            return Err(offline_error());
        }
        Ok(cached)
    }

    async fn offline_area(&self, query: &AreaQuery) -> Result<Sourced<Vec<Place>>, NadriError> {
        // Page semantics are meaningless against the flat cache; only a
        // first-page browse gets a best-effort answer.
        if query.page_no > 1 {
            return Err(offline_error());
        }
        let filter = PlaceFilter {
            area_code: query.area_code.clone(),
            sigungu_code: query.sigungu_code.clone(),
            content_type_id: query.content_type_id,
        };
        let places = self.offline_places(&filter).await?;
        Ok(Sourced::new(
            truncate(filter_cat3(places, &query.cat3), query.num_of_rows),
            DataOrigin::LocalCache,
        ))
    }

    async fn cached_nearby(&self, query: &LocationQuery, ttl: Duration) -> Vec<Place> {
        let filter = PlaceFilter {
            content_type_id: query.content_type_id,
            ..Default::default()
        };
        let places = match self.cache.get_places(&filter, ttl).await {
            Ok(places) => places,
            Err(e) => {
                tracing::warn!("cache read failed, treating as miss: {e}");
                return Vec::new();
            }
        };

        let mut hits: Vec<Place> = places
            .into_iter()
            .filter_map(|mut place| {
                let distance = place.distance_from(query.map_x, query.map_y)?;
                if distance > query.radius as f64 {
                    return None;
                }
                place.distance = Some(distance);
                Some(place)
            })
            .collect();
        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        truncate(hits, query.num_of_rows)
    }

    /// Detached best-effort write-back. Never awaited on the read path;
    /// a failure is logged and the caller's data is unaffected.
    fn spawn_write_back(&self, places: Vec<Place>) {
        if places.is_empty() {
            return;
        }
        let cache = self.cache.clone();
        tokio::spawn(async move {
            if let Err(e) = cache.save_places(&places).await {
                tracing::warn!("cache write-back failed: {e}");
            }
        });
    }

    fn spawn_info_write_back(&self, content_id: String, info: OperatingInfo) {
        let cache = self.cache.clone();
        tokio::spawn(async move {
            if let Err(e) = cache.save_operating_info(&content_id, &info).await {
                tracing::warn!("operating-info write-back failed: {e}");
            }
        });
    }
}

fn offline_error() -> NadriError {
    NadriError::NetworkRequired(
        "no network connection and nothing cached for this query".to_string(),
    )
}

fn truncate(mut places: Vec<Place>, num_of_rows: u32) -> Vec<Place> {
    places.truncate(num_of_rows as usize);
    places
}

/// Client-side membership filter, applied only when more than one cat3
/// code was requested (a single code is pushed down to the source).
fn filter_cat3(places: Vec<Place>, cat3: &[String]) -> Vec<Place> {
    if cat3.len() <= 1 {
        return places;
    }
    let wanted: HashSet<&str> = cat3.iter().map(String::as_str).collect();
    places
        .into_iter()
        .filter(|p| p.cat3.as_deref().is_some_and(|c| wanted.contains(c)))
        .collect()
}
