use crate::domain::error::NadriError;
use crate::domain::model::{
    AreaQuery, FestivalQuery, LocationQuery, OperatingInfo, Place, PlaceImage, SearchQuery,
};
use async_trait::async_trait;

/// A source of tourism data, one call per domain query.
///
/// Implemented by the live API client, the bundled fallback dataset,
/// and test doubles. The repository is generic over this trait so the
/// orchestration can be exercised without a network.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    async fn fetch_festivals(&self, query: &FestivalQuery) -> Result<Vec<Place>, NadriError>;

    async fn fetch_area_places(&self, query: &AreaQuery) -> Result<Vec<Place>, NadriError>;

    async fn fetch_location_places(&self, query: &LocationQuery)
        -> Result<Vec<Place>, NadriError>;

    /// `Ok(None)` means the id does not exist upstream.
    async fn fetch_detail(&self, content_id: &str) -> Result<Option<Place>, NadriError>;

    async fn fetch_operating_info(
        &self,
        content_id: &str,
        content_type_id: u32,
    ) -> Result<Option<OperatingInfo>, NadriError>;

    async fn fetch_images(&self, content_id: &str) -> Result<Vec<PlaceImage>, NadriError>;

    async fn search_places(&self, query: &SearchQuery) -> Result<Vec<Place>, NadriError>;
}
