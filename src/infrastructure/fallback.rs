//! Static fallback datasets, served when the tourism service is judged
//! unhealthy. Shaped exactly like remote output and guaranteed never to
//! fail: a broken or missing entry degrades to an empty result.

use crate::domain::error::NadriError;
use crate::domain::model::{
    AreaQuery, ContentType, EventMeta, FestivalQuery, LocationQuery, OperatingInfo, Place,
    PlaceImage, SearchQuery,
};
use crate::domain::traits::RemoteSource;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;

static DATASETS: Lazy<HashMap<&'static str, Vec<Place>>> = Lazy::new(|| {
    let mut datasets = HashMap::new();
    datasets.insert("seoul", parse_dataset(include_str!("../../data/seoul.json")));
    datasets.insert("busan", parse_dataset(include_str!("../../data/busan.json")));
    datasets.insert("jeju", parse_dataset(include_str!("../../data/jeju.json")));
    datasets
});

#[derive(Deserialize)]
struct FallbackPlace {
    content_id: String,
    title: String,
    #[serde(default)]
    addr: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    map_x: Option<f64>,
    #[serde(default)]
    map_y: Option<f64>,
    #[serde(default)]
    tel: Option<String>,
    #[serde(default)]
    overview: Option<String>,
    #[serde(default)]
    content_type_id: Option<u32>,
    #[serde(default)]
    area_code: Option<String>,
    #[serde(default)]
    sigungu_code: Option<String>,
    #[serde(default)]
    cat1: Option<String>,
    #[serde(default)]
    cat2: Option<String>,
    #[serde(default)]
    cat3: Option<String>,
    #[serde(default)]
    event_start_date: Option<String>,
    #[serde(default)]
    event_end_date: Option<String>,
}

impl FallbackPlace {
    fn into_place(self) -> Place {
        let event = match (self.event_start_date, self.event_end_date) {
            (Some(start_date), Some(end_date)) => Some(EventMeta {
                start_date,
                end_date,
            }),
            _ => None,
        };
        let mut place = Place::new(self.content_id, self.title);
        place.addr = self.addr;
        place.image_url = self.image_url;
        place.map_x = self.map_x;
        place.map_y = self.map_y;
        place.tel = self.tel;
        place.overview = self.overview;
        place.content_type_id = self.content_type_id;
        place.area_code = self.area_code;
        place.sigungu_code = self.sigungu_code;
        place.cat1 = self.cat1;
        place.cat2 = self.cat2;
        place.cat3 = self.cat3;
        place.event = event;
        place
    }
}

fn parse_dataset(raw: &str) -> Vec<Place> {
    match serde_json::from_str::<Vec<FallbackPlace>>(raw) {
        Ok(entries) => entries.into_iter().map(FallbackPlace::into_place).collect(),
        Err(e) => {
            tracing::error!("bundled dataset failed to parse: {e}");
            Vec::new()
        }
    }
}

/// Selects a named dataset for an area code. Unknown areas fall back to
/// the Seoul dataset rather than failing.
fn dataset_for(area_code: Option<&str>) -> &'static [Place] {
    let name = match area_code {
        Some("6") => "busan",
        Some("39") => "jeju",
        _ => "seoul",
    };
    DATASETS.get(name).map(Vec::as_slice).unwrap_or(&[])
}

fn all_places() -> impl Iterator<Item = &'static Place> {
    DATASETS.values().flatten()
}

fn page<T>(items: Vec<T>, page_no: u32, num_of_rows: u32) -> Vec<T> {
    let start = (page_no.saturating_sub(1) as usize) * num_of_rows as usize;
    items
        .into_iter()
        .skip(start)
        .take(num_of_rows as usize)
        .collect()
}

/// The bundled stand-in for the live API. Every call succeeds; "not
/// found" is an empty result or `None`.
#[derive(Clone, Default)]
pub struct MockDataSource;

impl MockDataSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RemoteSource for MockDataSource {
    async fn fetch_festivals(&self, query: &FestivalQuery) -> Result<Vec<Place>, NadriError> {
        let places: Vec<Place> = dataset_for(query.area_code.as_deref())
            .iter()
            .filter(|p| p.content_type() == Some(ContentType::Festival))
            .filter(|p| match &p.event {
                // yyyyMMdd compares correctly as text
                Some(event) => event.end_date.as_str() >= query.event_start_date.as_str(),
                None => false,
            })
            .filter(|p| match &query.sigungu_code {
                Some(sigungu) => p.sigungu_code.as_deref() == Some(sigungu),
                None => true,
            })
            .cloned()
            .collect();

        Ok(page(places, query.page_no, query.num_of_rows))
    }

    async fn fetch_area_places(&self, query: &AreaQuery) -> Result<Vec<Place>, NadriError> {
        let places: Vec<Place> = dataset_for(query.area_code.as_deref())
            .iter()
            .filter(|p| match query.content_type_id {
                Some(type_id) => p.content_type_id == Some(type_id),
                None => true,
            })
            .filter(|p| match &query.sigungu_code {
                Some(sigungu) => p.sigungu_code.as_deref() == Some(sigungu),
                None => true,
            })
            .filter(|p| match &query.cat1 {
                Some(cat1) => p.cat1.as_deref() == Some(cat1),
                None => true,
            })
            .filter(|p| match &query.cat2 {
                Some(cat2) => p.cat2.as_deref() == Some(cat2),
                None => true,
            })
            .filter(|p| match query.cat3.as_slice() {
                [cat3] => p.cat3.as_deref() == Some(cat3),
                _ => true,
            })
            .cloned()
            .collect();

        Ok(page(places, query.page_no, query.num_of_rows))
    }

    async fn fetch_location_places(
        &self,
        query: &LocationQuery,
    ) -> Result<Vec<Place>, NadriError> {
        let mut places: Vec<Place> = all_places()
            .filter(|p| match query.content_type_id {
                Some(type_id) => p.content_type_id == Some(type_id),
                None => true,
            })
            .filter_map(|p| {
                let distance = p.distance_from(query.map_x, query.map_y)?;
                if distance > query.radius as f64 {
                    return None;
                }
                let mut place = p.clone();
                place.distance = Some(distance);
                Some(place)
            })
            .collect();
        places.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal));

        Ok(page(places, query.page_no, query.num_of_rows))
    }

    async fn fetch_detail(&self, content_id: &str) -> Result<Option<Place>, NadriError> {
        Ok(all_places()
            .find(|p| p.content_id == content_id)
            .cloned())
    }

    async fn fetch_operating_info(
        &self,
        content_id: &str,
        content_type_id: u32,
    ) -> Result<Option<OperatingInfo>, NadriError> {
        if all_places().all(|p| p.content_id != content_id) {
            return Ok(None);
        }
        let info = ContentType::from_id(content_type_id).map(|content_type| match content_type {
            ContentType::TouristSpot => OperatingInfo::TouristSpot {
                use_time: Some("09:00-18:00".to_string()),
                rest_date: Some("Tuesdays".to_string()),
                parking: Some("On-site lot".to_string()),
                phone: None,
            },
            ContentType::CulturalFacility => OperatingInfo::CulturalFacility {
                use_fee: Some("Free".to_string()),
                use_time: Some("10:00-18:00".to_string()),
                rest_date: Some("Mondays".to_string()),
                parking: None,
            },
            ContentType::Festival => OperatingInfo::Festival {
                play_time: Some("11:00-21:00".to_string()),
                event_place: Some("Main plaza".to_string()),
                use_fee: Some("Free".to_string()),
                sponsor: None,
            },
            ContentType::TravelCourse => OperatingInfo::TravelCourse {
                total_distance: Some("12km".to_string()),
                take_time: Some("About 4 hours".to_string()),
                schedule: None,
            },
            ContentType::LeisureSports => OperatingInfo::LeisureSports {
                open_period: Some("All year".to_string()),
                reservation: Some("Walk-in".to_string()),
                use_fee: None,
                parking: Some("Public lot nearby".to_string()),
            },
            ContentType::Lodging => OperatingInfo::Lodging {
                checkin_time: Some("15:00".to_string()),
                checkout_time: Some("11:00".to_string()),
                room_count: None,
                reservation_url: None,
            },
            ContentType::Shopping => OperatingInfo::Shopping {
                open_time: Some("10:00-22:00".to_string()),
                rest_date: Some("First Monday of the month".to_string()),
                sale_item: None,
                parking: None,
            },
            ContentType::Restaurant => OperatingInfo::Restaurant {
                first_menu: Some("House specialty".to_string()),
                open_time: Some("11:00-21:30".to_string()),
                rest_date: Some("Sundays".to_string()),
                parking: None,
            },
        });
        Ok(info)
    }

    async fn fetch_images(&self, content_id: &str) -> Result<Vec<PlaceImage>, NadriError> {
        Ok(all_places()
            .find(|p| p.content_id == content_id)
            .and_then(|p| {
                Some(PlaceImage {
                    content_id: p.content_id.clone(),
                    origin_url: p.image_url.clone()?,
                    small_url: None,
                })
            })
            .into_iter()
            .collect())
    }

    async fn search_places(&self, query: &SearchQuery) -> Result<Vec<Place>, NadriError> {
        let needle = query.keyword.to_lowercase();
        let places: Vec<Place> = all_places()
            .filter(|p| match &query.area_code {
                Some(area) => p.area_code.as_deref() == Some(area),
                None => true,
            })
            .filter(|p| match query.content_type_id {
                Some(type_id) => p.content_type_id == Some(type_id),
                None => true,
            })
            .filter(|p| {
                p.title.to_lowercase().contains(&needle)
                    || p.addr
                        .as_deref()
                        .is_some_and(|a| a.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();

        Ok(page(places, query.page_no, query.num_of_rows))
    }
}
