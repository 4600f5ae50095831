#![allow(dead_code)]

use async_trait::async_trait;
use nadri::application::PlaceRepository;
use nadri::domain::error::NadriError;
use nadri::domain::mode::ModeState;
use nadri::domain::model::{
    AreaQuery, FestivalQuery, LocationQuery, OperatingInfo, Place, PlaceImage, SearchQuery,
};
use nadri::domain::traits::RemoteSource;
use nadri::infrastructure::fallback::MockDataSource;
use nadri::infrastructure::storage::db::init_memory_database;
use nadri::infrastructure::storage::PlaceCache;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_rusqlite::Connection;

/// What the stub answers on every fetch.
#[derive(Clone)]
pub enum Behavior {
    Places(Vec<Place>),
    QuotaExceeded,
    ConnectionRefused,
    ServerError,
}

/// Scripted remote with call accounting, so tests can assert both the
/// result and whether the network was touched at all.
#[derive(Clone)]
pub struct StubRemote {
    behavior: Behavior,
    pub calls: Arc<AtomicUsize>,
    pub last_area_query: Arc<Mutex<Option<AreaQuery>>>,
}

impl StubRemote {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(AtomicUsize::new(0)),
            last_area_query: Arc::new(Mutex::new(None)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn answer(&self) -> Result<Vec<Place>, NadriError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Places(places) => Ok(places.clone()),
            Behavior::QuotaExceeded => Err(NadriError::Api {
                code: "22".to_string(),
                message: "LIMITED_NUMBER_OF_SERVICE_REQUESTS_EXCEEDS_ERROR".to_string(),
            }),
            Behavior::ConnectionRefused => {
                Err(NadriError::Connection("connection refused".to_string()))
            }
            Behavior::ServerError => Err(NadriError::HttpStatus { status: 500 }),
        }
    }
}

#[async_trait]
impl RemoteSource for StubRemote {
    async fn fetch_festivals(&self, _query: &FestivalQuery) -> Result<Vec<Place>, NadriError> {
        self.answer()
    }

    async fn fetch_area_places(&self, query: &AreaQuery) -> Result<Vec<Place>, NadriError> {
        *self.last_area_query.lock().unwrap() = Some(query.clone());
        self.answer()
    }

    async fn fetch_location_places(
        &self,
        _query: &LocationQuery,
    ) -> Result<Vec<Place>, NadriError> {
        self.answer()
    }

    async fn fetch_detail(&self, content_id: &str) -> Result<Option<Place>, NadriError> {
        let places = self.answer()?;
        Ok(places.into_iter().find(|p| p.content_id == content_id))
    }

    async fn fetch_operating_info(
        &self,
        _content_id: &str,
        _content_type_id: u32,
    ) -> Result<Option<OperatingInfo>, NadriError> {
        self.answer()?;
        Ok(None)
    }

    async fn fetch_images(&self, _content_id: &str) -> Result<Vec<PlaceImage>, NadriError> {
        self.answer()?;
        Ok(Vec::new())
    }

    async fn search_places(&self, query: &SearchQuery) -> Result<Vec<Place>, NadriError> {
        let places = self.answer()?;
        Ok(places
            .into_iter()
            .filter(|p| p.title.contains(&query.keyword))
            .collect())
    }
}

pub struct TestHarness {
    pub repo: PlaceRepository<StubRemote>,
    pub cache: PlaceCache,
    pub db: Arc<Connection>,
    pub mode: ModeState,
    pub stub: StubRemote,
}

pub async fn harness(behavior: Behavior) -> TestHarness {
    let db = Arc::new(init_memory_database().await.unwrap());
    let cache = PlaceCache::new(db.clone());
    let mode = ModeState::new();
    let stub = StubRemote::new(behavior);
    let repo = PlaceRepository::new(
        cache.clone(),
        stub.clone(),
        MockDataSource::new(),
        mode.clone(),
    );
    TestHarness {
        repo,
        cache,
        db,
        mode,
        stub,
    }
}

pub fn place(content_id: &str, title: &str) -> Place {
    Place::new(content_id, title)
}

pub fn festival_place(content_id: &str, area_code: &str) -> Place {
    let mut p = Place::new(content_id, format!("festival {content_id}"));
    p.area_code = Some(area_code.to_string());
    p.content_type_id = Some(15);
    p
}

pub fn area_place(content_id: &str, area_code: &str, cat3: Option<&str>) -> Place {
    let mut p = Place::new(content_id, format!("place {content_id}"));
    p.area_code = Some(area_code.to_string());
    p.content_type_id = Some(12);
    p.cat3 = cat3.map(str::to_string);
    p
}

pub fn located_place(content_id: &str, map_x: f64, map_y: f64) -> Place {
    let mut p = Place::new(content_id, format!("place {content_id}"));
    p.map_x = Some(map_x);
    p.map_y = Some(map_y);
    p.content_type_id = Some(12);
    p
}

pub fn location_query(map_x: f64, map_y: f64, radius: u32, rows: u32) -> LocationQuery {
    LocationQuery {
        map_x,
        map_y,
        radius,
        content_type_id: None,
        page_no: 1,
        num_of_rows: rows,
    }
}

pub fn festival_query(area_code: &str, rows: u32) -> FestivalQuery {
    FestivalQuery {
        event_start_date: "20260101".to_string(),
        area_code: Some(area_code.to_string()),
        sigungu_code: None,
        page_no: 1,
        num_of_rows: rows,
    }
}

pub fn area_query(area_code: &str, cat3: Vec<&str>, rows: u32) -> AreaQuery {
    AreaQuery {
        area_code: Some(area_code.to_string()),
        sigungu_code: None,
        content_type_id: Some(12),
        cat1: None,
        cat2: None,
        cat3: cat3.into_iter().map(str::to_string).collect(),
        page_no: 1,
        num_of_rows: rows,
        arrange: None,
    }
}

/// Rewinds every cached row's write time by `secs`, simulating age.
pub async fn backdate_all(db: &Connection, secs: i64) {
    db.call(move |conn| {
        conn.execute(
            "UPDATE places SET cached_at = cached_at - ?",
            rusqlite::params![secs],
        )?;
        conn.execute(
            "UPDATE operating_info SET cached_at = cached_at - ?",
            rusqlite::params![secs],
        )?;
        Ok::<_, rusqlite::Error>(())
    })
    .await
    .unwrap();
}
