use serde::{Deserialize, Serialize};

/// A tourist point of interest or event, keyed by the upstream `contentId`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Place {
    pub content_id: String,
    pub title: String,
    pub addr: Option<String>,
    pub image_url: Option<String>,
    /// Longitude (upstream `mapX`).
    pub map_x: Option<f64>,
    /// Latitude (upstream `mapY`).
    pub map_y: Option<f64>,
    pub tel: Option<String>,
    pub overview: Option<String>,
    pub content_type_id: Option<u32>,
    pub area_code: Option<String>,
    pub sigungu_code: Option<String>,
    pub cat1: Option<String>,
    pub cat2: Option<String>,
    pub cat3: Option<String>,
    /// Meters from the query point, only set on location-based results.
    pub distance: Option<f64>,
    /// Upstream change-detection token.
    pub modified_time: Option<String>,
    pub event: Option<EventMeta>,
    /// Cache-local flag, never comes from upstream.
    pub is_favorite: bool,
    pub is_custom: bool,
    pub custom_place_id: Option<String>,
    /// Write time of the cached row, epoch seconds. Set by the cache.
    pub cached_at: Option<i64>,
}

impl Place {
    pub fn new(content_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            content_id: content_id.into(),
            title: title.into(),
            addr: None,
            image_url: None,
            map_x: None,
            map_y: None,
            tel: None,
            overview: None,
            content_type_id: None,
            area_code: None,
            sigungu_code: None,
            cat1: None,
            cat2: None,
            cat3: None,
            distance: None,
            modified_time: None,
            event: None,
            is_favorite: false,
            is_custom: false,
            custom_place_id: None,
            cached_at: None,
        }
    }

    pub fn content_type(&self) -> Option<ContentType> {
        self.content_type_id.and_then(ContentType::from_id)
    }

    /// Approximate meters between this place and the given point.
    /// Equirectangular projection, good enough for radius filtering.
    pub fn distance_from(&self, map_x: f64, map_y: f64) -> Option<f64> {
        const EARTH_RADIUS_M: f64 = 6_371_000.0;
        let (px, py) = (self.map_x?, self.map_y?);
        let mean_lat = ((py + map_y) / 2.0).to_radians();
        let dx = (px - map_x).to_radians() * mean_lat.cos();
        let dy = (py - map_y).to_radians();
        Some((dx * dx + dy * dy).sqrt() * EARTH_RADIUS_M)
    }
}

/// Event dates in upstream `yyyyMMdd` form, present only for festival content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventMeta {
    pub start_date: String,
    pub end_date: String,
}

/// Closed set of upstream content-type families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentType {
    TouristSpot,
    CulturalFacility,
    Festival,
    TravelCourse,
    LeisureSports,
    Lodging,
    Shopping,
    Restaurant,
}

impl ContentType {
    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            12 => Some(Self::TouristSpot),
            14 => Some(Self::CulturalFacility),
            15 => Some(Self::Festival),
            25 => Some(Self::TravelCourse),
            28 => Some(Self::LeisureSports),
            32 => Some(Self::Lodging),
            38 => Some(Self::Shopping),
            39 => Some(Self::Restaurant),
            _ => None,
        }
    }

    pub fn id(&self) -> u32 {
        match self {
            Self::TouristSpot => 12,
            Self::CulturalFacility => 14,
            Self::Festival => 15,
            Self::TravelCourse => 25,
            Self::LeisureSports => 28,
            Self::Lodging => 32,
            Self::Shopping => 38,
            Self::Restaurant => 39,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::TouristSpot => "tourist spot",
            Self::CulturalFacility => "cultural facility",
            Self::Festival => "festival",
            Self::TravelCourse => "travel course",
            Self::LeisureSports => "leisure sports",
            Self::Lodging => "lodging",
            Self::Shopping => "shopping",
            Self::Restaurant => "restaurant",
        }
    }
}

/// Per-content-type operating details, persisted as a JSON column.
/// One variant per family; unknown upstream shapes never reach this type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperatingInfo {
    TouristSpot {
        use_time: Option<String>,
        rest_date: Option<String>,
        parking: Option<String>,
        phone: Option<String>,
    },
    CulturalFacility {
        use_fee: Option<String>,
        use_time: Option<String>,
        rest_date: Option<String>,
        parking: Option<String>,
    },
    Festival {
        play_time: Option<String>,
        event_place: Option<String>,
        use_fee: Option<String>,
        sponsor: Option<String>,
    },
    TravelCourse {
        total_distance: Option<String>,
        take_time: Option<String>,
        schedule: Option<String>,
    },
    LeisureSports {
        open_period: Option<String>,
        reservation: Option<String>,
        use_fee: Option<String>,
        parking: Option<String>,
    },
    Lodging {
        checkin_time: Option<String>,
        checkout_time: Option<String>,
        room_count: Option<String>,
        reservation_url: Option<String>,
    },
    Shopping {
        open_time: Option<String>,
        rest_date: Option<String>,
        sale_item: Option<String>,
        parking: Option<String>,
    },
    Restaurant {
        first_menu: Option<String>,
        open_time: Option<String>,
        rest_date: Option<String>,
        parking: Option<String>,
    },
}

/// A previously searched keyword. Primary key is the text itself;
/// re-searching refreshes `searched_at` rather than duplicating.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecentKeyword {
    pub keyword: String,
    /// Epoch milliseconds of the most recent search.
    pub searched_at: i64,
}

/// One image attached to a place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaceImage {
    pub content_id: String,
    pub origin_url: String,
    pub small_url: Option<String>,
}

/// Cache filter. A `None` field means "no constraint", not "match null".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceFilter {
    pub area_code: Option<String>,
    pub sigungu_code: Option<String>,
    pub content_type_id: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FestivalQuery {
    /// `yyyyMMdd`; festivals ending before this date are excluded upstream.
    pub event_start_date: String,
    pub area_code: Option<String>,
    pub sigungu_code: Option<String>,
    pub page_no: u32,
    pub num_of_rows: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaQuery {
    pub area_code: Option<String>,
    pub sigungu_code: Option<String>,
    pub content_type_id: Option<u32>,
    pub cat1: Option<String>,
    pub cat2: Option<String>,
    /// Upstream accepts at most one cat3 code per request; the repository
    /// post-filters client-side when more than one is given.
    pub cat3: Vec<String>,
    pub page_no: u32,
    pub num_of_rows: u32,
    pub arrange: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationQuery {
    pub map_x: f64,
    pub map_y: f64,
    /// Meters.
    pub radius: u32,
    pub content_type_id: Option<u32>,
    pub page_no: u32,
    pub num_of_rows: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub keyword: String,
    pub area_code: Option<String>,
    pub content_type_id: Option<u32>,
    pub page_no: u32,
    pub num_of_rows: u32,
}

/// Where a query's data actually came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataOrigin {
    LocalCache,
    Remote,
    Fallback,
}

/// A query result annotated with its origin, so the presentation layer
/// can tell the user when data is cached or illustrative.
#[derive(Debug, Clone, Serialize)]
pub struct Sourced<T> {
    pub value: T,
    pub origin: DataOrigin,
}

impl<T> Sourced<T> {
    pub fn new(value: T, origin: DataOrigin) -> Self {
        Self { value, origin }
    }
}
