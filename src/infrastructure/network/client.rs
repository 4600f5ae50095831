//! Client for the KorService tourism open-data API.

use crate::domain::error::NadriError;
use crate::domain::model::{
    AreaQuery, ContentType, EventMeta, FestivalQuery, LocationQuery, OperatingInfo, Place,
    PlaceImage, SearchQuery,
};
use crate::domain::traits::RemoteSource;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://apis.data.go.kr/B551011/KorService1";
/// Application-level success code in the response header.
const RESULT_OK: &str = "0000";

// Upstream envelope: response.header carries the result code even on
// HTTP 200; response.body.items is "" (a bare string) when empty.
#[derive(Deserialize, Debug)]
struct Envelope<T> {
    response: ApiResponse<T>,
}

#[derive(Deserialize, Debug)]
struct ApiResponse<T> {
    header: ApiHeader,
    body: Option<ApiBody<T>>,
}

#[derive(Deserialize, Debug)]
struct ApiHeader {
    #[serde(rename = "resultCode")]
    result_code: String,
    #[serde(rename = "resultMsg")]
    result_msg: String,
}

#[derive(Deserialize, Debug)]
struct ApiBody<T> {
    items: Option<ItemsField<T>>,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum ItemsField<T> {
    Wrapped { item: ItemList<T> },
    Empty(String),
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum ItemList<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> Envelope<T> {
    fn into_items(self) -> Result<Vec<T>, NadriError> {
        let header = self.response.header;
        if header.result_code != RESULT_OK {
            return Err(NadriError::Api {
                code: header.result_code,
                message: header.result_msg,
            });
        }
        let items = match self.response.body.and_then(|b| b.items) {
            Some(ItemsField::Wrapped {
                item: ItemList::Many(items),
            }) => items,
            Some(ItemsField::Wrapped {
                item: ItemList::One(item),
            }) => vec![item],
            Some(ItemsField::Empty(_)) | None => Vec::new(),
        };
        Ok(items)
    }
}

#[derive(Deserialize, Debug)]
struct RawPlace {
    #[serde(default)]
    contentid: String,
    #[serde(default)]
    contenttypeid: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    addr1: Option<String>,
    #[serde(default)]
    firstimage: Option<String>,
    #[serde(default)]
    mapx: Option<String>,
    #[serde(default)]
    mapy: Option<String>,
    #[serde(default)]
    tel: Option<String>,
    #[serde(default)]
    overview: Option<String>,
    #[serde(default)]
    areacode: Option<String>,
    #[serde(default)]
    sigungucode: Option<String>,
    #[serde(default)]
    cat1: Option<String>,
    #[serde(default)]
    cat2: Option<String>,
    #[serde(default)]
    cat3: Option<String>,
    #[serde(default)]
    dist: Option<String>,
    #[serde(default)]
    modifiedtime: Option<String>,
    #[serde(default)]
    eventstartdate: Option<String>,
    #[serde(default)]
    eventenddate: Option<String>,
}

impl RawPlace {
    fn into_place(self) -> Place {
        let event = match (norm(self.eventstartdate), norm(self.eventenddate)) {
            (Some(start_date), Some(end_date)) => Some(EventMeta {
                start_date,
                end_date,
            }),
            _ => None,
        };

        let mut place = Place::new(self.contentid, self.title);
        place.addr = norm(self.addr1);
        place.image_url = norm(self.firstimage);
        place.map_x = parse_f64(self.mapx);
        place.map_y = parse_f64(self.mapy);
        place.tel = norm(self.tel);
        place.overview = norm(self.overview);
        place.content_type_id = norm(self.contenttypeid).and_then(|v| v.parse().ok());
        place.area_code = norm(self.areacode);
        place.sigungu_code = norm(self.sigungucode);
        place.cat1 = norm(self.cat1);
        place.cat2 = norm(self.cat2);
        place.cat3 = norm(self.cat3);
        place.distance = parse_f64(self.dist);
        place.modified_time = norm(self.modifiedtime);
        place.event = event;
        place
    }
}

// detailIntro fields vary per content type; the upstream flattens them
// all into one record, suffixed by family (restdateculture, parkingfood
// and so on). Only the ones this app surfaces are modeled.
#[derive(Deserialize, Debug, Default)]
struct RawIntro {
    #[serde(default)]
    usetime: Option<String>,
    #[serde(default)]
    restdate: Option<String>,
    #[serde(default)]
    parking: Option<String>,
    #[serde(default)]
    infocenter: Option<String>,
    #[serde(default)]
    usefee: Option<String>,
    #[serde(default)]
    usetimeculture: Option<String>,
    #[serde(default)]
    restdateculture: Option<String>,
    #[serde(default)]
    parkingculture: Option<String>,
    #[serde(default)]
    playtime: Option<String>,
    #[serde(default)]
    eventplace: Option<String>,
    #[serde(default)]
    usetimefestival: Option<String>,
    #[serde(default)]
    sponsor1: Option<String>,
    #[serde(default)]
    distance: Option<String>,
    #[serde(default)]
    taketime: Option<String>,
    #[serde(default)]
    schedule: Option<String>,
    #[serde(default)]
    openperiod: Option<String>,
    #[serde(default)]
    reservation: Option<String>,
    #[serde(default)]
    usefeeleports: Option<String>,
    #[serde(default)]
    parkingleports: Option<String>,
    #[serde(default)]
    checkintime: Option<String>,
    #[serde(default)]
    checkouttime: Option<String>,
    #[serde(default)]
    roomcount: Option<String>,
    #[serde(default)]
    reservationurl: Option<String>,
    #[serde(default)]
    opentime: Option<String>,
    #[serde(default)]
    restdateshopping: Option<String>,
    #[serde(default)]
    saleitem: Option<String>,
    #[serde(default)]
    parkingshopping: Option<String>,
    #[serde(default)]
    firstmenu: Option<String>,
    #[serde(default)]
    opentimefood: Option<String>,
    #[serde(default)]
    restdatefood: Option<String>,
    #[serde(default)]
    parkingfood: Option<String>,
}

impl RawIntro {
    fn into_operating_info(self, content_type: ContentType) -> OperatingInfo {
        match content_type {
            ContentType::TouristSpot => OperatingInfo::TouristSpot {
                use_time: norm(self.usetime),
                rest_date: norm(self.restdate),
                parking: norm(self.parking),
                phone: norm(self.infocenter),
            },
            ContentType::CulturalFacility => OperatingInfo::CulturalFacility {
                use_fee: norm(self.usefee),
                use_time: norm(self.usetimeculture),
                rest_date: norm(self.restdateculture),
                parking: norm(self.parkingculture),
            },
            ContentType::Festival => OperatingInfo::Festival {
                play_time: norm(self.playtime).or(norm(self.usetimefestival)),
                event_place: norm(self.eventplace),
                use_fee: norm(self.usefee),
                sponsor: norm(self.sponsor1),
            },
            ContentType::TravelCourse => OperatingInfo::TravelCourse {
                total_distance: norm(self.distance),
                take_time: norm(self.taketime),
                schedule: norm(self.schedule),
            },
            ContentType::LeisureSports => OperatingInfo::LeisureSports {
                open_period: norm(self.openperiod),
                reservation: norm(self.reservation),
                use_fee: norm(self.usefeeleports),
                parking: norm(self.parkingleports),
            },
            ContentType::Lodging => OperatingInfo::Lodging {
                checkin_time: norm(self.checkintime),
                checkout_time: norm(self.checkouttime),
                room_count: norm(self.roomcount),
                reservation_url: norm(self.reservationurl),
            },
            ContentType::Shopping => OperatingInfo::Shopping {
                open_time: norm(self.opentime),
                rest_date: norm(self.restdateshopping),
                sale_item: norm(self.saleitem),
                parking: norm(self.parkingshopping),
            },
            ContentType::Restaurant => OperatingInfo::Restaurant {
                first_menu: norm(self.firstmenu),
                open_time: norm(self.opentimefood),
                rest_date: norm(self.restdatefood),
                parking: norm(self.parkingfood),
            },
        }
    }
}

#[derive(Deserialize, Debug)]
struct RawImage {
    #[serde(default)]
    contentid: String,
    #[serde(default)]
    originimgurl: Option<String>,
    #[serde(default)]
    smallimageurl: Option<String>,
}

/// Live remote source backed by the tourism open-data service.
#[derive(Clone)]
pub struct TourApiClient {
    client: Client,
    service_key: String,
    base_url: String,
}

impl TourApiClient {
    pub fn new(client: Client, service_key: impl Into<String>) -> Self {
        Self {
            client,
            service_key: service_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch_items<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        extra: &[(&str, String)],
    ) -> Result<Vec<T>, NadriError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let mut params: Vec<(&str, String)> = vec![
            ("serviceKey", self.service_key.clone()),
            ("MobileOS", "ETC".to_string()),
            ("MobileApp", "nadri".to_string()),
            ("_type", "json".to_string()),
        ];
        params.extend(extra.iter().cloned());

        let response = match self.client.get(&url).query(&params).send().await {
            Ok(r) => r,
            Err(e) if e.is_timeout() || e.is_connect() => {
                return Err(NadriError::Connection(e.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(NadriError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let envelope: Envelope<T> = response.json().await?;
        envelope.into_items()
    }
}

#[async_trait]
impl RemoteSource for TourApiClient {
    async fn fetch_festivals(&self, query: &FestivalQuery) -> Result<Vec<Place>, NadriError> {
        let mut params = vec![
            ("eventStartDate", query.event_start_date.clone()),
            ("pageNo", query.page_no.to_string()),
            ("numOfRows", query.num_of_rows.to_string()),
            ("arrange", "C".to_string()),
        ];
        if let Some(area) = &query.area_code {
            params.push(("areaCode", area.clone()));
        }
        if let Some(sigungu) = &query.sigungu_code {
            params.push(("sigunguCode", sigungu.clone()));
        }

        let raw: Vec<RawPlace> = self.fetch_items("searchFestival1", &params).await?;
        Ok(raw.into_iter().map(RawPlace::into_place).collect())
    }

    async fn fetch_area_places(&self, query: &AreaQuery) -> Result<Vec<Place>, NadriError> {
        let mut params = vec![
            ("pageNo", query.page_no.to_string()),
            ("numOfRows", query.num_of_rows.to_string()),
        ];
        if let Some(area) = &query.area_code {
            params.push(("areaCode", area.clone()));
        }
        if let Some(sigungu) = &query.sigungu_code {
            params.push(("sigunguCode", sigungu.clone()));
        }
        if let Some(type_id) = query.content_type_id {
            params.push(("contentTypeId", type_id.to_string()));
        }
        if let Some(cat1) = &query.cat1 {
            params.push(("cat1", cat1.clone()));
        }
        if let Some(cat2) = &query.cat2 {
            params.push(("cat2", cat2.clone()));
        }
        // The upstream accepts a single category code; multi-code
        // requests are post-filtered by the repository instead.
        if let [cat3] = query.cat3.as_slice() {
            params.push(("cat3", cat3.clone()));
        }
        if let Some(arrange) = &query.arrange {
            params.push(("arrange", arrange.clone()));
        }

        let raw: Vec<RawPlace> = self.fetch_items("areaBasedList1", &params).await?;
        Ok(raw.into_iter().map(RawPlace::into_place).collect())
    }

    async fn fetch_location_places(
        &self,
        query: &LocationQuery,
    ) -> Result<Vec<Place>, NadriError> {
        let mut params = vec![
            ("mapX", query.map_x.to_string()),
            ("mapY", query.map_y.to_string()),
            ("radius", query.radius.to_string()),
            ("pageNo", query.page_no.to_string()),
            ("numOfRows", query.num_of_rows.to_string()),
            ("arrange", "E".to_string()),
        ];
        if let Some(type_id) = query.content_type_id {
            params.push(("contentTypeId", type_id.to_string()));
        }

        let raw: Vec<RawPlace> = self.fetch_items("locationBasedList1", &params).await?;
        Ok(raw.into_iter().map(RawPlace::into_place).collect())
    }

    async fn fetch_detail(&self, content_id: &str) -> Result<Option<Place>, NadriError> {
        let params = vec![
            ("contentId", content_id.to_string()),
            ("defaultYN", "Y".to_string()),
            ("firstImageYN", "Y".to_string()),
            ("addrinfoYN", "Y".to_string()),
            ("mapinfoYN", "Y".to_string()),
            ("overviewYN", "Y".to_string()),
        ];

        let raw: Vec<RawPlace> = self.fetch_items("detailCommon1", &params).await?;
        Ok(raw.into_iter().next().map(RawPlace::into_place))
    }

    async fn fetch_operating_info(
        &self,
        content_id: &str,
        content_type_id: u32,
    ) -> Result<Option<OperatingInfo>, NadriError> {
        let content_type = match ContentType::from_id(content_type_id) {
            Some(ct) => ct,
            None => return Ok(None),
        };
        let params = vec![
            ("contentId", content_id.to_string()),
            ("contentTypeId", content_type_id.to_string()),
        ];

        let raw: Vec<RawIntro> = self.fetch_items("detailIntro1", &params).await?;
        Ok(raw
            .into_iter()
            .next()
            .map(|intro| intro.into_operating_info(content_type)))
    }

    async fn fetch_images(&self, content_id: &str) -> Result<Vec<PlaceImage>, NadriError> {
        let params = vec![
            ("contentId", content_id.to_string()),
            ("imageYN", "Y".to_string()),
        ];

        let raw: Vec<RawImage> = self.fetch_items("detailImage1", &params).await?;
        Ok(raw
            .into_iter()
            .filter_map(|img| {
                Some(PlaceImage {
                    content_id: if img.contentid.is_empty() {
                        content_id.to_string()
                    } else {
                        img.contentid
                    },
                    origin_url: norm(img.originimgurl)?,
                    small_url: norm(img.smallimageurl),
                })
            })
            .collect())
    }

    async fn search_places(&self, query: &SearchQuery) -> Result<Vec<Place>, NadriError> {
        let mut params = vec![
            ("keyword", query.keyword.clone()),
            ("pageNo", query.page_no.to_string()),
            ("numOfRows", query.num_of_rows.to_string()),
        ];
        if let Some(area) = &query.area_code {
            params.push(("areaCode", area.clone()));
        }
        if let Some(type_id) = query.content_type_id {
            params.push(("contentTypeId", type_id.to_string()));
        }

        let raw: Vec<RawPlace> = self.fetch_items("searchKeyword1", &params).await?;
        Ok(raw.into_iter().map(RawPlace::into_place).collect())
    }
}

fn norm(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_f64(value: Option<String>) -> Option<f64> {
    norm(value).and_then(|v| v.parse().ok())
}
