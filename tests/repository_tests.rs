mod common;

use common::{
    area_place, area_query, backdate_all, festival_place, festival_query, harness, located_place,
    location_query, Behavior,
};
use nadri::domain::error::NadriError;
use nadri::domain::mode::OperatingMode;
use nadri::domain::model::{DataOrigin, SearchQuery};
use nadri::infrastructure::storage::cache::LISTING_TTL;
use std::time::Duration;

fn five_festivals() -> Vec<nadri::domain::model::Place> {
    (1..=5).map(|i| festival_place(&format!("f{i}"), "1")).collect()
}

#[tokio::test]
async fn sufficient_cache_answers_without_touching_the_remote() {
    let h = harness(Behavior::Places(five_festivals())).await;
    h.cache.save_places(&five_festivals()).await.unwrap();

    let result = h.repo.get_festivals(&festival_query("1", 5)).await.unwrap();

    assert_eq!(result.origin, DataOrigin::LocalCache);
    assert_eq!(result.value.len(), 5);
    assert_eq!(h.stub.call_count(), 0);
}

#[tokio::test]
async fn insufficient_cache_goes_remote() {
    let h = harness(Behavior::Places(five_festivals())).await;
    h.cache
        .save_places(&[festival_place("f1", "1")])
        .await
        .unwrap();

    // One cached row cannot satisfy a five-row request.
    let result = h.repo.get_festivals(&festival_query("1", 5)).await.unwrap();

    assert_eq!(result.origin, DataOrigin::Remote);
    assert_eq!(result.value.len(), 5);
    assert_eq!(h.stub.call_count(), 1);
}

#[tokio::test]
async fn remote_results_are_written_back_asynchronously() {
    let h = harness(Behavior::Places(five_festivals())).await;

    let result = h.repo.get_festivals(&festival_query("1", 5)).await.unwrap();
    assert_eq!(result.origin, DataOrigin::Remote);

    // The write-back is detached; poll until it lands.
    let filter = nadri::domain::model::PlaceFilter {
        area_code: Some("1".to_string()),
        ..Default::default()
    };
    let mut cached = Vec::new();
    for _ in 0..50 {
        cached = h.cache.get_places(&filter, LISTING_TTL).await.unwrap();
        if cached.len() == 5 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(cached.len(), 5);
}

#[tokio::test]
async fn quota_exhaustion_degrades_to_sample_data_and_blocks_writes() {
    let h = harness(Behavior::QuotaExceeded).await;

    // User data written while the mode was still normal.
    h.repo.toggle_favorite("mine").await.unwrap();
    h.repo.record_search_keyword("hanok stay").await.unwrap();

    let result = h.repo.get_festivals(&festival_query("1", 5)).await.unwrap();
    assert_eq!(result.origin, DataOrigin::Fallback);
    assert!(!result.value.is_empty());

    match h.mode.current_mode() {
        OperatingMode::MockFallback { reason } => assert!(!reason.is_empty()),
        other => panic!("expected mock fallback, got {other:?}"),
    }

    // Every subsequent read is served from the bundled data directly.
    let calls_after_first = h.stub.call_count();
    h.repo.get_festivals(&festival_query("1", 5)).await.unwrap();
    assert_eq!(h.stub.call_count(), calls_after_first);

    // No user mutation may land while fabricated data is on screen.
    assert!(matches!(
        h.repo.toggle_favorite("mine").await,
        Err(NadriError::WriteBlocked(_))
    ));
    assert!(matches!(
        h.repo.record_search_keyword("seoul").await,
        Err(NadriError::WriteBlocked(_))
    ));
    assert!(matches!(
        h.repo.remove_search_keyword("hanok stay").await,
        Err(NadriError::WriteBlocked(_))
    ));

    // The rejected calls left the store exactly as it was.
    let favorites = h.cache.get_favorites().await.unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].content_id, "mine");
    assert!(favorites[0].is_favorite);

    let keywords = h.cache.recent_keywords(10).await.unwrap();
    assert_eq!(keywords.len(), 1);
    assert_eq!(keywords[0].keyword, "hanok stay");
}

#[tokio::test]
async fn server_errors_also_degrade_to_sample_data() {
    let h = harness(Behavior::ServerError).await;

    let result = h.repo.get_festivals(&festival_query("1", 5)).await.unwrap();
    assert_eq!(result.origin, DataOrigin::Fallback);
    assert!(matches!(
        h.mode.current_mode(),
        OperatingMode::MockFallback { .. }
    ));
}

#[tokio::test]
async fn connectivity_loss_with_empty_cache_surfaces_an_error() {
    let h = harness(Behavior::ConnectionRefused).await;

    let err = h
        .repo
        .get_festivals(&festival_query("1", 5))
        .await
        .unwrap_err();
    assert!(matches!(err, NadriError::NetworkRequired(_)));
    assert_eq!(h.mode.current_mode(), OperatingMode::Offline);
}

#[tokio::test]
async fn connectivity_loss_serves_stale_cache_instead_of_sample_data() {
    let h = harness(Behavior::ConnectionRefused).await;
    h.cache.save_places(&five_festivals()).await.unwrap();

    // Stale for the normal listing TTL but still within the sweep horizon.
    backdate_all(&h.db, 4 * 3600).await;

    let result = h.repo.get_festivals(&festival_query("1", 5)).await.unwrap();
    assert_eq!(result.origin, DataOrigin::LocalCache);
    assert_eq!(result.value.len(), 5);
    assert_eq!(h.mode.current_mode(), OperatingMode::Offline);

    // Once offline, the remote is not tried again.
    let calls = h.stub.call_count();
    h.repo.get_festivals(&festival_query("1", 5)).await.unwrap();
    assert_eq!(h.stub.call_count(), calls);
}

#[tokio::test]
async fn offline_writes_remain_allowed() {
    let h = harness(Behavior::ConnectionRefused).await;
    h.mode.enter_offline_mode();

    assert!(h.repo.toggle_favorite("f1").await.unwrap());
    h.repo.record_search_keyword("namsan").await.unwrap();
}

#[tokio::test]
async fn area_browse_is_always_remote_even_with_a_warm_cache() {
    let h = harness(Behavior::Places(vec![area_place("a1", "1", None)])).await;
    h.cache
        .save_places(&[area_place("warm", "1", None)])
        .await
        .unwrap();

    let result = h
        .repo
        .get_area_places(&area_query("1", vec![], 10))
        .await
        .unwrap();

    assert_eq!(result.origin, DataOrigin::Remote);
    assert_eq!(h.stub.call_count(), 1);
}

#[tokio::test]
async fn single_cat3_code_is_pushed_down_to_the_remote() {
    let h = harness(Behavior::Places(vec![area_place("a1", "1", Some("A01010100"))])).await;

    h.repo
        .get_area_places(&area_query("1", vec!["A01010100"], 10))
        .await
        .unwrap();

    let sent = h.stub.last_area_query.lock().unwrap().clone().unwrap();
    assert_eq!(sent.cat3, vec!["A01010100".to_string()]);
    assert_eq!(sent.num_of_rows, 10);
}

#[tokio::test]
async fn multiple_cat3_codes_request_a_superset_and_filter_locally() {
    let h = harness(Behavior::Places(vec![
        area_place("a1", "1", Some("A01010100")),
        area_place("a2", "1", Some("A01010200")),
        area_place("a3", "1", Some("A02020200")),
    ]))
    .await;

    let result = h
        .repo
        .get_area_places(&area_query("1", vec!["A01010100", "A01010200"], 10))
        .await
        .unwrap();

    let sent = h.stub.last_area_query.lock().unwrap().clone().unwrap();
    assert!(sent.cat3.is_empty());
    assert_eq!(sent.num_of_rows, 30);

    let ids: Vec<&str> = result.value.iter().map(|p| p.content_id.as_str()).collect();
    assert_eq!(ids, vec!["a1", "a2"]);
}

#[tokio::test]
async fn detail_is_cached_after_the_first_remote_hit() {
    let h = harness(Behavior::Places(vec![area_place("d1", "1", None)])).await;

    let first = h.repo.get_place_detail("d1").await.unwrap();
    assert_eq!(first.origin, DataOrigin::Remote);
    assert!(first.value.is_some());

    // Wait for the detached write-back, then expect a cache hit.
    let mut hit = false;
    for _ in 0..50 {
        if h
            .cache
            .get_place("d1", LISTING_TTL)
            .await
            .unwrap()
            .is_some()
        {
            hit = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(hit);

    let calls = h.stub.call_count();
    let second = h.repo.get_place_detail("d1").await.unwrap();
    assert_eq!(second.origin, DataOrigin::LocalCache);
    assert_eq!(h.stub.call_count(), calls);
}

#[tokio::test]
async fn nearby_serves_cached_places_in_radius_sorted_by_distance() {
    let h = harness(Behavior::Places(Vec::new())).await;
    // Around Seoul City Hall: ~100m, ~1km, and ~11km out.
    h.cache
        .save_places(&[
            located_place("mid", 126.9880, 37.5700),
            located_place("near", 126.9790, 37.5660),
            located_place("far", 127.1000, 37.6000),
        ])
        .await
        .unwrap();

    let result = h
        .repo
        .get_nearby_places(&location_query(126.9780, 37.5665, 2000, 10))
        .await
        .unwrap();

    assert_eq!(result.origin, DataOrigin::LocalCache);
    assert_eq!(h.stub.call_count(), 0);

    let ids: Vec<&str> = result.value.iter().map(|p| p.content_id.as_str()).collect();
    assert_eq!(ids, vec!["near", "mid"]);

    let distances: Vec<f64> = result.value.iter().map(|p| p.distance.unwrap()).collect();
    assert!(distances[0] < distances[1]);
    assert!(distances.iter().all(|d| *d <= 2000.0));
}

#[tokio::test]
async fn nearby_goes_remote_once_the_location_ttl_lapses() {
    let h = harness(Behavior::Places(vec![located_place(
        "fresh", 126.9780, 37.5665,
    )]))
    .await;
    h.cache
        .save_places(&[located_place("stale", 126.9790, 37.5660)])
        .await
        .unwrap();

    // Two hours old: past the one-hour location TTL.
    backdate_all(&h.db, 2 * 3600).await;

    let result = h
        .repo
        .get_nearby_places(&location_query(126.9780, 37.5665, 2000, 10))
        .await
        .unwrap();

    assert_eq!(result.origin, DataOrigin::Remote);
    assert_eq!(h.stub.call_count(), 1);
    assert_eq!(result.value[0].content_id, "fresh");
}

#[tokio::test]
async fn search_requires_a_network_when_offline() {
    let h = harness(Behavior::Places(Vec::new())).await;
    h.mode.enter_offline_mode();

    let query = SearchQuery {
        keyword: "palace".to_string(),
        area_code: None,
        content_type_id: None,
        page_no: 1,
        num_of_rows: 10,
    };
    assert!(matches!(
        h.repo.search_places(&query).await,
        Err(NadriError::NetworkRequired(_))
    ));
}

#[tokio::test]
async fn custom_places_get_generated_ids_and_persist_immediately() {
    let h = harness(Behavior::Places(Vec::new())).await;

    let place = h
        .repo
        .add_custom_place(
            "granddad's noodle shop",
            Some("Seoul somewhere".to_string()),
            Some(126.98),
            Some(37.56),
            Some(39),
        )
        .await
        .unwrap();

    assert!(place.content_id.starts_with("custom-"));
    assert!(place.is_custom);

    let stored = h
        .cache
        .get_place(&place.content_id, LISTING_TTL)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.title, "granddad's noodle shop");
    assert!(stored.is_custom);
}
