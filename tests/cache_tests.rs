mod common;

use common::{backdate_all, festival_place, harness, place, Behavior};
use nadri::domain::model::PlaceFilter;
use nadri::infrastructure::storage::cache::{DETAIL_TTL, LISTING_TTL};
use nadri::infrastructure::storage::PlaceCache;

#[tokio::test]
async fn fresh_rows_are_served_within_ttl() {
    let h = harness(Behavior::Places(Vec::new())).await;
    h.cache
        .save_places(&[festival_place("f1", "1"), festival_place("f2", "1")])
        .await
        .unwrap();

    let filter = PlaceFilter {
        area_code: Some("1".to_string()),
        ..Default::default()
    };
    let places = h.cache.get_places(&filter, LISTING_TTL).await.unwrap();
    assert_eq!(places.len(), 2);
}

#[tokio::test]
async fn aged_rows_fall_out_of_ttl() {
    let h = harness(Behavior::Places(Vec::new())).await;
    h.cache
        .save_places(&[festival_place("f1", "1")])
        .await
        .unwrap();

    // Four hours old: past the three-hour listing TTL, inside the
    // seven-day detail TTL.
    backdate_all(&h.db, 4 * 3600).await;

    let filter = PlaceFilter::default();
    assert!(h
        .cache
        .get_places(&filter, LISTING_TTL)
        .await
        .unwrap()
        .is_empty());
    assert!(h.cache.get_place("f1", DETAIL_TTL).await.unwrap().is_some());
}

#[tokio::test]
async fn upsert_refreshes_fields_but_keeps_favorite_flag() {
    let h = harness(Behavior::Places(Vec::new())).await;
    h.cache
        .save_places(&[place("p1", "old title")])
        .await
        .unwrap();
    h.cache.toggle_favorite("p1").await.unwrap();

    // A re-fetch from the remote arrives without the local flag.
    h.cache
        .save_places(&[place("p1", "new title")])
        .await
        .unwrap();

    let stored = h
        .cache
        .get_place("p1", LISTING_TTL)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.title, "new title");
    assert!(stored.is_favorite);
}

#[tokio::test]
async fn empty_content_id_is_never_persisted() {
    let h = harness(Behavior::Places(Vec::new())).await;
    h.cache
        .save_places(&[place("", "ghost"), place("real", "kept")])
        .await
        .unwrap();

    let places = h
        .cache
        .get_places(&PlaceFilter::default(), LISTING_TTL)
        .await
        .unwrap();
    assert_eq!(places.len(), 1);
    assert_eq!(places[0].content_id, "real");
}

#[tokio::test]
async fn sweep_spares_favorites_regardless_of_age() {
    let h = harness(Behavior::Places(Vec::new())).await;
    h.cache
        .save_places(&[place("stale", "stale"), place("kept", "kept")])
        .await
        .unwrap();
    h.cache.toggle_favorite("kept").await.unwrap();

    backdate_all(&h.db, 8 * 24 * 3600).await;

    let removed = h.cache.clear_expired().await.unwrap();
    assert_eq!(removed, 1);

    let favorites = h.cache.get_favorites().await.unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].content_id, "kept");
}

#[tokio::test]
async fn clear_all_keeps_only_favorites() {
    let h = harness(Behavior::Places(Vec::new())).await;
    h.cache
        .save_places(&[place("a", "a"), place("b", "b")])
        .await
        .unwrap();
    h.cache.toggle_favorite("a").await.unwrap();

    let removed = h.cache.clear_all().await.unwrap();
    assert_eq!(removed, 1);
    assert!(h.cache.get_place("a", LISTING_TTL).await.unwrap().is_some());
}

#[tokio::test]
async fn favoriting_an_uncached_id_creates_a_placeholder() {
    let h = harness(Behavior::Places(Vec::new())).await;

    let now_favored = h.cache.toggle_favorite("never-seen").await.unwrap();
    assert!(now_favored);

    let favorites = h.cache.get_favorites().await.unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].content_id, "never-seen");
    assert_eq!(favorites[0].title, "");

    let un_favored = h.cache.toggle_favorite("never-seen").await.unwrap();
    assert!(!un_favored);
    assert!(h.cache.get_favorites().await.unwrap().is_empty());
}

#[tokio::test]
async fn cache_validity_probe_respects_ttl() {
    let h = harness(Behavior::Places(Vec::new())).await;
    h.cache.save_places(&[place("p1", "t")]).await.unwrap();

    assert!(h.cache.is_cache_valid("p1", LISTING_TTL).await.unwrap());
    assert!(!h.cache.is_cache_valid("missing", LISTING_TTL).await.unwrap());

    backdate_all(&h.db, 4 * 3600).await;
    assert!(!h.cache.is_cache_valid("p1", LISTING_TTL).await.unwrap());
}

#[tokio::test]
async fn favorites_watch_publishes_every_mutation() {
    let h = harness(Behavior::Places(Vec::new())).await;
    let mut rx = h.cache.watch_favorites().await.unwrap();
    assert!(rx.borrow_and_update().is_empty());

    h.cache.toggle_favorite("w1").await.unwrap();
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().len(), 1);

    h.cache.toggle_favorite("w1").await.unwrap();
    rx.changed().await.unwrap();
    assert!(rx.borrow_and_update().is_empty());
}

#[tokio::test]
async fn favorites_watch_starts_with_the_persisted_snapshot() {
    let h = harness(Behavior::Places(Vec::new())).await;
    h.cache.toggle_favorite("w1").await.unwrap();

    // A fresh handle over the same store, as after a process restart.
    let reopened = PlaceCache::new(h.db.clone());
    let mut rx = reopened.watch_favorites().await.unwrap();

    let snapshot = rx.borrow_and_update().clone();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].content_id, "w1");
}
