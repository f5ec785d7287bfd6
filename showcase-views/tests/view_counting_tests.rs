//! End-to-end view counting: player -> HTTP client -> running service -> SQLite
//!
//! Each test starts the real router on an ephemeral port and drives it through
//! [`HttpViewStore`], the same way a browser tab would.

use std::sync::Arc;

use showcase_common::db::init_database;
use showcase_common::db::models::{NewVideo, ViewRecordRequest};
use showcase_views::gallery::{format_view_count, VideoGallery};
use showcase_views::session_id::SessionIdProvider;
use showcase_views::storage::MemoryStorage;
use showcase_views::store::{list_videos_or_empty, view_count_or_zero};
use showcase_views::tracker::WatchTracker;
use showcase_views::{
    build_router, AppState, Error, HttpViewStore, PlayerContext, PlayerSession, SqliteViewStore,
    ViewCountBus, ViewState, ViewStore,
};
use tempfile::TempDir;

fn catalog() -> Vec<NewVideo> {
    ["intro", "demo"]
        .into_iter()
        .map(|id| NewVideo {
            id: id.to_string(),
            title: format!("{} video", id),
            description: Some("showcase clip".to_string()),
            thumbnail_url: format!("https://cdn.example.com/{}.jpg", id),
            video_url: format!("https://cdn.example.com/{}.mp4", id),
            duration_seconds: 45,
        })
        .collect()
}

/// Start the service on 127.0.0.1:0 backed by a temp database; returns its base URL
async fn start_service(temp_dir: &TempDir) -> String {
    let pool = init_database(&temp_dir.path().join("showcase.db"))
        .await
        .expect("Should create database");
    let store = SqliteViewStore::new(pool, 3);
    store.seed(&catalog()).await.expect("Should seed catalog");

    let app = build_router(AppState::new(Arc::new(store), ViewCountBus::default()));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Should bind");
    let addr = listener.local_addr().expect("Should have address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server should run");
    });

    format!("http://{}", addr)
}

fn tab_context(store: Arc<HttpViewStore>, bus: ViewCountBus) -> PlayerContext {
    PlayerContext::new(
        store,
        bus,
        SessionIdProvider::for_tab(Arc::new(MemoryStorage::new())),
    )
}

#[tokio::test]
async fn test_http_store_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let base_url = start_service(&temp_dir).await;
    let store = HttpViewStore::new(&base_url).unwrap();

    let videos = store.list_videos().await.unwrap();
    assert_eq!(videos.len(), 2);

    let request = ViewRecordRequest::new("intro", "tab-a", 4.9);
    assert!(store.record_view(&request).await.unwrap());
    assert!(!store.record_view(&request).await.unwrap());
    assert_eq!(store.view_count("intro").await.unwrap(), 1);
    assert_eq!(store.view_count("demo").await.unwrap(), 0);
}

#[tokio::test]
async fn test_http_store_maps_errors() {
    let temp_dir = TempDir::new().unwrap();
    let base_url = start_service(&temp_dir).await;
    let store = HttpViewStore::new(&base_url).unwrap();

    let unknown = ViewRecordRequest::new("nope", "tab-a", 5.0);
    assert!(matches!(store.record_view(&unknown).await, Err(Error::NotFound(_))));
    assert!(matches!(store.view_count("nope").await, Err(Error::NotFound(_))));

    let anonymous = ViewRecordRequest::new("intro", "", 5.0);
    assert!(matches!(
        store.record_view(&anonymous).await,
        Err(Error::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_unreachable_service_degrades() {
    // Port 9 (discard) on localhost is not served by anything here
    let store = HttpViewStore::new("http://127.0.0.1:9").unwrap();

    assert!(list_videos_or_empty(&store).await.is_empty());
    assert_eq!(view_count_or_zero(&store, "intro").await, 0);
}

#[tokio::test]
async fn test_player_counts_once_per_tab() {
    let temp_dir = TempDir::new().unwrap();
    let base_url = start_service(&temp_dir).await;
    let store = Arc::new(HttpViewStore::new(&base_url).unwrap());
    let bus = ViewCountBus::default();
    let mut updates = bus.subscribe();
    let ctx = tab_context(store.clone(), bus);

    // Player mounted with three seconds already watched qualifies immediately
    let player = PlayerSession::open_with_tracker(&ctx, WatchTracker::resume("intro", 3, 3));
    let mut state = player.subscribe();
    let settled = *state.wait_for(|s| s.is_terminal()).await.unwrap();
    assert_eq!(settled, ViewState::Counted { view_count: 1 });

    let update = updates.recv().await.unwrap();
    assert_eq!(update.video_id, "intro");
    assert_eq!(update.view_count, 1);
    player.close();

    // Same tab, same video, second mount: the store says "already counted"
    let again = PlayerSession::open_with_tracker(&ctx, WatchTracker::resume("intro", 3, 3));
    let mut state = again.subscribe();
    let settled = *state.wait_for(|s| s.is_terminal()).await.unwrap();
    assert_eq!(settled, ViewState::NotCounted);
    again.close();

    assert_eq!(store.view_count("intro").await.unwrap(), 1);
}

#[tokio::test]
async fn test_separate_tabs_each_count_and_gallery_follows() {
    let temp_dir = TempDir::new().unwrap();
    let base_url = start_service(&temp_dir).await;
    let store = Arc::new(HttpViewStore::new(&base_url).unwrap());
    let bus = ViewCountBus::default();

    let mut gallery = VideoGallery::load(store.as_ref()).await;
    assert_eq!(gallery.get("demo").unwrap().view_count, 0);

    for _ in 0..2 {
        let ctx = tab_context(store.clone(), bus.clone());
        let player = PlayerSession::open_with_tracker(&ctx, WatchTracker::resume("demo", 3, 5));
        let mut state = player.subscribe();
        let settled = *state.wait_for(|s| s.is_terminal()).await.unwrap();
        assert!(matches!(settled, ViewState::Counted { .. }));
        player.close();
    }

    // Closing the player reloads the grid
    gallery.refresh(store.as_ref()).await;
    let demo = gallery.get("demo").unwrap();
    assert_eq!(demo.view_count, 2);
    assert_eq!(format_view_count(demo.view_count), "2");
}
