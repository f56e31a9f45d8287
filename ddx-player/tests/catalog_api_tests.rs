//! HttpCatalogApi against a local REST API stand-in

mod helpers;

use ddx_common::events::{QueueBus, QueueEvent};
use ddx_common::models::SourceKey;
use ddx_player::api::{CatalogApi, HttpCatalogApi};
use ddx_player::{Error, Player};
use helpers::TestServer;
use std::sync::Arc;
use std::time::Duration;

fn client(server: &TestServer) -> HttpCatalogApi {
    HttpCatalogApi::new(server.base_url(), Duration::from_secs(5)).expect("client")
}

#[tokio::test]
async fn test_preview_url_endpoint() {
    let server = TestServer::start().await;
    let api = client(&server);

    let url = api.preview_url("b1").await.unwrap();
    assert_eq!(url, "https://cdn.test/b1.mp3?sig=1");
}

#[tokio::test]
async fn test_ids_are_percent_encoded_in_path() {
    let server = TestServer::start().await;
    let api = client(&server);

    let url = api.preview_url("lo-fi beat#2").await.unwrap();
    assert_eq!(url, "https://cdn.test/lo-fi beat#2.mp3?sig=1");

    let url = api.preview_url("what?now").await.unwrap();
    assert_eq!(url, "https://cdn.test/what?now.mp3?sig=1");

    let tracks = api.kit_preview_playlist("808 kit").await.unwrap();
    assert_eq!(tracks[0].id, "808 kit-1");
}

#[tokio::test]
async fn test_error_status_maps_to_api_error() {
    let server = TestServer::start().await;
    let api = client(&server);

    match api.preview_url("broken").await {
        Err(Error::Api { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "signing failed");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_trailing_slash_in_base_url() {
    let server = TestServer::start().await;
    let api = HttpCatalogApi::new(format!("{}/", server.base_url()), Duration::from_secs(5)).unwrap();

    assert_eq!(api.base_url(), server.base_url());
    assert!(api.preview_url("b1").await.is_ok());
}

#[tokio::test]
async fn test_pack_playlist_tolerates_nulls() {
    let server = TestServer::start().await;
    let api = client(&server);

    let tracks = api.pack_preview_playlist("p1").await.unwrap();
    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].id, "p1-1");
    assert_eq!(tracks[0].duration_in_seconds, 30.0);
    assert_eq!(tracks[1].artist_name, "");
    assert_eq!(tracks[1].preview_url, "");
}

#[tokio::test]
async fn test_cache_repairs_double_encoded_url_from_server() {
    let server = TestServer::start().await;
    let bus = QueueBus::new(16);
    let player = Player::new(Arc::new(client(&server)), bus);

    let url = player.cache().get("double", false).await;
    assert_eq!(url.as_deref(), Some("https://cdn.test/previews%2Fdouble.mp3?sig=1"));
}

#[tokio::test]
async fn test_play_kit_over_http_drops_unplayable() {
    let server = TestServer::start().await;
    let bus = QueueBus::new(16);
    let mut rx = bus.subscribe();
    let player = Player::new(Arc::new(client(&server)), bus);

    let list = player.play_kit("k1").await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].id, "k1-1");

    match rx.recv().await.unwrap() {
        QueueEvent::PlayList {
            list,
            index,
            source_key,
        } => {
            assert_eq!(index, 0);
            assert_eq!(source_key, SourceKey::kit("k1"));
            assert_eq!(list.len(), 1);
        }
        other => panic!("expected play-list, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_pack_is_no_playable_items() {
    let server = TestServer::start().await;
    let bus = QueueBus::new(16);
    let mut rx = bus.subscribe();
    let player = Player::new(Arc::new(client(&server)), bus);

    let result = player.play_pack("missing").await;
    assert!(matches!(result, Err(Error::NoPlayableItems(_))));
    assert!(rx.try_recv().is_err());
}
