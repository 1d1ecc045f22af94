//! Façade tests over an in-memory database with mocked collaborator
//! seams for the identity provider and the object store.

use bytes::Bytes;
use core_auth::{AuthError, TokenVerifier, VerifiedToken};
use core_catalog::db::create_test_pool;
use core_service::{MusicService, SearchStrictness, ServiceError, SongUpload};
use mockall::mock;
use provider_b2::{ObjectStore, StorageError};
use std::sync::Arc;

mock! {
    Verifier {}

    #[async_trait::async_trait]
    impl TokenVerifier for Verifier {
        async fn verify(&self, token: &str) -> core_auth::Result<VerifiedToken>;
    }
}

mock! {
    Store {}

    #[async_trait::async_trait]
    impl ObjectStore for Store {
        async fn put_object(&self, key: &str, data: Bytes) -> provider_b2::Result<String>;
        async fn signed_url(&self, key: &str, valid_secs: u32) -> provider_b2::Result<String>;
    }
}

fn member(uid: &str) -> VerifiedToken {
    VerifiedToken {
        subject_id: uid.to_string(),
        email: format!("{}@example.com", uid),
        display_name: uid.to_string(),
        admin: false,
    }
}

fn admin(uid: &str) -> VerifiedToken {
    VerifiedToken {
        admin: true,
        ..member(uid)
    }
}

async fn service(verifier: MockVerifier, store: MockStore) -> MusicService {
    let pool = create_test_pool().await.unwrap();
    MusicService::new(
        pool,
        Arc::new(verifier),
        Arc::new(store),
        3600,
        SearchStrictness::default(),
    )
}

fn upload_store() -> MockStore {
    let mut store = MockStore::new();
    store
        .expect_put_object()
        .returning(|key, _| Ok(format!("https://f001.example.com/file/music/{}", key)));
    store.expect_signed_url().returning(|key, _| {
        Ok(format!(
            "https://f001.example.com/file/music/{}?Authorization=tok",
            key
        ))
    });
    store
}

#[tokio::test]
async fn test_upload_then_stream() {
    let service = service(MockVerifier::new(), upload_store()).await;

    let outcome = service
        .upload_song(SongUpload {
            file_name: "happier.mp3".to_string(),
            data: Bytes::from_static(b"audio"),
            title: "Happier".to_string(),
            artist_names: vec!["Stephan Tudu".to_string()],
            ..SongUpload::default()
        })
        .await
        .unwrap();

    assert_eq!(outcome.file_name, "happier.mp3");
    assert_eq!(
        outcome.public_url,
        "https://f001.example.com/file/music/happier.mp3"
    );
    assert!(outcome.signed_url.contains("Authorization="));

    let songs = service.list_songs().await.unwrap();
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0].id, outcome.song_id);
    assert_eq!(songs[0].file_url, outcome.public_url);

    // The stored locator is enough to re-sign later.
    let url = service.stream_url(&outcome.public_url).await.unwrap();
    assert!(url.ends_with("happier.mp3?Authorization=tok"));
}

#[tokio::test]
async fn test_upload_requires_file_name() {
    let service = service(MockVerifier::new(), MockStore::new()).await;

    let result = service
        .upload_song(SongUpload {
            title: "Untitled".to_string(),
            ..SongUpload::default()
        })
        .await;

    assert!(matches!(result, Err(ServiceError::Validation(_))));
}

#[tokio::test]
async fn test_upload_surfaces_storage_outage() {
    let mut store = MockStore::new();
    store.expect_put_object().returning(|_, _| {
        Err(StorageError::Api {
            status: 503,
            message: "busy".to_string(),
        })
    });
    let service = service(MockVerifier::new(), store).await;

    let result = service
        .upload_song(SongUpload {
            file_name: "f.mp3".to_string(),
            ..SongUpload::default()
        })
        .await;

    assert!(matches!(result, Err(ServiceError::Upstream(_))));
    // Nothing was ingested.
    assert!(service.list_songs().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_register_provisions_once() {
    let mut verifier = MockVerifier::new();
    verifier
        .expect_verify()
        .times(2)
        .returning(|_| Ok(member("user-1")));
    let service = service(verifier, MockStore::new()).await;

    let first = service.register("token").await.unwrap();
    assert_eq!(first.uid, "user-1");
    assert!(first.created);

    let second = service.register("token").await.unwrap();
    assert!(!second.created);
}

#[tokio::test]
async fn test_invalid_token_is_unauthenticated() {
    let mut verifier = MockVerifier::new();
    verifier
        .expect_verify()
        .returning(|_| Err(AuthError::Unauthenticated("expired".to_string())));
    let service = service(verifier, MockStore::new()).await;

    let result = service.playlists("stale-token").await;
    assert!(matches!(result, Err(ServiceError::Unauthenticated(_))));
}

#[tokio::test]
async fn test_playlist_flow() {
    let mut verifier = MockVerifier::new();
    verifier.expect_verify().returning(|_| Ok(member("user-1")));
    let service = service(verifier, upload_store()).await;

    let song = service
        .upload_song(SongUpload {
            file_name: "tune.mp3".to_string(),
            title: "Tune".to_string(),
            ..SongUpload::default()
        })
        .await
        .unwrap();

    let playlist_id = service
        .create_playlist("token", "Road Trip", "long drives")
        .await
        .unwrap();

    assert!(service
        .add_song_to_playlist("token", &playlist_id, &song.song_id)
        .await
        .unwrap());
    // Re-adding the same song is a no-op.
    assert!(!service
        .add_song_to_playlist("token", &playlist_id, &song.song_id)
        .await
        .unwrap());

    let playlists = service.playlists("token").await.unwrap();
    assert_eq!(playlists.len(), 1);
    assert_eq!(playlists[0].name, "Road Trip");

    let entries = service
        .playlist_entries("token", &playlist_id)
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].snapshot.title, "Tune");
}

#[tokio::test]
async fn test_add_to_foreign_playlist_is_not_found() {
    let mut verifier = MockVerifier::new();
    // Two callers behind the same seam, distinguished by token.
    verifier
        .expect_verify()
        .returning(|token| Ok(member(token)));
    let service = service(verifier, upload_store()).await;

    let song = service
        .upload_song(SongUpload {
            file_name: "tune.mp3".to_string(),
            ..SongUpload::default()
        })
        .await
        .unwrap();

    let playlist_id = service.create_playlist("user-1", "Private", "").await.unwrap();

    let result = service
        .add_song_to_playlist("user-2", &playlist_id, &song.song_id)
        .await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn test_admin_operations_reject_members() {
    let mut verifier = MockVerifier::new();
    verifier.expect_verify().returning(|_| Ok(member("user-1")));
    let service = service(verifier, MockStore::new()).await;

    let result = service.reconcile_artists("token").await;
    assert!(matches!(result, Err(ServiceError::Forbidden(_))));

    let result = service.backfill_search_fields("token").await;
    assert!(matches!(result, Err(ServiceError::Forbidden(_))));
}

#[tokio::test]
async fn test_admin_operations_run_for_admins() {
    let mut verifier = MockVerifier::new();
    verifier.expect_verify().returning(|_| Ok(admin("root")));
    let service = service(verifier, upload_store()).await;

    service
        .upload_song(SongUpload {
            file_name: "tune.mp3".to_string(),
            title: "Tune".to_string(),
            artist_names: vec!["Someone".to_string()],
            ..SongUpload::default()
        })
        .await
        .unwrap();

    let report = service.reconcile_artists("token").await.unwrap();
    assert_eq!(report.artists_stabilized, 1);
    assert_eq!(report.duplicates_removed, 0);

    // Coverage counts: every record gets its search field rewritten.
    let backfill = service.backfill_search_fields("token").await.unwrap();
    assert_eq!(backfill.songs_updated, 1);
    assert_eq!(backfill.artists_updated, 1);
}

#[tokio::test]
async fn test_search_is_reachable_through_facade() {
    let mut verifier = MockVerifier::new();
    verifier.expect_verify().returning(|_| Ok(member("user-1")));
    let service = service(verifier, upload_store()).await;

    service
        .upload_song(SongUpload {
            file_name: "happier.mp3".to_string(),
            title: "Happier".to_string(),
            artist_names: vec!["Stephan Tudu".to_string()],
            ..SongUpload::default()
        })
        .await
        .unwrap();

    let results = service.search("hap").await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Happier");

    assert!(service.search("").await.unwrap().is_empty());
}
