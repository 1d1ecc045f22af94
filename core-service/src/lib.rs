//! # Service Façade
//!
//! Composes the catalog, the identity-provider verifier, and the
//! object store into the operations the transport layer exposes:
//! upload and ingestion, streaming URLs, listing and search, account
//! registration, playlist management, and the privilege-gated
//! administrative passes. Transport (routing, wire formats) lives
//! outside this crate; everything here speaks in domain types.

pub mod config;
pub mod error;
pub mod telemetry;

pub use config::ServiceConfig;
pub use error::{Result, ServiceError};

use bytes::Bytes;
use core_auth::{RemoteTokenVerifier, TokenVerifier, VerifiedToken};
use core_catalog::db::{create_pool, DatabaseConfig};
use core_catalog::models::{Playlist, PlaylistEntry, SearchResult, Song, UserAccount};
use core_catalog::repositories::{
    SqliteArtistRepository, SqlitePlaylistRepository, SqliteSongRepository, SqliteUserRepository,
    UserRepository,
};
use core_catalog::{
    ArtistDirectory, BackfillReport, CatalogSearch, NewSong, PlaylistStore, ReconcileReport,
    SearchIndexMaintainer, SongCatalog,
};
pub use core_catalog::SearchStrictness;
use provider_b2::{object_key, B2ObjectStore, ObjectStore};
use serde::Serialize;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{info, warn};

/// Metadata and payload of an upload request.
#[derive(Debug, Clone, Default)]
pub struct SongUpload {
    /// Original file name; required, doubles as the object key
    pub file_name: String,
    /// Raw audio bytes
    pub data: Bytes,
    pub title: String,
    pub artist_names: Vec<String>,
    pub genre: String,
    pub created_year: String,
    pub cover_url: String,
    pub upload_user: String,
}

/// Result of a completed upload.
#[derive(Debug, Clone, Serialize)]
pub struct UploadOutcome {
    pub song_id: String,
    pub public_url: String,
    pub signed_url: String,
    pub file_name: String,
}

/// Result of account registration.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub uid: String,
    /// True when this call provisioned the account row
    pub created: bool,
}

/// The composed music catalog service.
pub struct MusicService {
    catalog: SongCatalog,
    directory: Arc<ArtistDirectory>,
    search: CatalogSearch,
    playlists: PlaylistStore,
    maintainer: SearchIndexMaintainer,
    users: Arc<dyn UserRepository>,
    verifier: Arc<dyn TokenVerifier>,
    store: Arc<dyn ObjectStore>,
    signed_url_ttl_secs: u32,
}

impl MusicService {
    /// Wire the service over an existing pool and collaborator seams.
    pub fn new(
        pool: SqlitePool,
        verifier: Arc<dyn TokenVerifier>,
        store: Arc<dyn ObjectStore>,
        signed_url_ttl_secs: u32,
        search_strictness: SearchStrictness,
    ) -> Self {
        let artists = Arc::new(SqliteArtistRepository::new(pool.clone()));
        let songs = Arc::new(SqliteSongRepository::new(pool.clone()));
        let playlist_repo = Arc::new(SqlitePlaylistRepository::new(pool.clone()));
        let users = Arc::new(SqliteUserRepository::new(pool));

        let directory = Arc::new(ArtistDirectory::new(artists.clone(), songs.clone()));
        let catalog = SongCatalog::new(songs.clone(), directory.clone());
        let search =
            CatalogSearch::with_strictness(artists.clone(), songs.clone(), search_strictness);
        let playlists = PlaylistStore::new(playlist_repo, songs.clone());
        let maintainer = SearchIndexMaintainer::new(artists, songs);

        Self {
            catalog,
            directory,
            search,
            playlists,
            maintainer,
            users,
            verifier,
            store,
            signed_url_ttl_secs,
        }
    }

    /// Bootstrap the service from configuration: open the database,
    /// run migrations, and construct the production collaborators.
    pub async fn from_config(config: ServiceConfig) -> Result<Self> {
        let pool = create_pool(DatabaseConfig::new(config.database_path.clone())).await?;
        let verifier = Arc::new(RemoteTokenVerifier::new(config.auth_verify_url)?);
        let store = Arc::new(B2ObjectStore::new(config.storage)?);
        Ok(Self::new(
            pool,
            verifier,
            store,
            config.signed_url_ttl_secs,
            config.search_strictness,
        ))
    }

    // --- Catalog ---

    /// Store the audio bytes, ingest the metadata, and return the
    /// locators. The object is stored before the metadata is written;
    /// a failure in between leaves an orphaned object, never a song
    /// without audio.
    pub async fn upload_song(&self, upload: SongUpload) -> Result<UploadOutcome> {
        if upload.file_name.trim().is_empty() {
            return Err(ServiceError::Validation("File name is required".to_string()));
        }

        let public_url = self.store.put_object(&upload.file_name, upload.data).await?;
        let signed_url = self
            .store
            .signed_url(&upload.file_name, self.signed_url_ttl_secs)
            .await?;

        let song_id = self
            .catalog
            .ingest(NewSong {
                title: upload.title,
                artist_names: upload.artist_names,
                genre: upload.genre,
                created_year: upload.created_year,
                file_name: upload.file_name.clone(),
                file_url: public_url.clone(),
                cover_url: upload.cover_url,
                duration_ms: 0,
                upload_user: upload.upload_user,
            })
            .await?;

        info!(song_id = %song_id, file_name = %upload.file_name, "Upload complete");

        Ok(UploadOutcome {
            song_id,
            public_url,
            signed_url,
            file_name: upload.file_name,
        })
    }

    /// Produce a short-lived signed URL for a stored object, given the
    /// public locator persisted on the song.
    pub async fn stream_url(&self, locator: &str) -> Result<String> {
        if locator.trim().is_empty() {
            return Err(ServiceError::Validation("File locator is required".to_string()));
        }

        let key = object_key(locator)?;
        Ok(self.store.signed_url(&key, self.signed_url_ttl_secs).await?)
    }

    /// All songs, newest upload first.
    pub async fn list_songs(&self) -> Result<Vec<Song>> {
        Ok(self.catalog.list_all().await?)
    }

    /// Prefix search over songs and artists.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        Ok(self.search.search(query).await?)
    }

    /// Songs referencing the given artist id.
    pub async fn songs_by_artist(&self, artist_id: &str) -> Result<Vec<Song>> {
        Ok(self.catalog.list_by_artist(artist_id).await?)
    }

    // --- Accounts ---

    /// Verify the token and provision an account row on first contact.
    pub async fn register(&self, token: &str) -> Result<Registration> {
        let claims = self.verifier.verify(token).await?;

        if self.users.find_by_uid(&claims.subject_id).await?.is_some() {
            return Ok(Registration {
                uid: claims.subject_id,
                created: false,
            });
        }

        let account = UserAccount {
            uid: claims.subject_id.clone(),
            email: claims.email,
            display_name: claims.display_name,
            created_at: chrono::Utc::now().timestamp(),
        };
        self.users.insert(&account).await?;
        info!(uid = %account.uid, "Account registered");

        Ok(Registration {
            uid: account.uid,
            created: true,
        })
    }

    /// Verify the token and return its claims. The token itself is the
    /// session credential; nothing is stored.
    pub async fn login(&self, token: &str) -> Result<VerifiedToken> {
        Ok(self.verifier.verify(token).await?)
    }

    // --- Playlists (token-gated) ---

    /// Create a playlist owned by the caller.
    pub async fn create_playlist(
        &self,
        token: &str,
        name: &str,
        description: &str,
    ) -> Result<String> {
        let claims = self.authenticate(token).await?;
        Ok(self
            .playlists
            .create(&claims.subject_id, name, description)
            .await?)
    }

    /// The caller's playlists, newest first.
    pub async fn playlists(&self, token: &str) -> Result<Vec<Playlist>> {
        let claims = self.authenticate(token).await?;
        Ok(self.playlists.list(&claims.subject_id).await?)
    }

    /// Snapshots in one of the caller's playlists, in insertion order.
    pub async fn playlist_entries(
        &self,
        token: &str,
        playlist_id: &str,
    ) -> Result<Vec<PlaylistEntry>> {
        let claims = self.authenticate(token).await?;
        Ok(self
            .playlists
            .entries(&claims.subject_id, playlist_id)
            .await?)
    }

    /// Snapshot a song into one of the caller's playlists. Returns
    /// false when the song was already present.
    pub async fn add_song_to_playlist(
        &self,
        token: &str,
        playlist_id: &str,
        song_id: &str,
    ) -> Result<bool> {
        let claims = self.authenticate(token).await?;
        Ok(self
            .playlists
            .add_song(&claims.subject_id, playlist_id, song_id)
            .await?)
    }

    // --- Administration (admin-gated) ---

    /// Run the artist-identity reconciliation pass. Idempotent and
    /// re-runnable; committed stages are never rolled back.
    pub async fn reconcile_artists(&self, token: &str) -> Result<ReconcileReport> {
        let claims = self.require_admin(token).await?;
        info!(subject = %claims.subject_id, "Running artist reconciliation");
        Ok(self.directory.reconcile().await?)
    }

    /// Recompute the derived search fields. Idempotent by value.
    pub async fn backfill_search_fields(&self, token: &str) -> Result<BackfillReport> {
        let claims = self.require_admin(token).await?;
        info!(subject = %claims.subject_id, "Running search-field backfill");
        Ok(self.maintainer.backfill_search_fields().await?)
    }

    /// Verify the token and make sure an account row exists for the
    /// subject, so first-time callers can use gated operations without
    /// an explicit registration round trip.
    async fn authenticate(&self, token: &str) -> Result<VerifiedToken> {
        let claims = self.verifier.verify(token).await?;

        if self.users.find_by_uid(&claims.subject_id).await?.is_none() {
            let account = UserAccount {
                uid: claims.subject_id.clone(),
                email: claims.email.clone(),
                display_name: claims.display_name.clone(),
                created_at: chrono::Utc::now().timestamp(),
            };
            self.users.insert(&account).await?;
        }

        Ok(claims)
    }

    async fn require_admin(&self, token: &str) -> Result<VerifiedToken> {
        let claims = self.verifier.verify(token).await?;
        if !claims.admin {
            warn!(subject = %claims.subject_id, "Administrative operation denied");
            return Err(ServiceError::Forbidden(
                "Administrator privileges required".to_string(),
            ));
        }
        Ok(claims)
    }
}
