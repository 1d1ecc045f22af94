//! # Song Catalog
//!
//! Owns song records and the ingestion path. Ingestion resolves every
//! artist name through the directory before the song is persisted, so
//! a song never carries a name without a stable id, though the two
//! writes are independent round trips: a crash in between leaves the
//! artist created and the song absent, which is safe because re-upload
//! re-resolves to the same identity.

use crate::directory::{ArtistDirectory, UNKNOWN_ARTIST};
use crate::error::Result;
use crate::models::Song;
use crate::normalize::normalize;
use crate::repositories::SongRepository;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Fallback genre label for uploads that leave the field empty.
const UNKNOWN_GENRE: &str = "Unknown";

/// Fallback uploader tag.
const DEFAULT_UPLOADER: &str = "admin";

/// Input for song ingestion. Locators come from the object-storage
/// collaborator; everything else is upload metadata.
#[derive(Debug, Clone, Default)]
pub struct NewSong {
    /// Display title; empty falls back to `file_name`
    pub title: String,
    /// Artist display names in upload order; empty falls back to
    /// the unknown-artist placeholder
    pub artist_names: Vec<String>,
    /// Genre label; empty falls back to "Unknown"
    pub genre: String,
    /// Release year; empty falls back to the current year
    pub created_year: String,
    /// Original upload file name
    pub file_name: String,
    /// Public locator of the stored audio object
    pub file_url: String,
    /// Cover art locator, may be empty
    pub cover_url: String,
    /// Duration in milliseconds, zero when unknown
    pub duration_ms: i64,
    /// Tag of the uploading user; empty falls back to "admin"
    pub upload_user: String,
}

/// Song catalog service.
pub struct SongCatalog {
    songs: Arc<dyn SongRepository>,
    directory: Arc<ArtistDirectory>,
}

impl SongCatalog {
    /// Create a catalog over the given repository and directory.
    pub fn new(songs: Arc<dyn SongRepository>, directory: Arc<ArtistDirectory>) -> Self {
        Self { songs, directory }
    }

    /// Ingest a new song, resolving or creating artist identities for
    /// every submitted name.
    ///
    /// Names are trimmed and empty entries skipped; the resulting
    /// `(name, id)` pairs keep upload order and are not deduplicated
    /// against each other. Returns the new song id. May create new
    /// artist identities as a side effect.
    pub async fn ingest(&self, new_song: NewSong) -> Result<String> {
        let title = if new_song.title.trim().is_empty() {
            new_song.file_name.clone()
        } else {
            new_song.title
        };

        let submitted_names = if new_song.artist_names.is_empty() {
            vec![UNKNOWN_ARTIST.to_string()]
        } else {
            new_song.artist_names
        };

        let genre = if new_song.genre.trim().is_empty() {
            UNKNOWN_GENRE.to_string()
        } else {
            new_song.genre
        };

        let created_year = if new_song.created_year.trim().is_empty() {
            chrono::Utc::now().format("%Y").to_string()
        } else {
            new_song.created_year
        };

        let upload_user = if new_song.upload_user.trim().is_empty() {
            DEFAULT_UPLOADER.to_string()
        } else {
            new_song.upload_user
        };

        debug!(title = %title, artists = submitted_names.len(), "Resolving artists for ingestion");

        let mut artist_names = Vec::with_capacity(submitted_names.len());
        let mut artist_ids = Vec::with_capacity(submitted_names.len());
        for name in &submitted_names {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let id = self.directory.resolve_or_create(name).await?;
            artist_names.push(name.to_string());
            artist_ids.push(id);
        }

        let song = Song {
            id: Uuid::new_v4().to_string(),
            search_title: normalize(&title),
            title,
            artist_names,
            artist_ids,
            file_name: new_song.file_name,
            file_url: new_song.file_url,
            cover_url: new_song.cover_url,
            duration_ms: new_song.duration_ms,
            genre,
            created_year,
            likes: 0,
            downloads: 0,
            play_count: 0,
            uploaded_at: chrono::Utc::now().timestamp(),
            upload_user,
        };

        self.songs.insert(&song).await?;
        info!(song_id = %song.id, title = %song.title, "Song ingested");

        Ok(song.id)
    }

    /// All songs, newest upload first.
    pub async fn list_all(&self) -> Result<Vec<Song>> {
        self.songs.list_all().await
    }

    /// Songs referencing the given canonical artist id, newest first.
    pub async fn list_by_artist(&self, artist_id: &str) -> Result<Vec<Song>> {
        self.songs.list_by_artist(artist_id).await
    }

    /// Look up one song.
    pub async fn find(&self, song_id: &str) -> Result<Option<Song>> {
        self.songs.find_by_id(song_id).await
    }
}
