//! Domain models for the music catalog
//!
//! Rich domain models with validation and database mapping. Songs and
//! playlist entries carry ordered multi-artist arrays and denormalized
//! snapshots, which are persisted as JSON-encoded text columns and
//! decoded by hand in the `FromRow` implementations.

use crate::normalize::normalize;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use uuid::Uuid;

/// Decode a JSON-encoded `TEXT` column into a string array.
fn json_string_array(row: &SqliteRow, column: &str) -> Result<Vec<String>, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    serde_json::from_str(&raw).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

/// Canonical artist identity.
///
/// At most one identity exists per distinct `search_name` once a
/// reconciliation pass has run. `id` is the only value song records
/// ever reference; the display `name` keeps its first-writer casing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ArtistIdentity {
    /// Stable unique identifier referenced by songs
    pub id: String,
    /// Display name, original casing preserved
    pub name: String,
    /// Normalized name, the deduplication and search key
    pub search_name: String,
    /// Profile image locator, empty when unset
    pub profile_image: String,
    /// Creation time, Unix seconds
    pub created_at: i64,
}

impl ArtistIdentity {
    /// Create a new identity for a display name, minting a fresh id.
    pub fn new(display_name: &str) -> Self {
        let name = display_name.trim().to_string();
        let search_name = normalize(&name);
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            search_name,
            profile_image: String::new(),
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Validate identity data
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Artist name cannot be empty".to_string());
        }
        if self.search_name != normalize(&self.name) {
            return Err("Artist search name is out of sync with display name".to_string());
        }
        Ok(())
    }
}

/// Song record with denormalized artist names and search title.
///
/// `artist_ids` is parallel to `artist_names`: position `i` of one
/// describes position `i` of the other. The reconciliation pass may
/// rewrite both arrays wholesale; nothing else mutates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    /// Unique identifier
    pub id: String,
    /// Display title
    pub title: String,
    /// Normalized title for prefix search
    pub search_title: String,
    /// Ordered artist display names (not deduplicated)
    pub artist_names: Vec<String>,
    /// Ordered stable artist ids, parallel to `artist_names`
    pub artist_ids: Vec<String>,
    /// Original upload file name
    pub file_name: String,
    /// Public locator of the stored audio object
    pub file_url: String,
    /// Cover art locator, empty when unset
    pub cover_url: String,
    /// Duration in milliseconds
    pub duration_ms: i64,
    /// Genre label
    pub genre: String,
    /// Release year as supplied at upload time
    pub created_year: String,
    // Counters
    pub likes: i64,
    pub downloads: i64,
    pub play_count: i64,
    /// Upload time, Unix seconds
    pub uploaded_at: i64,
    /// Tag of the uploading user
    pub upload_user: String,
}

impl Song {
    /// Validate song data
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Song title cannot be empty".to_string());
        }
        if self.artist_ids.len() != self.artist_names.len() {
            return Err(format!(
                "Artist id count {} does not match artist name count {}",
                self.artist_ids.len(),
                self.artist_names.len()
            ));
        }
        if self.likes < 0 || self.downloads < 0 || self.play_count < 0 {
            return Err("Song counters cannot be negative".to_string());
        }
        Ok(())
    }
}

impl FromRow<'_, SqliteRow> for Song {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            search_title: row.try_get("search_title")?,
            artist_names: json_string_array(row, "artist_names")?,
            artist_ids: json_string_array(row, "artist_ids")?,
            file_name: row.try_get("file_name")?,
            file_url: row.try_get("file_url")?,
            cover_url: row.try_get("cover_url")?,
            duration_ms: row.try_get("duration_ms")?,
            genre: row.try_get("genre")?,
            created_year: row.try_get("created_year")?,
            likes: row.try_get("likes")?,
            downloads: row.try_get("downloads")?,
            play_count: row.try_get("play_count")?,
            uploaded_at: row.try_get("uploaded_at")?,
            upload_user: row.try_get("upload_user")?,
        })
    }
}

/// Playlist owned by exactly one user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Playlist {
    /// Unique identifier
    pub id: String,
    /// Owning user id
    pub owner_id: String,
    /// Playlist name
    pub name: String,
    /// Description, empty when unset
    pub description: String,
    /// Creation time, Unix seconds
    pub created_at: i64,
}

impl Playlist {
    /// Create a new playlist for an owner
    pub fn new(owner_id: String, name: String, description: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id,
            name,
            description,
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Validate playlist data
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Playlist name cannot be empty".to_string());
        }
        if self.owner_id.trim().is_empty() {
            return Err("Playlist owner cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Immutable song snapshot inside a playlist.
///
/// Keyed by `(song_id, added_at)`; the snapshot is a copy of the song
/// at the time of addition and does not track later edits. Membership
/// is deduplicated on `song_id` alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    /// Id of the source song at snapshot time
    pub song_id: String,
    /// When the snapshot was taken, Unix seconds
    pub added_at: i64,
    /// Denormalized copy of the song
    pub snapshot: Song,
}

impl FromRow<'_, SqliteRow> for PlaylistEntry {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let raw: String = row.try_get("snapshot")?;
        let snapshot = serde_json::from_str(&raw).map_err(|e| sqlx::Error::ColumnDecode {
            index: "snapshot".to_string(),
            source: Box::new(e),
        })?;
        Ok(Self {
            song_id: row.try_get("song_id")?,
            added_at: row.try_get("added_at")?,
            snapshot,
        })
    }
}

/// User account provisioned on first registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserAccount {
    /// Subject id assigned by the identity provider
    pub uid: String,
    /// Email claim, empty when the provider did not supply one
    pub email: String,
    /// Display name claim
    pub display_name: String,
    /// Creation time, Unix seconds
    pub created_at: i64,
}

/// Kind discriminator for unified search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Song,
    Artist,
}

/// Unified search result row returned by the catalog query façade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub artist_names: Vec<String>,
    pub artwork: String,
    pub url: String,
    pub duration: i64,
    #[serde(rename = "type")]
    pub kind: ResultKind,
}

impl SearchResult {
    /// Map a song record to its search-result projection.
    pub fn from_song(song: &Song) -> Self {
        Self {
            id: song.id.clone(),
            title: song.title.clone(),
            artist_names: song.artist_names.clone(),
            artwork: song.cover_url.clone(),
            url: song.file_url.clone(),
            duration: song.duration_ms,
            kind: ResultKind::Song,
        }
    }

    /// Map an artist identity to its search-result projection.
    ///
    /// Artists have no playable locator, so `url` is empty and
    /// `duration` is zero.
    pub fn from_artist(artist: &ArtistIdentity) -> Self {
        Self {
            id: artist.id.clone(),
            title: artist.name.clone(),
            artist_names: vec![artist.name.clone()],
            artwork: artist.profile_image.clone(),
            url: String::new(),
            duration: 0,
            kind: ResultKind::Artist,
        }
    }
}
