//! # Playlist Store
//!
//! Per-user ordered collections of song snapshots. A snapshot is a
//! copy of the song at the time of addition and never tracks later
//! edits; membership is deduplicated on the song id, so re-adding a
//! song is a no-op, even after its counters moved.

use crate::error::{CatalogError, Result};
use crate::models::{Playlist, PlaylistEntry};
use crate::repositories::{PlaylistRepository, SongRepository};
use std::sync::Arc;
use tracing::{debug, info};

/// Playlist service enforcing ownership and snapshot semantics.
pub struct PlaylistStore {
    playlists: Arc<dyn PlaylistRepository>,
    songs: Arc<dyn SongRepository>,
}

impl PlaylistStore {
    /// Create a store over the given repositories.
    pub fn new(playlists: Arc<dyn PlaylistRepository>, songs: Arc<dyn SongRepository>) -> Self {
        Self { playlists, songs }
    }

    /// Create a playlist for an owner. The name is required.
    pub async fn create(
        &self,
        owner_id: &str,
        name: &str,
        description: &str,
    ) -> Result<String> {
        let playlist = Playlist::new(
            owner_id.to_string(),
            name.to_string(),
            description.to_string(),
        );
        self.playlists.insert(&playlist).await?;
        info!(playlist_id = %playlist.id, owner = owner_id, "Playlist created");
        Ok(playlist.id)
    }

    /// Playlists owned by a user, newest first.
    pub async fn list(&self, owner_id: &str) -> Result<Vec<Playlist>> {
        self.playlists.list_by_owner(owner_id).await
    }

    /// Snapshots in one of the owner's playlists, in insertion order.
    pub async fn entries(&self, owner_id: &str, playlist_id: &str) -> Result<Vec<PlaylistEntry>> {
        self.owned_playlist(owner_id, playlist_id).await?;
        self.playlists.entries(playlist_id).await
    }

    /// Snapshot a song into one of the owner's playlists.
    ///
    /// # Returns
    /// - `Ok(true)` if the song was added
    /// - `Ok(false)` if it was already in the playlist (no-op)
    ///
    /// # Errors
    /// `NotFound` if the song or the playlist is absent, or the
    /// playlist belongs to another user.
    pub async fn add_song(
        &self,
        owner_id: &str,
        playlist_id: &str,
        song_id: &str,
    ) -> Result<bool> {
        self.owned_playlist(owner_id, playlist_id).await?;

        let song = self
            .songs
            .find_by_id(song_id)
            .await?
            .ok_or_else(|| CatalogError::NotFound {
                entity_type: "Song".to_string(),
                id: song_id.to_string(),
            })?;

        let added = self
            .playlists
            .add_entry(playlist_id, &song, chrono::Utc::now().timestamp())
            .await?;

        if added {
            info!(playlist_id, song_id, "Song added to playlist");
        } else {
            debug!(playlist_id, song_id, "Song already in playlist, no-op");
        }

        Ok(added)
    }

    /// Fetch a playlist and check it belongs to the caller. A playlist
    /// owned by another user is reported as absent, not as forbidden.
    async fn owned_playlist(&self, owner_id: &str, playlist_id: &str) -> Result<Playlist> {
        let playlist = self
            .playlists
            .find_by_id(playlist_id)
            .await?
            .filter(|p| p.owner_id == owner_id)
            .ok_or_else(|| CatalogError::NotFound {
                entity_type: "Playlist".to_string(),
                id: playlist_id.to_string(),
            })?;

        Ok(playlist)
    }
}
