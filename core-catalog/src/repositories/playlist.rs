//! Playlist repository trait and implementation
//!
//! Entries are immutable song snapshots keyed by `(playlist_id,
//! song_id)`; re-adding a song the playlist already contains is a
//! no-op enforced by the primary key rather than by structural
//! equality of the snapshot.

use crate::error::{CatalogError, Result};
use crate::models::{Playlist, PlaylistEntry, Song};
use async_trait::async_trait;
use sqlx::{query, query_as, SqlitePool};

/// Playlist repository interface for data access operations
#[async_trait]
pub trait PlaylistRepository: Send + Sync {
    /// Find a playlist by its ID
    ///
    /// # Returns
    /// - `Ok(Some(playlist))` if found
    /// - `Ok(None)` if not found
    /// - `Err` if database error occurs
    async fn find_by_id(&self, id: &str) -> Result<Option<Playlist>>;

    /// Insert a new playlist
    async fn insert(&self, playlist: &Playlist) -> Result<()>;

    /// List playlists owned by a user, newest first.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Playlist>>;

    /// Append a song snapshot to a playlist.
    ///
    /// # Returns
    /// - `Ok(true)` if the snapshot was added
    /// - `Ok(false)` if the song was already in the playlist (no-op)
    async fn add_entry(&self, playlist_id: &str, song: &Song, added_at: i64) -> Result<bool>;

    /// Snapshots in a playlist, in insertion order.
    async fn entries(&self, playlist_id: &str) -> Result<Vec<PlaylistEntry>>;

    /// Count total playlists
    async fn count(&self) -> Result<i64>;
}

/// SQLite implementation of PlaylistRepository
pub struct SqlitePlaylistRepository {
    pool: SqlitePool,
}

impl SqlitePlaylistRepository {
    /// Create a new SqlitePlaylistRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlaylistRepository for SqlitePlaylistRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Playlist>> {
        let playlist = query_as::<_, Playlist>("SELECT * FROM playlists WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(playlist)
    }

    async fn insert(&self, playlist: &Playlist) -> Result<()> {
        playlist.validate().map_err(|e| CatalogError::InvalidInput {
            field: "Playlist".to_string(),
            message: e,
        })?;

        query(
            r#"
            INSERT INTO playlists (id, owner_id, name, description, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&playlist.id)
        .bind(&playlist.owner_id)
        .bind(&playlist.name)
        .bind(&playlist.description)
        .bind(playlist.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Playlist>> {
        let playlists = query_as::<_, Playlist>(
            "SELECT * FROM playlists WHERE owner_id = ? ORDER BY created_at DESC, rowid DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(playlists)
    }

    async fn add_entry(&self, playlist_id: &str, song: &Song, added_at: i64) -> Result<bool> {
        let snapshot = serde_json::to_string(song).map_err(|e| CatalogError::InvalidInput {
            field: "snapshot".to_string(),
            message: e.to_string(),
        })?;

        // Position assignment and the dedup check ride on the same
        // statement so no second round trip can interleave.
        let result = query(
            r#"
            INSERT OR IGNORE INTO playlist_entries
                (playlist_id, song_id, added_at, snapshot, position)
            VALUES (
                ?, ?, ?, ?,
                (SELECT COUNT(*) FROM playlist_entries WHERE playlist_id = ?)
            )
            "#,
        )
        .bind(playlist_id)
        .bind(&song.id)
        .bind(added_at)
        .bind(&snapshot)
        .bind(playlist_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn entries(&self, playlist_id: &str) -> Result<Vec<PlaylistEntry>> {
        let entries = query_as::<_, PlaylistEntry>(
            r#"
            SELECT song_id, added_at, snapshot FROM playlist_entries
            WHERE playlist_id = ?
            ORDER BY position ASC
            "#,
        )
        .bind(playlist_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = query_as("SELECT COUNT(*) as count FROM playlists")
            .fetch_one(&self.pool)
            .await
            .map(|row: (i64,)| row.0)?;

        Ok(count)
    }
}
