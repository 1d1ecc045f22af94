//! Song repository trait and implementation
//!
//! Songs carry their ordered artist arrays as JSON-encoded text
//! columns. Array-membership queries go through `json_each`, and the
//! reconciliation/backfill batches commit as single transactions.

use crate::error::{CatalogError, Result};
use crate::models::Song;
use async_trait::async_trait;
use sqlx::{query, query_as, SqlitePool};

/// A pending wholesale rewrite of one song's artist references.
#[derive(Debug, Clone)]
pub struct SongArtistRewrite {
    /// Song id
    pub id: String,
    /// Display names to re-persist (order preserved)
    pub artist_names: Vec<String>,
    /// Canonical ids, parallel to `artist_names`
    pub artist_ids: Vec<String>,
}

/// Song repository interface for data access operations
#[async_trait]
pub trait SongRepository: Send + Sync {
    /// Find a song by its ID
    ///
    /// # Returns
    /// - `Ok(Some(song))` if found
    /// - `Ok(None)` if not found
    /// - `Err` if database error occurs
    async fn find_by_id(&self, id: &str) -> Result<Option<Song>>;

    /// Insert a new song
    ///
    /// # Errors
    /// Returns error if a song with the same ID exists, validation
    /// fails, or a database error occurs.
    async fn insert(&self, song: &Song) -> Result<()>;

    /// List all songs, newest `uploaded_at` first.
    async fn list_all(&self) -> Result<Vec<Song>>;

    /// List songs whose `artist_ids` array contains the given id,
    /// newest first. Exact match; ids are canonical, no normalization.
    async fn list_by_artist(&self, artist_id: &str) -> Result<Vec<Song>>;

    /// Range scan over `search_title` in `[lower, upper)`, ascending.
    async fn search_prefix(&self, lower: &str, upper: &str) -> Result<Vec<Song>>;

    /// Enumerate every song in fixed (insertion) order, for
    /// maintenance passes.
    async fn enumerate_all(&self) -> Result<Vec<Song>>;

    /// Rewrite artist references for the given songs as one atomic
    /// commit. Names and ids are both re-persisted.
    async fn rewrite_artist_refs(&self, rewrites: &[SongArtistRewrite]) -> Result<()>;

    /// Rewrite `search_title` for the given `(id, search_title)` pairs
    /// as one atomic commit. Used by the search-field backfill.
    async fn update_search_titles(&self, updates: &[(String, String)]) -> Result<()>;

    /// Count total songs
    async fn count(&self) -> Result<i64>;
}

/// SQLite implementation of SongRepository
pub struct SqliteSongRepository {
    pool: SqlitePool,
}

impl SqliteSongRepository {
    /// Create a new SqliteSongRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn encode_json_array(values: &[String], field: &str) -> Result<String> {
    serde_json::to_string(values).map_err(|e| CatalogError::InvalidInput {
        field: field.to_string(),
        message: e.to_string(),
    })
}

#[async_trait]
impl SongRepository for SqliteSongRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Song>> {
        let song = query_as::<_, Song>("SELECT * FROM songs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(song)
    }

    async fn insert(&self, song: &Song) -> Result<()> {
        song.validate().map_err(|e| CatalogError::InvalidInput {
            field: "Song".to_string(),
            message: e,
        })?;

        query(
            r#"
            INSERT INTO songs (
                id, title, search_title, artist_names, artist_ids,
                file_name, file_url, cover_url, duration_ms, genre,
                created_year, likes, downloads, play_count, uploaded_at,
                upload_user
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&song.id)
        .bind(&song.title)
        .bind(&song.search_title)
        .bind(encode_json_array(&song.artist_names, "artist_names")?)
        .bind(encode_json_array(&song.artist_ids, "artist_ids")?)
        .bind(&song.file_name)
        .bind(&song.file_url)
        .bind(&song.cover_url)
        .bind(song.duration_ms)
        .bind(&song.genre)
        .bind(&song.created_year)
        .bind(song.likes)
        .bind(song.downloads)
        .bind(song.play_count)
        .bind(song.uploaded_at)
        .bind(&song.upload_user)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Song>> {
        let songs =
            query_as::<_, Song>("SELECT * FROM songs ORDER BY uploaded_at DESC, rowid DESC")
                .fetch_all(&self.pool)
                .await?;

        Ok(songs)
    }

    async fn list_by_artist(&self, artist_id: &str) -> Result<Vec<Song>> {
        let songs = query_as::<_, Song>(
            r#"
            SELECT * FROM songs
            WHERE EXISTS (
                SELECT 1 FROM json_each(songs.artist_ids)
                WHERE json_each.value = ?
            )
            ORDER BY uploaded_at DESC, rowid DESC
            "#,
        )
        .bind(artist_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(songs)
    }

    async fn search_prefix(&self, lower: &str, upper: &str) -> Result<Vec<Song>> {
        let songs = query_as::<_, Song>(
            r#"
            SELECT * FROM songs
            WHERE search_title >= ? AND search_title < ?
            ORDER BY search_title ASC
            "#,
        )
        .bind(lower)
        .bind(upper)
        .fetch_all(&self.pool)
        .await?;

        Ok(songs)
    }

    async fn enumerate_all(&self) -> Result<Vec<Song>> {
        let songs = query_as::<_, Song>("SELECT * FROM songs ORDER BY rowid ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(songs)
    }

    async fn rewrite_artist_refs(&self, rewrites: &[SongArtistRewrite]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for rewrite in rewrites {
            query("UPDATE songs SET artist_names = ?, artist_ids = ? WHERE id = ?")
                .bind(encode_json_array(&rewrite.artist_names, "artist_names")?)
                .bind(encode_json_array(&rewrite.artist_ids, "artist_ids")?)
                .bind(&rewrite.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await.map_err(|e| CatalogError::BatchCommit {
            stage: "song reference migration".to_string(),
            message: e.to_string(),
        })?;

        Ok(())
    }

    async fn update_search_titles(&self, updates: &[(String, String)]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for (id, search_title) in updates {
            query("UPDATE songs SET search_title = ? WHERE id = ?")
                .bind(search_title)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await.map_err(|e| CatalogError::BatchCommit {
            stage: "song search-title backfill".to_string(),
            message: e.to_string(),
        })?;

        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = query_as("SELECT COUNT(*) as count FROM songs")
            .fetch_one(&self.pool)
            .await
            .map(|row: (i64,)| row.0)?;

        Ok(count)
    }
}
