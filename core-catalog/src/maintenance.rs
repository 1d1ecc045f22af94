//! # Search Index Maintainer
//!
//! Keeps the denormalized lowercase search fields in sync with the
//! display fields, across the whole catalog. Backfill is the repair
//! for drift (records written before the search fields existed, or by
//! writers that skipped them) and is idempotent by value: a second run
//! with no intervening edits rewrites every field to the value it
//! already holds.

use crate::error::Result;
use crate::normalize::normalize;
use crate::repositories::{ArtistRepository, SongRepository};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Outcome of a search-field backfill pass.
///
/// Counts report coverage (records whose search field was written),
/// not change: an idempotent re-run reports the same counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillReport {
    pub songs_updated: usize,
    pub artists_updated: usize,
}

/// Maintains denormalized search fields on songs and artists.
pub struct SearchIndexMaintainer {
    artists: Arc<dyn ArtistRepository>,
    songs: Arc<dyn SongRepository>,
}

impl SearchIndexMaintainer {
    /// Create a maintainer over the given repositories.
    pub fn new(artists: Arc<dyn ArtistRepository>, songs: Arc<dyn SongRepository>) -> Self {
        Self { artists, songs }
    }

    /// Recompute `search_title` for every song and `search_name` for
    /// every artist. Each entity class commits as one atomic batch;
    /// a failure on the artist batch leaves the committed song batch
    /// in place (the pass converges on re-run).
    pub async fn backfill_search_fields(&self) -> Result<BackfillReport> {
        info!("Starting search field backfill");

        let songs = self.songs.enumerate_all().await?;
        let song_updates: Vec<(String, String)> = songs
            .into_iter()
            .map(|song| (song.id, normalize(&song.title)))
            .collect();
        let songs_updated = song_updates.len();
        self.songs.update_search_titles(&song_updates).await?;

        let artists = self.artists.list_all().await?;
        let artist_updates: Vec<(String, String)> = artists
            .into_iter()
            .map(|artist| (artist.id, normalize(&artist.name)))
            .collect();
        let artists_updated = artist_updates.len();
        self.artists.update_search_names(&artist_updates).await?;

        info!(songs_updated, artists_updated, "Search field backfill committed");

        Ok(BackfillReport {
            songs_updated,
            artists_updated,
        })
    }
}
