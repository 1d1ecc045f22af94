//! # Catalog Query Façade
//!
//! Composes prefix search across songs and artists into one result
//! list: songs first, then artists, each group ascending by its
//! normalized key. Both branches scan the denormalized lowercase
//! columns over the range `[key, key + U+10FFFF)`.

use crate::error::Result;
use crate::models::SearchResult;
use crate::normalize::{normalize, prefix_upper_bound};
use crate::repositories::{ArtistRepository, SongRepository};
use std::sync::Arc;
use tracing::{debug, warn};

/// Failure policy for the artist branch of a combined search.
///
/// The song branch always fails the whole call. Historically the
/// artist branch degraded silently instead; `BestEffort` preserves
/// that behavior, `AllFailFast` propagates both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchStrictness {
    /// Any branch failure fails the call.
    AllFailFast,
    /// Song failures fail the call; artist failures are logged and
    /// yield zero artist results.
    #[default]
    BestEffort,
}

/// Combined prefix search over songs and artists.
pub struct CatalogSearch {
    artists: Arc<dyn ArtistRepository>,
    songs: Arc<dyn SongRepository>,
    strictness: SearchStrictness,
}

impl CatalogSearch {
    /// Create a façade with the default (best-effort) policy.
    pub fn new(artists: Arc<dyn ArtistRepository>, songs: Arc<dyn SongRepository>) -> Self {
        Self::with_strictness(artists, songs, SearchStrictness::default())
    }

    /// Create a façade with an explicit failure policy.
    pub fn with_strictness(
        artists: Arc<dyn ArtistRepository>,
        songs: Arc<dyn SongRepository>,
        strictness: SearchStrictness,
    ) -> Self {
        Self {
            artists,
            songs,
            strictness,
        }
    }

    /// Run a prefix search. An empty query yields an empty result,
    /// not an error.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let key = normalize(query);
        if key.is_empty() {
            return Ok(Vec::new());
        }
        let upper = prefix_upper_bound(&key);

        debug!(key = %key, "Running combined prefix search");

        let mut results: Vec<SearchResult> = self
            .songs
            .search_prefix(&key, &upper)
            .await?
            .iter()
            .map(SearchResult::from_song)
            .collect();

        match self.artists.search_prefix(&key, &upper).await {
            Ok(artists) => {
                results.extend(artists.iter().map(SearchResult::from_artist));
            }
            Err(e) => match self.strictness {
                SearchStrictness::AllFailFast => return Err(e),
                SearchStrictness::BestEffort => {
                    warn!(error = %e, "Artist search branch failed, returning songs only");
                }
            },
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::error::CatalogError;
    use crate::models::{ArtistIdentity, ResultKind, Song};
    use crate::repositories::{ArtistRewrite, SqliteArtistRepository, SqliteSongRepository};
    use async_trait::async_trait;
    use mockall::mock;
    use uuid::Uuid;

    mock! {
        ArtistRepo {}

        #[async_trait]
        impl ArtistRepository for ArtistRepo {
            async fn find_by_id(&self, id: &str) -> Result<Option<ArtistIdentity>>;
            async fn find_by_search_name(&self, search_name: &str) -> Result<Option<ArtistIdentity>>;
            async fn insert(&self, artist: &ArtistIdentity) -> Result<()>;
            async fn list_all(&self) -> Result<Vec<ArtistIdentity>>;
            async fn search_prefix(&self, lower: &str, upper: &str) -> Result<Vec<ArtistIdentity>>;
            async fn apply_reconciliation(
                &self,
                deletions: &[String],
                rewrites: &[ArtistRewrite],
            ) -> Result<()>;
            async fn update_search_names(&self, updates: &[(String, String)]) -> Result<()>;
            async fn count(&self) -> Result<i64>;
        }
    }

    fn failing_artists() -> MockArtistRepo {
        let mut artists = MockArtistRepo::new();
        artists
            .expect_search_prefix()
            .returning(|_, _| Err(CatalogError::Database(sqlx::Error::PoolTimedOut)));
        artists
    }

    fn sample_song(title: &str) -> Song {
        Song {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            search_title: normalize(title),
            artist_names: vec!["Stephan Tudu".to_string()],
            artist_ids: vec!["artist-1".to_string()],
            file_name: "f.mp3".to_string(),
            file_url: "https://cdn.example/file/bucket/f.mp3".to_string(),
            cover_url: "https://cdn.example/cover.jpg".to_string(),
            duration_ms: 120_000,
            genre: "Pop".to_string(),
            created_year: "2024".to_string(),
            likes: 0,
            downloads: 0,
            play_count: 0,
            uploaded_at: 0,
            upload_user: "admin".to_string(),
        }
    }

    async fn setup() -> (CatalogSearch, Arc<SqliteArtistRepository>, Arc<SqliteSongRepository>) {
        let pool = create_test_pool().await.unwrap();
        let artists = Arc::new(SqliteArtistRepository::new(pool.clone()));
        let songs = Arc::new(SqliteSongRepository::new(pool));
        (
            CatalogSearch::new(artists.clone(), songs.clone()),
            artists,
            songs,
        )
    }

    #[tokio::test]
    async fn test_empty_query_yields_empty_result() {
        let (search, _, _) = setup().await;
        assert!(search.search("").await.unwrap().is_empty());
        assert!(search.search("   ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_songs_before_artists_each_ascending() {
        let (search, artists, songs) = setup().await;

        songs.insert(&sample_song("Happier 2")).await.unwrap();
        songs.insert(&sample_song("Happier")).await.unwrap();
        artists.insert(&ArtistIdentity::new("Happy Band")).await.unwrap();
        artists.insert(&ArtistIdentity::new("Hap")).await.unwrap();

        let results = search.search("hap").await.unwrap();
        let kinds: Vec<_> = results.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ResultKind::Song,
                ResultKind::Song,
                ResultKind::Artist,
                ResultKind::Artist
            ]
        );
        assert_eq!(results[0].title, "Happier");
        assert_eq!(results[1].title, "Happier 2");
        assert_eq!(results[2].title, "Hap");
        assert_eq!(results[3].title, "Happy Band");
    }

    #[tokio::test]
    async fn test_query_is_normalized_before_matching() {
        let (search, _, songs) = setup().await;

        songs.insert(&sample_song("Happier")).await.unwrap();

        let results = search.search("  HAPP  ").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Happier");
    }

    #[tokio::test]
    async fn test_prefix_only_no_substring_matches() {
        let (search, _, songs) = setup().await;

        songs.insert(&sample_song("Unhappy")).await.unwrap();

        let results = search.search("happ").await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_best_effort_degrades_to_songs_only() {
        let pool = create_test_pool().await.unwrap();
        let songs = Arc::new(SqliteSongRepository::new(pool));
        songs.insert(&sample_song("Happier")).await.unwrap();

        let search = CatalogSearch::new(Arc::new(failing_artists()), songs);

        let results = search.search("hap").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].kind, ResultKind::Song);
    }

    #[tokio::test]
    async fn test_fail_fast_propagates_artist_branch_failure() {
        let pool = create_test_pool().await.unwrap();
        let songs = Arc::new(SqliteSongRepository::new(pool));
        songs.insert(&sample_song("Happier")).await.unwrap();

        let search = CatalogSearch::with_strictness(
            Arc::new(failing_artists()),
            songs,
            SearchStrictness::AllFailFast,
        );

        let result = search.search("hap").await;
        assert!(matches!(result, Err(CatalogError::Database(_))));
    }

    #[tokio::test]
    async fn test_artist_projection_shape() {
        let (search, artists, _) = setup().await;

        artists.insert(&ArtistIdentity::new("Stephan Tudu")).await.unwrap();

        let results = search.search("stephan").await.unwrap();
        assert_eq!(results.len(), 1);
        let artist = &results[0];
        assert_eq!(artist.kind, ResultKind::Artist);
        assert_eq!(artist.artist_names, vec!["Stephan Tudu"]);
        assert!(artist.url.is_empty());
        assert_eq!(artist.duration, 0);
    }
}
