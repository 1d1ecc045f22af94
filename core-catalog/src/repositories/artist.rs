//! Artist repository trait and implementation

use crate::error::{CatalogError, Result};
use crate::models::ArtistIdentity;
use async_trait::async_trait;
use sqlx::{query, query_as, SqlitePool};

/// A pending rewrite of one artist record during a reconciliation pass.
///
/// `canonical_id` may differ from `current_id` when the existing key
/// failed the stability check and a fresh id was minted. Only the id,
/// display name, and creation time are rewritten; other fields merge
/// through unchanged.
#[derive(Debug, Clone)]
pub struct ArtistRewrite {
    /// Id the record is currently stored under
    pub current_id: String,
    /// Canonical id the record must end up with
    pub canonical_id: String,
    /// Display name to persist
    pub name: String,
    /// Refreshed creation time, Unix seconds
    pub created_at: i64,
}

/// Artist repository interface for data access operations
#[async_trait]
pub trait ArtistRepository: Send + Sync {
    /// Find an artist by its ID
    ///
    /// # Returns
    /// - `Ok(Some(artist))` if found
    /// - `Ok(None)` if not found
    /// - `Err` if database error occurs
    async fn find_by_id(&self, id: &str) -> Result<Option<ArtistIdentity>>;

    /// Find an artist by its normalized search name
    ///
    /// This is the lookup the resolve-or-create path uses; the caller
    /// must derive `search_name` with the normalization utility.
    async fn find_by_search_name(&self, search_name: &str) -> Result<Option<ArtistIdentity>>;

    /// Insert a new artist identity
    ///
    /// # Errors
    /// Returns error if an artist with the same ID exists, validation
    /// fails, or a database error occurs.
    async fn insert(&self, artist: &ArtistIdentity) -> Result<()>;

    /// List all artists in fixed enumeration order (insertion order).
    ///
    /// The reconciliation pass depends on this order being stable
    /// across consecutive runs with no intervening writes.
    async fn list_all(&self) -> Result<Vec<ArtistIdentity>>;

    /// Range scan over `search_name` in `[lower, upper)`, ascending.
    async fn search_prefix(&self, lower: &str, upper: &str) -> Result<Vec<ArtistIdentity>>;

    /// Apply a reconciliation batch: delete the given ids and rewrite
    /// the given records, all in one atomic commit.
    async fn apply_reconciliation(
        &self,
        deletions: &[String],
        rewrites: &[ArtistRewrite],
    ) -> Result<()>;

    /// Rewrite `search_name` for the given `(id, search_name)` pairs
    /// as one atomic commit. Used by the search-field backfill.
    async fn update_search_names(&self, updates: &[(String, String)]) -> Result<()>;

    /// Count total artists
    async fn count(&self) -> Result<i64>;
}

/// SQLite implementation of ArtistRepository
pub struct SqliteArtistRepository {
    pool: SqlitePool,
}

impl SqliteArtistRepository {
    /// Create a new SqliteArtistRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArtistRepository for SqliteArtistRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<ArtistIdentity>> {
        let artist = query_as::<_, ArtistIdentity>("SELECT * FROM artists WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(artist)
    }

    async fn find_by_search_name(&self, search_name: &str) -> Result<Option<ArtistIdentity>> {
        let artist =
            query_as::<_, ArtistIdentity>("SELECT * FROM artists WHERE search_name = ? LIMIT 1")
                .bind(search_name)
                .fetch_optional(&self.pool)
                .await?;

        Ok(artist)
    }

    async fn insert(&self, artist: &ArtistIdentity) -> Result<()> {
        artist.validate().map_err(|e| CatalogError::InvalidInput {
            field: "ArtistIdentity".to_string(),
            message: e,
        })?;

        query(
            r#"
            INSERT INTO artists (id, name, search_name, profile_image, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&artist.id)
        .bind(&artist.name)
        .bind(&artist.search_name)
        .bind(&artist.profile_image)
        .bind(artist.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<ArtistIdentity>> {
        let artists = query_as::<_, ArtistIdentity>("SELECT * FROM artists ORDER BY rowid ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(artists)
    }

    async fn search_prefix(&self, lower: &str, upper: &str) -> Result<Vec<ArtistIdentity>> {
        let artists = query_as::<_, ArtistIdentity>(
            r#"
            SELECT * FROM artists
            WHERE search_name >= ? AND search_name < ?
            ORDER BY search_name ASC
            "#,
        )
        .bind(lower)
        .bind(upper)
        .fetch_all(&self.pool)
        .await?;

        Ok(artists)
    }

    async fn apply_reconciliation(
        &self,
        deletions: &[String],
        rewrites: &[ArtistRewrite],
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for id in deletions {
            query("DELETE FROM artists WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        for rewrite in rewrites {
            query(
                r#"
                UPDATE artists
                SET id = ?, name = ?, created_at = ?
                WHERE id = ?
                "#,
            )
            .bind(&rewrite.canonical_id)
            .bind(&rewrite.name)
            .bind(rewrite.created_at)
            .bind(&rewrite.current_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await.map_err(|e| CatalogError::BatchCommit {
            stage: "artist reconciliation".to_string(),
            message: e.to_string(),
        })?;

        Ok(())
    }

    async fn update_search_names(&self, updates: &[(String, String)]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for (id, search_name) in updates {
            query("UPDATE artists SET search_name = ? WHERE id = ?")
                .bind(search_name)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await.map_err(|e| CatalogError::BatchCommit {
            stage: "artist search-name backfill".to_string(),
            message: e.to_string(),
        })?;

        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = query_as("SELECT COUNT(*) as count FROM artists")
            .fetch_one(&self.pool)
            .await
            .map(|row: (i64,)| row.0)?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    async fn setup_test_pool() -> SqlitePool {
        create_test_pool().await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_find_artist() {
        let pool = setup_test_pool().await;
        let repo = SqliteArtistRepository::new(pool);

        let artist = ArtistIdentity::new("Test Artist");
        repo.insert(&artist).await.unwrap();

        let found = repo.find_by_id(&artist.id).await.unwrap();
        assert!(found.is_some());
        let found = found.unwrap();
        assert_eq!(found.name, "Test Artist");
        assert_eq!(found.search_name, "test artist");
    }

    #[tokio::test]
    async fn test_find_by_search_name_matches_any_casing() {
        let pool = setup_test_pool().await;
        let repo = SqliteArtistRepository::new(pool);

        let artist = ArtistIdentity::new("Stephan Tudu");
        repo.insert(&artist).await.unwrap();

        let found = repo.find_by_search_name("stephan tudu").await.unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().id, artist.id);

        let missing = repo.find_by_search_name("someone else").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_artist() {
        let pool = setup_test_pool().await;
        let repo = SqliteArtistRepository::new(pool);

        let mut artist = ArtistIdentity::new("Valid");
        artist.name = "".to_string();

        let result = repo.insert(&artist).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_list_all_preserves_insertion_order() {
        let pool = setup_test_pool().await;
        let repo = SqliteArtistRepository::new(pool);

        for name in ["Charlie", "Alice", "Bob"] {
            repo.insert(&ArtistIdentity::new(name)).await.unwrap();
        }

        let all = repo.list_all().await.unwrap();
        let names: Vec<_> = all.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Charlie", "Alice", "Bob"]);
    }

    #[tokio::test]
    async fn test_search_prefix_range() {
        let pool = setup_test_pool().await;
        let repo = SqliteArtistRepository::new(pool);

        for name in ["Stephan Tudu", "Stevie", "Adele"] {
            repo.insert(&ArtistIdentity::new(name)).await.unwrap();
        }

        let upper = crate::normalize::prefix_upper_bound("ste");
        let hits = repo.search_prefix("ste", &upper).await.unwrap();
        let names: Vec<_> = hits.iter().map(|a| a.search_name.as_str()).collect();
        assert_eq!(names, vec!["stephan tudu", "stevie"]);
    }

    #[tokio::test]
    async fn test_apply_reconciliation_deletes_and_rewrites() {
        let pool = setup_test_pool().await;
        let repo = SqliteArtistRepository::new(pool);

        let keep = ArtistIdentity::new("Keeper");
        let dupe = ArtistIdentity::new("keeper");
        repo.insert(&keep).await.unwrap();
        repo.insert(&dupe).await.unwrap();

        let rewrite = ArtistRewrite {
            current_id: keep.id.clone(),
            canonical_id: "canonical-id-0000000000".to_string(),
            name: keep.name.clone(),
            created_at: 42,
        };
        repo.apply_reconciliation(std::slice::from_ref(&dupe.id), &[rewrite])
            .await
            .unwrap();

        assert!(repo.find_by_id(&dupe.id).await.unwrap().is_none());
        assert!(repo.find_by_id(&keep.id).await.unwrap().is_none());
        let rewritten = repo
            .find_by_id("canonical-id-0000000000")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rewritten.name, "Keeper");
        assert_eq!(rewritten.created_at, 42);
        // untouched fields merge through
        assert_eq!(rewritten.search_name, "keeper");
    }

    #[tokio::test]
    async fn test_update_search_names() {
        let pool = setup_test_pool().await;
        let repo = SqliteArtistRepository::new(pool);

        let artist = ArtistIdentity::new("Name");
        repo.insert(&artist).await.unwrap();

        repo.update_search_names(&[(artist.id.clone(), "rewritten".to_string())])
            .await
            .unwrap();

        let found = repo.find_by_id(&artist.id).await.unwrap().unwrap();
        assert_eq!(found.search_name, "rewritten");
    }
}
