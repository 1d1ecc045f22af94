//! # Artist Directory
//!
//! Owns the mapping from canonical (normalized) artist name to stable
//! artist identity.
//!
//! The hot path, [`ArtistDirectory::resolve_or_create`], carries no
//! transactional guard: two concurrent calls with the same normalized
//! name can race and create two identities sharing one canonical key.
//! [`ArtistDirectory::reconcile`] is the administrative repair pass
//! that restores the one-identity-per-key invariant and rewrites song
//! references onto the surviving canonical ids. It is idempotent and
//! safe to re-run, including concurrently with ingestion traffic (at
//! reduced, not zero, risk of a duplicate slipping in between its read
//! and its batch commit).

use crate::error::Result;
use crate::models::ArtistIdentity;
use crate::normalize::normalize;
use crate::repositories::{
    ArtistRepository, ArtistRewrite, SongArtistRewrite, SongRepository,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Placeholder artist for songs ingested without any artist name.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Ids shorter than this are treated as legacy auto-generated keys and
/// replaced with a fresh UUID during reconciliation.
const MIN_STABLE_ID_LEN: usize = 10;

/// Outcome of a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Distinct canonical keys established in stage 1
    pub artists_stabilized: usize,
    /// Duplicate identities deleted in stage 1
    pub duplicates_removed: usize,
    /// Songs whose artist-id count changed in stage 2. Known to
    /// undercount rewrites that preserve array length.
    pub songs_updated: usize,
}

/// Directory of canonical artist identities.
pub struct ArtistDirectory {
    artists: Arc<dyn ArtistRepository>,
    songs: Arc<dyn SongRepository>,
}

impl ArtistDirectory {
    /// Create a directory over the given repositories.
    pub fn new(artists: Arc<dyn ArtistRepository>, songs: Arc<dyn SongRepository>) -> Self {
        Self { artists, songs }
    }

    /// Resolve a display name to its stable artist id, creating the
    /// identity on first encounter.
    ///
    /// Lookup is by canonical key, so any casing/whitespace variant of
    /// an existing name resolves to the same id. The stored display
    /// casing is never overwritten here: first writer wins.
    pub async fn resolve_or_create(&self, display_name: &str) -> Result<String> {
        let name = display_name.trim();
        let key = normalize(name);

        if let Some(existing) = self.artists.find_by_search_name(&key).await? {
            debug!(artist = name, id = %existing.id, "Artist resolved via normalized name");
            return Ok(existing.id);
        }

        let artist = ArtistIdentity::new(name);
        self.artists.insert(&artist).await?;
        info!(artist = name, id = %artist.id, "New artist created");

        Ok(artist.id)
    }

    /// Full cleanup and normalization of artist identities.
    ///
    /// Stage 1 walks every identity in fixed enumeration order:
    /// malformed records (empty name) are deleted, later claimants of
    /// an already-claimed canonical key are deleted, and the first
    /// claimant becomes canonical, keeping its id unless it looks
    /// like a legacy short key, in which case a fresh one is minted.
    /// Stage 2 remaps every song's artist references through the
    /// canonical map; names with no surviving identity get a freshly
    /// minted id rather than a hole. Each stage commits as one atomic
    /// batch; a stage-2 failure leaves stage 1 committed, which is
    /// safe because the pass converges on re-run.
    pub async fn reconcile(&self) -> Result<ReconcileReport> {
        info!("Starting artist identity reconciliation");

        // Stage 1: establish canonical ids.
        let all_artists = self.artists.list_all().await?;

        let mut canonical: HashMap<String, String> = HashMap::new();
        let mut deletions: Vec<String> = Vec::new();
        let mut rewrites: Vec<ArtistRewrite> = Vec::new();
        let mut duplicates_removed = 0usize;
        let now = chrono::Utc::now().timestamp();

        for artist in all_artists {
            if artist.name.trim().is_empty() {
                warn!(id = %artist.id, "Artist record has empty name, deleting");
                deletions.push(artist.id);
                continue;
            }

            let key = normalize(&artist.name);

            if let Some(stable_id) = canonical.get(&key) {
                debug!(
                    key = %key,
                    id = %artist.id,
                    canonical_id = %stable_id,
                    "Duplicate artist marked for deletion"
                );
                deletions.push(artist.id);
                duplicates_removed += 1;
                continue;
            }

            let canonical_id = if artist.id.len() < MIN_STABLE_ID_LEN {
                Uuid::new_v4().to_string()
            } else {
                artist.id.clone()
            };
            canonical.insert(key, canonical_id.clone());

            rewrites.push(ArtistRewrite {
                current_id: artist.id,
                canonical_id,
                name: artist.name,
                created_at: now,
            });
        }

        self.artists
            .apply_reconciliation(&deletions, &rewrites)
            .await?;

        info!(
            stabilized = canonical.len(),
            duplicates_removed, "Artist normalization committed, starting song migration"
        );

        // Stage 2: repoint song references at the canonical ids.
        let all_songs = self.songs.enumerate_all().await?;

        let mut song_rewrites: Vec<SongArtistRewrite> = Vec::new();
        let mut songs_updated = 0usize;

        for song in all_songs {
            let names = if song.artist_names.is_empty() {
                vec![UNKNOWN_ARTIST.to_string()]
            } else {
                song.artist_names
            };

            let new_ids: Vec<String> = names
                .iter()
                .map(|name| match canonical.get(&normalize(name)) {
                    Some(stable_id) => stable_id.clone(),
                    // Name with no surviving identity: mint a fresh id
                    // rather than dropping the reference.
                    None => Uuid::new_v4().to_string(),
                })
                .collect();

            if new_ids.len() != song.artist_ids.len() {
                songs_updated += 1;
            }

            song_rewrites.push(SongArtistRewrite {
                id: song.id,
                artist_names: names,
                artist_ids: new_ids,
            });
        }

        self.songs.rewrite_artist_refs(&song_rewrites).await?;

        info!(songs_updated, "Song reference migration committed");

        Ok(ReconcileReport {
            artists_stabilized: canonical.len(),
            duplicates_removed,
            songs_updated,
        })
    }
}
