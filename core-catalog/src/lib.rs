//! # Catalog Core
//!
//! Owns the music catalog's data model and the artist-identity
//! reconciliation and search-indexing subsystem.
//!
//! ## Overview
//!
//! - Canonical key normalization and prefix-range helpers
//! - Artist directory: resolve-or-create plus the administrative
//!   reconciliation pass that merges duplicate identities and repairs
//!   song references
//! - Song catalog: ingestion with artist resolution, listings
//! - Search index maintainer: backfill of denormalized lowercase
//!   search fields
//! - Playlist store: per-user snapshot playlists
//! - Catalog query façade: combined song/artist prefix search
//!
//! Persistence goes through repository traits backed by SQLite; the
//! traits are the seam a different document store would implement.

pub mod catalog;
pub mod db;
pub mod directory;
pub mod error;
pub mod maintenance;
pub mod models;
pub mod normalize;
pub mod playlists;
pub mod repositories;
pub mod search;

pub use catalog::{NewSong, SongCatalog};
pub use directory::{ArtistDirectory, ReconcileReport, UNKNOWN_ARTIST};
pub use error::{CatalogError, Result};
pub use maintenance::{BackfillReport, SearchIndexMaintainer};
pub use playlists::PlaylistStore;
pub use search::{CatalogSearch, SearchStrictness};
