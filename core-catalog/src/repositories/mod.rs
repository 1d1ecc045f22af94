//! # Repository Pattern Implementation
//!
//! Repository traits and SQLite implementations for data access. The
//! traits are the seam the services are written against; a different
//! document store plugs in by implementing them.
//!
//! - Traits define the interface for each collection
//! - SQLite implementations use sqlx for async access
//! - Multi-row administrative batches commit as single transactions
//! - All operations return `Result<T>` for error handling

pub mod artist;
pub mod playlist;
pub mod song;
pub mod user;

pub use artist::{ArtistRepository, ArtistRewrite, SqliteArtistRepository};
pub use playlist::{PlaylistRepository, SqlitePlaylistRepository};
pub use song::{SongArtistRewrite, SongRepository, SqliteSongRepository};
pub use user::{SqliteUserRepository, UserRepository};
