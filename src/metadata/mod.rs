//! Movie metadata lookup.
//!
//! # Module layout
//!
//! - [`provider`] -- [`MetadataProvider`] trait and the [`MovieRecord`] it yields.
//! - [`providers`] -- Concrete providers (OMDb).
//! - [`rating`] -- Rating extraction from a payload's rating sources.
//! - [`retry`] -- Backoff policy for transient server errors.

pub mod provider;
pub mod providers;
pub mod rating;
pub mod retry;

pub use provider::{MetadataProvider, MovieRecord, RatingEntry};
pub use providers::OmdbProvider;
pub use rating::{extract_rating, IMDB_SOURCE};
pub use retry::RetryPolicy;
