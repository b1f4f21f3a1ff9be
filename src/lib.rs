//! Cinelog: a favorite-movie tracker.
//!
//! Users keep a list of movies with their own ratings. New movies are looked
//! up by title on OMDb ([`metadata`]), normalized into a
//! [`MovieRecord`](metadata::MovieRecord) and stored through the
//! [`DataManager`](cinelog_db::DataManager) in `cinelog-db`. The JSON API in
//! [`server`] ties both together.

pub mod config;
pub mod metadata;
pub mod server;
