//! Database query modules.
//!
//! - users: user CRUD
//! - movies: movie CRUD
//! - user_movies: a user's list of movies and their ratings

pub mod movies;
pub mod user_movies;
pub mod users;
