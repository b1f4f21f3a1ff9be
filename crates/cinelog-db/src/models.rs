//! Rust models matching the database schema.

use cinelog_common::{MovieId, UserId};
use serde::{Deserialize, Serialize};

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub user_name: String,
    pub avatar_url: Option<String>,
}

/// Input for creating a user.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub user_name: String,
    pub avatar_url: Option<String>,
}

/// A stored movie.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: MovieId,
    pub movie_name: String,
    pub year: Option<i32>,
    pub director: Option<String>,
    pub genre: Option<String>,
    pub poster_url: Option<String>,
    pub plot: Option<String>,
    /// IMDb rating captured when the movie was fetched.
    pub imdb_rating: Option<f64>,
}

/// Movie fields as fetched from the metadata service, before insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMovie {
    pub movie_name: String,
    pub year: i32,
    pub director: String,
    pub genre: String,
    pub poster_url: String,
    pub plot: String,
    pub imdb_rating: f64,
}

/// Partial movie edit; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieUpdate {
    pub movie_name: Option<String>,
    pub year: Option<i32>,
    pub director: Option<String>,
    pub genre: Option<String>,
    pub poster_url: Option<String>,
    pub plot: Option<String>,
}

impl MovieUpdate {
    /// Apply the non-empty fields of this update to `movie`.
    ///
    /// Blank strings count as "not provided", so a form that submits every
    /// field only changes the ones the user actually filled in.
    pub fn apply(self, movie: &mut Movie) {
        fn filled(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        if let Some(name) = filled(self.movie_name) {
            movie.movie_name = name;
        }
        if let Some(year) = self.year {
            movie.year = Some(year);
        }
        if let Some(director) = filled(self.director) {
            movie.director = Some(director);
        }
        if let Some(genre) = filled(self.genre) {
            movie.genre = Some(genre);
        }
        if let Some(poster_url) = filled(self.poster_url) {
            movie.poster_url = Some(poster_url);
        }
        if let Some(plot) = filled(self.plot) {
            movie.plot = Some(plot);
        }
    }
}

/// Link between a user and a movie in their list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserMovie {
    pub id: i64,
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub rating: Option<f64>,
}
