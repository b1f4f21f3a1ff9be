//! Data manager capability.
//!
//! [`DataManager`] is the storage interface the HTTP layer talks to;
//! [`SqliteDataManager`] implements it over the pooled SQLite database.

use cinelog_common::{Error, MovieId, Result, UserId};
use tracing::{debug, info};

use crate::models::{Movie, NewMovie, NewUser, User};
use crate::pool::{get_conn, DbPool};
use crate::queries::{movies, user_movies, users};

/// Lowest accepted user rating.
pub const MIN_RATING: f64 = 0.0;
/// Highest accepted user rating.
pub const MAX_RATING: f64 = 10.0;

/// Storage operations behind the movie list application.
pub trait DataManager: Send + Sync {
    /// All users ordered by name.
    fn get_all_users(&self) -> Result<Vec<User>>;

    /// All movies ordered by name.
    fn get_all_movies(&self) -> Result<Vec<Movie>>;

    /// Look up a single user.
    fn get_user(&self, user_id: UserId) -> Result<Option<User>>;

    /// Name of a user, if the user exists.
    fn get_user_name(&self, user_id: UserId) -> Result<Option<String>> {
        Ok(self.get_user(user_id)?.map(|u| u.user_name))
    }

    /// A user's movies, each paired with the user's rating.
    fn get_user_movies(&self, user_id: UserId) -> Result<Vec<(Movie, Option<f64>)>>;

    /// Register a new user.
    fn add_user(&self, user: NewUser) -> Result<User>;

    /// Add a movie to a user's list, storing the movie first if needed.
    ///
    /// Returns `false` when the movie is already in the user's list.
    fn add_movie(&self, movie: NewMovie, user_id: UserId, rating: Option<f64>) -> Result<bool>;

    /// Look up a single movie.
    fn get_movie(&self, movie_id: MovieId) -> Result<Option<Movie>>;

    /// Persist edited movie details. Returns the movie name, or `None` if the
    /// movie does not exist.
    fn update_movie(&self, movie: &Movie) -> Result<Option<String>>;

    /// Change the user's rating of a movie in their list.
    fn update_rating(&self, user_id: UserId, movie_id: MovieId, rating: f64) -> Result<bool>;

    /// Remove a movie from the user's list. The movie itself is deleted once
    /// no user references it any more.
    fn delete_movie(&self, user_id: UserId, movie_id: MovieId) -> Result<Option<Movie>>;
}

/// Reject ratings outside `MIN_RATING..=MAX_RATING` (and NaN).
pub fn validate_rating(rating: f64) -> Result<f64> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(rating)
    } else {
        Err(Error::invalid_input(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}, got {rating}"
        )))
    }
}

/// [`DataManager`] backed by SQLite.
#[derive(Clone)]
pub struct SqliteDataManager {
    pool: DbPool,
}

impl SqliteDataManager {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl std::fmt::Debug for SqliteDataManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteDataManager")
            .field("max_connections", &self.pool.max_size())
            .finish()
    }
}

impl DataManager for SqliteDataManager {
    fn get_all_users(&self) -> Result<Vec<User>> {
        let conn = get_conn(&self.pool)?;
        users::list_users(&conn)
    }

    fn get_all_movies(&self) -> Result<Vec<Movie>> {
        let conn = get_conn(&self.pool)?;
        movies::list_movies(&conn)
    }

    fn get_user(&self, user_id: UserId) -> Result<Option<User>> {
        let conn = get_conn(&self.pool)?;
        users::get_user(&conn, user_id)
    }

    fn get_user_movies(&self, user_id: UserId) -> Result<Vec<(Movie, Option<f64>)>> {
        let conn = get_conn(&self.pool)?;
        user_movies::list_user_movies(&conn, user_id)
    }

    fn add_user(&self, user: NewUser) -> Result<User> {
        let conn = get_conn(&self.pool)?;
        let avatar_url = user.avatar_url.as_deref().filter(|a| !a.trim().is_empty());
        let created = users::create_user(&conn, &user.user_name, avatar_url)?;
        info!(user_id = %created.id, user_name = %created.user_name, "User added");
        Ok(created)
    }

    fn add_movie(&self, movie: NewMovie, user_id: UserId, rating: Option<f64>) -> Result<bool> {
        let rating = rating.map(validate_rating).transpose()?;

        let conn = get_conn(&self.pool)?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| Error::database(e.to_string()))?;

        if users::get_user(&tx, user_id)?.is_none() {
            return Err(Error::not_found("user", user_id));
        }

        let stored = match movies::find_movie(&tx, &movie.movie_name, movie.year)? {
            Some(existing) => {
                debug!(movie_id = %existing.id, "Reusing stored movie");
                existing
            }
            None => movies::create_movie(&tx, &movie)?,
        };

        let added = user_movies::add_user_movie(&tx, user_id, stored.id, rating)?;

        tx.commit().map_err(|e| Error::database(e.to_string()))?;

        if added {
            info!(
                user_id = %user_id,
                movie_id = %stored.id,
                movie_name = %stored.movie_name,
                "Movie added to list"
            );
        }
        Ok(added)
    }

    fn get_movie(&self, movie_id: MovieId) -> Result<Option<Movie>> {
        let conn = get_conn(&self.pool)?;
        movies::get_movie(&conn, movie_id)
    }

    fn update_movie(&self, movie: &Movie) -> Result<Option<String>> {
        let conn = get_conn(&self.pool)?;
        if movies::update_movie(&conn, movie)? {
            Ok(Some(movie.movie_name.clone()))
        } else {
            Ok(None)
        }
    }

    fn update_rating(&self, user_id: UserId, movie_id: MovieId, rating: f64) -> Result<bool> {
        let rating = validate_rating(rating)?;
        let conn = get_conn(&self.pool)?;
        user_movies::update_rating(&conn, user_id, movie_id, rating)
    }

    fn delete_movie(&self, user_id: UserId, movie_id: MovieId) -> Result<Option<Movie>> {
        let conn = get_conn(&self.pool)?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| Error::database(e.to_string()))?;

        let Some(movie) = movies::get_movie(&tx, movie_id)? else {
            return Ok(None);
        };

        if !user_movies::remove_user_movie(&tx, user_id, movie_id)? {
            return Ok(None);
        }

        if user_movies::count_movie_references(&tx, movie_id)? == 0 {
            movies::delete_movie(&tx, movie_id)?;
            debug!(movie_id = %movie_id, "Deleted unreferenced movie");
        }

        tx.commit().map_err(|e| Error::database(e.to_string()))?;

        info!(user_id = %user_id, movie_id = %movie_id, "Movie removed from list");
        Ok(Some(movie))
    }
}
