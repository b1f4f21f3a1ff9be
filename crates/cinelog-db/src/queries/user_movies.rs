//! Queries over a user's movie list.

use cinelog_common::{Error, MovieId, Result, UserId};
use rusqlite::{Connection, OptionalExtension};

use crate::models::{Movie, UserMovie};
use crate::queries::movies::row_to_movie;

/// Link a movie to a user's list.
///
/// # Returns
///
/// * `Ok(true)` - If the link was created
/// * `Ok(false)` - If the movie was already in the user's list
pub fn add_user_movie(
    conn: &Connection,
    user_id: UserId,
    movie_id: MovieId,
    rating: Option<f64>,
) -> Result<bool> {
    let rows_affected = conn
        .execute(
            "INSERT OR IGNORE INTO user_movies (user_id, movie_id, rating)
             VALUES (:user_id, :movie_id, :rating)",
            rusqlite::named_params! {
                ":user_id": user_id.get(),
                ":movie_id": movie_id.get(),
                ":rating": rating,
            },
        )
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(rows_affected > 0)
}

/// Get the link row for a user and movie.
pub fn get_user_movie(
    conn: &Connection,
    user_id: UserId,
    movie_id: MovieId,
) -> Result<Option<UserMovie>> {
    conn.query_row(
        "SELECT id, user_id, movie_id, rating FROM user_movies
         WHERE user_id = :user_id AND movie_id = :movie_id",
        rusqlite::named_params! { ":user_id": user_id.get(), ":movie_id": movie_id.get() },
        |row| {
            Ok(UserMovie {
                id: row.get(0)?,
                user_id: UserId::from(row.get::<_, i64>(1)?),
                movie_id: MovieId::from(row.get::<_, i64>(2)?),
                rating: row.get(3)?,
            })
        },
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}

/// List a user's movies together with the user's rating for each.
pub fn list_user_movies(conn: &Connection, user_id: UserId) -> Result<Vec<(Movie, Option<f64>)>> {
    let mut stmt = conn
        .prepare(
            "SELECT m.id, m.movie_name, m.year, m.director, m.genre, m.poster_url, m.plot,
                    m.imdb_rating, um.rating
             FROM user_movies um
             JOIN movies m ON m.id = um.movie_id
             WHERE um.user_id = :user_id
             ORDER BY m.movie_name, m.id",
        )
        .map_err(|e| Error::database(e.to_string()))?;

    let rows = stmt
        .query_map(rusqlite::named_params! { ":user_id": user_id.get() }, |row| {
            Ok((row_to_movie(row)?, row.get::<_, Option<f64>>(8)?))
        })
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(rows)
}

/// Set the user's rating for a movie in their list.
pub fn update_rating(
    conn: &Connection,
    user_id: UserId,
    movie_id: MovieId,
    rating: f64,
) -> Result<bool> {
    let rows_affected = conn
        .execute(
            "UPDATE user_movies SET rating = :rating
             WHERE user_id = :user_id AND movie_id = :movie_id",
            rusqlite::named_params! {
                ":rating": rating,
                ":user_id": user_id.get(),
                ":movie_id": movie_id.get(),
            },
        )
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(rows_affected > 0)
}

/// Remove a movie from a user's list.
pub fn remove_user_movie(conn: &Connection, user_id: UserId, movie_id: MovieId) -> Result<bool> {
    let rows_affected = conn
        .execute(
            "DELETE FROM user_movies WHERE user_id = :user_id AND movie_id = :movie_id",
            rusqlite::named_params! { ":user_id": user_id.get(), ":movie_id": movie_id.get() },
        )
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(rows_affected > 0)
}

/// Number of users that still have the movie in their list.
pub fn count_movie_references(conn: &Connection, movie_id: MovieId) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM user_movies WHERE movie_id = :movie_id",
        rusqlite::named_params! { ":movie_id": movie_id.get() },
        |row| row.get(0),
    )
    .map_err(|e| Error::database(e.to_string()))
}
