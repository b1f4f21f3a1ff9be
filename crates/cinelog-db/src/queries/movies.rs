//! Movie database queries.

use cinelog_common::{Error, MovieId, Result};
use rusqlite::{Connection, OptionalExtension, Row};

use crate::models::{Movie, NewMovie};

const MOVIE_COLUMNS: &str =
    "id, movie_name, year, director, genre, poster_url, plot, imdb_rating";

pub(crate) fn row_to_movie(row: &Row<'_>) -> rusqlite::Result<Movie> {
    Ok(Movie {
        id: MovieId::from(row.get::<_, i64>(0)?),
        movie_name: row.get(1)?,
        year: row.get(2)?,
        director: row.get(3)?,
        genre: row.get(4)?,
        poster_url: row.get(5)?,
        plot: row.get(6)?,
        imdb_rating: row.get(7)?,
    })
}

/// Insert a movie and return the stored row.
pub fn create_movie(conn: &Connection, movie: &NewMovie) -> Result<Movie> {
    conn.execute(
        "INSERT INTO movies (movie_name, year, director, genre, poster_url, plot, imdb_rating)
         VALUES (:movie_name, :year, :director, :genre, :poster_url, :plot, :imdb_rating)",
        rusqlite::named_params! {
            ":movie_name": movie.movie_name,
            ":year": movie.year,
            ":director": movie.director,
            ":genre": movie.genre,
            ":poster_url": movie.poster_url,
            ":plot": movie.plot,
            ":imdb_rating": movie.imdb_rating,
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(Movie {
        id: MovieId::from(conn.last_insert_rowid()),
        movie_name: movie.movie_name.clone(),
        year: Some(movie.year),
        director: Some(movie.director.clone()),
        genre: Some(movie.genre.clone()),
        poster_url: Some(movie.poster_url.clone()),
        plot: Some(movie.plot.clone()),
        imdb_rating: Some(movie.imdb_rating),
    })
}

/// Get a movie by ID.
pub fn get_movie(conn: &Connection, id: MovieId) -> Result<Option<Movie>> {
    conn.query_row(
        &format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE id = :id"),
        rusqlite::named_params! { ":id": id.get() },
        row_to_movie,
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}

/// Find a stored movie by exact name and year.
///
/// The metadata service returns canonical titles, so two lookups of the same
/// film resolve to the same name/year pair.
pub fn find_movie(conn: &Connection, movie_name: &str, year: i32) -> Result<Option<Movie>> {
    conn.query_row(
        &format!(
            "SELECT {MOVIE_COLUMNS} FROM movies
             WHERE movie_name = :movie_name AND year = :year
             ORDER BY id LIMIT 1"
        ),
        rusqlite::named_params! { ":movie_name": movie_name, ":year": year },
        row_to_movie,
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}

/// List all movies ordered by name.
pub fn list_movies(conn: &Connection) -> Result<Vec<Movie>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {MOVIE_COLUMNS} FROM movies ORDER BY movie_name, id"
        ))
        .map_err(|e| Error::database(e.to_string()))?;

    let movies = stmt
        .query_map([], row_to_movie)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(movies)
}

/// Overwrite the editable columns of a movie.
///
/// # Returns
///
/// * `Ok(true)` - If the movie existed and was updated
/// * `Ok(false)` - If no movie has that id
pub fn update_movie(conn: &Connection, movie: &Movie) -> Result<bool> {
    let rows_affected = conn
        .execute(
            "UPDATE movies SET movie_name = :movie_name, year = :year, director = :director,
                genre = :genre, poster_url = :poster_url, plot = :plot
             WHERE id = :id",
            rusqlite::named_params! {
                ":id": movie.id.get(),
                ":movie_name": movie.movie_name,
                ":year": movie.year,
                ":director": movie.director,
                ":genre": movie.genre,
                ":poster_url": movie.poster_url,
                ":plot": movie.plot,
            },
        )
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(rows_affected > 0)
}

/// Delete a movie row.
pub fn delete_movie(conn: &Connection, id: MovieId) -> Result<bool> {
    let rows_affected = conn
        .execute(
            "DELETE FROM movies WHERE id = :id",
            rusqlite::named_params! { ":id": id.get() },
        )
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{get_conn, init_memory_pool};

    fn heat() -> NewMovie {
        NewMovie {
            movie_name: "Heat".into(),
            year: 1995,
            director: "Michael Mann".into(),
            genre: "Crime, Drama".into(),
            poster_url: "http://x/heat.jpg".into(),
            plot: "A group of high-end professional thieves...".into(),
            imdb_rating: 8.3,
        }
    }

    #[test]
    fn create_get_find() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let movie = create_movie(&conn, &heat()).unwrap();
        assert_eq!(get_movie(&conn, movie.id).unwrap().unwrap(), movie);
        assert_eq!(find_movie(&conn, "Heat", 1995).unwrap().unwrap().id, movie.id);
        assert!(find_movie(&conn, "Heat", 1986).unwrap().is_none());
    }

    #[test]
    fn update_and_delete() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let mut movie = create_movie(&conn, &heat()).unwrap();
        movie.genre = Some("Thriller".into());
        assert!(update_movie(&conn, &movie).unwrap());
        assert_eq!(
            get_movie(&conn, movie.id).unwrap().unwrap().genre.as_deref(),
            Some("Thriller")
        );

        assert!(delete_movie(&conn, movie.id).unwrap());
        assert!(!delete_movie(&conn, movie.id).unwrap());
        assert!(list_movies(&conn).unwrap().is_empty());
    }
}
