//! Movie catalogue routes.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use cinelog_common::MovieId;
use cinelog_db::Movie;
use serde::Serialize;

use super::{AppContext, AppError};

pub const WELCOME_MESSAGE: &str = "Welcome to Cinelog!";

pub fn movie_routes() -> Router<AppContext> {
    Router::new()
        .route("/home", get(home))
        .route("/movies/{movie_id}", get(get_movie))
}

#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub message: &'static str,
    pub movies: Vec<Movie>,
}

/// GET /api/home: every stored movie.
pub async fn home(State(ctx): State<AppContext>) -> Result<Json<HomeResponse>, AppError> {
    let movies = ctx.data.get_all_movies()?;
    if movies.is_empty() {
        return Err(AppError::not_found("movies", "none stored yet"));
    }

    Ok(Json(HomeResponse {
        message: WELCOME_MESSAGE,
        movies,
    }))
}

/// GET /api/movies/{movie_id}
pub async fn get_movie(
    State(ctx): State<AppContext>,
    Path(movie_id): Path<MovieId>,
) -> Result<Json<Movie>, AppError> {
    ctx.data
        .get_movie(movie_id)?
        .map(Json)
        .ok_or_else(|| AppError::not_found("movie", movie_id))
}
