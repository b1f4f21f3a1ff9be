//! User, watch-list and rating routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use cinelog_common::{Error, MovieId, UserId};
use cinelog_db::{Movie, MovieUpdate, NewMovie, NewUser, User};
use serde::{Deserialize, Serialize};

use super::{AppContext, AppError};

/// Avatar given to users who register without one.
pub const DEFAULT_AVATAR_URL: &str =
    "https://gravatar.com/userimage/12498767/cf086b8eb3c9ffbc5147271157598803.jpeg?size=256";

pub fn user_routes() -> Router<AppContext> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{user_id}", get(list_user_movies))
        .route("/users/{user_id}/movies", post(add_movie))
        .route(
            "/users/{user_id}/movies/{movie_id}",
            put(update_movie).delete(delete_movie),
        )
        .route("/users/{user_id}/movies/{movie_id}/rating", put(update_rating))
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub user_name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddMovieRequest {
    pub movie_name: String,
    /// Defaults to the IMDb rating of the fetched movie.
    pub rating: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRatingRequest {
    pub rating: f64,
}

#[derive(Debug, Serialize)]
pub struct UserMovieEntry {
    #[serde(flatten)]
    pub movie: Movie,
    pub user_rating: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct UserMoviesResponse {
    pub user_id: UserId,
    pub user_name: String,
    pub movies: Vec<UserMovieEntry>,
}

#[derive(Debug, Serialize)]
pub struct AddMovieResponse {
    pub user_id: UserId,
    pub movie_name: String,
    pub year: i32,
    pub rating: f64,
}

#[derive(Debug, Serialize)]
pub struct RatingResponse {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub rating: f64,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: String,
}

/// GET /api/users
pub async fn list_users(State(ctx): State<AppContext>) -> Result<Json<Vec<User>>, AppError> {
    let users = ctx.data.get_all_users()?;
    if users.is_empty() {
        return Err(AppError::not_found("users", "none registered"));
    }
    Ok(Json(users))
}

/// POST /api/users
pub async fn create_user(
    State(ctx): State<AppContext>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let avatar_url = payload
        .avatar_url
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_AVATAR_URL.to_string());

    let user = ctx.data.add_user(NewUser {
        user_name: payload.user_name,
        avatar_url: Some(avatar_url),
    })?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/users/{user_id}: the user's movies with their own ratings.
pub async fn list_user_movies(
    State(ctx): State<AppContext>,
    Path(user_id): Path<UserId>,
) -> Result<Json<UserMoviesResponse>, AppError> {
    let user_name = ctx
        .data
        .get_user_name(user_id)?
        .ok_or_else(|| AppError::not_found("user", user_id))?;

    let movies = ctx.data.get_user_movies(user_id)?;
    if movies.is_empty() {
        return Err(AppError::not_found("movies for user", user_id));
    }

    Ok(Json(UserMoviesResponse {
        user_id,
        user_name,
        movies: movies
            .into_iter()
            .map(|(movie, user_rating)| UserMovieEntry { movie, user_rating })
            .collect(),
    }))
}

/// POST /api/users/{user_id}/movies: look the title up and add it to the
/// user's list.
pub async fn add_movie(
    State(ctx): State<AppContext>,
    Path(user_id): Path<UserId>,
    Json(payload): Json<AddMovieRequest>,
) -> Result<(StatusCode, Json<AddMovieResponse>), AppError> {
    let title = payload.movie_name.trim();
    if title.is_empty() {
        return Err(Error::invalid_input("movie_name must not be empty").into());
    }
    if ctx.data.get_user(user_id)?.is_none() {
        return Err(AppError::not_found("user", user_id));
    }

    let record = ctx
        .metadata
        .lookup_movie(title)
        .await
        .ok_or_else(|| AppError::not_found("movie", title))?;

    let rating = payload.rating.unwrap_or(record.rating);
    let response = AddMovieResponse {
        user_id,
        movie_name: record.title.clone(),
        year: record.year,
        rating,
    };

    if !ctx
        .data
        .add_movie(NewMovie::from(record), user_id, Some(rating))?
    {
        return Err(Error::conflict(format!(
            "{} ({}) is already in this user's list",
            response.movie_name, response.year
        ))
        .into());
    }

    Ok((StatusCode::CREATED, Json(response)))
}

/// PUT /api/users/{user_id}/movies/{movie_id}/rating
pub async fn update_rating(
    State(ctx): State<AppContext>,
    Path((user_id, movie_id)): Path<(UserId, MovieId)>,
    Json(payload): Json<UpdateRatingRequest>,
) -> Result<Json<RatingResponse>, AppError> {
    if !ctx.data.update_rating(user_id, movie_id, payload.rating)? {
        return Err(AppError::not_found(
            "movie in user list",
            format!("{user_id}/{movie_id}"),
        ));
    }

    Ok(Json(RatingResponse {
        user_id,
        movie_id,
        rating: payload.rating,
    }))
}

/// PUT /api/users/{user_id}/movies/{movie_id}: edit stored movie fields.
/// Blank fields are left unchanged.
pub async fn update_movie(
    State(ctx): State<AppContext>,
    Path((user_id, movie_id)): Path<(UserId, MovieId)>,
    Json(update): Json<MovieUpdate>,
) -> Result<Json<Movie>, AppError> {
    if ctx.data.get_user(user_id)?.is_none() {
        return Err(AppError::not_found("user", user_id));
    }
    let mut movie = ctx
        .data
        .get_movie(movie_id)?
        .ok_or_else(|| AppError::not_found("movie", movie_id))?;

    update.apply(&mut movie);
    let name = ctx
        .data
        .update_movie(&movie)?
        .ok_or_else(|| AppError::not_found("movie", movie_id))?;
    tracing::info!(movie_id = %movie_id, movie = %name, "Movie updated");

    Ok(Json(movie))
}

/// DELETE /api/users/{user_id}/movies/{movie_id}
pub async fn delete_movie(
    State(ctx): State<AppContext>,
    Path((user_id, movie_id)): Path<(UserId, MovieId)>,
) -> Result<Json<DeletedResponse>, AppError> {
    let movie = ctx
        .data
        .delete_movie(user_id, movie_id)?
        .ok_or_else(|| {
            AppError::not_found("movie in user list", format!("{user_id}/{movie_id}"))
        })?;

    Ok(Json(DeletedResponse {
        deleted: movie.movie_name,
    }))
}
