use crate::db::MovieDb;
use crate::model::*;
use axum::extract::{Path, State};
use reconbit::*;
use std::sync::Arc;
use std::time::Duration;
use utoipa_axum::routes;

#[derive(Clone)]
pub struct RequestState {
    pub db: Arc<MovieDb>,
    pub save_attempts: usize,
    pub save_retry_delay: Duration,
}

impl RequestState {
    pub fn new(db: Arc<MovieDb>, http: &HttpSettings) -> Self {
        RequestState { db, save_attempts: http.save_attempts.max(1), save_retry_delay: http.save_retry_delay_ms }
    }
}

#[utoipa::path(post, path = "/movie", request_body(content = Movie, content_type = "application/json"), responses((status = OK, body = Movie), (status = 409, body = ErrorResponse), (status = 422, body = ErrorResponse)), tag = "Movie")]
#[axum::debug_handler]
pub async fn save_movie(State(state): State<RequestState>, AppJson(movie): AppJson<Movie>) -> Result<AppJson<Movie>, AppError> {
    let saved = retry_with_delay(state.save_attempts, state.save_retry_delay, AppError::is_transient, || {
        let db = Arc::clone(&state.db);
        let movie = movie.clone();
        async move { db.save_movie(movie) }
    })
    .await?;
    Ok(AppJson(saved))
}

#[utoipa::path(get, path = "/movie", responses((status = OK, body = Vec<Movie>)), tag = "Movie")]
#[axum::debug_handler]
pub async fn list_movies(State(state): State<RequestState>) -> Result<AppJson<Vec<Movie>>, AppError> {
    state.db.list_movies().map(AppJson)
}

#[utoipa::path(get, path = "/movie/{id}", params(("id" = u32, Path, description = "Movie id")), responses((status = OK, body = Movie), (status = 404, body = ErrorResponse)), tag = "Movie")]
#[axum::debug_handler]
pub async fn get_movie(State(state): State<RequestState>, Path(id): Path<u32>) -> Result<AppJson<Movie>, AppError> {
    state
        .db
        .get_movie(MasterId(id))?
        .map(AppJson)
        .ok_or_else(|| AppError::NotFound(format!("MOVIE {}", id)))
}

#[utoipa::path(delete, path = "/movie/{id}", params(("id" = u32, Path, description = "Movie id")), responses((status = OK), (status = 404, body = ErrorResponse)), tag = "Movie")]
#[axum::debug_handler]
pub async fn delete_movie(State(state): State<RequestState>, Path(id): Path<u32>) -> Result<StatusCode, AppError> {
    state.db.delete_movie(MasterId(id))?;
    Ok(StatusCode::OK)
}

#[utoipa::path(post, path = "/person", request_body(content = Person, content_type = "application/json"), responses((status = OK, body = Person)), tag = "Person")]
#[axum::debug_handler]
pub async fn save_person(State(state): State<RequestState>, AppJson(person): AppJson<Person>) -> Result<AppJson<Person>, AppError> {
    state.db.save_person(person).map(AppJson)
}

#[utoipa::path(get, path = "/person/{id}", params(("id" = u32, Path, description = "Person id")), responses((status = OK, body = Person), (status = 404, body = ErrorResponse)), tag = "Person")]
#[axum::debug_handler]
pub async fn get_person(State(state): State<RequestState>, Path(id): Path<u32>) -> Result<AppJson<Person>, AppError> {
    state
        .db
        .get_person(PersonId(id))?
        .map(AppJson)
        .ok_or_else(|| AppError::NotFound(format!("PERSON {}", id)))
}

pub fn api() -> OpenApiRouter<RequestState> {
    OpenApiRouter::new()
        .routes(routes!(save_movie, list_movies))
        .routes(routes!(get_movie, delete_movie))
        .routes(routes!(save_person))
        .routes(routes!(get_person))
}
