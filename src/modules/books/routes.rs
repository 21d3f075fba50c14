//! Axum handlers for the books API.
//!
//! The [`Requester`] extractor runs before the body is touched, so an
//! unauthenticated request is rejected with 401 before any validation.

use axum::extract::{Path, State};
use axum::http::StatusCode;

use bookswap_auth::Requester;
use bookswap_http::error::AppError;
use bookswap_http::extract::Json;

use super::models::{BookCreateRequest, BookDetail, BookSummary, BookUpdateRequest};
use super::service::BookService;
use crate::state::AppState;

/// GET / — list the requester's books, newest first.
pub async fn list_books(
    State(state): State<AppState>,
    Requester(user): Requester,
) -> Json<Vec<BookSummary>> {
    Json(BookService::new(state.store).list(user))
}

/// POST / — create a book owned by the requester.
pub async fn create_book(
    State(state): State<AppState>,
    Requester(user): Requester,
    Json(request): Json<BookCreateRequest>,
) -> Result<(StatusCode, Json<BookDetail>), AppError> {
    let book = BookService::new(state.store).create(user, request)?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// GET /{id} — retrieve one of the requester's books.
pub async fn get_book(
    State(state): State<AppState>,
    Requester(user): Requester,
    Path(id): Path<u64>,
) -> Result<Json<BookDetail>, AppError> {
    let book = BookService::new(state.store).get(user, id)?;
    Ok(Json(book))
}

/// PUT /{id} — full replace.
pub async fn replace_book(
    State(state): State<AppState>,
    Requester(user): Requester,
    Path(id): Path<u64>,
    Json(request): Json<BookUpdateRequest>,
) -> Result<Json<BookDetail>, AppError> {
    let book = BookService::new(state.store).update(user, id, request, false)?;
    Ok(Json(book))
}

/// PATCH /{id} — partial update.
pub async fn patch_book(
    State(state): State<AppState>,
    Requester(user): Requester,
    Path(id): Path<u64>,
    Json(request): Json<BookUpdateRequest>,
) -> Result<Json<BookDetail>, AppError> {
    let book = BookService::new(state.store).update(user, id, request, true)?;
    Ok(Json(book))
}

/// DELETE /{id} — remove one of the requester's books.
pub async fn delete_book(
    State(state): State<AppState>,
    Requester(user): Requester,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    BookService::new(state.store).delete(user, id)?;
    Ok(StatusCode::NO_CONTENT)
}
