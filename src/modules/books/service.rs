//! Write coordinator and query entry points for the books module.
//!
//! Every operation takes the requester identity explicitly; the store's
//! owner-scoped lookups make a foreign book indistinguishable from a missing
//! one, so cross-owner access surfaces as NotFound.

use std::sync::Arc;

use bookswap_auth::UserId;
use bookswap_http::error::AppError;
use bookswap_store::{Store, StoreError};

use super::models::{BookCreateRequest, BookDetail, BookSummary, BookUpdateRequest};

pub struct BookService {
    store: Arc<Store>,
}

impl BookService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// All books owned by the requester, most recently created first.
    pub fn list(&self, requester: UserId) -> Vec<BookSummary> {
        self.store
            .list_books(requester)
            .into_iter()
            .map(BookSummary::from)
            .collect()
    }

    /// Validate a create payload, resolve its references, and insert the
    /// book with `owner = requester` in one atomic store write.
    pub fn create(
        &self,
        requester: UserId,
        request: BookCreateRequest,
    ) -> Result<BookDetail, AppError> {
        let new_book = request.validate()?;
        let book = self.store.create_book(requester, new_book);

        tracing::info!(book_id = book.id, owner = %requester, "book created");
        Ok(BookDetail::from(book))
    }

    pub fn get(&self, requester: UserId, id: u64) -> Result<BookDetail, AppError> {
        let book = self.store.get_book(requester, id).map_err(not_found)?;
        Ok(BookDetail::from(book))
    }

    /// Apply a full (`partial = false`) or partial update. Present nested
    /// reference fragments are re-resolved; absent ones retain the book's
    /// current reference in both modes.
    pub fn update(
        &self,
        requester: UserId,
        id: u64,
        request: BookUpdateRequest,
        partial: bool,
    ) -> Result<BookDetail, AppError> {
        let changes = request.validate(partial)?;
        let book = self
            .store
            .update_book(requester, id, changes)
            .map_err(not_found)?;

        tracing::info!(book_id = book.id, owner = %requester, partial, "book updated");
        Ok(BookDetail::from(book))
    }

    /// Remove an owned book. Reference entities survive.
    pub fn delete(&self, requester: UserId, id: u64) -> Result<(), AppError> {
        self.store.delete_book(requester, id).map_err(not_found)?;

        tracing::info!(book_id = id, owner = %requester, "book deleted");
        Ok(())
    }
}

fn not_found(err: StoreError) -> AppError {
    match err {
        StoreError::BookNotFound(_) => AppError::not_found("Book not found"),
    }
}
