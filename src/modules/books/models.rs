//! Request and response shapes for the books API.
//!
//! Requests deserialize into fully optional DTOs and go through an explicit
//! validation pass before anything touches the store. `owner` is never part
//! of a request shape; it always comes from the authenticated requester.

use serde::{Deserialize, Serialize};
use serde_json::json;

use bookswap_http::error::AppError;
use bookswap_store::{Book, BookChanges, NewBook};

/// Nested reference fragment as submitted by clients: `{"name": "..."}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceRef {
    pub name: Option<String>,
}

/// Compact nested reference in list responses.
#[derive(Debug, Clone, Serialize)]
pub struct ReferenceOut {
    pub name: String,
}

/// Nested reference in detail responses, with its canonical id.
#[derive(Debug, Clone, Serialize)]
pub struct ReferenceDetailOut {
    pub id: u64,
    pub name: String,
}

/// List-shape book: nested entities carry names only.
#[derive(Debug, Clone, Serialize)]
pub struct BookSummary {
    pub id: u64,
    pub title: String,
    pub author: ReferenceOut,
    pub genre: ReferenceOut,
    pub condition: ReferenceOut,
    pub pickup_location: String,
    pub is_available: bool,
}

/// Detail-shape book returned by create/retrieve/update.
#[derive(Debug, Clone, Serialize)]
pub struct BookDetail {
    pub id: u64,
    pub title: String,
    pub author: ReferenceDetailOut,
    pub genre: ReferenceDetailOut,
    pub condition: ReferenceDetailOut,
    pub pickup_location: String,
    pub is_available: bool,
}

impl From<Book> for BookSummary {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: ReferenceOut {
                name: book.author.name,
            },
            genre: ReferenceOut {
                name: book.genre.name,
            },
            condition: ReferenceOut {
                name: book.condition.name,
            },
            pickup_location: book.pickup_location,
            is_available: book.is_available,
        }
    }
}

impl From<Book> for BookDetail {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: ReferenceDetailOut {
                id: book.author.id,
                name: book.author.name,
            },
            genre: ReferenceDetailOut {
                id: book.genre.id,
                name: book.genre.name,
            },
            condition: ReferenceDetailOut {
                id: book.condition.id,
                name: book.condition.name,
            },
            pickup_location: book.pickup_location,
            is_available: book.is_available,
        }
    }
}

/// Request body for POST /api/books.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookCreateRequest {
    pub title: Option<String>,
    pub author: Option<ReferenceRef>,
    pub genre: Option<ReferenceRef>,
    pub condition: Option<ReferenceRef>,
    pub pickup_location: Option<String>,
    pub is_available: Option<bool>,
}

impl BookCreateRequest {
    /// Validate required fields and produce the store-level insert input.
    pub fn validate(self) -> Result<NewBook, AppError> {
        let mut errors = Vec::new();

        let title = require_text("title", self.title, &mut errors);
        let pickup_location = require_text("pickup_location", self.pickup_location, &mut errors);
        let author_name = require_reference("author", self.author, &mut errors);
        let genre_name = require_reference("genre", self.genre, &mut errors);
        let condition_name = require_reference("condition", self.condition, &mut errors);

        match (title, pickup_location, author_name, genre_name, condition_name) {
            (Some(title), Some(pickup_location), Some(author), Some(genre), Some(condition))
                if errors.is_empty() =>
            {
                Ok(NewBook {
                    title,
                    pickup_location,
                    is_available: self.is_available.unwrap_or(true),
                    author_name: author,
                    genre_name: genre,
                    condition_name: condition,
                })
            }
            _ => Err(AppError::validation(errors, "Invalid book payload")),
        }
    }
}

/// Request body for PUT/PATCH /api/books/{id}.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookUpdateRequest {
    pub title: Option<String>,
    pub author: Option<ReferenceRef>,
    pub genre: Option<ReferenceRef>,
    pub condition: Option<ReferenceRef>,
    pub pickup_location: Option<String>,
    pub is_available: Option<bool>,
}

impl BookUpdateRequest {
    /// Validate an update payload.
    ///
    /// `partial = false` (PUT) requires `title` and `pickup_location`.
    /// Reference fragments are optional in both modes: an absent fragment
    /// retains the book's current reference, a present one must carry a
    /// non-empty name. Absent `is_available` retains the current flag.
    pub fn validate(self, partial: bool) -> Result<BookChanges, AppError> {
        let mut errors = Vec::new();

        let (title, pickup_location) = if partial {
            (
                optional_text("title", self.title, &mut errors),
                optional_text("pickup_location", self.pickup_location, &mut errors),
            )
        } else {
            (
                require_text("title", self.title, &mut errors),
                require_text("pickup_location", self.pickup_location, &mut errors),
            )
        };

        let author_name = optional_reference("author", self.author, &mut errors);
        let genre_name = optional_reference("genre", self.genre, &mut errors);
        let condition_name = optional_reference("condition", self.condition, &mut errors);

        if !errors.is_empty() {
            return Err(AppError::validation(errors, "Invalid book payload"));
        }

        Ok(BookChanges {
            title,
            pickup_location,
            is_available: self.is_available,
            author_name,
            genre_name,
            condition_name,
        })
    }
}

fn field_error(field: &str, error: &str) -> serde_json::Value {
    json!({ "field": field, "error": error })
}

fn require_text(
    field: &str,
    value: Option<String>,
    errors: &mut Vec<serde_json::Value>,
) -> Option<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Some(v),
        Some(_) => {
            errors.push(field_error(field, "blank"));
            None
        }
        None => {
            errors.push(field_error(field, "required"));
            None
        }
    }
}

fn optional_text(
    field: &str,
    value: Option<String>,
    errors: &mut Vec<serde_json::Value>,
) -> Option<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Some(v),
        Some(_) => {
            errors.push(field_error(field, "blank"));
            None
        }
        None => None,
    }
}

fn require_reference(
    field: &str,
    value: Option<ReferenceRef>,
    errors: &mut Vec<serde_json::Value>,
) -> Option<String> {
    match value {
        Some(fragment) => reference_name(field, fragment, errors),
        None => {
            errors.push(field_error(field, "required"));
            None
        }
    }
}

fn optional_reference(
    field: &str,
    value: Option<ReferenceRef>,
    errors: &mut Vec<serde_json::Value>,
) -> Option<String> {
    value.and_then(|fragment| reference_name(field, fragment, errors))
}

fn reference_name(
    field: &str,
    fragment: ReferenceRef,
    errors: &mut Vec<serde_json::Value>,
) -> Option<String> {
    match fragment.name {
        Some(name) if !name.trim().is_empty() => Some(name),
        Some(_) => {
            errors.push(field_error(&format!("{field}.name"), "blank"));
            None
        }
        None => {
            errors.push(field_error(&format!("{field}.name"), "required"));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_create() -> BookCreateRequest {
        BookCreateRequest {
            title: Some("Parable of the Sower".to_string()),
            author: Some(ReferenceRef {
                name: Some("Octavia Butler".to_string()),
            }),
            genre: Some(ReferenceRef {
                name: Some("Science Fiction".to_string()),
            }),
            condition: Some(ReferenceRef {
                name: Some("Like New".to_string()),
            }),
            pickup_location: Some("Kreuzberg".to_string()),
            is_available: None,
        }
    }

    #[test]
    fn create_defaults_is_available_to_true() {
        let new = valid_create().validate().unwrap();
        assert!(new.is_available);
    }

    #[test]
    fn create_missing_title_is_invalid() {
        let mut request = valid_create();
        request.title = None;

        let err = request.validate().unwrap_err();
        match err {
            AppError::Validation { details, .. } => {
                assert_eq!(details, vec![field_error("title", "required")]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn create_empty_reference_name_is_invalid() {
        let mut request = valid_create();
        request.author = Some(ReferenceRef {
            name: Some("   ".to_string()),
        });

        let err = request.validate().unwrap_err();
        match err {
            AppError::Validation { details, .. } => {
                assert_eq!(details, vec![field_error("author.name", "blank")]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn create_collects_all_field_errors() {
        let request = BookCreateRequest::default();
        let err = request.validate().unwrap_err();
        match err {
            AppError::Validation { details, .. } => {
                assert_eq!(details.len(), 5);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn partial_update_allows_everything_absent() {
        let changes = BookUpdateRequest::default().validate(true).unwrap();
        assert!(changes.title.is_none());
        assert!(changes.author_name.is_none());
        assert!(changes.is_available.is_none());
    }

    #[test]
    fn full_update_requires_title_and_pickup_location() {
        let err = BookUpdateRequest::default().validate(false).unwrap_err();
        match err {
            AppError::Validation { details, .. } => {
                assert_eq!(
                    details,
                    vec![
                        field_error("title", "required"),
                        field_error("pickup_location", "required"),
                    ]
                );
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn full_update_leaves_absent_references_untouched() {
        let request = BookUpdateRequest {
            title: Some("Updated".to_string()),
            pickup_location: Some("Neukölln".to_string()),
            ..Default::default()
        };

        let changes = request.validate(false).unwrap();
        assert!(changes.author_name.is_none());
        assert!(changes.genre_name.is_none());
        assert!(changes.condition_name.is_none());
    }

    #[test]
    fn update_rejects_blank_present_fields() {
        let request = BookUpdateRequest {
            title: Some("".to_string()),
            ..Default::default()
        };

        let err = request.validate(true).unwrap_err();
        match err {
            AppError::Validation { details, .. } => {
                assert_eq!(details, vec![field_error("title", "blank")]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
