pub mod models;
pub mod routes;
pub mod service;

use async_trait::async_trait;
use axum::routing::get;
use axum::Router;
use bookswap_kernel::{InitCtx, Module};

use crate::state::AppState;

/// Books module: owner-scoped CRUD over book listings with shared
/// author/genre/condition reference entities.
pub struct BooksModule {
    state: AppState,
}

impl BooksModule {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(routes::list_books).post(routes::create_book))
            .route(
                "/{id}",
                get(routes::get_book)
                    .put(routes::replace_book)
                    .patch(routes::patch_book)
                    .delete(routes::delete_book),
            )
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List the requester's books",
                        "tags": ["Books"],
                        "security": [{"bearerAuth": []}],
                        "responses": {
                            "200": {
                                "description": "Books owned by the requester, newest first",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": {
                                                "$ref": "#/components/schemas/BookSummary"
                                            }
                                        }
                                    }
                                }
                            },
                            "401": {
                                "description": "Missing or invalid credentials",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/ErrorResponse"
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "security": [{"bearerAuth": []}],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "$ref": "#/components/schemas/BookWrite"
                                    }
                                }
                            }
                        },
                        "responses": {
                            "201": {
                                "description": "Created book with resolved references",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/BookDetail"
                                        }
                                    }
                                }
                            },
                            "400": {
                                "description": "Validation error",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/ErrorResponse"
                                        }
                                    }
                                }
                            },
                            "401": {
                                "description": "Missing or invalid credentials",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/ErrorResponse"
                                        }
                                    }
                                }
                            }
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Retrieve a book",
                        "tags": ["Books"],
                        "security": [{"bearerAuth": []}],
                        "parameters": [{
                            "name": "id",
                            "in": "path",
                            "required": true,
                            "schema": {"type": "integer", "format": "int64"}
                        }],
                        "responses": {
                            "200": {
                                "description": "The requested book",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/BookDetail"
                                        }
                                    }
                                }
                            },
                            "404": {
                                "description": "Unknown id or owned by another user",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/ErrorResponse"
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "put": {
                        "summary": "Replace a book",
                        "tags": ["Books"],
                        "security": [{"bearerAuth": []}],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "$ref": "#/components/schemas/BookWrite"
                                    }
                                }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "Updated book",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/BookDetail"
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "patch": {
                        "summary": "Partially update a book",
                        "tags": ["Books"],
                        "security": [{"bearerAuth": []}],
                        "responses": {
                            "200": {
                                "description": "Updated book",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/BookDetail"
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "security": [{"bearerAuth": []}],
                        "responses": {
                            "204": {
                                "description": "Book deleted"
                            },
                            "404": {
                                "description": "Unknown id or owned by another user",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/ErrorResponse"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Reference": {
                        "type": "object",
                        "properties": {
                            "name": {
                                "type": "string",
                                "description": "Unique name of the reference entity"
                            }
                        },
                        "required": ["name"]
                    },
                    "ReferenceDetail": {
                        "type": "object",
                        "properties": {
                            "id": {
                                "type": "integer",
                                "format": "int64"
                            },
                            "name": {
                                "type": "string"
                            }
                        },
                        "required": ["id", "name"]
                    },
                    "BookSummary": {
                        "type": "object",
                        "properties": {
                            "id": {"type": "integer", "format": "int64"},
                            "title": {"type": "string"},
                            "author": {"$ref": "#/components/schemas/Reference"},
                            "genre": {"$ref": "#/components/schemas/Reference"},
                            "condition": {"$ref": "#/components/schemas/Reference"},
                            "pickup_location": {"type": "string"},
                            "is_available": {"type": "boolean"}
                        },
                        "required": ["id", "title", "author", "genre", "condition", "pickup_location", "is_available"]
                    },
                    "BookDetail": {
                        "type": "object",
                        "properties": {
                            "id": {"type": "integer", "format": "int64"},
                            "title": {"type": "string"},
                            "author": {"$ref": "#/components/schemas/ReferenceDetail"},
                            "genre": {"$ref": "#/components/schemas/ReferenceDetail"},
                            "condition": {"$ref": "#/components/schemas/ReferenceDetail"},
                            "pickup_location": {"type": "string"},
                            "is_available": {"type": "boolean"}
                        },
                        "required": ["id", "title", "author", "genre", "condition", "pickup_location", "is_available"]
                    },
                    "BookWrite": {
                        "type": "object",
                        "properties": {
                            "title": {"type": "string"},
                            "author": {"$ref": "#/components/schemas/Reference"},
                            "genre": {"$ref": "#/components/schemas/Reference"},
                            "condition": {"$ref": "#/components/schemas/Reference"},
                            "pickup_location": {"type": "string"},
                            "is_available": {"type": "boolean"}
                        },
                        "required": ["title", "author", "genre", "condition", "pickup_location"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module(state: AppState) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new(state))
}
