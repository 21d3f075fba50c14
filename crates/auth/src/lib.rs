//! Bearer-token identity for BOOKSWAP.
//!
//! The identity subsystem proper (user accounts, token issuance UX) lives
//! outside this service. This crate holds the in-process token registry and
//! the [`Requester`] extractor that turns an `Authorization` header into an
//! authenticated [`UserId`], rejecting with 401 before any handler logic runs.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bookswap_http::error::AppError;
use bookswap_kernel::settings::AuthSettings;

const AUTH_HEADER: &str = "authorization";
const BEARER_PREFIX: &str = "Bearer ";

/// Opaque identity of an authenticated user. Consumed, never created, by
/// the catalog: handlers receive it from the [`Requester`] extractor and
/// thread it through every query and mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Mint a fresh identity. Used when seeding tokens in tests and tooling.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// In-process registry mapping opaque bearer tokens to user identities.
pub struct TokenAuth {
    tokens: RwLock<HashMap<String, UserId>>,
}

impl TokenAuth {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry seeded with the static tokens from settings.
    pub fn from_settings(settings: &AuthSettings) -> Self {
        let auth = Self::new();
        for seed in &settings.tokens {
            auth.register(seed.token.clone(), UserId::from(seed.user));
        }
        tracing::info!(count = settings.tokens.len(), "seeded auth tokens");
        auth
    }

    /// Register an existing token for a user.
    pub fn register(&self, token: String, user: UserId) {
        let mut tokens = self.tokens.write().unwrap_or_else(|e| e.into_inner());
        tokens.insert(token, user);
    }

    /// Issue a fresh opaque token for a user and return it.
    pub fn issue(&self, user: UserId) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.register(token.clone(), user);
        token
    }

    /// Resolve a raw token to its user, if known.
    pub fn resolve(&self, token: &str) -> Option<UserId> {
        let tokens = self.tokens.read().unwrap_or_else(|e| e.into_inner());
        tokens.get(token).copied()
    }
}

impl Default for TokenAuth {
    fn default() -> Self {
        Self::new()
    }
}

/// Extractor for the authenticated requester identity.
///
/// Resolves `Authorization: Bearer <token>` against the [`TokenAuth`]
/// registry pulled from router state. Missing or unknown credentials reject
/// with 401 before ownership or validation is evaluated.
pub struct Requester(pub UserId);

impl<S> FromRequestParts<S> for Requester
where
    Arc<TokenAuth>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = Arc::<TokenAuth>::from_ref(state);

        let header = parts
            .headers
            .get(AUTH_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                AppError::unauthorized("Authentication credentials were not provided")
            })?;

        let token = header
            .strip_prefix(BEARER_PREFIX)
            .ok_or_else(|| AppError::unauthorized("Invalid authorization header"))?;

        match auth.resolve(token.trim()) {
            Some(user) => Ok(Requester(user)),
            None => {
                tracing::debug!("rejected unknown bearer token");
                Err(AppError::unauthorized("Invalid token"))
            }
        }
    }
}
