//! Shared application state threaded into module routers.

use std::sync::Arc;

use axum::extract::FromRef;

use bookswap_auth::TokenAuth;
use bookswap_kernel::settings::Settings;
use bookswap_store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub auth: Arc<TokenAuth>,
}

impl AppState {
    /// Fresh state with an empty store and the token registry seeded from
    /// settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            store: Arc::new(Store::new()),
            auth: Arc::new(TokenAuth::from_settings(&settings.auth)),
        }
    }
}

// Lets the `Requester` extractor pull the token registry out of any router
// built over `AppState`.
impl FromRef<AppState> for Arc<TokenAuth> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}
