//! BOOKSWAP Application Library
//!
//! Book-exchange catalog: owner-scoped book listings over shared
//! author/genre/condition reference entities.

pub mod modules;
pub mod state;

pub use state::AppState;
