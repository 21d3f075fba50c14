pub mod books;

use bookswap_kernel::ModuleRegistry;

use crate::state::AppState;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, state: AppState) {
    registry.register(books::create_module(state));
}
