pub mod posts;

use inkwell_kernel::ModuleRegistry;

use posts::repository::SharedPostRepository;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, posts: SharedPostRepository) {
    registry.register_custom(posts::create_module(posts));
}
