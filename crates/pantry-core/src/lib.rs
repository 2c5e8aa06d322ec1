pub mod backend;
pub mod config;
pub mod recipe;
pub mod state;

// Re-export main types for convenience
pub use backend::{normalize_backend_url, BackendClient, BackendHealth, BackendInfo};
pub use config::Config;
pub use recipe::{parse_ingredients, parse_recipe, Ingredient, ParsedRecipe};
pub use state::{ChatMessage, ChatRole, ConnectionState};
