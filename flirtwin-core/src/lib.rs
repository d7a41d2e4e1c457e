pub mod config;
pub mod inspiration;
pub mod prompt;
pub mod schema;
pub mod shape;
pub mod text;
pub mod types;

// Flat re-exports so callers can import from the crate root.
pub use config::*;
pub use inspiration::*;
pub use prompt::*;
pub use schema::*;
pub use shape::*;
pub use text::*;
pub use types::*;
