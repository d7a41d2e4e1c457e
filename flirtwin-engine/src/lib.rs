pub mod client;
pub mod engine;
pub mod error;
pub mod gate;
pub mod traits;
