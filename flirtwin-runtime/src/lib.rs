pub mod config_store;
pub mod files;
pub mod gemini;
pub mod runtime_engine;
pub mod secrets;
