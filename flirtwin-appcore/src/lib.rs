pub mod service;
pub mod slot;
