/// Database configuration and connection management
pub mod database;

/// Catalog seed loading from catalog.toml
pub mod catalog;

/// Salon account selection from environment variables
pub mod owner;
