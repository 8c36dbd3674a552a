//! Core business logic - framework-agnostic recipe, visit and catalog operations.
//!
//! The editing side (`ratio`, `mixing`, `recipe`, `validation`) is synchronous
//! and works on in-memory drafts against a read-only [`catalog::Catalog`]. The
//! storage side (`visit`, `sale`, `client`, catalog maintenance, `report`) is async and
//! takes a `SeaORM` connection.

pub mod catalog;
pub mod client;
pub mod ids;
pub mod material;
pub mod mixing;
pub mod oxidant;
pub mod product;
pub mod ratio;
pub mod recipe;
pub mod report;
pub mod sale;
pub mod service_template;
pub mod validation;
pub mod visit;
