//! Product entity - A retail product that can be sold during a visit.
//!
//! Products carry a default unit price; the price actually charged is copied
//! onto the visit's sale line and may differ.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Salon account that owns this record
    pub owner_id: String,
    /// Name of the product (e.g. "Shampoo 250 ml")
    pub name: String,
    /// Default price per piece
    pub price: f64,
    /// Inactive products are not offered for sale
    pub is_active: bool,
    /// Position in pickers
    pub sort_order: i32,
    /// When the product was created
    pub created_at: DateTime,
    /// When the product was last modified
    pub updated_at: DateTime,
}

/// `Product` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
