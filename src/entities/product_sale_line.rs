//! Product sale line entity - One product of a walk-in sale.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product sale line database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_sale_lines")]
pub struct Model {
    /// Unique identifier for the line
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Parent sale
    pub sale_id: i64,
    /// Catalog product that was sold
    pub product_id: i64,
    /// Product name at the time of sale
    pub product_name: String,
    /// Number of pieces
    pub quantity: i32,
    /// Price per piece
    pub unit_price: f64,
}

/// Defines relationships between `ProductSaleLine` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line belongs to one sale
    #[sea_orm(
        belongs_to = "super::product_sale::Entity",
        from = "Column::SaleId",
        to = "super::product_sale::Column::Id"
    )]
    Sale,
}

impl Related<super::product_sale::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sale.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
