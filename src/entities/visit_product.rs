//! Visit product entity - A retail product sold during a visit.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Visit product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "visit_products")]
pub struct Model {
    /// Unique identifier for the sale line
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Parent visit
    pub visit_id: i64,
    /// Catalog product that was sold
    pub product_id: i64,
    /// Product name at the time of sale
    pub product_name: String,
    /// Number of pieces
    pub quantity: i32,
    /// Price per piece
    pub unit_price: f64,
}

/// Defines relationships between `VisitProduct` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each sale line belongs to one visit
    #[sea_orm(
        belongs_to = "super::visit::Entity",
        from = "Column::VisitId",
        to = "super::visit::Column::Id"
    )]
    Visit,
}

impl Related<super::visit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Visit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
