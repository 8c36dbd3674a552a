//! Product sale entity - A retail sale made outside of a visit.
//!
//! Walk-in customers buy products without being served. The client is optional;
//! when present its name is snapshotted like on a visit.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product sale database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_sales")]
pub struct Model {
    /// Unique identifier for the sale
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Salon account that owns this record
    pub owner_id: String,
    /// Known client, absent for a walk-in customer
    pub client_id: Option<i64>,
    /// Client given name at the time of the sale
    pub client_first_name: Option<String>,
    /// Client family name at the time of the sale
    pub client_last_name: Option<String>,
    /// Day of the sale
    pub date: Date,
    /// Free-text note
    pub note: Option<String>,
    /// `"cash"` or `"qr"`, absent when not recorded
    pub payment_method: Option<String>,
    /// Sum of the sale lines
    pub total_amount: f64,
    /// When the sale was created
    pub created_at: DateTime,
    /// When the sale was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between `ProductSale` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A sale may belong to a client
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id"
    )]
    Client,
    /// One sale has many lines
    #[sea_orm(has_many = "super::product_sale_line::Entity")]
    Lines,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::product_sale_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
