//! Visit entity - Root of the recipe tree.
//!
//! A visit owns its services (and through them bowls and material lines) and the
//! products sold during it. Client name and service count are denormalized here
//! so visit lists render without walking the tree.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Visit database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "visits")]
pub struct Model {
    /// Unique identifier for the visit
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Salon account that owns this record
    pub owner_id: String,
    /// Client who was served
    pub client_id: i64,
    /// Client given name at the time of the visit
    pub client_first_name: String,
    /// Client family name at the time of the visit
    pub client_last_name: String,
    /// Day of the visit
    pub date: Date,
    /// Free-text note
    pub note: Option<String>,
    /// `"cash"` or `"qr"`, absent when not recorded
    pub payment_method: Option<String>,
    /// Amount charged for services, entered by staff
    pub services_amount: Option<f64>,
    /// Sum of product lines, absent when zero
    pub products_amount: Option<f64>,
    /// Services plus products, absent when zero
    pub total_amount: Option<f64>,
    /// Number of services, kept for list views
    pub service_count: i32,
    /// When the visit was created
    pub created_at: DateTime,
    /// When the visit was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Visit and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each visit belongs to one client
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id"
    )]
    Client,
    /// One visit has many services
    #[sea_orm(has_many = "super::visit_service::Entity")]
    Services,
    /// One visit has many sold products
    #[sea_orm(has_many = "super::visit_product::Entity")]
    Products,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::visit_service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Services.def()
    }
}

impl Related<super::visit_product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
