//! Client entity - A salon customer whose visits are recorded.
//!
//! Clients are never hard-deleted; deactivating one hides it from pickers while
//! its visit history stays intact.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Client database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    /// Unique identifier for the client
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Salon account that owns this record
    pub owner_id: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Contact phone number
    pub phone: Option<String>,
    /// Free-text note
    pub note: Option<String>,
    /// Known allergies, shown as a warning when starting a visit
    pub allergies: Option<String>,
    /// Inactive clients are hidden from search
    pub is_active: bool,
    /// When the client was created
    pub created_at: DateTime,
    /// When the client was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Client and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One client has many visits
    #[sea_orm(has_many = "super::visit::Entity")]
    Visits,
    /// One client has many walk-in sales
    #[sea_orm(has_many = "super::product_sale::Entity")]
    Sales,
}

impl Related<super::visit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Visits.def()
    }
}

impl Related<super::product_sale::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sales.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
