//! Oxidant entity - A developer (peroxide) product in the owner's catalog.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Oxidant database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "oxidants")]
pub struct Model {
    /// Unique identifier for the oxidant
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Salon account that owns this record
    pub owner_id: String,
    /// Name (e.g. "6%")
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Inactive oxidants are not offered for new recipes
    pub is_active: bool,
    /// Position in pickers
    pub sort_order: i32,
}

/// `Oxidant` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
