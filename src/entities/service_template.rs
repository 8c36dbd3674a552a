//! Service template entity - A predefined service offered as a quick-add.
//!
//! `bowl_count` is the number of empty bowls a new service starts with. Zero
//! marks a service with no recipe at all, such as a haircut.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Service template database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_templates")]
pub struct Model {
    /// Unique identifier for the template
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Salon account that owns this record
    pub owner_id: String,
    /// Service name copied onto the visit
    pub name: String,
    /// Number of bowls the service starts with
    pub bowl_count: i32,
    /// Inactive templates are hidden
    pub is_active: bool,
    /// Position in the quick-add bar
    pub sort_order: i32,
}

/// `ServiceTemplate` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
