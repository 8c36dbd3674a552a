//! Material entity - A colouring material in the owner's catalog.
//!
//! Each material has a default mixing ratio and may offer alternates, stored in
//! the `material_ratios` table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Material database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "materials")]
pub struct Model {
    /// Unique identifier for the material
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Salon account that owns this record
    pub owner_id: String,
    /// Brand/line name (e.g. "Majirel")
    pub name: String,
    /// `"shade"` for free-text shade names, `"code"` for numeric codes
    pub input_mode: String,
    /// Material side of the default ratio
    pub ratio_material: f64,
    /// Oxidant side of the default ratio
    pub ratio_oxidant: f64,
    /// Inactive materials are not offered for new recipes
    pub is_active: bool,
    /// Position in pickers
    pub sort_order: i32,
    /// When the material was created
    pub created_at: DateTime,
    /// When the material was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Material and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One material offers many alternate ratios
    #[sea_orm(has_many = "super::material_ratio::Entity")]
    Ratios,
}

impl Related<super::material_ratio::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ratios.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
