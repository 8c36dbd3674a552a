//! Material ratio entity - An alternate mixing ratio offered by a material.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Alternate ratio database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "material_ratios")]
pub struct Model {
    /// Unique identifier for the ratio
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Material offering this ratio
    pub material_id: i64,
    /// Label shown in the ratio picker
    pub label: String,
    /// Material side of the ratio
    pub ratio_material: f64,
    /// Oxidant side of the ratio
    pub ratio_oxidant: f64,
}

/// Defines relationships between `MaterialRatio` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each ratio belongs to one material
    #[sea_orm(
        belongs_to = "super::material::Entity",
        from = "Column::MaterialId",
        to = "super::material::Column::Id"
    )]
    Material,
}

impl Related<super::material::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Material.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
