//! Material line entity - One colouring material measured into a bowl.
//!
//! Name and mixing ratio are snapshots taken when the line was entered, so the
//! stored recipe does not change when the catalog material is edited later.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Material line database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "material_lines")]
pub struct Model {
    /// Unique identifier for the line
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Parent bowl
    pub bowl_id: i64,
    /// 1-based display order within the bowl
    pub position: i32,
    /// Catalog material that was used
    pub material_id: i64,
    /// Material name at the time of the visit
    pub material_name: String,
    /// Shade name or number (e.g. "7.1")
    pub shade_label: String,
    /// Grams of material
    pub material_grams: f64,
    /// Material side of the ratio snapshot
    pub ratio_material: f64,
    /// Oxidant side of the ratio snapshot
    pub ratio_oxidant: f64,
}

/// Defines relationships between `MaterialLine` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line belongs to one bowl
    #[sea_orm(
        belongs_to = "super::bowl::Entity",
        from = "Column::BowlId",
        to = "super::bowl::Column::Id"
    )]
    Bowl,
}

impl Related<super::bowl::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bowl.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
