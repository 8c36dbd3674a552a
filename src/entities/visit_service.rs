//! Visit service entity - A named treatment performed during a visit.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Visit service database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "visit_services")]
pub struct Model {
    /// Unique identifier for the service row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Parent visit
    pub visit_id: i64,
    /// Display name (e.g. "Barvení", "Střih")
    pub name: String,
    /// 1-based display order within the visit
    pub position: i32,
}

/// Defines relationships between Service and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each service belongs to one visit
    #[sea_orm(
        belongs_to = "super::visit::Entity",
        from = "Column::VisitId",
        to = "super::visit::Column::Id"
    )]
    Visit,
    /// One service has many bowls
    #[sea_orm(has_many = "super::bowl::Entity")]
    Bowls,
}

impl Related<super::visit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Visit.def()
    }
}

impl Related<super::bowl::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bowls.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
