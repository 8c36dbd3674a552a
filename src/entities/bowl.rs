//! Bowl entity - One mixing bowl within a service.
//!
//! `oxidant_grams` is derived from the bowl's material lines when the visit is
//! saved; it is stored so a reloaded recipe shows exactly what was mixed.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Bowl database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bowls")]
pub struct Model {
    /// Unique identifier for the bowl
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Parent service
    pub service_id: i64,
    /// 1-based display order within the service
    pub position: i32,
    /// Selected oxidant, absent for an empty bowl
    pub oxidant_id: Option<i64>,
    /// Oxidant name at the time of the visit
    pub oxidant_name: Option<String>,
    /// Grams of oxidant mixed into the bowl
    pub oxidant_grams: f64,
}

/// Defines relationships between Bowl and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each bowl belongs to one service
    #[sea_orm(
        belongs_to = "super::visit_service::Entity",
        from = "Column::ServiceId",
        to = "super::visit_service::Column::Id"
    )]
    Service,
    /// One bowl has many material lines
    #[sea_orm(has_many = "super::material_line::Entity")]
    MaterialLines,
}

impl Related<super::visit_service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Service.def()
    }
}

impl Related<super::material_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MaterialLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
