//! Material catalog maintenance.
//!
//! Materials and their alternate ratios are edited here. Editing a material's
//! default ratio only affects recipes entered afterwards: stored material lines
//! keep their own ratio snapshot.

use crate::{
    core::{
        catalog::{CatalogMaterial, InputMode},
        ids::StoredId,
        ratio::{MixingRatio, NamedRatio},
    },
    entities::{Material, MaterialRatio, material, material_ratio},
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use std::collections::HashMap;

/// Fields of a material to create.
#[derive(Debug, Clone)]
pub struct NewMaterial {
    /// Display name
    pub name: String,
    /// Shade entry mode
    pub input_mode: InputMode,
    /// Default mixing ratio
    pub default_ratio: MixingRatio,
    /// Alternate ratios offered next to the default
    pub alternate_ratios: Vec<NamedRatio>,
    /// Picker position
    pub sort_order: i32,
}

/// A material for catalog maintenance, with its ratios and active flag.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MaterialRecord {
    /// Name, input mode, default and alternate ratios
    pub material: CatalogMaterial,
    /// Inactive materials are hidden from new recipes
    pub is_active: bool,
}

/// Loads the alternate ratios of several materials in one query, grouped by
/// material id and kept in insertion order.
pub(crate) async fn load_ratios<C: ConnectionTrait>(
    conn: &C,
    material_ids: Vec<i64>,
) -> Result<HashMap<i64, Vec<material_ratio::Model>>> {
    let mut by_material: HashMap<i64, Vec<material_ratio::Model>> = HashMap::new();
    for ratio in MaterialRatio::find()
        .filter(material_ratio::Column::MaterialId.is_in(material_ids))
        .order_by_asc(material_ratio::Column::Id)
        .all(conn)
        .await?
    {
        by_material.entry(ratio.material_id).or_default().push(ratio);
    }
    Ok(by_material)
}

/// Retrieves all materials of an owner, active and inactive, ordered by name.
///
/// Each record carries the default ratio and the alternate ratios.
///
/// # Errors
/// Returns an error if a query fails or a stored ratio or input mode is invalid.
pub async fn get_materials(db: &DatabaseConnection, owner_id: &str) -> Result<Vec<MaterialRecord>> {
    let models = Material::find()
        .filter(material::Column::OwnerId.eq(owner_id))
        .order_by_asc(material::Column::Name)
        .all(db)
        .await?;

    let mut ratios = load_ratios(db, models.iter().map(|m| m.id).collect()).await?;
    models
        .into_iter()
        .map(|model| {
            let is_active = model.is_active;
            let alternates = ratios.remove(&model.id).unwrap_or_default();
            Ok(MaterialRecord {
                material: CatalogMaterial::from_models(model, alternates)?,
                is_active,
            })
        })
        .collect()
}

/// Retrieves the alternate ratios of a material in insertion order.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_material_ratios(
    db: &DatabaseConnection,
    material_id: StoredId,
) -> Result<Vec<material_ratio::Model>> {
    MaterialRatio::find()
        .filter(material_ratio::Column::MaterialId.eq(material_id.get()))
        .order_by_asc(material_ratio::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates a material together with its alternate ratios.
///
/// # Errors
/// Returns an error if the name is empty or the database insert fails.
pub async fn create_material(
    db: &DatabaseConnection,
    owner_id: &str,
    new_material: NewMaterial,
) -> Result<material::Model> {
    if new_material.name.trim().is_empty() {
        return Err(Error::InvalidInput {
            message: "Material name cannot be empty".to_string(),
        });
    }

    let now = chrono::Utc::now().naive_utc();
    let txn = db.begin().await?;

    let created = material::ActiveModel {
        owner_id: Set(owner_id.to_string()),
        name: Set(new_material.name.trim().to_string()),
        input_mode: Set(new_material.input_mode.as_str().to_string()),
        ratio_material: Set(new_material.default_ratio.material_parts()),
        ratio_oxidant: Set(new_material.default_ratio.oxidant_parts()),
        is_active: Set(true),
        sort_order: Set(new_material.sort_order),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    for alt in new_material.alternate_ratios {
        insert_ratio(&txn, created.id, alt).await?;
    }

    txn.commit().await?;
    Ok(created)
}

async fn insert_ratio<C: ConnectionTrait>(
    conn: &C,
    material_id: i64,
    ratio: NamedRatio,
) -> Result<material_ratio::Model> {
    material_ratio::ActiveModel {
        material_id: Set(material_id),
        label: Set(ratio.label),
        ratio_material: Set(ratio.ratio.material_parts()),
        ratio_oxidant: Set(ratio.ratio.oxidant_parts()),
        ..Default::default()
    }
    .insert(conn)
    .await
    .map_err(Into::into)
}

async fn find_owned(
    db: &DatabaseConnection,
    owner_id: &str,
    material_id: StoredId,
) -> Result<material::Model> {
    Material::find_by_id(material_id.get())
        .filter(material::Column::OwnerId.eq(owner_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Material", material_id))
}

/// Adds an alternate ratio to an existing material.
///
/// # Errors
/// Returns [`Error::NotFound`] if the material does not belong to the owner.
pub async fn add_alternate_ratio(
    db: &DatabaseConnection,
    owner_id: &str,
    material_id: StoredId,
    ratio: NamedRatio,
) -> Result<material_ratio::Model> {
    let material = find_owned(db, owner_id, material_id).await?;
    insert_ratio(db, material.id, ratio).await
}

/// Changes a material's default ratio.
///
/// # Errors
/// Returns [`Error::NotFound`] if the material does not belong to the owner.
pub async fn update_default_ratio(
    db: &DatabaseConnection,
    owner_id: &str,
    material_id: StoredId,
    ratio: MixingRatio,
) -> Result<material::Model> {
    let mut material: material::ActiveModel = find_owned(db, owner_id, material_id).await?.into();
    material.ratio_material = Set(ratio.material_parts());
    material.ratio_oxidant = Set(ratio.oxidant_parts());
    material.updated_at = Set(chrono::Utc::now().naive_utc());
    material.update(db).await.map_err(Into::into)
}

/// Activates or deactivates a material.
///
/// # Errors
/// Returns [`Error::NotFound`] if the material does not belong to the owner.
pub async fn set_material_active(
    db: &DatabaseConnection,
    owner_id: &str,
    material_id: StoredId,
    is_active: bool,
) -> Result<material::Model> {
    let mut material: material::ActiveModel = find_owned(db, owner_id, material_id).await?.into();
    material.is_active = Set(is_active);
    material.updated_at = Set(chrono::Utc::now().naive_utc());
    material.update(db).await.map_err(Into::into)
}
