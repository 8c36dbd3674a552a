//! Oxidant catalog maintenance.

use crate::{
    core::ids::StoredId,
    entities::{Oxidant, oxidant},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Retrieves all oxidants of an owner, active and inactive, ordered by name.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_oxidants(db: &DatabaseConnection, owner_id: &str) -> Result<Vec<oxidant::Model>> {
    Oxidant::find()
        .filter(oxidant::Column::OwnerId.eq(owner_id))
        .order_by_asc(oxidant::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates an active oxidant.
///
/// # Errors
/// Returns an error if the name is empty or the insert fails.
pub async fn create_oxidant(
    db: &DatabaseConnection,
    owner_id: &str,
    name: String,
    description: Option<String>,
    sort_order: i32,
) -> Result<oxidant::Model> {
    if name.trim().is_empty() {
        return Err(Error::InvalidInput {
            message: "Oxidant name cannot be empty".to_string(),
        });
    }

    oxidant::ActiveModel {
        owner_id: Set(owner_id.to_string()),
        name: Set(name.trim().to_string()),
        description: Set(description.filter(|d| !d.trim().is_empty())),
        is_active: Set(true),
        sort_order: Set(sort_order),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Activates or deactivates an oxidant.
///
/// # Errors
/// Returns [`Error::NotFound`] if the oxidant does not belong to the owner.
pub async fn set_oxidant_active(
    db: &DatabaseConnection,
    owner_id: &str,
    oxidant_id: StoredId,
    is_active: bool,
) -> Result<oxidant::Model> {
    let mut oxidant: oxidant::ActiveModel = Oxidant::find_by_id(oxidant_id.get())
        .filter(oxidant::Column::OwnerId.eq(owner_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Oxidant", oxidant_id))?
        .into();

    oxidant.is_active = Set(is_active);
    oxidant.update(db).await.map_err(Into::into)
}
