//! Retail products sold during visits.
//!
//! Products are never hard-deleted. A visit sale line keeps its own name and
//! unit price snapshot, so renaming, repricing or deactivating a product only
//! changes what new visits are offered.

use crate::{
    core::ids::StoredId,
    entities::{Product, product},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

fn check_product(name: &str, price: f64) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidInput {
            message: "Product name cannot be empty".to_string(),
        });
    }

    if !price.is_finite() || price < 0.0 {
        return Err(Error::InvalidAmount { amount: price });
    }

    Ok(())
}

/// Products of an owner, active and inactive, in shelf order.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_all_products(db: &DatabaseConnection, owner_id: &str) -> Result<Vec<product::Model>> {
    Product::find()
        .filter(product::Column::OwnerId.eq(owner_id))
        .order_by_asc(product::Column::SortOrder)
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Loads one product of the owner.
///
/// # Errors
/// Returns [`Error::NotFound`] if the product does not exist for this owner.
pub async fn get_product(
    db: &DatabaseConnection,
    owner_id: &str,
    product_id: StoredId,
) -> Result<product::Model> {
    Product::find_by_id(product_id.get())
        .filter(product::Column::OwnerId.eq(owner_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Product", product_id))
}

/// Creates an active product.
///
/// # Errors
/// Returns [`Error::InvalidInput`] for a blank name, [`Error::InvalidAmount`]
/// for a negative or non-finite price, or a database error.
pub async fn create_product(
    db: &DatabaseConnection,
    owner_id: &str,
    name: String,
    price: f64,
    sort_order: i32,
) -> Result<product::Model> {
    check_product(&name, price)?;

    let now = chrono::Utc::now().naive_utc();
    let created = product::ActiveModel {
        owner_id: Set(owner_id.to_string()),
        name: Set(name.trim().to_string()),
        price: Set(price),
        is_active: Set(true),
        sort_order: Set(sort_order),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(product_id = created.id, price, "Product created");
    Ok(created)
}

/// Renames and reprices a product. Sale lines already stored keep their price.
///
/// # Errors
/// Returns a validation error as [`create_product`] does, or
/// [`Error::NotFound`] if the product does not belong to the owner.
pub async fn update_product(
    db: &DatabaseConnection,
    owner_id: &str,
    product_id: StoredId,
    name: String,
    price: f64,
) -> Result<product::Model> {
    check_product(&name, price)?;

    let mut product: product::ActiveModel = get_product(db, owner_id, product_id).await?.into();
    product.name = Set(name.trim().to_string());
    product.price = Set(price);
    product.updated_at = Set(chrono::Utc::now().naive_utc());
    product.update(db).await.map_err(Into::into)
}

/// Activates or deactivates a product.
///
/// # Errors
/// Returns [`Error::NotFound`] if the product does not belong to the owner.
pub async fn set_product_active(
    db: &DatabaseConnection,
    owner_id: &str,
    product_id: StoredId,
    is_active: bool,
) -> Result<product::Model> {
    let mut product: product::ActiveModel = get_product(db, owner_id, product_id).await?.into();
    product.is_active = Set(is_active);
    product.updated_at = Set(chrono::Utc::now().naive_utc());
    product.update(db).await.map_err(Into::into)
}
