//! Walk-in product sales.
//!
//! A sale is a list of products sold outside of a visit, optionally to a known
//! client. It has no recipe tree; the sale row and its lines are written and
//! removed together in one transaction. Sales count towards the cash register
//! and product revenue in [`crate::core::report`].

use crate::{
    core::{
        catalog::Catalog,
        ids::StoredId,
        visit::{PaymentMethod, check_amount},
    },
    entities::{Client, ProductSale, ProductSaleLine, client, product_sale, product_sale_line},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, instrument};

/// One product of a sale to record.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SaleItem {
    /// Catalog product
    pub product_id: StoredId,
    /// Pieces sold, at least one
    pub quantity: u32,
    /// Price per piece; `None` takes the catalog price
    pub unit_price: Option<f64>,
}

/// A sale to record.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewSale {
    /// Known client, `None` for a walk-in customer
    pub client_id: Option<StoredId>,
    /// Day of the sale
    pub date: NaiveDate,
    /// Free-text note
    pub note: Option<String>,
    /// How the sale was paid
    pub payment_method: Option<PaymentMethod>,
    /// Products sold
    pub items: Vec<SaleItem>,
}

/// A stored sale line.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StoredSaleLine {
    /// Stored id
    pub id: StoredId,
    /// Catalog product
    pub product_id: StoredId,
    /// Product name snapshot
    pub product_name: String,
    /// Pieces sold
    pub quantity: u32,
    /// Price per piece
    pub unit_price: f64,
}

impl StoredSaleLine {
    /// Quantity times unit price.
    #[must_use]
    pub fn amount(&self) -> f64 {
        f64::from(self.quantity) * self.unit_price
    }
}

impl TryFrom<product_sale_line::Model> for StoredSaleLine {
    type Error = Error;

    fn try_from(model: product_sale_line::Model) -> Result<Self> {
        Ok(Self {
            id: StoredId::new(model.id),
            product_id: StoredId::new(model.product_id),
            product_name: model.product_name,
            quantity: u32::try_from(model.quantity)?,
            unit_price: model.unit_price,
        })
    }
}

/// A stored sale with its lines.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StoredSale {
    /// Stored id
    pub id: StoredId,
    /// Known client
    pub client_id: Option<StoredId>,
    /// Client given name snapshot
    pub client_first_name: Option<String>,
    /// Client family name snapshot
    pub client_last_name: Option<String>,
    /// Day of the sale
    pub date: NaiveDate,
    /// Free-text note
    pub note: Option<String>,
    /// How the sale was paid
    pub payment_method: Option<PaymentMethod>,
    /// Sum of the lines
    pub total: f64,
    /// Lines in entry order
    pub lines: Vec<StoredSaleLine>,
}

impl StoredSale {
    fn from_models(model: product_sale::Model, lines: Vec<StoredSaleLine>) -> Result<Self> {
        Ok(Self {
            id: StoredId::new(model.id),
            client_id: model.client_id.map(StoredId::new),
            client_first_name: model.client_first_name,
            client_last_name: model.client_last_name,
            date: model.date,
            note: model.note,
            payment_method: model
                .payment_method
                .as_deref()
                .map(PaymentMethod::parse)
                .transpose()?,
            total: model.total_amount,
            lines,
        })
    }
}

struct PricedItem<'a> {
    product_id: StoredId,
    product_name: &'a str,
    quantity: i32,
    unit_price: f64,
}

fn price_items<'c>(items: &[SaleItem], catalog: &'c Catalog) -> Result<Vec<PricedItem<'c>>> {
    if items.is_empty() {
        return Err(Error::InvalidInput {
            message: "Add at least one product".to_string(),
        });
    }

    items
        .iter()
        .map(|item| {
            if item.quantity == 0 {
                return Err(Error::InvalidAmount { amount: 0.0 });
            }
            let product = catalog
                .product(item.product_id)
                .ok_or_else(|| Error::not_found("Product", item.product_id))?;
            let unit_price = item.unit_price.unwrap_or(product.price);
            check_amount(unit_price)?;
            Ok(PricedItem {
                product_id: product.id,
                product_name: &product.name,
                quantity: i32::try_from(item.quantity)?,
                unit_price,
            })
        })
        .collect()
}

async fn find_owned_sale<C: ConnectionTrait>(
    conn: &C,
    owner_id: &str,
    sale_id: StoredId,
) -> Result<product_sale::Model> {
    ProductSale::find_by_id(sale_id.get())
        .filter(product_sale::Column::OwnerId.eq(owner_id))
        .one(conn)
        .await?
        .ok_or_else(|| Error::not_found("Sale", sale_id))
}

async fn load_lines<C: ConnectionTrait>(
    conn: &C,
    sale_ids: Vec<i64>,
) -> Result<HashMap<i64, Vec<StoredSaleLine>>> {
    let mut by_sale: HashMap<i64, Vec<StoredSaleLine>> = HashMap::new();
    for row in ProductSaleLine::find()
        .filter(product_sale_line::Column::SaleId.is_in(sale_ids))
        .order_by_asc(product_sale_line::Column::Id)
        .all(conn)
        .await?
    {
        by_sale
            .entry(row.sale_id)
            .or_default()
            .push(StoredSaleLine::try_from(row)?);
    }
    Ok(by_sale)
}

/// Records a sale and its lines.
///
/// Product names are snapshotted from the session catalog and a missing unit
/// price falls back to the catalog price.
///
/// # Errors
/// Returns [`Error::InvalidInput`] for a sale without items,
/// [`Error::InvalidAmount`] for a zero quantity or invalid price, and
/// [`Error::NotFound`] for a product outside the catalog or a client of
/// another owner. Nothing is written in those cases.
#[instrument(skip(db, catalog, sale), fields(items = sale.items.len()))]
pub async fn create_sale(
    db: &DatabaseConnection,
    owner_id: &str,
    catalog: &Catalog,
    sale: &NewSale,
) -> Result<StoredId> {
    let priced = price_items(&sale.items, catalog)?;
    let total: f64 = priced
        .iter()
        .map(|p| f64::from(p.quantity) * p.unit_price)
        .sum();

    let txn = db.begin().await?;

    let client = match sale.client_id {
        Some(client_id) => Some(
            Client::find_by_id(client_id.get())
                .filter(client::Column::OwnerId.eq(owner_id))
                .one(&txn)
                .await?
                .ok_or_else(|| Error::not_found("Client", client_id))?,
        ),
        None => None,
    };

    let now = chrono::Utc::now().naive_utc();
    let note = sale.note.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let sale_row = product_sale::ActiveModel {
        owner_id: Set(owner_id.to_string()),
        client_id: Set(client.as_ref().map(|c| c.id)),
        client_first_name: Set(client.as_ref().map(|c| c.first_name.clone())),
        client_last_name: Set(client.map(|c| c.last_name)),
        date: Set(sale.date),
        note: Set(note.map(ToString::to_string)),
        payment_method: Set(sale.payment_method.map(|m| m.as_str().to_string())),
        total_amount: Set(total),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    for item in &priced {
        product_sale_line::ActiveModel {
            sale_id: Set(sale_row.id),
            product_id: Set(item.product_id.get()),
            product_name: Set(item.product_name.to_string()),
            quantity: Set(item.quantity),
            unit_price: Set(item.unit_price),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;

    info!(sale_id = sale_row.id, total, "Sale recorded");
    Ok(StoredId::new(sale_row.id))
}

/// Loads one sale with its lines.
///
/// # Errors
/// Returns [`Error::NotFound`] if the sale does not exist for this owner.
pub async fn get_sale(db: &DatabaseConnection, owner_id: &str, sale_id: StoredId) -> Result<StoredSale> {
    let model = find_owned_sale(db, owner_id, sale_id).await?;
    let lines = load_lines(db, vec![model.id])
        .await?
        .remove(&model.id)
        .unwrap_or_default();
    StoredSale::from_models(model, lines)
}

/// Lists an owner's sales newest first, optionally for one client.
///
/// # Errors
/// Returns an error if a query fails.
pub async fn list_sales(
    db: &DatabaseConnection,
    owner_id: &str,
    client_id: Option<StoredId>,
) -> Result<Vec<StoredSale>> {
    let mut query = ProductSale::find().filter(product_sale::Column::OwnerId.eq(owner_id));
    if let Some(client_id) = client_id {
        query = query.filter(product_sale::Column::ClientId.eq(client_id.get()));
    }
    let models = query
        .order_by_desc(product_sale::Column::Date)
        .order_by_desc(product_sale::Column::Id)
        .all(db)
        .await?;

    let mut lines = load_lines(db, models.iter().map(|m| m.id).collect()).await?;
    models
        .into_iter()
        .map(|model| {
            let own = lines.remove(&model.id).unwrap_or_default();
            StoredSale::from_models(model, own)
        })
        .collect()
}

/// Deletes a sale, lines first, and returns the number of lines removed.
///
/// # Errors
/// Returns [`Error::NotFound`] if the sale does not exist for this owner.
#[instrument(skip(db))]
pub async fn delete_sale(db: &DatabaseConnection, owner_id: &str, sale_id: StoredId) -> Result<u64> {
    let txn = db.begin().await?;

    let existing = find_owned_sale(&txn, owner_id, sale_id).await?;
    let lines = ProductSaleLine::delete_many()
        .filter(product_sale_line::Column::SaleId.eq(existing.id))
        .exec(&txn)
        .await?
        .rows_affected;
    ProductSale::delete_by_id(existing.id).exec(&txn).await?;

    txn.commit().await?;

    info!(sale_id = existing.id, lines, "Sale deleted");
    Ok(lines)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::{catalog::load_catalog, product};
    use crate::test_utils::*;
    use sea_orm::PaginatorTrait;

    fn walk_in(date: NaiveDate, items: Vec<SaleItem>) -> NewSale {
        NewSale {
            client_id: None,
            date,
            note: None,
            payment_method: Some(PaymentMethod::Cash),
            items,
        }
    }

    fn item(product_id: i64, quantity: u32) -> SaleItem {
        SaleItem {
            product_id: StoredId::new(product_id),
            quantity,
            unit_price: None,
        }
    }

    #[tokio::test]
    async fn test_create_sale_snapshots_catalog() -> Result<()> {
        let db = setup_test_db().await?;
        let shampoo = product::create_product(&db, TEST_OWNER, "Shampoo".to_string(), 350.0, 0).await?;
        let mask = product::create_product(&db, TEST_OWNER, "Mask".to_string(), 500.0, 1).await?;
        let catalog = load_catalog(&db, TEST_OWNER).await?;

        let mut sale = walk_in(
            NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            vec![item(shampoo.id, 2), item(mask.id, 1)],
        );
        sale.items[1].unit_price = Some(450.0);
        sale.note = Some("  ".to_string());
        let id = create_sale(&db, TEST_OWNER, &catalog, &sale).await?;

        product::update_product(
            &db,
            TEST_OWNER,
            StoredId::new(shampoo.id),
            "Shampoo XL".to_string(),
            420.0,
        )
        .await?;

        let stored = get_sale(&db, TEST_OWNER, id).await?;
        assert_eq!(stored.total, 1150.0);
        assert_eq!(stored.client_id, None);
        assert_eq!(stored.note, None);
        assert_eq!(stored.payment_method, Some(PaymentMethod::Cash));
        assert_eq!(stored.lines.len(), 2);
        assert_eq!(stored.lines[0].product_name, "Shampoo");
        assert_eq!(stored.lines[0].amount(), 700.0);
        assert_eq!(stored.lines[1].unit_price, 450.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_sale_to_known_client() -> Result<()> {
        let db = setup_test_db().await?;
        let jana = create_test_client(&db, "Jana", "Nováková").await?;
        let shampoo = product::create_product(&db, TEST_OWNER, "Shampoo".to_string(), 350.0, 0).await?;
        let catalog = load_catalog(&db, TEST_OWNER).await?;
        let day = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();

        let mut sale = walk_in(day, vec![item(shampoo.id, 1)]);
        sale.client_id = Some(StoredId::new(jana.id));
        create_sale(&db, TEST_OWNER, &catalog, &sale).await?;
        create_sale(&db, TEST_OWNER, &catalog, &walk_in(day, vec![item(shampoo.id, 1)])).await?;

        let for_jana = list_sales(&db, TEST_OWNER, Some(StoredId::new(jana.id))).await?;
        assert_eq!(for_jana.len(), 1);
        assert_eq!(for_jana[0].client_last_name.as_deref(), Some("Nováková"));
        assert_eq!(list_sales(&db, TEST_OWNER, None).await?.len(), 2);

        sale.client_id = Some(StoredId::new(999));
        let missing = create_sale(&db, TEST_OWNER, &catalog, &sale).await;
        assert!(missing.unwrap_err().is_not_found());
        assert_eq!(ProductSale::find().count(&db).await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_sales_write_nothing() -> Result<()> {
        let db = setup_test_db().await?;
        let shampoo = product::create_product(&db, TEST_OWNER, "Shampoo".to_string(), 350.0, 0).await?;
        let catalog = load_catalog(&db, TEST_OWNER).await?;
        let day = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();

        let empty = create_sale(&db, TEST_OWNER, &catalog, &walk_in(day, Vec::new())).await;
        assert!(matches!(empty, Err(Error::InvalidInput { .. })));

        let zero = create_sale(&db, TEST_OWNER, &catalog, &walk_in(day, vec![item(shampoo.id, 0)])).await;
        assert!(matches!(zero, Err(Error::InvalidAmount { .. })));

        let unknown = create_sale(&db, TEST_OWNER, &catalog, &walk_in(day, vec![item(404, 1)])).await;
        assert!(unknown.unwrap_err().is_not_found());

        let mut negative = walk_in(day, vec![item(shampoo.id, 1)]);
        negative.items[0].unit_price = Some(-5.0);
        let negative = create_sale(&db, TEST_OWNER, &catalog, &negative).await;
        assert!(matches!(negative, Err(Error::InvalidAmount { .. })));

        assert_eq!(ProductSale::find().count(&db).await?, 0);
        assert_eq!(ProductSaleLine::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_newest_first_and_delete() -> Result<()> {
        let db = setup_test_db().await?;
        let shampoo = product::create_product(&db, TEST_OWNER, "Shampoo".to_string(), 350.0, 0).await?;
        let catalog = load_catalog(&db, TEST_OWNER).await?;

        let older = create_sale(
            &db,
            TEST_OWNER,
            &catalog,
            &walk_in(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(), vec![item(shampoo.id, 1)]),
        )
        .await?;
        let newer = create_sale(
            &db,
            TEST_OWNER,
            &catalog,
            &walk_in(
                NaiveDate::from_ymd_opt(2026, 2, 5).unwrap(),
                vec![item(shampoo.id, 1), item(shampoo.id, 3)],
            ),
        )
        .await?;

        let listed = list_sales(&db, TEST_OWNER, None).await?;
        assert_eq!(listed[0].id, newer);
        assert_eq!(listed[0].lines.len(), 2);
        assert_eq!(listed[1].id, older);

        assert!(delete_sale(&db, "someone-else", newer).await.unwrap_err().is_not_found());
        assert_eq!(delete_sale(&db, TEST_OWNER, newer).await?, 2);
        assert_eq!(ProductSaleLine::find().count(&db).await?, 1);
        assert!(get_sale(&db, TEST_OWNER, newer).await.unwrap_err().is_not_found());
        assert_eq!(get_sale(&db, TEST_OWNER, older).await?.total, 350.0);
        Ok(())
    }
}
