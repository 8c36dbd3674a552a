//! Visit persistence - writes and reads the whole recipe tree.
//!
//! A visit is stored one table per level: the visit row, its services, each
//! service's bowls, each bowl's material lines, plus the products sold during
//! the visit. Writes go parent first so every child has a parent id; deletes go
//! leaf first so no child is left without a parent. Each cascade runs inside a
//! single database transaction, so a failure part-way through leaves nothing
//! behind.
//!
//! Payloads are typed per level. Their fields are private and
//! [`NewVisit::from_draft`] is the only constructor, so every stored tree has
//! passed validation.

use crate::{
    core::{
        catalog::Catalog,
        ids::StoredId,
        mixing,
        ratio::{self, MixingRatio},
        recipe::VisitDraft,
        validation::{self, ValidationError},
    },
    entities::{
        Bowl, Client, MaterialLine, Visit, VisitProduct, VisitService, bowl, client,
        material_line, visit, visit_product, visit_service,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// How a visit or a walk-in sale was paid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum PaymentMethod {
    /// Cash at the register
    Cash,
    /// Bank transfer from a QR code
    Qr,
}

impl PaymentMethod {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Qr => "qr",
        }
    }

    /// Parses the stored representation.
    ///
    /// # Errors
    /// Returns [`Error::InvalidStoredValue`] for anything but `"cash"` or `"qr"`.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "cash" => Ok(Self::Cash),
            "qr" => Ok(Self::Qr),
            other => Err(Error::InvalidStoredValue {
                field: "payment_method",
                value: other.to_string(),
            }),
        }
    }
}

/// Money amounts of a visit as stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct VisitTotals {
    /// Amount charged for services
    pub services: Option<f64>,
    /// Sum of product lines; `None` when nothing was sold
    pub products: Option<f64>,
    /// Services plus products; `None` when both are zero
    pub total: Option<f64>,
}

/// Derives the stored totals from the services amount and the product sum.
#[must_use]
pub fn compute_totals(services_amount: Option<f64>, products_amount: f64) -> VisitTotals {
    let total = services_amount.unwrap_or(0.0) + products_amount;
    VisitTotals {
        services: services_amount,
        products: (products_amount > 0.0).then_some(products_amount),
        total: (total > 0.0).then_some(total),
    }
}

pub(crate) fn check_amount(amount: f64) -> Result<()> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidAmount { amount })
    }
}

fn ordinal(index: usize) -> Result<i32> {
    Ok(i32::try_from(index + 1)?)
}

// ---- request records ----
//
// Fields are private: a payload only comes out of `NewVisit::from_draft`, so
// everything `create_visit` stores has passed validation.

/// One material line to store.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewMaterialLine {
    /// Catalog material
    material_id: StoredId,
    /// Material name snapshot
    material_name: String,
    /// Shade name or number
    shade_label: String,
    /// Strictly positive grams
    grams: f64,
    /// Ratio snapshot
    ratio: MixingRatio,
}

/// One bowl to store.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewBowl {
    /// Selected oxidant; `None` only for a bowl without lines
    oxidant_id: Option<StoredId>,
    /// Oxidant name snapshot
    oxidant_name: Option<String>,
    /// Derived oxidant grams
    oxidant_grams: f64,
    /// Lines in order
    lines: Vec<NewMaterialLine>,
}

/// One service to store.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewService {
    /// Display name
    name: String,
    /// Bowls in order
    bowls: Vec<NewBowl>,
}

/// One product sale to store.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewVisitProduct {
    /// Catalog product
    product_id: StoredId,
    /// Product name snapshot
    product_name: String,
    /// Pieces sold
    quantity: u32,
    /// Price per piece
    unit_price: f64,
}

/// A complete visit payload.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewVisit {
    /// Client served
    client_id: StoredId,
    /// Visit day
    date: NaiveDate,
    /// Note; `None` when blank
    note: Option<String>,
    /// How the visit was paid
    payment_method: Option<PaymentMethod>,
    /// Amount charged for services
    services_amount: Option<f64>,
    /// Services in order
    services: Vec<NewService>,
    /// Products sold
    products: Vec<NewVisitProduct>,
}

impl NewMaterialLine {
    /// Catalog material.
    #[must_use]
    pub const fn material_id(&self) -> StoredId {
        self.material_id
    }

    /// Material name snapshot.
    #[must_use]
    pub fn material_name(&self) -> &str {
        &self.material_name
    }

    /// Shade name or number.
    #[must_use]
    pub fn shade_label(&self) -> &str {
        &self.shade_label
    }

    /// Grams of material, always positive.
    #[must_use]
    pub const fn grams(&self) -> f64 {
        self.grams
    }

    /// Ratio snapshot.
    #[must_use]
    pub const fn ratio(&self) -> MixingRatio {
        self.ratio
    }
}

impl NewBowl {
    /// Selected oxidant.
    #[must_use]
    pub const fn oxidant_id(&self) -> Option<StoredId> {
        self.oxidant_id
    }

    /// Oxidant name snapshot.
    #[must_use]
    pub fn oxidant_name(&self) -> Option<&str> {
        self.oxidant_name.as_deref()
    }

    /// Derived oxidant grams.
    #[must_use]
    pub const fn oxidant_grams(&self) -> f64 {
        self.oxidant_grams
    }

    /// Lines in order.
    #[must_use]
    pub fn lines(&self) -> &[NewMaterialLine] {
        &self.lines
    }
}

impl NewService {
    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bowls in order.
    #[must_use]
    pub fn bowls(&self) -> &[NewBowl] {
        &self.bowls
    }
}

impl NewVisitProduct {
    /// Catalog product.
    #[must_use]
    pub const fn product_id(&self) -> StoredId {
        self.product_id
    }

    /// Product name snapshot.
    #[must_use]
    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    /// Pieces sold.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Price per piece.
    #[must_use]
    pub const fn unit_price(&self) -> f64 {
        self.unit_price
    }
}

impl NewVisit {
    /// Builds a payload from an editor draft.
    ///
    /// The draft is validated first. Catalog names are snapshotted into the
    /// payload, lines without a ratio snapshot get the material's default, and
    /// every bowl's oxidant grams are recomputed.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] with the first violated rule,
    /// [`Error::InvalidAmount`] for an invalid services amount or unit price and
    /// [`Error::NotFound`] for a product missing from the session catalog.
    pub fn from_draft(draft: &VisitDraft, catalog: &Catalog) -> Result<Self> {
        validation::validate(draft, catalog)?;

        let client_id = draft.client_id.ok_or(ValidationError::MissingClient)?;
        let date = draft.date.ok_or(ValidationError::MissingDate)?;
        if let Some(amount) = draft.services_amount {
            check_amount(amount)?;
        }

        let mut services = Vec::with_capacity(draft.services.len());
        for service in &draft.services {
            let mut bowls = Vec::with_capacity(service.bowls.len());
            for bowl in &service.bowls {
                let mut lines = Vec::with_capacity(bowl.lines.len());
                for line in &bowl.lines {
                    let material = line
                        .material_id
                        .and_then(|id| catalog.material(id))
                        .ok_or(ValidationError::MissingMaterial)?;
                    let grams = line.grams.ok_or(ValidationError::NonPositiveGrams)?;
                    lines.push(NewMaterialLine {
                        material_id: material.id,
                        material_name: material.name.clone(),
                        shade_label: line.shade_label.trim().to_string(),
                        grams,
                        ratio: line.ratio.unwrap_or_else(|| ratio::resolve(material, None)),
                    });
                }

                let oxidant = bowl.oxidant_id.and_then(|id| catalog.oxidant(id));
                bowls.push(NewBowl {
                    oxidant_id: oxidant.map(|o| o.id),
                    oxidant_name: oxidant.map(|o| o.name.clone()),
                    oxidant_grams: mixing::recompute_oxidant(bowl, catalog),
                    lines,
                });
            }
            services.push(NewService {
                name: service.name.trim().to_string(),
                bowls,
            });
        }

        let mut products = Vec::with_capacity(draft.products.len());
        for line in &draft.products {
            let Some(product_id) = line.product_id else {
                continue;
            };
            let product = catalog
                .product(product_id)
                .ok_or_else(|| Error::not_found("Product", product_id))?;
            check_amount(line.unit_price)?;
            products.push(NewVisitProduct {
                product_id,
                product_name: product.name.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
            });
        }

        let note = draft.note.trim();
        Ok(Self {
            client_id,
            date,
            note: (!note.is_empty()).then(|| note.to_string()),
            payment_method: draft.payment_method,
            services_amount: draft.services_amount,
            services,
            products,
        })
    }

    /// Client served.
    #[must_use]
    pub const fn client_id(&self) -> StoredId {
        self.client_id
    }

    /// Visit day.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Note, `None` when blank.
    #[must_use]
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    /// How the visit was paid.
    #[must_use]
    pub const fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    /// Amount charged for services.
    #[must_use]
    pub const fn services_amount(&self) -> Option<f64> {
        self.services_amount
    }

    /// Services in order.
    #[must_use]
    pub fn services(&self) -> &[NewService] {
        &self.services
    }

    /// Products sold.
    #[must_use]
    pub fn products(&self) -> &[NewVisitProduct] {
        &self.products
    }

    /// Sum of the product lines.
    #[must_use]
    pub fn products_amount(&self) -> f64 {
        self.products
            .iter()
            .map(|p| f64::from(p.quantity) * p.unit_price)
            .sum()
    }

    /// Stored totals of this payload.
    #[must_use]
    pub fn totals(&self) -> VisitTotals {
        compute_totals(self.services_amount, self.products_amount())
    }
}

// ---- response records ----

/// A stored material line.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StoredMaterialLine {
    /// Stored id
    pub id: StoredId,
    /// 1-based order within the bowl
    pub position: u32,
    /// Catalog material
    pub material_id: StoredId,
    /// Material name snapshot
    pub material_name: String,
    /// Shade name or number
    pub shade_label: String,
    /// Grams of material
    pub material_grams: f64,
    /// Ratio snapshot
    pub ratio: MixingRatio,
}

impl TryFrom<material_line::Model> for StoredMaterialLine {
    type Error = Error;

    fn try_from(model: material_line::Model) -> Result<Self> {
        Ok(Self {
            id: StoredId::new(model.id),
            position: u32::try_from(model.position)?,
            material_id: StoredId::new(model.material_id),
            ratio: MixingRatio::new(model.ratio_material, model.ratio_oxidant)?,
            material_name: model.material_name,
            shade_label: model.shade_label,
            material_grams: model.material_grams,
        })
    }
}

/// A stored bowl.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StoredBowl {
    /// Stored id
    pub id: StoredId,
    /// 1-based order within the service
    pub position: u32,
    /// Selected oxidant
    pub oxidant_id: Option<StoredId>,
    /// Oxidant name snapshot
    pub oxidant_name: Option<String>,
    /// Oxidant grams as mixed
    pub oxidant_grams: f64,
    /// Lines in order
    pub lines: Vec<StoredMaterialLine>,
}

/// A stored service.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StoredService {
    /// Stored id
    pub id: StoredId,
    /// 1-based order within the visit
    pub position: u32,
    /// Display name
    pub name: String,
    /// Bowls in order
    pub bowls: Vec<StoredBowl>,
}

/// A stored product sale.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StoredVisitProduct {
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

impl TryFrom<visit_product::Model> for StoredVisitProduct {
    type Error = Error;

    fn try_from(model: visit_product::Model) -> Result<Self> {
        Ok(Self {
            id: StoredId::new(model.id),
            product_id: StoredId::new(model.product_id),
            product_name: model.product_name,
            quantity: u32::try_from(model.quantity)?,
            unit_price: model.unit_price,
        })
    }
}

/// A stored visit with its whole tree.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StoredVisit {
    /// Stored id
    pub id: StoredId,
    /// Client served
    pub client_id: StoredId,
    /// Client given name snapshot
    pub client_first_name: String,
    /// Client family name snapshot
    pub client_last_name: String,
    /// Visit day
    pub date: NaiveDate,
    /// Note
    pub note: Option<String>,
    /// How the visit was paid
    pub payment_method: Option<PaymentMethod>,
    /// Stored totals
    pub totals: VisitTotals,
    /// Number of services
    pub service_count: u32,
    /// Services in order
    pub services: Vec<StoredService>,
    /// Products sold
    pub products: Vec<StoredVisitProduct>,
}

/// Rows removed by a delete cascade, per level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
    /// Visit rows
    pub visits: u64,
    /// Service rows
    pub services: u64,
    /// Bowl rows
    pub bowls: u64,
    /// Material line rows
    pub material_lines: u64,
    /// Product sale rows
    pub products: u64,
}

impl CascadeReport {
    /// Rows removed across all levels.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.visits + self.services + self.bowls + self.material_lines + self.products
    }
}

/// Scalar fields of a stored visit that may change after creation.
///
/// `None` leaves a field unchanged; `Some(None)` clears an optional field.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VisitPatch {
    /// New visit day
    pub date: Option<NaiveDate>,
    /// New note
    pub note: Option<Option<String>>,
    /// New payment method
    pub payment_method: Option<Option<PaymentMethod>>,
    /// New services amount
    pub services_amount: Option<Option<f64>>,
}

// ---- cascade ----

async fn find_owned_visit<C: ConnectionTrait>(
    conn: &C,
    owner_id: &str,
    visit_id: StoredId,
) -> Result<visit::Model> {
    Visit::find_by_id(visit_id.get())
        .filter(visit::Column::OwnerId.eq(owner_id))
        .one(conn)
        .await?
        .ok_or_else(|| Error::not_found("Visit", visit_id))
}

async fn find_owned_client<C: ConnectionTrait>(
    conn: &C,
    owner_id: &str,
    client_id: StoredId,
) -> Result<client::Model> {
    Client::find_by_id(client_id.get())
        .filter(client::Column::OwnerId.eq(owner_id))
        .one(conn)
        .await?
        .ok_or_else(|| Error::not_found("Client", client_id))
}

/// Writes services, bowls, lines and products under an existing visit row.
async fn insert_children<C: ConnectionTrait>(
    conn: &C,
    visit_id: i64,
    payload: &NewVisit,
) -> Result<()> {
    for (s, service) in payload.services.iter().enumerate() {
        let service_row = visit_service::ActiveModel {
            visit_id: Set(visit_id),
            name: Set(service.name.clone()),
            position: Set(ordinal(s)?),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        for (b, new_bowl) in service.bowls.iter().enumerate() {
            let bowl_row = bowl::ActiveModel {
                service_id: Set(service_row.id),
                position: Set(ordinal(b)?),
                oxidant_id: Set(new_bowl.oxidant_id.map(StoredId::get)),
                oxidant_name: Set(new_bowl.oxidant_name.clone()),
                oxidant_grams: Set(new_bowl.oxidant_grams),
                ..Default::default()
            }
            .insert(conn)
            .await?;

            for (l, line) in new_bowl.lines.iter().enumerate() {
                material_line::ActiveModel {
                    bowl_id: Set(bowl_row.id),
                    position: Set(ordinal(l)?),
                    material_id: Set(line.material_id.get()),
                    material_name: Set(line.material_name.clone()),
                    shade_label: Set(line.shade_label.clone()),
                    material_grams: Set(line.grams),
                    ratio_material: Set(line.ratio.material_parts()),
                    ratio_oxidant: Set(line.ratio.oxidant_parts()),
                    ..Default::default()
                }
                .insert(conn)
                .await?;
            }
        }
    }

    for product in &payload.products {
        visit_product::ActiveModel {
            visit_id: Set(visit_id),
            product_id: Set(product.product_id.get()),
            product_name: Set(product.product_name.clone()),
            quantity: Set(i32::try_from(product.quantity)?),
            unit_price: Set(product.unit_price),
            ..Default::default()
        }
        .insert(conn)
        .await?;
    }

    Ok(())
}

/// Deletes everything under a visit row, leaves first. The visit row stays.
async fn delete_children<C: ConnectionTrait>(conn: &C, visit_id: i64) -> Result<CascadeReport> {
    let mut report = CascadeReport::default();

    let services = VisitService::find()
        .filter(visit_service::Column::VisitId.eq(visit_id))
        .all(conn)
        .await?;
    for service in services {
        let bowls = Bowl::find()
            .filter(bowl::Column::ServiceId.eq(service.id))
            .all(conn)
            .await?;
        for bowl_row in bowls {
            report.material_lines += MaterialLine::delete_many()
                .filter(material_line::Column::BowlId.eq(bowl_row.id))
                .exec(conn)
                .await?
                .rows_affected;
            report.bowls += Bowl::delete_by_id(bowl_row.id).exec(conn).await?.rows_affected;
        }
        report.services += VisitService::delete_by_id(service.id)
            .exec(conn)
            .await?
            .rows_affected;
    }

    report.products += VisitProduct::delete_many()
        .filter(visit_product::Column::VisitId.eq(visit_id))
        .exec(conn)
        .await?
        .rows_affected;

    Ok(report)
}

/// Loads the tree under a visit row, one query per level.
async fn load_tree<C: ConnectionTrait>(conn: &C, model: visit::Model) -> Result<StoredVisit> {
    let service_rows = VisitService::find()
        .filter(visit_service::Column::VisitId.eq(model.id))
        .order_by_asc(visit_service::Column::Position)
        .all(conn)
        .await?;
    let service_ids: Vec<i64> = service_rows.iter().map(|s| s.id).collect();

    let bowl_rows = Bowl::find()
        .filter(bowl::Column::ServiceId.is_in(service_ids))
        .order_by_asc(bowl::Column::Position)
        .all(conn)
        .await?;
    let bowl_ids: Vec<i64> = bowl_rows.iter().map(|b| b.id).collect();

    let mut lines_by_bowl: HashMap<i64, Vec<StoredMaterialLine>> = HashMap::new();
    for row in MaterialLine::find()
        .filter(material_line::Column::BowlId.is_in(bowl_ids))
        .order_by_asc(material_line::Column::Position)
        .all(conn)
        .await?
    {
        lines_by_bowl
            .entry(row.bowl_id)
            .or_default()
            .push(StoredMaterialLine::try_from(row)?);
    }

    let mut bowls_by_service: HashMap<i64, Vec<StoredBowl>> = HashMap::new();
    for row in bowl_rows {
        bowls_by_service.entry(row.service_id).or_default().push(StoredBowl {
            id: StoredId::new(row.id),
            position: u32::try_from(row.position)?,
            oxidant_id: row.oxidant_id.map(StoredId::new),
            oxidant_name: row.oxidant_name,
            oxidant_grams: row.oxidant_grams,
            lines: lines_by_bowl.remove(&row.id).unwrap_or_default(),
        });
    }

    let services = service_rows
        .into_iter()
        .map(|row| {
            Ok(StoredService {
                id: StoredId::new(row.id),
                position: u32::try_from(row.position)?,
                bowls: bowls_by_service.remove(&row.id).unwrap_or_default(),
                name: row.name,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let products = VisitProduct::find()
        .filter(visit_product::Column::VisitId.eq(model.id))
        .order_by_asc(visit_product::Column::Id)
        .all(conn)
        .await?
        .into_iter()
        .map(StoredVisitProduct::try_from)
        .collect::<Result<Vec<_>>>()?;

    Ok(StoredVisit {
        id: StoredId::new(model.id),
        client_id: StoredId::new(model.client_id),
        client_first_name: model.client_first_name,
        client_last_name: model.client_last_name,
        date: model.date,
        note: model.note,
        payment_method: model
            .payment_method
            .as_deref()
            .map(PaymentMethod::parse)
            .transpose()?,
        totals: VisitTotals {
            services: model.services_amount,
            products: model.products_amount,
            total: model.total_amount,
        },
        service_count: u32::try_from(model.service_count)?,
        services,
        products,
    })
}

/// Creates a visit with its whole tree.
///
/// The visit row is written first with the client's name and the number of
/// services, then each service, its bowls and their lines, then the products.
/// Everything happens in one transaction.
///
/// # Errors
/// Returns [`Error::NotFound`] if the client does not belong to the owner, or a
/// database error; in both cases nothing is written.
#[instrument(skip(db, payload), fields(client_id = %payload.client_id))]
pub async fn create_visit(
    db: &DatabaseConnection,
    owner_id: &str,
    payload: &NewVisit,
) -> Result<StoredId> {
    let txn = db.begin().await?;

    let client = find_owned_client(&txn, owner_id, payload.client_id).await?;
    let totals = payload.totals();
    let now = chrono::Utc::now().naive_utc();

    let visit_row = visit::ActiveModel {
        owner_id: Set(owner_id.to_string()),
        client_id: Set(client.id),
        client_first_name: Set(client.first_name),
        client_last_name: Set(client.last_name),
        date: Set(payload.date),
        note: Set(payload.note.clone()),
        payment_method: Set(payload.payment_method.map(|m| m.as_str().to_string())),
        services_amount: Set(totals.services),
        products_amount: Set(totals.products),
        total_amount: Set(totals.total),
        service_count: Set(i32::try_from(payload.services.len())?),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    insert_children(&txn, visit_row.id, payload).await?;
    txn.commit().await?;

    info!(
        visit_id = visit_row.id,
        services = payload.services.len(),
        products = payload.products.len(),
        "Visit created"
    );
    Ok(StoredId::new(visit_row.id))
}

/// Loads a visit with its tree, children ordered by position.
///
/// # Errors
/// Returns [`Error::NotFound`] if the visit does not exist for this owner.
pub async fn get_visit(
    db: &DatabaseConnection,
    owner_id: &str,
    visit_id: StoredId,
) -> Result<StoredVisit> {
    let model = find_owned_visit(db, owner_id, visit_id).await?;
    load_tree(db, model).await
}

/// Patches scalar fields of a stored visit and recomputes its total.
///
/// # Errors
/// Returns [`Error::NotFound`] if the visit does not exist for this owner and
/// [`Error::InvalidAmount`] for an invalid services amount.
#[instrument(skip(db))]
pub async fn update_visit(
    db: &DatabaseConnection,
    owner_id: &str,
    visit_id: StoredId,
    patch: VisitPatch,
) -> Result<visit::Model> {
    if let Some(Some(amount)) = patch.services_amount {
        check_amount(amount)?;
    }

    let existing = find_owned_visit(db, owner_id, visit_id).await?;
    let services_amount = patch.services_amount.unwrap_or(existing.services_amount);
    let totals = compute_totals(services_amount, existing.products_amount.unwrap_or(0.0));

    let mut active: visit::ActiveModel = existing.into();
    if let Some(date) = patch.date {
        active.date = Set(date);
    }
    if let Some(note) = patch.note {
        active.note = Set(note.filter(|n| !n.trim().is_empty()));
    }
    if let Some(method) = patch.payment_method {
        active.payment_method = Set(method.map(|m| m.as_str().to_string()));
    }
    active.services_amount = Set(totals.services);
    active.total_amount = Set(totals.total);
    active.updated_at = Set(chrono::Utc::now().naive_utc());

    let updated = active.update(db).await?;
    debug!(visit_id = updated.id, total = ?updated.total_amount, "Visit patched");
    Ok(updated)
}

/// Replaces the whole tree of a stored visit, keeping its id.
///
/// The old services, bowls, lines and products are deleted leaf first and the
/// payload's tree is written in their place, together with the payload's
/// scalar fields, in one transaction.
///
/// # Errors
/// Returns [`Error::NotFound`] if the visit or the payload's client does not
/// belong to the owner; nothing is changed in that case.
#[instrument(skip(db, payload))]
pub async fn replace_visit_tree(
    db: &DatabaseConnection,
    owner_id: &str,
    visit_id: StoredId,
    payload: &NewVisit,
) -> Result<CascadeReport> {
    let txn = db.begin().await?;

    let existing = find_owned_visit(&txn, owner_id, visit_id).await?;
    let client = find_owned_client(&txn, owner_id, payload.client_id).await?;
    let removed = delete_children(&txn, existing.id).await?;

    let totals = payload.totals();
    let mut active: visit::ActiveModel = existing.into();
    active.client_id = Set(client.id);
    active.client_first_name = Set(client.first_name);
    active.client_last_name = Set(client.last_name);
    active.date = Set(payload.date);
    active.note = Set(payload.note.clone());
    active.payment_method = Set(payload.payment_method.map(|m| m.as_str().to_string()));
    active.services_amount = Set(totals.services);
    active.products_amount = Set(totals.products);
    active.total_amount = Set(totals.total);
    active.service_count = Set(i32::try_from(payload.services.len())?);
    active.updated_at = Set(chrono::Utc::now().naive_utc());
    let updated = active.update(&txn).await?;

    insert_children(&txn, updated.id, payload).await?;
    txn.commit().await?;

    info!(
        visit_id = updated.id,
        removed_rows = removed.total(),
        "Visit tree replaced"
    );
    Ok(removed)
}

/// Deletes a visit and everything under it.
///
/// Each bowl's lines go before the bowl, each service's bowls before the
/// service, and products and services before the visit row, all in one
/// transaction.
///
/// # Errors
/// Returns [`Error::NotFound`] if the visit does not exist for this owner.
#[instrument(skip(db))]
pub async fn delete_visit(
    db: &DatabaseConnection,
    owner_id: &str,
    visit_id: StoredId,
) -> Result<CascadeReport> {
    let txn = db.begin().await?;

    let existing = find_owned_visit(&txn, owner_id, visit_id).await?;
    let mut report = delete_children(&txn, existing.id).await?;
    report.visits += Visit::delete_by_id(existing.id)
        .exec(&txn)
        .await?
        .rows_affected;

    txn.commit().await?;

    info!(
        visit_id = existing.id,
        services = report.services,
        bowls = report.bowls,
        material_lines = report.material_lines,
        products = report.products,
        "Visit deleted"
    );
    Ok(report)
}

/// Lists an owner's visits newest first, optionally for one client.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_visits(
    db: &DatabaseConnection,
    owner_id: &str,
    client_id: Option<StoredId>,
) -> Result<Vec<visit::Model>> {
    let mut query = Visit::find().filter(visit::Column::OwnerId.eq(owner_id));
    if let Some(client_id) = client_id {
        query = query.filter(visit::Column::ClientId.eq(client_id.get()));
    }
    query
        .order_by_desc(visit::Column::Date)
        .order_by_desc(visit::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
