//! Session catalog - read-only lookup tables for one editing session.
//!
//! The recipe editor, mixing and validation code never query the database for
//! catalog entries. Instead a [`Catalog`] is loaded once with [`load_catalog`] (or
//! assembled by hand in tests) and passed in explicitly. Only active entries are
//! loaded, so a reference to a deactivated material behaves like a stale one.

use crate::{
    config::catalog::CatalogConfig,
    core::{
        ids::StoredId,
        material::{self, NewMaterial},
        oxidant, product,
        ratio::{MixingRatio, NamedRatio},
        service_template,
    },
    entities::{
        Material, Oxidant, Product, ServiceTemplate, material as material_entity,
        material_ratio, oxidant as oxidant_entity, product as product_entity,
        service_template as template_entity,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, prelude::*};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument};

/// How the shade of a material is entered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum InputMode {
    /// Free-text shade name
    Shade,
    /// Numeric shade code
    Code,
}

impl InputMode {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shade => "shade",
            Self::Code => "code",
        }
    }

    /// Parses the stored representation.
    ///
    /// # Errors
    /// Returns [`Error::InvalidStoredValue`] for anything but `"shade"` or `"code"`.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "shade" => Ok(Self::Shade),
            "code" => Ok(Self::Code),
            other => Err(Error::InvalidStoredValue {
                field: "input_mode",
                value: other.to_string(),
            }),
        }
    }
}

/// An active material as seen by the editor.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CatalogMaterial {
    /// Stored id
    pub id: StoredId,
    /// Display name
    pub name: String,
    /// Shade entry mode
    pub input_mode: InputMode,
    /// Ratio used unless another is picked
    pub default_ratio: MixingRatio,
    /// Other ratios the material may be mixed at
    pub alternate_ratios: Vec<NamedRatio>,
    /// Picker position
    pub sort_order: i32,
}

impl CatalogMaterial {
    /// True when `ratio` is the default or one of the alternates.
    #[must_use]
    pub fn offers(&self, ratio: MixingRatio) -> bool {
        self.default_ratio == ratio || self.alternate_ratios.iter().any(|alt| alt.ratio == ratio)
    }

    pub(crate) fn from_models(
        model: material_entity::Model,
        ratios: Vec<material_ratio::Model>,
    ) -> Result<Self> {
        let alternate_ratios = ratios
            .into_iter()
            .map(|r| {
                Ok(NamedRatio {
                    label: r.label,
                    ratio: MixingRatio::new(r.ratio_material, r.ratio_oxidant)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            id: StoredId::new(model.id),
            default_ratio: MixingRatio::new(model.ratio_material, model.ratio_oxidant)?,
            input_mode: InputMode::parse(&model.input_mode)?,
            name: model.name,
            alternate_ratios,
            sort_order: model.sort_order,
        })
    }
}

/// An active oxidant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CatalogOxidant {
    /// Stored id
    pub id: StoredId,
    /// Display name (e.g. "6%")
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Picker position
    pub sort_order: i32,
}

/// An active retail product.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CatalogProduct {
    /// Stored id
    pub id: StoredId,
    /// Display name
    pub name: String,
    /// Default unit price
    pub price: f64,
    /// Picker position
    pub sort_order: i32,
}

/// An active service template.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CatalogServiceTemplate {
    /// Stored id
    pub id: StoredId,
    /// Service name
    pub name: String,
    /// Bowls a new service starts with; zero means no recipe
    pub bowl_count: u32,
    /// Quick-add position
    pub sort_order: i32,
}

/// Read-only lookup tables for one editing session.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    materials: HashMap<StoredId, CatalogMaterial>,
    oxidants: HashMap<StoredId, CatalogOxidant>,
    products: HashMap<StoredId, CatalogProduct>,
    service_templates: HashMap<StoredId, CatalogServiceTemplate>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a material.
    #[must_use]
    pub fn with_material(mut self, material: CatalogMaterial) -> Self {
        self.materials.insert(material.id, material);
        self
    }

    /// Adds an oxidant.
    #[must_use]
    pub fn with_oxidant(mut self, oxidant: CatalogOxidant) -> Self {
        self.oxidants.insert(oxidant.id, oxidant);
        self
    }

    /// Adds a product.
    #[must_use]
    pub fn with_product(mut self, product: CatalogProduct) -> Self {
        self.products.insert(product.id, product);
        self
    }

    /// Adds a service template.
    #[must_use]
    pub fn with_service_template(mut self, template: CatalogServiceTemplate) -> Self {
        self.service_templates.insert(template.id, template);
        self
    }

    /// Looks up an active material.
    #[must_use]
    pub fn material(&self, id: StoredId) -> Option<&CatalogMaterial> {
        self.materials.get(&id)
    }

    /// Looks up an active oxidant.
    #[must_use]
    pub fn oxidant(&self, id: StoredId) -> Option<&CatalogOxidant> {
        self.oxidants.get(&id)
    }

    /// Looks up an active product.
    #[must_use]
    pub fn product(&self, id: StoredId) -> Option<&CatalogProduct> {
        self.products.get(&id)
    }

    /// Looks up an active service template.
    #[must_use]
    pub fn service_template(&self, id: StoredId) -> Option<&CatalogServiceTemplate> {
        self.service_templates.get(&id)
    }

    /// Materials in picker order.
    #[must_use]
    pub fn materials(&self) -> Vec<&CatalogMaterial> {
        let mut list: Vec<_> = self.materials.values().collect();
        list.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.name.cmp(&b.name)));
        list
    }

    /// Oxidants in picker order.
    #[must_use]
    pub fn oxidants(&self) -> Vec<&CatalogOxidant> {
        let mut list: Vec<_> = self.oxidants.values().collect();
        list.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.name.cmp(&b.name)));
        list
    }

    /// Service templates in quick-add order.
    #[must_use]
    pub fn service_templates(&self) -> Vec<&CatalogServiceTemplate> {
        let mut list: Vec<_> = self.service_templates.values().collect();
        list.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.name.cmp(&b.name)));
        list
    }
}

/// Loads the active catalog entries of one owner.
///
/// # Errors
/// Returns an error if a query fails or a stored ratio/input mode is invalid.
#[instrument(skip(db))]
pub async fn load_catalog(db: &DatabaseConnection, owner_id: &str) -> Result<Catalog> {
    let materials = Material::find()
        .filter(material_entity::Column::OwnerId.eq(owner_id))
        .filter(material_entity::Column::IsActive.eq(true))
        .order_by_asc(material_entity::Column::SortOrder)
        .all(db)
        .await?;

    let mut ratios_by_material =
        material::load_ratios(db, materials.iter().map(|m| m.id).collect()).await?;

    let mut catalog = Catalog::new();
    for model in materials {
        let ratios = ratios_by_material.remove(&model.id).unwrap_or_default();
        catalog = catalog.with_material(CatalogMaterial::from_models(model, ratios)?);
    }

    for model in Oxidant::find()
        .filter(oxidant_entity::Column::OwnerId.eq(owner_id))
        .filter(oxidant_entity::Column::IsActive.eq(true))
        .all(db)
        .await?
    {
        catalog = catalog.with_oxidant(CatalogOxidant {
            id: StoredId::new(model.id),
            name: model.name,
            description: model.description,
            sort_order: model.sort_order,
        });
    }

    for model in Product::find()
        .filter(product_entity::Column::OwnerId.eq(owner_id))
        .filter(product_entity::Column::IsActive.eq(true))
        .all(db)
        .await?
    {
        catalog = catalog.with_product(CatalogProduct {
            id: StoredId::new(model.id),
            name: model.name,
            price: model.price,
            sort_order: model.sort_order,
        });
    }

    for model in ServiceTemplate::find()
        .filter(template_entity::Column::OwnerId.eq(owner_id))
        .filter(template_entity::Column::IsActive.eq(true))
        .all(db)
        .await?
    {
        catalog = catalog.with_service_template(CatalogServiceTemplate {
            id: StoredId::new(model.id),
            name: model.name,
            bowl_count: u32::try_from(model.bowl_count.max(0))?,
            sort_order: model.sort_order,
        });
    }

    debug!(
        materials = catalog.materials.len(),
        oxidants = catalog.oxidants.len(),
        products = catalog.products.len(),
        service_templates = catalog.service_templates.len(),
        "Catalog loaded"
    );
    Ok(catalog)
}

/// Counts of catalog records inserted by [`seed_catalog`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Materials inserted
    pub materials: usize,
    /// Oxidants inserted
    pub oxidants: usize,
    /// Products inserted
    pub products: usize,
    /// Service templates inserted
    pub service_templates: usize,
}

/// Inserts the configured catalog entries whose names the owner does not have yet.
///
/// A name listed twice in one section is inserted once. Running it again with
/// the same configuration inserts nothing.
///
/// # Errors
/// Returns an error if a configured ratio, price or name is invalid, or a query fails.
#[instrument(skip(db, config))]
pub async fn seed_catalog(
    db: &DatabaseConnection,
    owner_id: &str,
    config: &CatalogConfig,
) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    let mut seen: HashSet<String> = material::get_materials(db, owner_id)
        .await?
        .into_iter()
        .map(|m| m.material.name)
        .collect();
    for (index, entry) in config.materials.iter().enumerate() {
        if !seen.insert(entry.name.trim().to_string()) {
            continue;
        }
        let alternate_ratios = entry
            .alternate_ratios
            .iter()
            .map(|alt| {
                Ok(NamedRatio {
                    label: alt.label.clone(),
                    ratio: MixingRatio::new(alt.material, alt.oxidant)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        material::create_material(
            db,
            owner_id,
            NewMaterial {
                name: entry.name.clone(),
                input_mode: InputMode::parse(&entry.input_mode)?,
                default_ratio: MixingRatio::new(entry.ratio_material, entry.ratio_oxidant)?,
                alternate_ratios,
                sort_order: i32::try_from(index)?,
            },
        )
        .await?;
        report.materials += 1;
    }

    let mut seen: HashSet<String> = oxidant::get_oxidants(db, owner_id)
        .await?
        .into_iter()
        .map(|o| o.name)
        .collect();
    for (index, entry) in config.oxidants.iter().enumerate() {
        if !seen.insert(entry.name.trim().to_string()) {
            continue;
        }
        oxidant::create_oxidant(
            db,
            owner_id,
            entry.name.clone(),
            entry.description.clone(),
            i32::try_from(index)?,
        )
        .await?;
        report.oxidants += 1;
    }

    let mut seen: HashSet<String> = product::get_all_products(db, owner_id)
        .await?
        .into_iter()
        .map(|p| p.name)
        .collect();
    for (index, entry) in config.products.iter().enumerate() {
        if !seen.insert(entry.name.trim().to_string()) {
            continue;
        }
        product::create_product(
            db,
            owner_id,
            entry.name.clone(),
            entry.price,
            i32::try_from(index)?,
        )
        .await?;
        report.products += 1;
    }

    let mut seen: HashSet<String> = service_template::get_all_service_templates(db, owner_id)
        .await?
        .into_iter()
        .map(|t| t.name)
        .collect();
    for (index, entry) in config.services.iter().enumerate() {
        if !seen.insert(entry.name.trim().to_string()) {
            continue;
        }
        service_template::create_service_template(
            db,
            owner_id,
            entry.name.clone(),
            entry.bowls,
            i32::try_from(index)?,
        )
        .await?;
        report.service_templates += 1;
    }

    info!(?report, "Catalog seeded");
    Ok(report)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    const CATALOG_TOML: &str = r#"
        [[materials]]
        name = "Majirel"
        input_mode = "code"
        ratio_material = 1.0
        ratio_oxidant = 1.5

        [[materials.alternate_ratios]]
        label = "high lift"
        material = 1.0
        oxidant = 2.0

        [[materials]]
        name = "Dia Light"
        ratio_material = 1.0
        ratio_oxidant = 1.0

        [[oxidants]]
        name = "6%"

        [[oxidants]]
        name = "9%"
        description = "20 vol"

        [[products]]
        name = "Shampoo"
        price = 350.0

        [[services]]
        name = "Barvení"
        bowls = 1

        [[services]]
        name = "Střih"
        bowls = 0
    "#;

    #[tokio::test]
    async fn test_seed_and_load_catalog() -> Result<()> {
        let db = setup_test_db().await?;
        let config: CatalogConfig = toml::from_str(CATALOG_TOML).unwrap();

        let report = seed_catalog(&db, TEST_OWNER, &config).await?;
        assert_eq!(report.materials, 2);
        assert_eq!(report.oxidants, 2);
        assert_eq!(report.products, 1);
        assert_eq!(report.service_templates, 2);

        let catalog = load_catalog(&db, TEST_OWNER).await?;
        let materials = catalog.materials();
        assert_eq!(materials.len(), 2);
        assert_eq!(materials[0].name, "Majirel");
        assert_eq!(materials[0].input_mode, InputMode::Code);
        assert_eq!(materials[0].default_ratio.oxidant_parts(), 1.5);
        assert_eq!(materials[0].alternate_ratios.len(), 1);
        assert_eq!(materials[1].input_mode, InputMode::Shade);
        assert_eq!(catalog.oxidants().len(), 2);
        assert_eq!(catalog.service_templates()[1].bowl_count, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_catalog_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let config: CatalogConfig = toml::from_str(CATALOG_TOML).unwrap();

        seed_catalog(&db, TEST_OWNER, &config).await?;
        let second = seed_catalog(&db, TEST_OWNER, &config).await?;
        assert_eq!(second, SeedReport::default());

        let catalog = load_catalog(&db, TEST_OWNER).await?;
        assert_eq!(catalog.materials().len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_catalog_inserts_repeated_name_once() -> Result<()> {
        let db = setup_test_db().await?;
        let config: CatalogConfig = toml::from_str(
            r#"
            [[oxidants]]
            name = "6%"

            [[oxidants]]
            name = " 6% "

            [[products]]
            name = "Shampoo"
            price = 350.0

            [[products]]
            name = "Shampoo"
            price = 390.0
            "#,
        )
        .unwrap();

        let report = seed_catalog(&db, TEST_OWNER, &config).await?;
        assert_eq!(report.oxidants, 1);
        assert_eq!(report.products, 1);

        let products = product::get_all_products(&db, TEST_OWNER).await?;
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].price, 350.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_load_catalog_skips_inactive_and_other_owners() -> Result<()> {
        let db = setup_test_db().await?;
        let kept = create_test_material(&db, "Kept", 1.0, 1.0).await?;
        let hidden = create_test_material(&db, "Hidden", 1.0, 2.0).await?;
        material::set_material_active(&db, TEST_OWNER, StoredId::new(hidden.id), false).await?;
        crate::core::oxidant::create_oxidant(&db, "someone-else", "3%".to_string(), None, 0)
            .await?;

        let catalog = load_catalog(&db, TEST_OWNER).await?;
        assert!(catalog.material(StoredId::new(kept.id)).is_some());
        assert!(catalog.material(StoredId::new(hidden.id)).is_none());
        assert!(catalog.oxidants().is_empty());
        Ok(())
    }

    #[test]
    fn test_input_mode_round_trip_and_rejects_unknown() {
        assert_eq!(InputMode::parse("shade").unwrap(), InputMode::Shade);
        assert_eq!(InputMode::Code.as_str(), "code");
        assert!(matches!(
            InputMode::parse("colour"),
            Err(Error::InvalidStoredValue { .. })
        ));
    }

    #[test]
    fn test_offers_matches_default_and_alternates() {
        let material = CatalogMaterial {
            id: StoredId::new(1),
            name: "M".to_string(),
            input_mode: InputMode::Shade,
            default_ratio: MixingRatio::ONE_TO_ONE,
            alternate_ratios: vec![NamedRatio {
                label: "1:2".to_string(),
                ratio: MixingRatio::new(1.0, 2.0).unwrap(),
            }],
            sort_order: 0,
        };
        assert!(material.offers(MixingRatio::ONE_TO_ONE));
        assert!(material.offers(MixingRatio::new(1.0, 2.0).unwrap()));
        assert!(!material.offers(MixingRatio::new(2.0, 1.0).unwrap()));
    }
}
