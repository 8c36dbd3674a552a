//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases,
//! creating test records with sensible defaults and building the in-memory
//! catalog and coloring visit that most recipe tests start from.

#![allow(clippy::unwrap_used)]

use crate::{
    core::{
        catalog::{
            Catalog, CatalogMaterial, CatalogOxidant, CatalogProduct, CatalogServiceTemplate,
            InputMode,
        },
        client::{self, NewClient},
        ids::StoredId,
        material::{self, NewMaterial},
        oxidant,
        ratio::{MixingRatio, NamedRatio},
        recipe::{RecipeEditor, VisitDraft},
    },
    entities,
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Owner id used by every test record.
pub const TEST_OWNER: &str = "test-salon";

/// Material mixed 1:1 in [`two_material_catalog`]
pub const MATERIAL_A: StoredId = StoredId::new(1);
/// Material mixed 1:2
pub const MATERIAL_B: StoredId = StoredId::new(2);
/// The "6%" oxidant
pub const OXIDANT_6: StoredId = StoredId::new(10);
/// Shampoo at 350
pub const PRODUCT_SHAMPOO: StoredId = StoredId::new(20);
/// Coloring template with one bowl
pub const TEMPLATE_COLOR: StoredId = StoredId::new(30);
/// Haircut template without bowls
pub const TEMPLATE_CUT: StoredId = StoredId::new(31);

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a material with the given default ratio.
///
/// # Defaults
/// * `input_mode`: shade
/// * no alternate ratios
/// * `sort_order`: 0
pub async fn create_test_material(
    db: &DatabaseConnection,
    name: &str,
    ratio_material: f64,
    ratio_oxidant: f64,
) -> Result<entities::material::Model> {
    material::create_material(
        db,
        TEST_OWNER,
        NewMaterial {
            name: name.to_string(),
            input_mode: InputMode::Shade,
            default_ratio: MixingRatio::new(ratio_material, ratio_oxidant)?,
            alternate_ratios: Vec::new(),
            sort_order: 0,
        },
    )
    .await
}

/// Creates an oxidant without description.
pub async fn create_test_oxidant(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::oxidant::Model> {
    oxidant::create_oxidant(db, TEST_OWNER, name.to_string(), None, 0).await
}

/// Creates a client with only a name.
pub async fn create_test_client(
    db: &DatabaseConnection,
    first_name: &str,
    last_name: &str,
) -> Result<entities::client::Model> {
    client::create_client(
        db,
        TEST_OWNER,
        NewClient {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            ..NewClient::default()
        },
    )
    .await
}

/// A catalog material with no alternate ratios.
#[must_use]
pub fn catalog_material(id: i64, name: &str, ratio: MixingRatio) -> CatalogMaterial {
    CatalogMaterial {
        id: StoredId::new(id),
        name: name.to_string(),
        input_mode: InputMode::Shade,
        default_ratio: ratio,
        alternate_ratios: Vec::new(),
        sort_order: 0,
    }
}

/// In-memory catalog for editor tests.
///
/// * [`MATERIAL_A`]: 1:1, alternate 1:1.5
/// * [`MATERIAL_B`]: 1:2
/// * [`OXIDANT_6`], [`PRODUCT_SHAMPOO`] (350)
/// * [`TEMPLATE_COLOR`] "Barvení" with one bowl, [`TEMPLATE_CUT`] "Střih" without
#[must_use]
pub fn two_material_catalog() -> Catalog {
    let mut material_a = catalog_material(MATERIAL_A.get(), "Material A", MixingRatio::ONE_TO_ONE);
    material_a.alternate_ratios.push(NamedRatio {
        label: "1:1.5".to_string(),
        ratio: MixingRatio::new(1.0, 1.5).unwrap(),
    });
    let material_b = catalog_material(MATERIAL_B.get(), "Material B", MixingRatio::new(1.0, 2.0).unwrap());

    Catalog::new()
        .with_material(material_a)
        .with_material(material_b)
        .with_oxidant(CatalogOxidant {
            id: OXIDANT_6,
            name: "6%".to_string(),
            description: None,
            sort_order: 0,
        })
        .with_product(CatalogProduct {
            id: PRODUCT_SHAMPOO,
            name: "Shampoo".to_string(),
            price: 350.0,
            sort_order: 0,
        })
        .with_service_template(CatalogServiceTemplate {
            id: TEMPLATE_COLOR,
            name: "Barvení".to_string(),
            bowl_count: 1,
            sort_order: 0,
        })
        .with_service_template(CatalogServiceTemplate {
            id: TEMPLATE_CUT,
            name: "Střih".to_string(),
            bowl_count: 0,
            sort_order: 1,
        })
}

/// Stored records behind a coloring visit.
#[derive(Debug, Clone)]
pub struct ColoringFixture {
    /// Client "Jana Nováková"
    pub client: entities::client::Model,
    /// "Material A", 1:1
    pub material_a: StoredId,
    /// "Material B", 1:2
    pub material_b: StoredId,
    /// "6%"
    pub oxidant: StoredId,
}

/// Stores the client, materials and oxidant of a coloring visit.
pub async fn coloring_fixture(db: &DatabaseConnection) -> Result<ColoringFixture> {
    let client = create_test_client(db, "Jana", "Nováková").await?;
    let material_a = create_test_material(db, "Material A", 1.0, 1.0).await?;
    let material_b = create_test_material(db, "Material B", 1.0, 2.0).await?;
    let oxidant = create_test_oxidant(db, "6%").await?;
    Ok(ColoringFixture {
        client,
        material_a: StoredId::new(material_a.id),
        material_b: StoredId::new(material_b.id),
        oxidant: StoredId::new(oxidant.id),
    })
}

/// Editor holding one "Barvení" service with one bowl: material A 50 g and
/// material B 25 g, oxidant 6%, dated 2026-03-14.
pub fn coloring_editor<'c>(
    catalog: &'c Catalog,
    fixture: &ColoringFixture,
) -> Result<RecipeEditor<'c>> {
    let mut editor = RecipeEditor::new(catalog);
    editor.set_client(Some(StoredId::new(fixture.client.id)));
    editor.set_date(NaiveDate::from_ymd_opt(2026, 3, 14));

    editor.add_service("Barvení");
    let bowl = editor.draft().services[0].bowls[0].id;
    let line_a = editor.draft().services[0].bowls[0].lines[0].id;
    editor.set_line_material(line_a, Some(fixture.material_a))?;
    editor.set_line_grams(line_a, Some(50.0))?;

    let line_b = editor.add_material_line(bowl)?;
    editor.set_line_material(line_b, Some(fixture.material_b))?;
    editor.set_line_grams(line_b, Some(25.0))?;

    editor.set_bowl_oxidant(bowl, Some(fixture.oxidant))?;
    Ok(editor)
}

/// The draft of [`coloring_editor`].
pub fn coloring_draft(catalog: &Catalog, fixture: &ColoringFixture) -> Result<VisitDraft> {
    Ok(coloring_editor(catalog, fixture)?.into_draft())
}
