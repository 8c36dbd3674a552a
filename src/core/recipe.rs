//! Recipe tree builder - the editable visit draft.
//!
//! A visit being entered is a tree: services hold bowls, bowls hold material
//! lines. [`RecipeEditor`] owns that tree and is the only place it is mutated.
//! Every mutation that can change a bowl's oxidant requirement recomputes that
//! bowl before returning, so [`BowlDraft::oxidant_grams`] is always consistent
//! with the lines. Nodes are addressed by [`DraftId`], which is unique across the
//! whole draft.
//!
//! Services, bowls and lines carry a 1-based `position`. A mutation renumbers
//! only the list it touched.

use crate::{
    core::{
        catalog::Catalog,
        ids::{DraftId, DraftIdGen, StoredId},
        mixing,
        ratio::{self, MixingRatio},
        visit::{PaymentMethod, StoredVisit},
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;

/// One material measured into a bowl.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialLineDraft {
    /// Draft identity
    pub id: DraftId,
    /// 1-based order within the bowl
    pub position: u32,
    /// Selected material
    pub material_id: Option<StoredId>,
    /// Ratio snapshot taken when the material or ratio was picked
    pub ratio: Option<MixingRatio>,
    /// Shade name or number
    pub shade_label: String,
    /// Grams as parsed from user input
    pub grams: Option<f64>,
}

/// A mixing bowl.
#[derive(Clone, Debug, PartialEq)]
pub struct BowlDraft {
    /// Draft identity
    pub id: DraftId,
    /// 1-based order within the service
    pub position: u32,
    /// Selected oxidant
    pub oxidant_id: Option<StoredId>,
    /// Derived; see [`mixing::recompute_oxidant`]
    pub oxidant_grams: f64,
    /// Material lines in display order
    pub lines: Vec<MaterialLineDraft>,
}

impl BowlDraft {
    /// A bowl is empty when it has no material lines at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// A service within the visit.
#[derive(Clone, Debug, PartialEq)]
pub struct ServiceDraft {
    /// Draft identity
    pub id: DraftId,
    /// 1-based order within the visit
    pub position: u32,
    /// Display name
    pub name: String,
    /// False for services without a recipe (e.g. a haircut)
    pub requires_materials: bool,
    /// Bowls in display order
    pub bowls: Vec<BowlDraft>,
}

/// A retail product sold during the visit.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductLineDraft {
    /// Draft identity
    pub id: DraftId,
    /// Selected product
    pub product_id: Option<StoredId>,
    /// Pieces sold
    pub quantity: u32,
    /// Price per piece
    pub unit_price: f64,
}

impl ProductLineDraft {
    /// Line amount; zero when no product is selected.
    #[must_use]
    pub fn amount(&self) -> f64 {
        if self.product_id.is_some() {
            f64::from(self.quantity) * self.unit_price
        } else {
            0.0
        }
    }
}

/// The visit being entered.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VisitDraft {
    /// Selected client
    pub client_id: Option<StoredId>,
    /// Visit day
    pub date: Option<NaiveDate>,
    /// Free-text note
    pub note: String,
    /// How the visit was paid
    pub payment_method: Option<PaymentMethod>,
    /// Amount charged for services
    pub services_amount: Option<f64>,
    /// Services in display order
    pub services: Vec<ServiceDraft>,
    /// Product lines in entry order
    pub products: Vec<ProductLineDraft>,
}

impl VisitDraft {
    /// Sum of product lines with a selected product.
    #[must_use]
    pub fn products_amount(&self) -> f64 {
        self.products.iter().map(ProductLineDraft::amount).sum()
    }
}

/// Outcome of [`RecipeEditor::remove_bowl`].
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum BowlRemoval {
    /// The bowl was removed from the tree
    Removed(BowlDraft),
    /// Removing the last bowl of a recipe service needs explicit confirmation;
    /// nothing was changed
    NeedsConfirmation,
}

trait Ordinal {
    fn set_position(&mut self, position: u32);
}

impl Ordinal for ServiceDraft {
    fn set_position(&mut self, position: u32) {
        self.position = position;
    }
}

impl Ordinal for BowlDraft {
    fn set_position(&mut self, position: u32) {
        self.position = position;
    }
}

impl Ordinal for MaterialLineDraft {
    fn set_position(&mut self, position: u32) {
        self.position = position;
    }
}

fn renumber<T: Ordinal>(items: &mut [T]) {
    for (index, item) in items.iter_mut().enumerate() {
        item.set_position(u32::try_from(index + 1).unwrap_or(u32::MAX));
    }
}

fn move_within<T: Ordinal>(items: &mut Vec<T>, from: usize, to: usize) {
    let item = items.remove(from);
    let to = to.min(items.len());
    items.insert(to, item);
    renumber(items);
}

fn validate_amount(amount: f64) -> Result<()> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidAmount { amount })
    }
}

/// Editing session over one [`VisitDraft`].
#[derive(Debug)]
pub struct RecipeEditor<'c> {
    catalog: &'c Catalog,
    ids: DraftIdGen,
    draft: VisitDraft,
}

impl<'c> RecipeEditor<'c> {
    /// Starts an empty draft.
    #[must_use]
    pub fn new(catalog: &'c Catalog) -> Self {
        Self {
            catalog,
            ids: DraftIdGen::new(),
            draft: VisitDraft::default(),
        }
    }

    /// Starts a draft that repeats the recipe of a stored visit.
    ///
    /// Client, services, bowls, material lines (with their ratio snapshots) and
    /// products are copied with fresh draft ids. Date is set to `date`; note,
    /// payment and amounts start empty. Bowls are recomputed against the current
    /// catalog, so a material that has since been deactivated stops counting.
    #[must_use]
    pub fn from_stored(catalog: &'c Catalog, stored: &StoredVisit, date: NaiveDate) -> Self {
        let mut ids = DraftIdGen::new();

        let services = stored
            .services
            .iter()
            .map(|service| ServiceDraft {
                id: ids.next_id(),
                position: 0,
                name: service.name.clone(),
                requires_materials: !service.bowls.is_empty(),
                bowls: service
                    .bowls
                    .iter()
                    .map(|bowl| {
                        let mut lines: Vec<MaterialLineDraft> = bowl
                            .lines
                            .iter()
                            .map(|line| MaterialLineDraft {
                                id: ids.next_id(),
                                position: 0,
                                material_id: Some(line.material_id),
                                ratio: Some(line.ratio),
                                shade_label: line.shade_label.clone(),
                                grams: Some(line.material_grams),
                            })
                            .collect();
                        renumber(&mut lines);
                        mixing::recompute(
                            BowlDraft {
                                id: ids.next_id(),
                                position: 0,
                                oxidant_id: bowl.oxidant_id,
                                oxidant_grams: 0.0,
                                lines,
                            },
                            catalog,
                        )
                    })
                    .collect(),
            })
            .map(|mut service| {
                renumber(&mut service.bowls);
                service
            })
            .collect::<Vec<_>>();

        let products = stored
            .products
            .iter()
            .map(|product| ProductLineDraft {
                id: ids.next_id(),
                product_id: Some(product.product_id),
                quantity: product.quantity,
                unit_price: product.unit_price,
            })
            .collect();

        let mut draft = VisitDraft {
            client_id: Some(stored.client_id),
            date: Some(date),
            services,
            products,
            ..VisitDraft::default()
        };
        renumber(&mut draft.services);

        Self {
            catalog,
            ids,
            draft,
        }
    }

    /// The current draft.
    #[must_use]
    pub const fn draft(&self) -> &VisitDraft {
        &self.draft
    }

    /// Ends the session, returning the draft.
    #[must_use]
    pub fn into_draft(self) -> VisitDraft {
        self.draft
    }

    /// The session catalog.
    #[must_use]
    pub const fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    // ---- visit fields ----

    /// Selects the client.
    pub fn set_client(&mut self, client_id: Option<StoredId>) {
        self.draft.client_id = client_id;
    }

    /// Sets the visit day.
    pub fn set_date(&mut self, date: Option<NaiveDate>) {
        self.draft.date = date;
    }

    /// Sets the note.
    pub fn set_note(&mut self, note: impl Into<String>) {
        self.draft.note = note.into();
    }

    /// Records how the visit was paid.
    pub fn set_payment_method(&mut self, method: Option<PaymentMethod>) {
        self.draft.payment_method = method;
    }

    /// Sets the amount charged for services.
    ///
    /// # Errors
    /// Returns [`Error::InvalidAmount`] for negative or non-finite amounts.
    pub fn set_services_amount(&mut self, amount: Option<f64>) -> Result<()> {
        if let Some(value) = amount {
            validate_amount(value)?;
        }
        self.draft.services_amount = amount;
        Ok(())
    }

    // ---- lookups ----

    fn service_index(&self, service: DraftId) -> Result<usize> {
        self.draft
            .services
            .iter()
            .position(|s| s.id == service)
            .ok_or(Error::DraftNodeNotFound {
                kind: "service",
                id: service,
            })
    }

    fn bowl_location(&self, bowl: DraftId) -> Result<(usize, usize)> {
        self.draft
            .services
            .iter()
            .enumerate()
            .find_map(|(s, service)| {
                service
                    .bowls
                    .iter()
                    .position(|b| b.id == bowl)
                    .map(|b| (s, b))
            })
            .ok_or(Error::DraftNodeNotFound {
                kind: "bowl",
                id: bowl,
            })
    }

    fn line_location(&self, line: DraftId) -> Result<(usize, usize, usize)> {
        for (s, service) in self.draft.services.iter().enumerate() {
            for (b, bowl) in service.bowls.iter().enumerate() {
                if let Some(l) = bowl.lines.iter().position(|m| m.id == line) {
                    return Ok((s, b, l));
                }
            }
        }
        Err(Error::DraftNodeNotFound {
            kind: "material line",
            id: line,
        })
    }

    fn product_index(&self, line: DraftId) -> Result<usize> {
        self.draft
            .products
            .iter()
            .position(|p| p.id == line)
            .ok_or(Error::DraftNodeNotFound {
                kind: "product line",
                id: line,
            })
    }

    fn recompute_bowl(&mut self, s: usize, b: usize) {
        let bowl = &mut self.draft.services[s].bowls[b];
        bowl.oxidant_grams = mixing::recompute_oxidant(bowl, self.catalog);
    }

    /// Applies `edit` to a line and recomputes its bowl.
    fn edit_line<R>(
        &mut self,
        line: DraftId,
        edit: impl FnOnce(&mut MaterialLineDraft, &Catalog) -> Result<R>,
    ) -> Result<R> {
        let (s, b, l) = self.line_location(line)?;
        let result = edit(&mut self.draft.services[s].bowls[b].lines[l], self.catalog)?;
        self.recompute_bowl(s, b);
        Ok(result)
    }

    fn empty_line(&mut self) -> MaterialLineDraft {
        MaterialLineDraft {
            id: self.ids.next_id(),
            position: 1,
            material_id: None,
            ratio: None,
            shade_label: String::new(),
            grams: None,
        }
    }

    fn empty_bowl(&mut self) -> BowlDraft {
        let line = self.empty_line();
        BowlDraft {
            id: self.ids.next_id(),
            position: 1,
            oxidant_id: None,
            oxidant_grams: 0.0,
            lines: vec![line],
        }
    }

    // ---- services ----

    fn push_service(&mut self, name: String, bowl_count: u32) -> DraftId {
        let bowls = (0..bowl_count).map(|_| self.empty_bowl()).collect();
        let id = self.ids.next_id();
        let mut service = ServiceDraft {
            id,
            position: 0,
            name,
            requires_materials: bowl_count > 0,
            bowls,
        };
        renumber(&mut service.bowls);
        self.draft.services.push(service);
        renumber(&mut self.draft.services);
        id
    }

    /// Appends a recipe service with one empty bowl.
    pub fn add_service(&mut self, name: impl Into<String>) -> DraftId {
        self.push_service(name.into(), 1)
    }

    /// Appends a service from a catalog template, with the template's number of
    /// empty bowls. A template with zero bowls yields a service without a recipe.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if the template is not in the session catalog.
    pub fn add_service_from_template(&mut self, template_id: StoredId) -> Result<DraftId> {
        let template = self
            .catalog
            .service_template(template_id)
            .ok_or_else(|| Error::not_found("Service template", template_id))?;
        let (name, bowls) = (template.name.clone(), template.bowl_count);
        Ok(self.push_service(name, bowls))
    }

    /// Renames a service.
    ///
    /// # Errors
    /// Returns [`Error::DraftNodeNotFound`] if the service is not in the draft.
    pub fn rename_service(&mut self, service: DraftId, name: impl Into<String>) -> Result<()> {
        let s = self.service_index(service)?;
        self.draft.services[s].name = name.into();
        Ok(())
    }

    /// Removes a service together with its bowls and lines.
    ///
    /// # Errors
    /// Returns [`Error::DraftNodeNotFound`] if the service is not in the draft.
    pub fn remove_service(&mut self, service: DraftId) -> Result<ServiceDraft> {
        let s = self.service_index(service)?;
        let removed = self.draft.services.remove(s);
        renumber(&mut self.draft.services);
        Ok(removed)
    }

    /// Moves a service to `new_index` (clamped to the end of the list).
    ///
    /// # Errors
    /// Returns [`Error::DraftNodeNotFound`] if the service is not in the draft.
    pub fn move_service(&mut self, service: DraftId, new_index: usize) -> Result<()> {
        let s = self.service_index(service)?;
        move_within(&mut self.draft.services, s, new_index);
        Ok(())
    }

    // ---- bowls ----

    /// Appends an empty bowl (with one empty line) to a service.
    ///
    /// # Errors
    /// Returns [`Error::DraftNodeNotFound`] if the service is not in the draft.
    pub fn add_bowl(&mut self, service: DraftId) -> Result<DraftId> {
        let s = self.service_index(service)?;
        let bowl = self.empty_bowl();
        let id = bowl.id;
        let bowls = &mut self.draft.services[s].bowls;
        bowls.push(bowl);
        renumber(bowls);
        Ok(id)
    }

    /// Removes a bowl and its lines.
    ///
    /// Removing the only bowl of a service that requires materials is refused
    /// with [`BowlRemoval::NeedsConfirmation`] unless `confirmed` is set.
    ///
    /// # Errors
    /// Returns [`Error::DraftNodeNotFound`] if the bowl is not in the draft.
    pub fn remove_bowl(&mut self, bowl: DraftId, confirmed: bool) -> Result<BowlRemoval> {
        let (s, b) = self.bowl_location(bowl)?;
        let service = &mut self.draft.services[s];
        if service.requires_materials && service.bowls.len() == 1 && !confirmed {
            return Ok(BowlRemoval::NeedsConfirmation);
        }
        let removed = service.bowls.remove(b);
        renumber(&mut service.bowls);
        Ok(BowlRemoval::Removed(removed))
    }

    /// Inserts a copy of a bowl right after it. The copy keeps the oxidant and
    /// every line verbatim, grams included; only draft ids are new.
    ///
    /// # Errors
    /// Returns [`Error::DraftNodeNotFound`] if the bowl is not in the draft.
    pub fn duplicate_bowl(&mut self, bowl: DraftId) -> Result<DraftId> {
        let (s, b) = self.bowl_location(bowl)?;
        let mut copy = self.draft.services[s].bowls[b].clone();
        copy.id = self.ids.next_id();
        for line in &mut copy.lines {
            line.id = self.ids.next_id();
        }
        let id = copy.id;
        let bowls = &mut self.draft.services[s].bowls;
        bowls.insert(b + 1, copy);
        renumber(bowls);
        Ok(id)
    }

    /// Moves a bowl to `new_index` within its service.
    ///
    /// # Errors
    /// Returns [`Error::DraftNodeNotFound`] if the bowl is not in the draft.
    pub fn move_bowl(&mut self, bowl: DraftId, new_index: usize) -> Result<()> {
        let (s, b) = self.bowl_location(bowl)?;
        move_within(&mut self.draft.services[s].bowls, b, new_index);
        Ok(())
    }

    /// Selects the bowl's oxidant.
    ///
    /// # Errors
    /// Returns [`Error::DraftNodeNotFound`] for an unknown bowl and
    /// [`Error::NotFound`] for an oxidant missing from the session catalog.
    pub fn set_bowl_oxidant(&mut self, bowl: DraftId, oxidant_id: Option<StoredId>) -> Result<()> {
        let (s, b) = self.bowl_location(bowl)?;
        if let Some(id) = oxidant_id {
            if self.catalog.oxidant(id).is_none() {
                return Err(Error::not_found("Oxidant", id));
            }
        }
        self.draft.services[s].bowls[b].oxidant_id = oxidant_id;
        self.recompute_bowl(s, b);
        Ok(())
    }

    // ---- material lines ----

    /// Appends an empty material line to a bowl.
    ///
    /// # Errors
    /// Returns [`Error::DraftNodeNotFound`] if the bowl is not in the draft.
    pub fn add_material_line(&mut self, bowl: DraftId) -> Result<DraftId> {
        let (s, b) = self.bowl_location(bowl)?;
        let line = self.empty_line();
        let id = line.id;
        let lines = &mut self.draft.services[s].bowls[b].lines;
        lines.push(line);
        renumber(lines);
        self.recompute_bowl(s, b);
        Ok(id)
    }

    /// Removes a material line.
    ///
    /// # Errors
    /// Returns [`Error::DraftNodeNotFound`] if the line is not in the draft.
    pub fn remove_material_line(&mut self, line: DraftId) -> Result<MaterialLineDraft> {
        let (s, b, l) = self.line_location(line)?;
        let lines = &mut self.draft.services[s].bowls[b].lines;
        let removed = lines.remove(l);
        renumber(lines);
        self.recompute_bowl(s, b);
        Ok(removed)
    }

    /// Inserts a copy of a line right after it: same material, ratio, shade
    /// label and grams, new draft id.
    ///
    /// # Errors
    /// Returns [`Error::DraftNodeNotFound`] if the line is not in the draft.
    pub fn duplicate_material_line(&mut self, line: DraftId) -> Result<DraftId> {
        let (s, b, l) = self.line_location(line)?;
        let mut copy = self.draft.services[s].bowls[b].lines[l].clone();
        copy.id = self.ids.next_id();
        let id = copy.id;
        let lines = &mut self.draft.services[s].bowls[b].lines;
        lines.insert(l + 1, copy);
        renumber(lines);
        self.recompute_bowl(s, b);
        Ok(id)
    }

    /// Selects the line's material, snapshotting its default ratio. The shade
    /// label is cleared because shades are specific to a material.
    ///
    /// # Errors
    /// Returns [`Error::DraftNodeNotFound`] for an unknown line and
    /// [`Error::NotFound`] for a material missing from the session catalog.
    pub fn set_line_material(&mut self, line: DraftId, material_id: Option<StoredId>) -> Result<()> {
        self.edit_line(line, |line, catalog| {
            let ratio = match material_id {
                Some(id) => {
                    let material = catalog
                        .material(id)
                        .ok_or_else(|| Error::not_found("Material", id))?;
                    Some(ratio::resolve(material, None))
                }
                None => None,
            };
            line.material_id = material_id;
            line.ratio = ratio;
            line.shade_label.clear();
            Ok(())
        })
    }

    /// Picks a mixing ratio for the line's material and returns the ratio that
    /// took effect: the requested one if the material offers it, otherwise the
    /// material's default.
    ///
    /// # Errors
    /// Returns [`Error::InvalidInput`] if the line has no material yet and
    /// [`Error::NotFound`] if its material is missing from the session catalog.
    pub fn set_line_ratio(&mut self, line: DraftId, requested: MixingRatio) -> Result<MixingRatio> {
        self.edit_line(line, |line, catalog| {
            let material_id = line.material_id.ok_or_else(|| Error::InvalidInput {
                message: "Select a material before choosing a ratio".to_string(),
            })?;
            let material = catalog
                .material(material_id)
                .ok_or_else(|| Error::not_found("Material", material_id))?;
            let effective = ratio::resolve(material, Some(requested));
            line.ratio = Some(effective);
            Ok(effective)
        })
    }

    /// Sets the line's grams.
    ///
    /// # Errors
    /// Returns [`Error::DraftNodeNotFound`] if the line is not in the draft.
    pub fn set_line_grams(&mut self, line: DraftId, grams: Option<f64>) -> Result<()> {
        self.edit_line(line, |line, _| {
            line.grams = grams;
            Ok(())
        })
    }

    /// Sets the line's grams from typed text; see [`mixing::parse_grams`].
    ///
    /// # Errors
    /// Returns [`Error::DraftNodeNotFound`] if the line is not in the draft.
    pub fn set_line_grams_text(&mut self, line: DraftId, text: &str) -> Result<()> {
        self.set_line_grams(line, mixing::parse_grams(text))
    }

    /// Sets the shade name or number.
    ///
    /// # Errors
    /// Returns [`Error::DraftNodeNotFound`] if the line is not in the draft.
    pub fn set_line_shade(&mut self, line: DraftId, shade: impl Into<String>) -> Result<()> {
        let (s, b, l) = self.line_location(line)?;
        self.draft.services[s].bowls[b].lines[l].shade_label = shade.into();
        Ok(())
    }

    // ---- products ----

    /// Adds a product line for one piece at the catalog price.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if the product is not in the session catalog.
    pub fn add_product_line(&mut self, product_id: StoredId) -> Result<DraftId> {
        let product = self
            .catalog
            .product(product_id)
            .ok_or_else(|| Error::not_found("Product", product_id))?;
        let line = ProductLineDraft {
            id: self.ids.next_id(),
            product_id: Some(product_id),
            quantity: 1,
            unit_price: product.price,
        };
        let id = line.id;
        self.draft.products.push(line);
        Ok(id)
    }

    /// Sets the number of pieces sold.
    ///
    /// # Errors
    /// Returns [`Error::InvalidAmount`] for zero and
    /// [`Error::DraftNodeNotFound`] for an unknown line.
    pub fn set_product_quantity(&mut self, line: DraftId, quantity: u32) -> Result<()> {
        if quantity == 0 {
            return Err(Error::InvalidAmount { amount: 0.0 });
        }
        let p = self.product_index(line)?;
        self.draft.products[p].quantity = quantity;
        Ok(())
    }

    /// Overrides the price per piece.
    ///
    /// # Errors
    /// Returns [`Error::InvalidAmount`] for negative or non-finite prices and
    /// [`Error::DraftNodeNotFound`] for an unknown line.
    pub fn set_product_unit_price(&mut self, line: DraftId, unit_price: f64) -> Result<()> {
        validate_amount(unit_price)?;
        let p = self.product_index(line)?;
        self.draft.products[p].unit_price = unit_price;
        Ok(())
    }

    /// Removes a product line.
    ///
    /// # Errors
    /// Returns [`Error::DraftNodeNotFound`] if the line is not in the draft.
    pub fn remove_product_line(&mut self, line: DraftId) -> Result<ProductLineDraft> {
        let p = self.product_index(line)?;
        Ok(self.draft.products.remove(p))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::{
        MATERIAL_A, MATERIAL_B, OXIDANT_6, PRODUCT_SHAMPOO, TEMPLATE_COLOR, TEMPLATE_CUT,
        two_material_catalog,
    };

    /// Bowl content without draft ids, for comparing by value.
    fn bowl_shape(bowl: &BowlDraft) -> (Option<StoredId>, f64, Vec<(Option<StoredId>, String, Option<f64>, Option<MixingRatio>)>) {
        (
            bowl.oxidant_id,
            bowl.oxidant_grams,
            bowl.lines
                .iter()
                .map(|l| (l.material_id, l.shade_label.clone(), l.grams, l.ratio))
                .collect(),
        )
    }

    fn first_bowl_and_line(editor: &RecipeEditor<'_>, service: DraftId) -> (DraftId, DraftId) {
        let service = editor
            .draft()
            .services
            .iter()
            .find(|s| s.id == service)
            .unwrap();
        (service.bowls[0].id, service.bowls[0].lines[0].id)
    }

    #[test]
    fn test_new_service_starts_with_one_empty_bowl() {
        let catalog = two_material_catalog();
        let mut editor = RecipeEditor::new(&catalog);
        let service = editor.add_service("Barvení");

        let draft = editor.draft();
        assert_eq!(draft.services.len(), 1);
        assert_eq!(draft.services[0].id, service);
        assert_eq!(draft.services[0].position, 1);
        assert!(draft.services[0].requires_materials);
        assert_eq!(draft.services[0].bowls.len(), 1);
        assert_eq!(draft.services[0].bowls[0].lines.len(), 1);
        assert_eq!(draft.services[0].bowls[0].oxidant_grams, 0.0);
    }

    #[test]
    fn test_template_without_bowls_creates_plain_service() {
        let catalog = two_material_catalog();
        let mut editor = RecipeEditor::new(&catalog);
        let cut = editor.add_service_from_template(TEMPLATE_CUT).unwrap();
        let color = editor.add_service_from_template(TEMPLATE_COLOR).unwrap();

        let draft = editor.draft();
        assert_eq!(draft.services[0].id, cut);
        assert_eq!(draft.services[0].name, "Střih");
        assert!(draft.services[0].bowls.is_empty());
        assert!(!draft.services[0].requires_materials);
        assert_eq!(draft.services[1].id, color);
        assert_eq!(draft.services[1].bowls.len(), 1);
        assert_eq!(draft.services[1].position, 2);

        let missing = editor.add_service_from_template(StoredId::new(404));
        assert!(matches!(missing, Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_material_edits_recompute_oxidant() {
        let catalog = two_material_catalog();
        let mut editor = RecipeEditor::new(&catalog);
        let service = editor.add_service("Barvení");
        let (bowl, line_a) = first_bowl_and_line(&editor, service);

        editor.set_line_material(line_a, Some(MATERIAL_A)).unwrap();
        editor.set_line_grams_text(line_a, "50").unwrap();
        assert_eq!(editor.draft().services[0].bowls[0].oxidant_grams, 50.0);

        let line_b = editor.add_material_line(bowl).unwrap();
        editor.set_line_material(line_b, Some(MATERIAL_B)).unwrap();
        editor.set_line_grams(line_b, Some(25.0)).unwrap();
        assert_eq!(editor.draft().services[0].bowls[0].oxidant_grams, 100.0);

        editor.remove_material_line(line_b).unwrap();
        assert_eq!(editor.draft().services[0].bowls[0].oxidant_grams, 50.0);

        editor.set_line_grams_text(line_a, "not a number").unwrap();
        assert_eq!(editor.draft().services[0].bowls[0].oxidant_grams, 0.0);
    }

    #[test]
    fn test_changing_material_clears_shade_and_resets_ratio() {
        let catalog = two_material_catalog();
        let mut editor = RecipeEditor::new(&catalog);
        let service = editor.add_service("Barvení");
        let (_, line) = first_bowl_and_line(&editor, service);

        editor.set_line_material(line, Some(MATERIAL_A)).unwrap();
        editor.set_line_shade(line, "7.1").unwrap();
        editor.set_line_grams(line, Some(40.0)).unwrap();
        let alt = MixingRatio::new(1.0, 1.5).unwrap();
        assert_eq!(editor.set_line_ratio(line, alt).unwrap(), alt);
        assert_eq!(editor.draft().services[0].bowls[0].oxidant_grams, 60.0);

        editor.set_line_material(line, Some(MATERIAL_B)).unwrap();
        let l = &editor.draft().services[0].bowls[0].lines[0];
        assert_eq!(l.shade_label, "");
        assert_eq!(l.ratio, Some(MixingRatio::new(1.0, 2.0).unwrap()));
        assert_eq!(l.grams, Some(40.0));
        assert_eq!(editor.draft().services[0].bowls[0].oxidant_grams, 80.0);
    }

    #[test]
    fn test_ratio_not_offered_falls_back_to_default() {
        let catalog = two_material_catalog();
        let mut editor = RecipeEditor::new(&catalog);
        let service = editor.add_service("Barvení");
        let (_, line) = first_bowl_and_line(&editor, service);

        let no_material = editor.set_line_ratio(line, MixingRatio::ONE_TO_ONE);
        assert!(matches!(no_material, Err(Error::InvalidInput { .. })));

        editor.set_line_material(line, Some(MATERIAL_A)).unwrap();
        let effective = editor
            .set_line_ratio(line, MixingRatio::new(1.0, 5.0).unwrap())
            .unwrap();
        assert_eq!(effective, MixingRatio::ONE_TO_ONE);
    }

    #[test]
    fn test_unknown_catalog_references_rejected() {
        let catalog = two_material_catalog();
        let mut editor = RecipeEditor::new(&catalog);
        let service = editor.add_service("Barvení");
        let (bowl, line) = first_bowl_and_line(&editor, service);

        assert!(matches!(
            editor.set_line_material(line, Some(StoredId::new(404))),
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(
            editor.set_bowl_oxidant(bowl, Some(StoredId::new(404))),
            Err(Error::NotFound { .. })
        ));
        editor.set_bowl_oxidant(bowl, Some(OXIDANT_6)).unwrap();
        assert_eq!(editor.draft().services[0].bowls[0].oxidant_id, Some(OXIDANT_6));
    }

    #[test]
    fn test_duplicate_then_remove_bowl_restores_list() {
        let catalog = two_material_catalog();
        let mut editor = RecipeEditor::new(&catalog);
        let service = editor.add_service("Barvení");
        let (bowl, line) = first_bowl_and_line(&editor, service);
        editor.set_line_material(line, Some(MATERIAL_B)).unwrap();
        editor.set_line_grams(line, Some(30.0)).unwrap();
        editor.set_line_shade(line, "6.0").unwrap();
        editor.set_bowl_oxidant(bowl, Some(OXIDANT_6)).unwrap();
        editor.add_bowl(service).unwrap();

        let before: Vec<_> = editor.draft().services[0].bowls.iter().map(bowl_shape).collect();

        let copy = editor.duplicate_bowl(bowl).unwrap();
        let bowls = &editor.draft().services[0].bowls;
        assert_eq!(bowls.len(), 3);
        assert_eq!(bowls[1].id, copy);
        assert_ne!(bowls[1].lines[0].id, line);
        assert_eq!(bowl_shape(&bowls[1]), bowl_shape(&bowls[0]));
        assert_eq!(bowls[1].oxidant_grams, 60.0);
        assert_eq!(
            bowls.iter().map(|b| b.position).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );

        let removed = editor.remove_bowl(copy, false).unwrap();
        assert!(matches!(removed, BowlRemoval::Removed(_)));
        let after: Vec<_> = editor.draft().services[0].bowls.iter().map(bowl_shape).collect();
        assert_eq!(after, before);
        assert_eq!(editor.draft().services[0].bowls[1].position, 2);
    }

    #[test]
    fn test_removing_last_bowl_needs_confirmation() {
        let catalog = two_material_catalog();
        let mut editor = RecipeEditor::new(&catalog);
        let service = editor.add_service("Barvení");
        let (bowl, _) = first_bowl_and_line(&editor, service);

        assert_eq!(
            editor.remove_bowl(bowl, false).unwrap(),
            BowlRemoval::NeedsConfirmation
        );
        assert_eq!(editor.draft().services[0].bowls.len(), 1);

        assert!(matches!(
            editor.remove_bowl(bowl, true).unwrap(),
            BowlRemoval::Removed(_)
        ));
        assert!(editor.draft().services[0].bowls.is_empty());

        assert!(matches!(
            editor.remove_bowl(bowl, true),
            Err(Error::DraftNodeNotFound { kind: "bowl", .. })
        ));
    }

    #[test]
    fn test_duplicate_material_line_keeps_grams() {
        let catalog = two_material_catalog();
        let mut editor = RecipeEditor::new(&catalog);
        let service = editor.add_service("Barvení");
        let (_, line) = first_bowl_and_line(&editor, service);
        editor.set_line_material(line, Some(MATERIAL_A)).unwrap();
        editor.set_line_shade(line, "8.3").unwrap();
        editor.set_line_grams(line, Some(20.0)).unwrap();

        let copy = editor.duplicate_material_line(line).unwrap();
        let bowl = &editor.draft().services[0].bowls[0];
        assert_eq!(bowl.lines.len(), 2);
        assert_eq!(bowl.lines[1].id, copy);
        assert_eq!(bowl.lines[1].shade_label, "8.3");
        assert_eq!(bowl.lines[1].grams, Some(20.0));
        assert_eq!(bowl.lines[1].position, 2);
        assert_eq!(bowl.oxidant_grams, 40.0);
    }

    #[test]
    fn test_reordering_one_list_leaves_siblings_untouched() {
        let catalog = two_material_catalog();
        let mut editor = RecipeEditor::new(&catalog);
        let first = editor.add_service("Barvení");
        let second = editor.add_service("Melír");
        let (first_bowl, _) = first_bowl_and_line(&editor, first);
        let extra = editor.add_bowl(first).unwrap();
        editor.add_bowl(second).unwrap();
        editor.add_bowl(second).unwrap();

        let second_before: Vec<_> = editor.draft().services[1]
            .bowls
            .iter()
            .map(|b| (b.id, b.position))
            .collect();

        editor.move_bowl(extra, 0).unwrap();
        let first_bowls = &editor.draft().services[0].bowls;
        assert_eq!(first_bowls[0].id, extra);
        assert_eq!(first_bowls[0].position, 1);
        assert_eq!(first_bowls[1].id, first_bowl);
        assert_eq!(first_bowls[1].position, 2);

        let second_after: Vec<_> = editor.draft().services[1]
            .bowls
            .iter()
            .map(|b| (b.id, b.position))
            .collect();
        assert_eq!(second_after, second_before);

        editor.move_service(first, 10).unwrap();
        let services = &editor.draft().services;
        assert_eq!(services[0].id, second);
        assert_eq!(services[0].position, 1);
        assert_eq!(services[1].id, first);
        assert_eq!(services[1].position, 2);
    }

    #[test]
    fn test_remove_service_cascades_in_memory() {
        let catalog = two_material_catalog();
        let mut editor = RecipeEditor::new(&catalog);
        let first = editor.add_service("Barvení");
        let second = editor.add_service("Střih");
        let (bowl, line) = first_bowl_and_line(&editor, first);

        let removed = editor.remove_service(first).unwrap();
        assert_eq!(removed.bowls.len(), 1);
        assert_eq!(editor.draft().services[0].id, second);
        assert_eq!(editor.draft().services[0].position, 1);
        assert!(editor.add_material_line(bowl).is_err());
        assert!(editor.set_line_grams(line, Some(1.0)).is_err());
    }

    #[test]
    fn test_product_lines_and_amounts() {
        let catalog = two_material_catalog();
        let mut editor = RecipeEditor::new(&catalog);
        let line = editor.add_product_line(PRODUCT_SHAMPOO).unwrap();
        assert_eq!(editor.draft().products[0].unit_price, 350.0);

        editor.set_product_quantity(line, 2).unwrap();
        editor.set_product_unit_price(line, 300.0).unwrap();
        assert_eq!(editor.draft().products_amount(), 600.0);

        assert!(editor.set_product_quantity(line, 0).is_err());
        assert!(editor.set_product_unit_price(line, -1.0).is_err());
        assert!(editor.add_product_line(StoredId::new(404)).is_err());

        editor.remove_product_line(line).unwrap();
        assert_eq!(editor.draft().products_amount(), 0.0);
    }

    #[test]
    fn test_visit_fields() {
        let catalog = two_material_catalog();
        let mut editor = RecipeEditor::new(&catalog);
        editor.set_client(Some(StoredId::new(5)));
        editor.set_date(NaiveDate::from_ymd_opt(2026, 3, 14));
        editor.set_note("first visit");
        editor.set_payment_method(Some(PaymentMethod::Cash));
        editor.set_services_amount(Some(1200.0)).unwrap();
        assert!(editor.set_services_amount(Some(f64::NAN)).is_err());

        let draft = editor.into_draft();
        assert_eq!(draft.client_id, Some(StoredId::new(5)));
        assert_eq!(draft.note, "first visit");
        assert_eq!(draft.services_amount, Some(1200.0));
        assert_eq!(draft.payment_method, Some(PaymentMethod::Cash));
    }
}
