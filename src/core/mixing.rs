//! Bowl aggregation - derives the oxidant grams of a mixing bowl.
//!
//! Oxidant grams are never entered by hand. They are the sum over the bowl's
//! material lines of `grams × oxidant_parts / material_parts`, rounded to one
//! decimal place (half away from zero). Lines that cannot contribute (no
//! material, a material missing from the session catalog, no positive grams)
//! are skipped instead of failing, so a half-filled bowl still shows a number.

use crate::core::{catalog::Catalog, ratio, recipe::BowlDraft, recipe::MaterialLineDraft};

/// Parses a gram amount typed by the user.
///
/// Accepts `.` or `,` as the decimal separator and surrounding whitespace.
/// Returns `None` for empty, unparseable or non-finite input. Sign is kept;
/// non-positive values are filtered out by the aggregation.
#[must_use]
pub fn parse_grams(text: &str) -> Option<f64> {
    let normalized = text.trim().replace(',', ".");
    if normalized.is_empty() {
        return None;
    }
    normalized.parse::<f64>().ok().filter(|g| g.is_finite())
}

/// Rounds to one decimal place, half away from zero.
#[must_use]
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Grams of a line that count towards the bowl, or `None` if it is skipped.
fn usable_grams(line: &MaterialLineDraft, catalog: &Catalog) -> Option<(f64, ratio::MixingRatio)> {
    let material = catalog.material(line.material_id?)?;
    let grams = line.grams.filter(|g| g.is_finite() && *g > 0.0)?;
    let ratio = line
        .ratio
        .unwrap_or_else(|| ratio::resolve(material, None));
    Some((grams, ratio))
}

/// Total grams of material that contribute to the bowl.
#[must_use]
pub fn material_grams(bowl: &BowlDraft, catalog: &Catalog) -> f64 {
    bowl.lines
        .iter()
        .filter_map(|line| usable_grams(line, catalog))
        .map(|(grams, _)| grams)
        .sum()
}

/// Oxidant grams required by the bowl's current material lines.
#[must_use]
pub fn recompute_oxidant(bowl: &BowlDraft, catalog: &Catalog) -> f64 {
    let mut total_material = 0.0;
    let mut total_oxidant = 0.0;

    for (grams, ratio) in bowl.lines.iter().filter_map(|line| usable_grams(line, catalog)) {
        total_material += grams;
        total_oxidant += ratio.oxidant_for(grams);
    }

    if total_material > 0.0 {
        round_to_tenth(total_oxidant)
    } else {
        0.0
    }
}

/// Returns the bowl with its oxidant grams brought up to date.
#[must_use]
pub fn recompute(mut bowl: BowlDraft, catalog: &Catalog) -> BowlDraft {
    bowl.oxidant_grams = recompute_oxidant(&bowl, catalog);
    bowl
}
