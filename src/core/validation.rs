//! Recipe validation - checks a visit draft before it is persisted.
//!
//! Visit-level rules come first, then the service tree is walked in display
//! order and the first violation is returned. Only one problem is reported
//! per submit.

use crate::core::{catalog::Catalog, recipe::VisitDraft};
use thiserror::Error;

/// First rule a visit draft violates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No client selected
    #[error("Select a client")]
    MissingClient,
    /// No visit date
    #[error("Enter the visit date")]
    MissingDate,
    /// The visit has no services
    #[error("Add at least one service")]
    NoServices,
    /// A service name is blank
    #[error("Fill in the name of every service")]
    EmptyServiceName,
    /// A material line has no (known) material
    #[error("Select a material for every line")]
    MissingMaterial,
    /// A material line has no positive gram amount
    #[error("Enter the grams of every material")]
    NonPositiveGrams,
    /// A bowl with materials has no (known) oxidant
    #[error("Select an oxidant for every bowl")]
    MissingOxidant,
}

/// Validates a draft against the session catalog.
///
/// Client, date and the presence of services are checked first. The tree is
/// then walked depth first: for each service its name, then for each bowl
/// every line's material and grams in turn, then the bowl's oxidant.
///
/// # Errors
/// Returns the first [`ValidationError`] met on that walk.
pub fn validate(draft: &VisitDraft, catalog: &Catalog) -> Result<(), ValidationError> {
    if draft.client_id.is_none() {
        return Err(ValidationError::MissingClient);
    }
    if draft.date.is_none() {
        return Err(ValidationError::MissingDate);
    }
    if draft.services.is_empty() {
        return Err(ValidationError::NoServices);
    }

    for service in &draft.services {
        if service.name.trim().is_empty() {
            return Err(ValidationError::EmptyServiceName);
        }
        for bowl in &service.bowls {
            for line in &bowl.lines {
                if line.material_id.and_then(|id| catalog.material(id)).is_none() {
                    return Err(ValidationError::MissingMaterial);
                }
                if !line.grams.is_some_and(|g| g.is_finite() && g > 0.0) {
                    return Err(ValidationError::NonPositiveGrams);
                }
            }
            if !bowl.is_empty() && bowl.oxidant_id.and_then(|id| catalog.oxidant(id)).is_none() {
                return Err(ValidationError::MissingOxidant);
            }
        }
    }

    Ok(())
}
