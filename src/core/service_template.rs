//! Service templates - predefined services with a starting number of bowls.

use crate::{
    core::ids::StoredId,
    entities::{ServiceTemplate, service_template},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

fn check_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidInput {
            message: "Service name cannot be empty".to_string(),
        });
    }
    Ok(())
}

async fn find_owned(
    db: &DatabaseConnection,
    owner_id: &str,
    template_id: StoredId,
) -> Result<service_template::Model> {
    ServiceTemplate::find_by_id(template_id.get())
        .filter(service_template::Column::OwnerId.eq(owner_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Service template", template_id))
}

/// Retrieves the owner's templates, active and inactive, in quick-add order.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_all_service_templates(
    db: &DatabaseConnection,
    owner_id: &str,
) -> Result<Vec<service_template::Model>> {
    ServiceTemplate::find()
        .filter(service_template::Column::OwnerId.eq(owner_id))
        .order_by_asc(service_template::Column::SortOrder)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates an active service template. `bowl_count == 0` marks a service
/// without a recipe.
///
/// # Errors
/// Returns an error if the name is empty or the insert fails.
pub async fn create_service_template(
    db: &DatabaseConnection,
    owner_id: &str,
    name: String,
    bowl_count: u32,
    sort_order: i32,
) -> Result<service_template::Model> {
    check_name(&name)?;

    service_template::ActiveModel {
        owner_id: Set(owner_id.to_string()),
        name: Set(name.trim().to_string()),
        bowl_count: Set(i32::try_from(bowl_count)?),
        is_active: Set(true),
        sort_order: Set(sort_order),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Renames a template and changes its bowl count. Services already added to
/// visits keep their own name and bowls.
///
/// # Errors
/// Returns [`Error::InvalidInput`] for a blank name and [`Error::NotFound`] if
/// the template does not belong to the owner.
pub async fn update_service_template(
    db: &DatabaseConnection,
    owner_id: &str,
    template_id: StoredId,
    name: String,
    bowl_count: u32,
) -> Result<service_template::Model> {
    check_name(&name)?;

    let mut template: service_template::ActiveModel =
        find_owned(db, owner_id, template_id).await?.into();
    template.name = Set(name.trim().to_string());
    template.bowl_count = Set(i32::try_from(bowl_count)?);
    template.update(db).await.map_err(Into::into)
}

/// Activates or deactivates a template.
///
/// # Errors
/// Returns [`Error::NotFound`] if the template does not belong to the owner.
pub async fn set_service_template_active(
    db: &DatabaseConnection,
    owner_id: &str,
    template_id: StoredId,
    is_active: bool,
) -> Result<service_template::Model> {
    let mut template: service_template::ActiveModel =
        find_owned(db, owner_id, template_id).await?.into();
    template.is_active = Set(is_active);
    template.update(db).await.map_err(Into::into)
}

/// Deletes a template. Stored services only carry the name, so nothing else
/// references the row.
///
/// # Errors
/// Returns [`Error::NotFound`] if the template does not belong to the owner.
pub async fn delete_service_template(
    db: &DatabaseConnection,
    owner_id: &str,
    template_id: StoredId,
) -> Result<()> {
    let template = find_owned(db, owner_id, template_id).await?;
    ServiceTemplate::delete_by_id(template.id).exec(db).await?;
    info!(template_id = template.id, "Service template deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_templates_listed_in_sort_order() -> Result<()> {
        let db = setup_test_db().await?;
        create_service_template(&db, TEST_OWNER, "Střih".to_string(), 0, 2).await?;
        create_service_template(&db, TEST_OWNER, "Barvení".to_string(), 1, 1).await?;
        create_service_template(&db, "someone-else", "Melír".to_string(), 2, 0).await?;

        let templates = get_all_service_templates(&db, TEST_OWNER).await?;
        assert_eq!(templates.len(), 2);
        assert_eq!(templates[0].name, "Barvení");
        assert_eq!(templates[1].bowl_count, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_template_name_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_service_template(&db, TEST_OWNER, String::new(), 1, 0).await;
        assert!(matches!(result, Err(Error::InvalidInput { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_delete_template() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_service_template(&db, TEST_OWNER, "Barvení".to_string(), 1, 0).await?;
        let id = StoredId::new(created.id);

        let updated = update_service_template(&db, TEST_OWNER, id, " Melír ".to_string(), 2).await?;
        assert_eq!(updated.name, "Melír");
        assert_eq!(updated.bowl_count, 2);

        let blank = update_service_template(&db, TEST_OWNER, id, " ".to_string(), 2).await;
        assert!(matches!(blank, Err(Error::InvalidInput { .. })));

        let hidden = set_service_template_active(&db, TEST_OWNER, id, false).await?;
        assert!(!hidden.is_active);
        let catalog = crate::core::catalog::load_catalog(&db, TEST_OWNER).await?;
        assert!(catalog.service_template(id).is_none());

        assert!(delete_service_template(&db, "someone-else", id).await.unwrap_err().is_not_found());
        delete_service_template(&db, TEST_OWNER, id).await?;
        assert!(get_all_service_templates(&db, TEST_OWNER).await?.is_empty());
        assert!(delete_service_template(&db, TEST_OWNER, id).await.unwrap_err().is_not_found());
        Ok(())
    }
}
